//! # Symptriage
//!
//! Symptom-to-disease triage: free-text symptoms in, ranked diseases out.
//!
//! This crate provides:
//! - Fuzzy matching of user phrases against the model's symptom vocabulary
//! - Random forest inference (and training) over one-hot symptom features
//! - Reference enrichment: descriptions, precautions, severity ranking
//! - Terminal UI and a one-shot CLI
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Core types (vocabulary, similarity, reference data, reports)
//! - `ports`: Trait definitions for the classifier and reference source
//! - `adapters`: Concrete implementations (JSON random forest, CSV tables)
//! - `application`: The prediction pipeline and chat rendering
//! - `tui`: Terminal user interface

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod tui;

pub use application::DiseasePredictor;
pub use config::Settings;
pub use domain::{PredictionOutcome, PredictionReport};

/// Result type for Symptriage operations
pub type Result<T> = std::result::Result<T, SymptriageError>;

/// Main error type for Symptriage
#[derive(Debug, thiserror::Error)]
pub enum SymptriageError {
    #[error("No symptoms provided")]
    EmptyRequest,

    #[error("Reference data error: {0}")]
    Reference(#[from] adapters::ReferenceError),

    #[error("Model error: {0}")]
    Model(#[from] ports::ModelError),

    #[error("Vocabulary error: {0}")]
    Vocabulary(#[from] domain::VocabularyError),
}
