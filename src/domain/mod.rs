//! Domain layer: Core types for symptom triage.
//!
//! Pure Rust types with no I/O. Everything here is immutable once built
//! and safe to share across threads.

mod prediction;
mod reference;
pub mod similarity;
mod vocabulary;

pub use prediction::{
    DiseasePrediction, NoMatchReport, ParsedSymptoms, PredictionOutcome, PredictionReport,
    SymptomDetail, SymptomSuggestion, NO_MATCH_MESSAGE,
};
pub use reference::{DiseaseInfo, ReferenceData, SeverityTable, MISSING_DESCRIPTION};
pub use similarity::SimilarityMetric;
pub use vocabulary::{FeatureVector, SymptomVocabulary, VocabularyError};
