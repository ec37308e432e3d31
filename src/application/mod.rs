//! Application layer: Use cases and services.
//!
//! This module orchestrates domain logic with ports to implement
//! the prediction request pipeline and its chat rendering.

mod aggregate;
pub mod chat;
mod matcher;
pub(crate) mod predictor;

pub use aggregate::{alternatives, build_report, symptom_details, AggregateConfig};
pub use chat::{format_for_chat, ChatMessage, ChatResponse};
pub use matcher::{split_phrases, MatcherConfig, SymptomMatcher};
pub use predictor::DiseasePredictor;
