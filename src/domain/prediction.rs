//! Prediction result types.
//!
//! A request either yields a full [`PredictionReport`] or, when none of the
//! supplied phrases matched the vocabulary, a [`NoMatchReport`] with
//! suggestions. Both are plain values; nothing here performs I/O.

use serde::{Deserialize, Serialize};

/// Message carried by the no-match branch.
pub const NO_MATCH_MESSAGE: &str = "No valid symptoms provided";

/// One candidate disease with its reference information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiseasePrediction {
    pub disease: String,
    /// Model probability in `[0, 1]`.
    pub probability: f64,
    pub description: String,
    pub precautions: Vec<String>,
}

impl DiseasePrediction {
    /// Probability formatted as a percentage with one decimal, e.g. `"42.0%"`.
    #[must_use]
    pub fn percent(&self) -> String {
        format!("{:.1}%", self.probability * 100.0)
    }
}

/// Severity (and, when the model provides it, importance) of a matched symptom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymptomDetail {
    pub symptom: String,
    /// Severity weight on the 1-7 scale, or the global mean when unknown.
    pub severity: f64,
    pub importance: Option<f64>,
}

/// Closest vocabulary entries for a phrase that did not match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymptomSuggestion {
    /// Phrase as the user typed it (trimmed).
    pub phrase: String,
    /// Up to three canonical symptom names, best first.
    pub candidates: Vec<String>,
}

/// Output of matching one request against the vocabulary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedSymptoms {
    /// Canonical names, in first-seen order, without duplicates.
    pub matched: Vec<String>,
    /// Phrases with no acceptable match, in input order.
    pub unmatched: Vec<String>,
    pub suggestions: Vec<SymptomSuggestion>,
}

impl ParsedSymptoms {
    #[must_use]
    pub fn has_matches(&self) -> bool {
        !self.matched.is_empty()
    }
}

/// Successful prediction for a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionReport {
    pub top_prediction: DiseasePrediction,
    /// Other likely diseases, strictly below the top prediction, most likely first.
    pub alternative_predictions: Vec<DiseasePrediction>,
    pub matched_symptoms: Vec<String>,
    /// Most severe first.
    pub symptom_details: Vec<SymptomDetail>,
    pub unmatched_symptoms: Vec<String>,
    pub symptom_suggestions: Vec<SymptomSuggestion>,
    pub generated_at: chrono::DateTime<chrono::Utc>,
}

/// Returned instead of a prediction when no phrase matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoMatchReport {
    pub error: String,
    pub unmatched: Vec<String>,
    pub suggestions: Vec<SymptomSuggestion>,
}

impl NoMatchReport {
    #[must_use]
    pub fn new(unmatched: Vec<String>, suggestions: Vec<SymptomSuggestion>) -> Self {
        Self {
            error: NO_MATCH_MESSAGE.to_string(),
            unmatched,
            suggestions,
        }
    }
}

/// Result of a prediction request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PredictionOutcome {
    Prediction(PredictionReport),
    NoMatch(NoMatchReport),
}

impl PredictionOutcome {
    #[must_use]
    pub fn report(&self) -> Option<&PredictionReport> {
        match self {
            Self::Prediction(report) => Some(report),
            Self::NoMatch(_) => None,
        }
    }

    #[must_use]
    pub fn is_prediction(&self) -> bool {
        matches!(self, Self::Prediction(_))
    }
}
