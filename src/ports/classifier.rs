//! Classifier port: Trait for the trained disease model.
//!
//! This trait abstracts the model artifact (a serialized random forest)
//! from the application logic.

use crate::domain::FeatureVector;

/// Errors raised while loading or evaluating a model.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Failed to read model artifact {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid model artifact: {0}")]
    Format(#[from] serde_json::Error),

    #[error("Malformed model: {0}")]
    Malformed(String),

    #[error("Feature vector has {got} entries, model expects {expected}")]
    DimensionMismatch { expected: usize, got: usize },
}

/// Probability of every class the model knows, in class order.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassProbabilities {
    classes: Vec<String>,
    probabilities: Vec<f64>,
}

impl ClassProbabilities {
    /// Pair class labels with probabilities.
    ///
    /// # Errors
    /// Returns `ModelError::Malformed` if the lengths differ or there are no classes.
    pub fn new(classes: Vec<String>, probabilities: Vec<f64>) -> Result<Self, ModelError> {
        if classes.is_empty() {
            return Err(ModelError::Malformed("model has no classes".into()));
        }
        if classes.len() != probabilities.len() {
            return Err(ModelError::Malformed(format!(
                "{} classes but {} probabilities",
                classes.len(),
                probabilities.len()
            )));
        }
        Ok(Self {
            classes,
            probabilities,
        })
    }

    #[must_use]
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    #[must_use]
    pub fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }

    /// Most probable class; ties go to the lowest class index.
    #[must_use]
    pub fn top(&self) -> (&str, f64) {
        let mut best = 0;
        for (i, &p) in self.probabilities.iter().enumerate().skip(1) {
            if p > self.probabilities[best] {
                best = i;
            }
        }
        (self.classes[best].as_str(), self.probabilities[best])
    }

    /// `(class, probability)` pairs, most probable first.
    ///
    /// Equal probabilities keep class order.
    #[must_use]
    pub fn ranked(&self) -> Vec<(&str, f64)> {
        let mut pairs: Vec<(&str, f64)> = self
            .classes
            .iter()
            .map(String::as_str)
            .zip(self.probabilities.iter().copied())
            .collect();
        pairs.sort_by(|a, b| b.1.total_cmp(&a.1));
        pairs
    }
}

/// Trait for a trained symptom classifier.
///
/// Implementations are read-only after loading and shared across requests.
pub trait SymptomClassifier: Send + Sync {
    /// Number of input features the model was trained on.
    fn n_features(&self) -> usize;

    /// Class labels in probability order.
    fn classes(&self) -> &[String];

    /// Probability distribution over all classes.
    ///
    /// # Errors
    /// Returns `ModelError::DimensionMismatch` if `features` has the wrong length.
    fn predict_proba(&self, features: &FeatureVector) -> Result<ClassProbabilities, ModelError>;

    /// Per-feature importance in feature order, if the artifact carries it.
    fn feature_importance(&self) -> Option<&[f64]> {
        None
    }

    /// Highest-probability label together with the full distribution.
    ///
    /// # Errors
    /// Propagates errors from [`SymptomClassifier::predict_proba`].
    fn predict(&self, features: &FeatureVector) -> Result<(String, ClassProbabilities), ModelError> {
        let probabilities = self.predict_proba(features)?;
        let label = probabilities.top().0.to_string();
        Ok((label, probabilities))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn probs(values: &[f64]) -> ClassProbabilities {
        let classes = (0..values.len()).map(|i| format!("D{i}")).collect();
        ClassProbabilities::new(classes, values.to_vec()).expect("valid")
    }

    #[test]
    fn test_top_prefers_first_on_tie() {
        let p = probs(&[0.4, 0.4, 0.2]);
        assert_eq!(p.top(), ("D0", 0.4));
    }

    #[test]
    fn test_ranked_is_descending() {
        let p = probs(&[0.1, 0.6, 0.3]);
        let ranked = p.ranked();
        assert_eq!(ranked[0].0, "D1");
        assert_eq!(ranked[1].0, "D2");
        assert_eq!(ranked[2].0, "D0");
        assert_eq!(ranked[0].1, 0.6);
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let err = ClassProbabilities::new(vec!["a".into()], vec![0.5, 0.5]).unwrap_err();
        assert!(matches!(err, ModelError::Malformed(_)));
        assert!(ClassProbabilities::new(Vec::new(), Vec::new()).is_err());
    }
}
