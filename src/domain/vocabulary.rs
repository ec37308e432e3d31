//! Symptom vocabulary and the binary feature vector built from it.
//!
//! The vocabulary fixes the model's input dimensionality: one feature per
//! canonical symptom, in vocabulary order.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

/// Errors raised while building or using a vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VocabularyError {
    #[error("Symptom vocabulary is empty")]
    Empty,

    #[error("Duplicate symptom in vocabulary: {0}")]
    Duplicate(String),

    #[error("Symptom not in vocabulary: {0}")]
    UnknownSymptom(String),
}

/// Ordered set of canonical symptom names understood by the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct SymptomVocabulary {
    symptoms: Vec<String>,

    /// Lowercased name -> position in `symptoms`.
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl SymptomVocabulary {
    /// Build a vocabulary from canonical names, keeping their order.
    ///
    /// Names are trimmed. Two names that collide once lowercased are rejected,
    /// since lookups are case-insensitive.
    ///
    /// # Errors
    /// Returns `VocabularyError::Empty` or `VocabularyError::Duplicate`.
    pub fn new<I, S>(symptoms: I) -> Result<Self, VocabularyError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names = Vec::new();
        let mut index = HashMap::new();

        for raw in symptoms {
            let raw: String = raw.into();
            let name = raw.trim().to_string();
            if name.is_empty() {
                continue;
            }
            let key = name.to_lowercase();
            if index.insert(key, names.len()).is_some() {
                return Err(VocabularyError::Duplicate(name));
            }
            names.push(name);
        }

        if names.is_empty() {
            return Err(VocabularyError::Empty);
        }

        Ok(Self {
            symptoms: names,
            index,
        })
    }

    /// Number of symptoms (= feature dimensionality).
    #[must_use]
    pub fn len(&self) -> usize {
        self.symptoms.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symptoms.is_empty()
    }

    /// Canonical names in vocabulary order.
    #[must_use]
    pub fn symptoms(&self) -> &[String] {
        &self.symptoms
    }

    /// Position of a symptom, looked up case-insensitively after trimming.
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(&name.trim().to_lowercase()).copied()
    }

    /// Canonical spelling of a symptom, looked up case-insensitively.
    #[must_use]
    pub fn canonical(&self, name: &str) -> Option<&str> {
        self.position(name).map(|i| self.symptoms[i].as_str())
    }

    /// Lowercased keys paired with their canonical names, in vocabulary order.
    pub fn lowercase_entries(&self) -> impl Iterator<Item = (String, &str)> {
        self.symptoms.iter().map(|s| (s.to_lowercase(), s.as_str()))
    }

    /// Encode a set of canonical symptoms as a binary feature vector.
    ///
    /// The result depends only on the set of names, not on their order or
    /// multiplicity.
    ///
    /// # Errors
    /// Returns `VocabularyError::UnknownSymptom` for a name outside the vocabulary.
    pub fn encode<S: AsRef<str>>(&self, present: &[S]) -> Result<FeatureVector, VocabularyError> {
        let mut positions = BTreeSet::new();
        for name in present {
            let name = name.as_ref();
            let pos = self
                .position(name)
                .ok_or_else(|| VocabularyError::UnknownSymptom(name.to_string()))?;
            positions.insert(pos);
        }

        let mut values = vec![0u8; self.len()];
        for pos in positions {
            values[pos] = 1;
        }

        Ok(FeatureVector { values })
    }
}

impl TryFrom<Vec<String>> for SymptomVocabulary {
    type Error = VocabularyError;

    fn try_from(value: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SymptomVocabulary> for Vec<String> {
    fn from(value: SymptomVocabulary) -> Self {
        value.symptoms
    }
}

/// Binary presence vector, one slot per vocabulary symptom.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureVector {
    values: Vec<u8>,
}

impl FeatureVector {
    /// Wrap raw values (used by model adapters and tests).
    #[must_use]
    pub fn from_values(values: Vec<u8>) -> Self {
        Self { values }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[must_use]
    pub fn values(&self) -> &[u8] {
        &self.values
    }

    /// Value at `index` as a float, the way tree splits compare it.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).map(|&v| f64::from(v))
    }

    /// Number of symptoms marked present.
    #[must_use]
    pub fn count_present(&self) -> usize {
        self.values.iter().filter(|&&v| v != 0).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab() -> SymptomVocabulary {
        SymptomVocabulary::new(["itching", "skin_rash", "Chest Pain", "sweating"])
            .expect("valid vocabulary")
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let v = vocab();
        assert_eq!(v.canonical("chest pain"), Some("Chest Pain"));
        assert_eq!(v.canonical("  SWEATING "), Some("sweating"));
        assert_eq!(v.canonical("fever"), None);
    }

    #[test]
    fn test_every_entry_found_by_lowercase_name() {
        let v = vocab();
        for name in v.symptoms() {
            assert_eq!(v.canonical(&name.to_lowercase()), Some(name.as_str()));
        }
    }

    #[test]
    fn test_rejects_duplicates_and_empty() {
        assert_eq!(
            SymptomVocabulary::new(["a", "A"]).unwrap_err(),
            VocabularyError::Duplicate("A".to_string())
        );
        assert_eq!(
            SymptomVocabulary::new(Vec::<String>::new()).unwrap_err(),
            VocabularyError::Empty
        );
    }

    #[test]
    fn test_encode_is_order_independent() {
        let v = vocab();
        let a = v.encode(&["sweating", "itching"]).expect("encode");
        let b = v.encode(&["itching", "sweating", "itching"]).expect("encode");
        assert_eq!(a, b);
        assert_eq!(a.len(), v.len());
        assert_eq!(a.values(), &[1, 0, 0, 1]);
        assert_eq!(a.count_present(), 2);
    }

    #[test]
    fn test_encode_empty_set_is_all_zero() {
        let v = vocab();
        let empty: [&str; 0] = [];
        let fv = v.encode(&empty).expect("encode");
        assert_eq!(fv.len(), 4);
        assert_eq!(fv.count_present(), 0);
    }

    #[test]
    fn test_encode_unknown_symptom() {
        let v = vocab();
        let err = v.encode(&["fever"]).unwrap_err();
        assert_eq!(err, VocabularyError::UnknownSymptom("fever".to_string()));
    }

    #[test]
    fn test_serde_roundtrip_rebuilds_index() {
        let v = vocab();
        let json = serde_json::to_string(&v).expect("serialize");
        assert!(json.starts_with('['));
        let back: SymptomVocabulary = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.position("skin_rash"), Some(1));
    }
}
