//! Static reference data: disease descriptions, precautions and symptom severities.
//!
//! Loaded once at startup and never mutated afterwards.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Placeholder used when a disease has no description on file.
pub const MISSING_DESCRIPTION: &str = "No description available";

/// Description and precautions for one disease.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiseaseInfo {
    pub description: Option<String>,
    /// Ordered precautions (0 to 4 in the shipped data).
    pub precautions: Vec<String>,
}

/// Severity weights per symptom, with the mean used for unknown symptoms.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeverityTable {
    weights: HashMap<String, f64>,
    mean: f64,
}

impl SeverityTable {
    /// Build a table; the fallback is the arithmetic mean of all rows.
    ///
    /// When the same symptom appears twice the last weight wins for lookups,
    /// but both rows count towards the mean.
    #[must_use]
    pub fn new<I, S>(rows: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let mut weights = HashMap::new();
        let mut sum = 0.0;
        let mut count = 0usize;

        for (symptom, weight) in rows {
            let symptom: String = symptom.into();
            weights.insert(symptom.trim().to_string(), weight);
            sum += weight;
            count += 1;
        }

        let mean = if count == 0 { 0.0 } else { sum / count as f64 };
        Self { weights, mean }
    }

    /// Weight for an exact symptom name, if present.
    #[must_use]
    pub fn weight(&self, symptom: &str) -> Option<f64> {
        self.weights.get(symptom).copied()
    }

    /// Weight for a symptom, falling back to the table mean.
    #[must_use]
    pub fn weight_or_mean(&self, symptom: &str) -> f64 {
        self.weight(symptom).unwrap_or(self.mean)
    }

    #[must_use]
    pub fn mean(&self) -> f64 {
        self.mean
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

/// All reference lookups used to enrich a prediction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReferenceData {
    diseases: HashMap<String, DiseaseInfo>,
    severity: SeverityTable,
}

impl ReferenceData {
    #[must_use]
    pub fn new(diseases: HashMap<String, DiseaseInfo>, severity: SeverityTable) -> Self {
        Self { diseases, severity }
    }

    /// Reference record for a disease (exact name match).
    #[must_use]
    pub fn disease(&self, name: &str) -> Option<&DiseaseInfo> {
        self.diseases.get(name)
    }

    /// Description for a disease, or [`MISSING_DESCRIPTION`].
    #[must_use]
    pub fn description_or_default(&self, name: &str) -> String {
        self.disease(name)
            .and_then(|d| d.description.clone())
            .unwrap_or_else(|| MISSING_DESCRIPTION.to_string())
    }

    /// Precautions for a disease; empty when none are on file.
    #[must_use]
    pub fn precautions(&self, name: &str) -> Vec<String> {
        self.disease(name)
            .map(|d| d.precautions.clone())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn severity(&self) -> &SeverityTable {
        &self.severity
    }

    /// Number of diseases with a reference record.
    #[must_use]
    pub fn disease_count(&self) -> usize {
        self.diseases.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_mean_and_fallback() {
        let table = SeverityTable::new([("itching", 1.0), ("chest_pain", 7.0), ("cough", 4.0)]);
        assert_eq!(table.len(), 3);
        assert!((table.mean() - 4.0).abs() < f64::EPSILON);
        assert_eq!(table.weight_or_mean("chest_pain"), 7.0);
        assert_eq!(table.weight_or_mean("unknown"), table.mean());
    }

    #[test]
    fn test_empty_severity_table() {
        let table = SeverityTable::new(Vec::<(String, f64)>::new());
        assert!(table.is_empty());
        assert_eq!(table.mean(), 0.0);
    }

    #[test]
    fn test_disease_defaults() {
        let mut diseases = HashMap::new();
        diseases.insert(
            "Flu".to_string(),
            DiseaseInfo {
                description: Some("Viral infection".to_string()),
                precautions: vec!["rest".to_string(), "fluids".to_string()],
            },
        );
        diseases.insert(
            "Rash".to_string(),
            DiseaseInfo {
                description: None,
                precautions: Vec::new(),
            },
        );
        let data = ReferenceData::new(diseases, SeverityTable::default());

        assert_eq!(data.description_or_default("Flu"), "Viral infection");
        assert_eq!(data.precautions("Flu").len(), 2);
        assert_eq!(data.description_or_default("Rash"), MISSING_DESCRIPTION);
        assert_eq!(data.description_or_default("Unknown"), MISSING_DESCRIPTION);
        assert!(data.precautions("Unknown").is_empty());
        assert_eq!(data.disease_count(), 2);
    }
}
