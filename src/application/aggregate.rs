//! Result aggregation: turns model output and reference data into a report.

use crate::domain::{
    DiseasePrediction, ParsedSymptoms, PredictionReport, ReferenceData, SymptomDetail,
    SymptomVocabulary,
};
use crate::ports::ClassProbabilities;

/// How many diseases a report lists.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregateConfig {
    /// Top prediction plus alternatives; at most `top_k - 1` alternatives.
    pub top_k: usize,
    /// Alternatives must have probability strictly above this.
    pub min_alternative_probability: f64,
}

impl Default for AggregateConfig {
    fn default() -> Self {
        Self {
            top_k: 3,
            min_alternative_probability: 0.01,
        }
    }
}

fn disease_prediction(reference: &ReferenceData, disease: &str, probability: f64) -> DiseasePrediction {
    DiseasePrediction {
        disease: disease.to_string(),
        probability,
        description: reference.description_or_default(disease),
        precautions: reference.precautions(disease),
    }
}

/// Alternatives to `top`: most probable first, above the threshold, at most `top_k - 1`.
#[must_use]
pub fn alternatives(
    probabilities: &ClassProbabilities,
    top: &str,
    reference: &ReferenceData,
    config: &AggregateConfig,
) -> Vec<DiseasePrediction> {
    probabilities
        .ranked()
        .into_iter()
        .filter(|(class, _)| *class != top)
        .take(config.top_k.saturating_sub(1))
        .filter(|(_, p)| *p > config.min_alternative_probability)
        .map(|(class, p)| disease_prediction(reference, class, p))
        .collect()
}

/// Severity (and importance, when known) of each matched symptom, most severe first.
///
/// Symptoms missing from the severity table get the table mean. Ties keep
/// input order.
#[must_use]
pub fn symptom_details(
    matched: &[String],
    reference: &ReferenceData,
    vocabulary: &SymptomVocabulary,
    importance: Option<&[f64]>,
) -> Vec<SymptomDetail> {
    let mut details: Vec<SymptomDetail> = matched
        .iter()
        .map(|symptom| SymptomDetail {
            symptom: symptom.clone(),
            severity: reference.severity().weight_or_mean(symptom),
            importance: importance
                .zip(vocabulary.position(symptom))
                .and_then(|(values, i)| values.get(i).copied()),
        })
        .collect();
    details.sort_by(|a, b| b.severity.total_cmp(&a.severity));
    details
}

/// Build the full report for a request that matched at least one symptom.
#[must_use]
pub fn build_report(
    parsed: ParsedSymptoms,
    probabilities: &ClassProbabilities,
    reference: &ReferenceData,
    vocabulary: &SymptomVocabulary,
    importance: Option<&[f64]>,
    config: &AggregateConfig,
) -> PredictionReport {
    let (top, top_probability) = probabilities.top();
    let top_prediction = disease_prediction(reference, top, top_probability);
    let alternative_predictions = alternatives(probabilities, top, reference, config);
    let symptom_details = symptom_details(&parsed.matched, reference, vocabulary, importance);

    PredictionReport {
        top_prediction,
        alternative_predictions,
        matched_symptoms: parsed.matched,
        symptom_details,
        unmatched_symptoms: parsed.unmatched,
        symptom_suggestions: parsed.suggestions,
        generated_at: chrono::Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DiseaseInfo, SeverityTable, MISSING_DESCRIPTION};
    use std::collections::HashMap;

    fn reference() -> ReferenceData {
        let mut diseases = HashMap::new();
        diseases.insert(
            "Heart attack".to_string(),
            DiseaseInfo {
                description: Some("Blocked blood flow to the heart.".into()),
                precautions: vec!["call ambulance".into(), "chew aspirin".into()],
            },
        );
        let severity = SeverityTable::new([("chest_pain", 7.0), ("sweating", 3.0), ("cough", 4.0)]);
        ReferenceData::new(diseases, severity)
    }

    fn vocab() -> SymptomVocabulary {
        SymptomVocabulary::new(["chest_pain", "cough", "headache", "sweating"]).expect("vocab")
    }

    fn probs(values: &[(&str, f64)]) -> ClassProbabilities {
        ClassProbabilities::new(
            values.iter().map(|(c, _)| (*c).to_string()).collect(),
            values.iter().map(|(_, p)| *p).collect(),
        )
        .expect("probabilities")
    }

    #[test]
    fn test_alternatives_exclude_top_and_filter_low() {
        let p = probs(&[
            ("Allergy", 0.005),
            ("Flu", 0.30),
            ("Heart attack", 0.60),
            ("Migraine", 0.095),
        ]);
        let alts = alternatives(&p, "Heart attack", &reference(), &AggregateConfig::default());
        let names: Vec<&str> = alts.iter().map(|a| a.disease.as_str()).collect();
        assert_eq!(names, vec!["Flu", "Migraine"]);
        assert!(alts[0].probability > alts[1].probability);
        assert_eq!(alts[0].description, MISSING_DESCRIPTION);
        assert!(alts[0].precautions.is_empty());

        let config = AggregateConfig {
            top_k: 1,
            ..AggregateConfig::default()
        };
        assert!(alternatives(&p, "Heart attack", &reference(), &config).is_empty());
    }

    #[test]
    fn test_alternatives_skip_below_threshold() {
        let p = probs(&[("Flu", 0.995), ("Cold", 0.005)]);
        assert!(alternatives(&p, "Flu", &reference(), &AggregateConfig::default()).is_empty());
    }

    #[test]
    fn test_symptom_details_sorted_with_mean_fallback() {
        let reference = reference();
        let matched = vec![
            "sweating".to_string(),
            "headache".to_string(),
            "chest_pain".to_string(),
        ];
        let importance = [0.4, 0.1, 0.2, 0.3];
        let details = symptom_details(&matched, &reference, &vocab(), Some(&importance));

        let order: Vec<&str> = details.iter().map(|d| d.symptom.as_str()).collect();
        assert_eq!(order, vec!["chest_pain", "headache", "sweating"]);
        let mean = reference.severity().mean();
        assert!((details[1].severity - mean).abs() < f64::EPSILON);
        assert_eq!(details[0].importance, Some(0.4));
        assert_eq!(details[2].importance, Some(0.3));

        let without = symptom_details(&matched, &reference, &vocab(), None);
        assert!(without.iter().all(|d| d.importance.is_none()));
    }

    #[test]
    fn test_build_report() {
        let parsed = ParsedSymptoms {
            matched: vec!["chest_pain".into(), "sweating".into()],
            unmatched: vec!["qqq".into()],
            suggestions: Vec::new(),
        };
        let p = probs(&[("Flu", 0.2), ("Heart attack", 0.8)]);
        let report = build_report(
            parsed,
            &p,
            &reference(),
            &vocab(),
            None,
            &AggregateConfig::default(),
        );

        assert_eq!(report.top_prediction.disease, "Heart attack");
        assert_eq!(report.top_prediction.percent(), "80.0%");
        assert_eq!(report.top_prediction.precautions.len(), 2);
        assert_eq!(report.alternative_predictions.len(), 1);
        assert_eq!(report.matched_symptoms, vec!["chest_pain", "sweating"]);
        assert_eq!(report.unmatched_symptoms, vec!["qqq"]);
        assert_eq!(report.symptom_details[0].symptom, "chest_pain");
    }
}
