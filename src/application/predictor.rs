//! Disease predictor: the request pipeline over immutable loaded state.
//!
//! parse phrases -> match vocabulary -> encode -> classify -> aggregate

use crate::adapters::forest::{self, RandomForestModel};
use crate::adapters::CsvReferenceSource;
use crate::config::Settings;
use crate::domain::{NoMatchReport, PredictionOutcome, ReferenceData, SymptomVocabulary};
use crate::ports::{ClassProbabilities, ModelError, ReferenceSource, SymptomClassifier};
use crate::{Result, SymptriageError};

use super::aggregate::{build_report, AggregateConfig};
use super::matcher::{split_phrases, MatcherConfig, SymptomMatcher};

/// Everything needed to answer prediction requests.
///
/// Read-only after construction; share it behind an `Arc` if several
/// threads need it.
pub struct DiseasePredictor<C>
where
    C: SymptomClassifier,
{
    classifier: C,
    vocabulary: SymptomVocabulary,
    reference: ReferenceData,
    matcher: SymptomMatcher,
    aggregate: AggregateConfig,
}

impl<C> DiseasePredictor<C>
where
    C: SymptomClassifier,
{
    /// Assemble a predictor from loaded parts.
    ///
    /// # Errors
    /// Returns `ModelError::DimensionMismatch` if the classifier's input width
    /// differs from the vocabulary size.
    pub fn new(
        classifier: C,
        vocabulary: SymptomVocabulary,
        reference: ReferenceData,
        matcher: MatcherConfig,
        aggregate: AggregateConfig,
    ) -> Result<Self> {
        if classifier.n_features() != vocabulary.len() {
            return Err(ModelError::DimensionMismatch {
                expected: classifier.n_features(),
                got: vocabulary.len(),
            }
            .into());
        }

        let matcher = SymptomMatcher::new(&vocabulary, matcher);
        Ok(Self {
            classifier,
            vocabulary,
            reference,
            matcher,
            aggregate,
        })
    }

    /// Canonical symptom names, for listing and autocomplete.
    #[must_use]
    pub fn symptoms(&self) -> &[String] {
        self.vocabulary.symptoms()
    }

    /// Disease labels the model can predict.
    #[must_use]
    pub fn classes(&self) -> &[String] {
        self.classifier.classes()
    }

    /// Whether the model carries per-symptom importances.
    #[must_use]
    pub fn has_feature_importance(&self) -> bool {
        self.classifier.feature_importance().is_some()
    }

    #[must_use]
    pub fn vocabulary(&self) -> &SymptomVocabulary {
        &self.vocabulary
    }

    #[must_use]
    pub fn reference(&self) -> &ReferenceData {
        &self.reference
    }

    #[must_use]
    pub fn matcher(&self) -> &SymptomMatcher {
        &self.matcher
    }

    /// Classify a set of canonical symptoms.
    ///
    /// # Errors
    /// Returns error if a name is outside the vocabulary or the model rejects the vector.
    pub fn predict<S: AsRef<str>>(&self, symptoms: &[S]) -> Result<(String, ClassProbabilities)> {
        let features = self.vocabulary.encode(symptoms)?;
        tracing::debug!(
            "Encoded {} of {} symptoms as present",
            features.count_present(),
            features.len()
        );
        Ok(self.classifier.predict(&features)?)
    }

    /// Run the full pipeline on a comma-separated symptom request.
    ///
    /// A request where nothing matched is not an error: it yields
    /// [`PredictionOutcome::NoMatch`] with suggestions.
    ///
    /// # Errors
    /// Returns `SymptriageError::EmptyRequest` when the request holds no
    /// phrase at all, or any prediction failure.
    pub fn predict_and_info(&self, input: &str) -> Result<PredictionOutcome> {
        if split_phrases(input).is_empty() {
            return Err(SymptriageError::EmptyRequest);
        }

        let parsed = self.matcher.parse_symptoms(input);
        if !parsed.has_matches() {
            tracing::info!(
                "No symptom matched ({} phrases unmatched, {} with suggestions)",
                parsed.unmatched.len(),
                parsed.suggestions.len()
            );
            return Ok(PredictionOutcome::NoMatch(NoMatchReport::new(
                parsed.unmatched,
                parsed.suggestions,
            )));
        }

        let (_, probabilities) = self.predict(&parsed.matched)?;
        let report = build_report(
            parsed,
            &probabilities,
            &self.reference,
            &self.vocabulary,
            self.classifier.feature_importance(),
            &self.aggregate,
        );

        tracing::info!(
            "Prediction complete: {} symptoms matched, {} unmatched, top={} ({})",
            report.matched_symptoms.len(),
            report.unmatched_symptoms.len(),
            report.top_prediction.disease,
            report.top_prediction.percent()
        );
        Ok(PredictionOutcome::Prediction(report))
    }
}

impl DiseasePredictor<RandomForestModel> {
    /// Load the model directory and reference CSVs named by `settings`.
    ///
    /// # Errors
    /// Returns error if any artifact is missing or malformed.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        tracing::info!("Loading predictor from {:?}", settings.model_dir);

        let (model, vocabulary) = forest::load_model_dir(&settings.model_dir)?;
        let source = CsvReferenceSource {
            description_path: settings.description_csv.clone(),
            precaution_path: settings.precaution_csv.clone(),
            severity_path: settings.severity_csv.clone(),
        };
        let reference = source.load_reference()?;

        let predictor = Self::new(
            model,
            vocabulary,
            reference,
            settings.matcher,
            settings.aggregate,
        )?;
        tracing::info!(
            "Predictor ready: {} symptoms, {} diseases",
            predictor.symptoms().len(),
            predictor.classes().len()
        );
        Ok(predictor)
    }
}
