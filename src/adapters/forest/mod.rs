//! Random forest adapter: Implementation of SymptomClassifier.
//!
//! The model directory holds two artifacts written by the `train_model` binary:
//! - `disease_rf_model.json`: the forest (see [`ForestArtifact`])
//! - `symptom_list.json`: the symptom vocabulary as a JSON array, in feature order

mod model;
pub mod train;

use std::path::Path;

pub use model::{DecisionTree, ForestArtifact, RandomForestModel, TreeNode, FORMAT_VERSION};

use crate::domain::SymptomVocabulary;
use crate::ports::{ModelError, SymptomClassifier};

/// File name of the forest artifact inside the model directory.
pub const MODEL_FILE: &str = "disease_rf_model.json";

/// File name of the symptom vocabulary inside the model directory.
pub const SYMPTOM_LIST_FILE: &str = "symptom_list.json";

/// Read the symptom vocabulary from a JSON array of names.
///
/// # Errors
/// Returns error if the file is unreadable, not a JSON string array, or
/// contains duplicates.
pub fn load_vocabulary(path: &Path) -> Result<SymptomVocabulary, ModelError> {
    let content = std::fs::read_to_string(path).map_err(|source| ModelError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let vocabulary: SymptomVocabulary = serde_json::from_str(&content)?;
    tracing::info!("Loaded {} symptoms from {:?}", vocabulary.len(), path);
    Ok(vocabulary)
}

/// Write the symptom vocabulary as a JSON array.
///
/// # Errors
/// Returns error if the write fails.
pub fn save_vocabulary(vocabulary: &SymptomVocabulary, path: &Path) -> Result<(), ModelError> {
    let json = serde_json::to_vec_pretty(vocabulary.symptoms())?;
    std::fs::write(path, json).map_err(|source| ModelError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Load the forest and vocabulary from `model_dir` and check they agree.
///
/// # Errors
/// Returns error if either artifact fails to load, or the forest's input
/// width differs from the vocabulary size.
pub fn load_model_dir(model_dir: &Path) -> Result<(RandomForestModel, SymptomVocabulary), ModelError> {
    let model = RandomForestModel::load(&model_dir.join(MODEL_FILE))?;
    let vocabulary = load_vocabulary(&model_dir.join(SYMPTOM_LIST_FILE))?;

    if model.n_features() != vocabulary.len() {
        return Err(ModelError::DimensionMismatch {
            expected: model.n_features(),
            got: vocabulary.len(),
        });
    }
    Ok((model, vocabulary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_model_dir() {
        let temp = tempdir().expect("tempdir");
        let model = RandomForestModel::from_artifact(model::tests::toy_artifact()).expect("valid");
        model.save(&temp.path().join(MODEL_FILE)).expect("save model");
        let vocab = SymptomVocabulary::new(["high_fever", "sneezing"]).expect("vocab");
        save_vocabulary(&vocab, &temp.path().join(SYMPTOM_LIST_FILE)).expect("save vocab");

        let (loaded, vocabulary) = load_model_dir(temp.path()).expect("load");
        assert_eq!(loaded.n_features(), 2);
        assert_eq!(vocabulary.symptoms(), &["high_fever", "sneezing"]);
    }

    #[test]
    fn test_vocabulary_size_must_match_model() {
        let temp = tempdir().expect("tempdir");
        let model = RandomForestModel::from_artifact(model::tests::toy_artifact()).expect("valid");
        model.save(&temp.path().join(MODEL_FILE)).expect("save model");
        std::fs::write(temp.path().join(SYMPTOM_LIST_FILE), r#"["a", "b", "c"]"#)
            .expect("write vocab");

        assert!(matches!(
            load_model_dir(temp.path()),
            Err(ModelError::DimensionMismatch {
                expected: 2,
                got: 3
            })
        ));
    }

    #[test]
    fn test_duplicate_vocabulary_rejected() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join(SYMPTOM_LIST_FILE);
        std::fs::write(&path, r#"["cough", "Cough"]"#).expect("write vocab");
        assert!(matches!(load_vocabulary(&path), Err(ModelError::Format(_))));
    }
}
