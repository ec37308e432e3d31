//! Random forest artifact and inference.
//!
//! The artifact is a JSON document: class labels, input width, optional
//! feature importances, and a list of trees. Each tree is a flat node list in
//! preorder; a split sends `x[feature] <= threshold` left, and a leaf holds
//! (possibly unnormalized) class weights.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::FeatureVector;
use crate::ports::{ClassProbabilities, ModelError, SymptomClassifier};

/// Current artifact format version.
pub const FORMAT_VERSION: u32 = 1;

/// A single tree node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        /// Class weights in class order.
        distribution: Vec<f64>,
    },
}

/// One decision tree, root at index 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

/// Serialized form of a trained forest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestArtifact {
    pub format_version: u32,
    pub classes: Vec<String>,
    pub n_features: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_importance: Option<Vec<f64>>,
    pub trees: Vec<DecisionTree>,
}

/// A validated random forest ready for inference.
#[derive(Debug, Clone)]
pub struct RandomForestModel {
    artifact: ForestArtifact,
}

impl RandomForestModel {
    /// Validate an artifact and wrap it.
    ///
    /// Leaf distributions are normalized to sum to one.
    ///
    /// # Errors
    /// Returns `ModelError::Malformed` describing the first structural problem found.
    pub fn from_artifact(mut artifact: ForestArtifact) -> Result<Self, ModelError> {
        let malformed = |msg: String| Err(ModelError::Malformed(msg));

        if artifact.format_version != FORMAT_VERSION {
            return malformed(format!(
                "unsupported format_version {} (expected {FORMAT_VERSION})",
                artifact.format_version
            ));
        }
        if artifact.classes.is_empty() {
            return malformed("no classes".into());
        }
        let mut seen = std::collections::HashSet::new();
        for class in &artifact.classes {
            if !seen.insert(class.as_str()) {
                return malformed(format!("duplicate class {class:?}"));
            }
        }
        if artifact.n_features == 0 {
            return malformed("n_features must be positive".into());
        }
        if artifact.trees.is_empty() {
            return malformed("no trees".into());
        }
        if let Some(importance) = &artifact.feature_importance {
            if importance.len() != artifact.n_features {
                return malformed(format!(
                    "feature_importance has {} entries, expected {}",
                    importance.len(),
                    artifact.n_features
                ));
            }
        }

        let n_classes = artifact.classes.len();
        let n_features = artifact.n_features;
        for (t, tree) in artifact.trees.iter_mut().enumerate() {
            let len = tree.nodes.len();
            if len == 0 {
                return malformed(format!("tree {t} is empty"));
            }
            for (i, node) in tree.nodes.iter_mut().enumerate() {
                match node {
                    TreeNode::Split {
                        feature,
                        threshold,
                        left,
                        right,
                    } => {
                        if *feature >= n_features {
                            return malformed(format!(
                                "tree {t} node {i}: feature {feature} out of range"
                            ));
                        }
                        if !threshold.is_finite() {
                            return malformed(format!("tree {t} node {i}: non-finite threshold"));
                        }
                        // Children must come later in the node list, which rules out cycles.
                        for child in [*left, *right] {
                            if child <= i || child >= len {
                                return malformed(format!(
                                    "tree {t} node {i}: invalid child index {child}"
                                ));
                            }
                        }
                    }
                    TreeNode::Leaf { distribution } => {
                        if distribution.len() != n_classes {
                            return malformed(format!(
                                "tree {t} node {i}: leaf has {} weights, expected {n_classes}",
                                distribution.len()
                            ));
                        }
                        if distribution.iter().any(|w| !w.is_finite() || *w < 0.0) {
                            return malformed(format!("tree {t} node {i}: invalid leaf weight"));
                        }
                        let sum: f64 = distribution.iter().sum();
                        if sum <= 0.0 {
                            return malformed(format!("tree {t} node {i}: empty leaf"));
                        }
                        distribution.iter_mut().for_each(|w| *w /= sum);
                    }
                }
            }
        }

        Ok(Self { artifact })
    }

    /// Load and validate a forest from a JSON file.
    ///
    /// # Errors
    /// Returns error if the file cannot be read, parsed, or validated.
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let content = std::fs::read_to_string(path).map_err(|source| ModelError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let artifact: ForestArtifact = serde_json::from_str(&content)?;
        let model = Self::from_artifact(artifact)?;

        tracing::info!(
            "Loaded random forest from {:?} ({} trees, {} classes, {} features)",
            path,
            model.artifact.trees.len(),
            model.artifact.classes.len(),
            model.artifact.n_features
        );
        Ok(model)
    }

    /// Write the forest as JSON.
    ///
    /// # Errors
    /// Returns error if serialization or the write fails.
    pub fn save(&self, path: &Path) -> Result<(), ModelError> {
        let json = serde_json::to_vec(&self.artifact)?;
        std::fs::write(path, json).map_err(|source| ModelError::Io {
            path: path.display().to_string(),
            source,
        })
    }

    #[must_use]
    pub fn artifact(&self) -> &ForestArtifact {
        &self.artifact
    }

    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.artifact.trees.len()
    }

    fn leaf_for<'a>(tree: &'a DecisionTree, features: &FeatureVector) -> &'a [f64] {
        let mut index = 0;
        loop {
            match &tree.nodes[index] {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let value = features.get(*feature).unwrap_or(0.0);
                    index = if value <= *threshold { *left } else { *right };
                }
                TreeNode::Leaf { distribution } => return distribution,
            }
        }
    }
}

impl SymptomClassifier for RandomForestModel {
    fn n_features(&self) -> usize {
        self.artifact.n_features
    }

    fn classes(&self) -> &[String] {
        &self.artifact.classes
    }

    fn predict_proba(&self, features: &FeatureVector) -> Result<ClassProbabilities, ModelError> {
        if features.len() != self.artifact.n_features {
            return Err(ModelError::DimensionMismatch {
                expected: self.artifact.n_features,
                got: features.len(),
            });
        }

        let mut totals = vec![0.0; self.artifact.classes.len()];
        for tree in &self.artifact.trees {
            for (total, p) in totals.iter_mut().zip(Self::leaf_for(tree, features)) {
                *total += p;
            }
        }
        let n_trees = self.artifact.trees.len() as f64;
        totals.iter_mut().for_each(|p| *p /= n_trees);

        ClassProbabilities::new(self.artifact.classes.clone(), totals)
    }

    fn feature_importance(&self) -> Option<&[f64]> {
        self.artifact.feature_importance.as_deref()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use tempfile::tempdir;

    fn leaf(distribution: &[f64]) -> TreeNode {
        TreeNode::Leaf {
            distribution: distribution.to_vec(),
        }
    }

    fn split(feature: usize, left: usize, right: usize) -> TreeNode {
        TreeNode::Split {
            feature,
            threshold: 0.5,
            left,
            right,
        }
    }

    /// Two-feature forest: feature 0 -> "Flu", feature 1 -> "Allergy", neither -> "Cold".
    pub(crate) fn toy_artifact() -> ForestArtifact {
        ForestArtifact {
            format_version: FORMAT_VERSION,
            classes: vec!["Allergy".into(), "Cold".into(), "Flu".into()],
            n_features: 2,
            feature_importance: Some(vec![0.6, 0.4]),
            trees: vec![
                DecisionTree {
                    nodes: vec![
                        split(0, 1, 4),
                        split(1, 2, 3),
                        leaf(&[0.0, 4.0, 0.0]),
                        leaf(&[3.0, 0.0, 0.0]),
                        leaf(&[0.0, 0.0, 2.0]),
                    ],
                },
                DecisionTree {
                    nodes: vec![split(1, 1, 2), leaf(&[0.0, 1.0, 1.0]), leaf(&[1.0, 0.0, 0.0])],
                },
            ],
        }
    }

    #[test]
    fn test_probabilities_average_normalized_leaves() {
        let model = RandomForestModel::from_artifact(toy_artifact()).expect("valid");
        let probs = model
            .predict_proba(&FeatureVector::from_values(vec![1, 0]))
            .expect("predict");
        // tree 1 -> Flu (1.0); tree 2 -> Cold/Flu (0.5 each)
        assert_eq!(probs.probabilities(), &[0.0, 0.25, 0.75]);
        let sum: f64 = probs.probabilities().iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);

        let (label, _) = model
            .predict(&FeatureVector::from_values(vec![0, 1]))
            .expect("predict");
        assert_eq!(label, "Allergy");
    }

    #[test]
    fn test_dimension_mismatch() {
        let model = RandomForestModel::from_artifact(toy_artifact()).expect("valid");
        let err = model
            .predict_proba(&FeatureVector::from_values(vec![1, 0, 0]))
            .unwrap_err();
        assert!(matches!(
            err,
            ModelError::DimensionMismatch {
                expected: 2,
                got: 3
            }
        ));
    }

    #[test]
    fn test_rejects_backward_child() {
        let mut artifact = toy_artifact();
        artifact.trees[1].nodes[0] = split(1, 0, 2);
        assert!(matches!(
            RandomForestModel::from_artifact(artifact),
            Err(ModelError::Malformed(_))
        ));
    }

    #[test]
    fn test_rejects_bad_leaf_and_feature() {
        let mut artifact = toy_artifact();
        artifact.trees[1].nodes[1] = leaf(&[1.0, 0.0]);
        assert!(RandomForestModel::from_artifact(artifact).is_err());

        let mut artifact = toy_artifact();
        artifact.trees[0].nodes[0] = split(7, 1, 4);
        assert!(RandomForestModel::from_artifact(artifact).is_err());

        let mut artifact = toy_artifact();
        artifact.trees[0].nodes[2] = leaf(&[0.0, 0.0, 0.0]);
        assert!(RandomForestModel::from_artifact(artifact).is_err());

        let mut artifact = toy_artifact();
        artifact.feature_importance = Some(vec![1.0]);
        assert!(RandomForestModel::from_artifact(artifact).is_err());
    }

    #[test]
    fn test_save_and_load() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("forest.json");
        let model = RandomForestModel::from_artifact(toy_artifact()).expect("valid");
        model.save(&path).expect("save");

        let loaded = RandomForestModel::load(&path).expect("load");
        assert_eq!(loaded.n_trees(), 2);
        assert_eq!(loaded.classes(), model.classes());
        assert_eq!(loaded.feature_importance(), Some(&[0.6, 0.4][..]));
    }

    #[test]
    fn test_load_missing_file() {
        let temp = tempdir().expect("tempdir");
        let err = RandomForestModel::load(&temp.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, ModelError::Io { .. }));
    }
}
