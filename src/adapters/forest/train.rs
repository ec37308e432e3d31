//! Random forest training on one-hot symptom data.
//!
//! CART trees with weighted Gini impurity, bootstrap sampling and a random
//! feature subset per split. Class weights are recomputed on every bootstrap
//! sample (`balanced_subsample`). All randomness comes from a seeded
//! `ChaCha20Rng`, so a fixed seed reproduces the same forest.

use std::collections::{BTreeMap, BTreeSet};

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

use super::model::{DecisionTree, ForestArtifact, RandomForestModel, TreeNode, FORMAT_VERSION};
use crate::adapters::dataset::SymptomRecord;
use crate::domain::{SymptomVocabulary, VocabularyError};
use crate::ports::{ModelError, SymptomClassifier};

/// Training errors.
#[derive(Debug, thiserror::Error)]
pub enum TrainError {
    #[error("No training rows")]
    NoData,

    #[error("Invalid training parameter: {0}")]
    InvalidParams(String),

    #[error("Vocabulary error: {0}")]
    Vocabulary(#[from] VocabularyError),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),
}

/// Number of features considered at each split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaxFeatures {
    /// `floor(sqrt(n_features))`, at least 1.
    Sqrt,
    All,
    Count(usize),
}

impl MaxFeatures {
    fn resolve(self, n_features: usize) -> usize {
        let k = match self {
            Self::Sqrt => (n_features as f64).sqrt().floor() as usize,
            Self::All => n_features,
            Self::Count(k) => k,
        };
        k.clamp(1, n_features.max(1))
    }
}

/// Forest hyperparameters.
#[derive(Debug, Clone)]
pub struct ForestParams {
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub max_features: MaxFeatures,
    pub bootstrap: bool,
    /// Reweight classes to equal total weight within each tree's sample.
    pub balanced_class_weight: bool,
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::Sqrt,
            bootstrap: true,
            balanced_class_weight: true,
            seed: 42,
        }
    }
}

impl ForestParams {
    fn validate(&self) -> Result<(), TrainError> {
        if self.n_estimators == 0 {
            return Err(TrainError::InvalidParams("n_estimators must be positive".into()));
        }
        if self.max_depth == Some(0) {
            return Err(TrainError::InvalidParams("max_depth must be positive".into()));
        }
        if self.min_samples_split < 2 {
            return Err(TrainError::InvalidParams("min_samples_split must be >= 2".into()));
        }
        if self.min_samples_leaf == 0 {
            return Err(TrainError::InvalidParams("min_samples_leaf must be positive".into()));
        }
        if self.max_features == MaxFeatures::Count(0) {
            return Err(TrainError::InvalidParams("max_features must be positive".into()));
        }
        Ok(())
    }
}

/// One-hot encoded dataset.
#[derive(Debug, Clone)]
pub struct TrainingMatrix {
    vocabulary: SymptomVocabulary,
    classes: Vec<String>,
    rows: Vec<Vec<u8>>,
    labels: Vec<usize>,
}

impl TrainingMatrix {
    /// Encode dataset rows.
    ///
    /// The vocabulary is every distinct symptom, sorted; classes are the
    /// distinct diseases, sorted.
    ///
    /// # Errors
    /// Returns `TrainError::NoData` for an empty dataset, or a vocabulary
    /// error if two symptom names differ only by case.
    pub fn from_records(records: &[SymptomRecord]) -> Result<Self, TrainError> {
        if records.is_empty() {
            return Err(TrainError::NoData);
        }

        let symptoms: BTreeSet<&str> = records
            .iter()
            .flat_map(|r| r.symptoms.iter().map(String::as_str))
            .collect();
        let vocabulary = SymptomVocabulary::new(symptoms)?;

        let classes: Vec<String> = records
            .iter()
            .map(|r| r.disease.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let class_index: BTreeMap<&str, usize> = classes
            .iter()
            .enumerate()
            .map(|(i, c)| (c.as_str(), i))
            .collect();

        let mut rows = Vec::with_capacity(records.len());
        let mut labels = Vec::with_capacity(records.len());
        for record in records {
            rows.push(vocabulary.encode(&record.symptoms)?.values().to_vec());
            labels.push(class_index[record.disease.as_str()]);
        }

        Ok(Self {
            vocabulary,
            classes,
            rows,
            labels,
        })
    }

    #[must_use]
    pub fn vocabulary(&self) -> &SymptomVocabulary {
        &self.vocabulary
    }

    #[must_use]
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    #[must_use]
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn n_features(&self) -> usize {
        self.vocabulary.len()
    }

    /// Row indices covering the whole dataset.
    #[must_use]
    pub fn all_rows(&self) -> Vec<usize> {
        (0..self.rows.len()).collect()
    }

    /// Symptoms-per-row spread and the `n` most and least frequent symptoms.
    ///
    /// Frequency ties keep vocabulary (alphabetical) order.
    #[must_use]
    pub fn stats(&self, n: usize) -> DatasetStats {
        let per_row: Vec<usize> = self
            .rows
            .iter()
            .map(|row| row.iter().filter(|&&v| v != 0).count())
            .collect();

        let mut occurrence: Vec<(String, usize)> = self
            .vocabulary
            .symptoms()
            .iter()
            .enumerate()
            .map(|(feature, name)| {
                let count = self.rows.iter().filter(|row| row[feature] != 0).count();
                (name.clone(), count)
            })
            .collect();

        occurrence.sort_by(|a, b| b.1.cmp(&a.1));
        let most_common = occurrence.iter().take(n).cloned().collect();
        occurrence.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
        let least_common = occurrence.into_iter().take(n).collect();

        DatasetStats {
            min_symptoms: per_row.iter().copied().min().unwrap_or(0),
            max_symptoms: per_row.iter().copied().max().unwrap_or(0),
            mean_symptoms: if per_row.is_empty() {
                0.0
            } else {
                per_row.iter().sum::<usize>() as f64 / per_row.len() as f64
            },
            most_common,
            least_common,
        }
    }
}

/// Shape of a dataset, logged before training.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetStats {
    pub min_symptoms: usize,
    pub max_symptoms: usize,
    pub mean_symptoms: f64,
    pub most_common: Vec<(String, usize)>,
    pub least_common: Vec<(String, usize)>,
}

/// Stratified split into `(train, test)` row indices.
///
/// Each class contributes `round(count * test_fraction)` rows to the test
/// side, but always keeps at least one row for training.
#[must_use]
pub fn stratified_split(labels: &[usize], test_fraction: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut by_class: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (row, &label) in labels.iter().enumerate() {
        by_class.entry(label).or_default().push(row);
    }

    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let fraction = test_fraction.clamp(0.0, 1.0);
    let mut train = Vec::new();
    let mut test = Vec::new();
    for (_, mut rows) in by_class {
        rows.shuffle(&mut rng);
        let n_test = ((rows.len() as f64 * fraction).round() as usize).min(rows.len() - 1);
        test.extend_from_slice(&rows[..n_test]);
        train.extend_from_slice(&rows[n_test..]);
    }
    train.sort_unstable();
    test.sort_unstable();
    (train, test)
}

/// Precision, recall and F1 for one class.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassReport {
    pub class: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    /// True rows of this class among the evaluated rows.
    pub support: usize,
}

/// Accuracy figures on a set of rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub n_samples: usize,
    pub accuracy: f64,
    /// Mean per-class recall over classes present in the rows.
    pub balanced_accuracy: f64,
    /// Classes that were either present or predicted, in class order.
    pub per_class: Vec<ClassReport>,
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

/// Score a classifier on the given rows of `data`.
///
/// # Errors
/// Propagates prediction errors.
pub fn evaluate(
    model: &dyn SymptomClassifier,
    data: &TrainingMatrix,
    rows: &[usize],
) -> Result<Evaluation, ModelError> {
    let n_classes = data.classes.len();
    let mut true_pos = vec![0usize; n_classes];
    let mut support = vec![0usize; n_classes];
    let mut predicted = vec![0usize; n_classes];

    for &row in rows {
        let features = crate::domain::FeatureVector::from_values(data.rows[row].clone());
        let (label, _) = model.predict(&features)?;
        let truth = data.labels[row];
        support[truth] += 1;

        // A label outside the dataset's classes only counts as a miss.
        if let Some(guess) = data.classes.iter().position(|c| *c == label) {
            predicted[guess] += 1;
            if guess == truth {
                true_pos[truth] += 1;
            }
        }
    }

    let per_class: Vec<ClassReport> = (0..n_classes)
        .filter(|&c| support[c] > 0 || predicted[c] > 0)
        .map(|c| {
            let precision = ratio(true_pos[c], predicted[c]);
            let recall = ratio(true_pos[c], support[c]);
            let f1 = if precision + recall > 0.0 {
                2.0 * precision * recall / (precision + recall)
            } else {
                0.0
            };
            ClassReport {
                class: data.classes[c].clone(),
                precision,
                recall,
                f1,
                support: support[c],
            }
        })
        .collect();

    let present: Vec<&ClassReport> = per_class.iter().filter(|r| r.support > 0).collect();
    let balanced_accuracy = if present.is_empty() {
        0.0
    } else {
        present.iter().map(|r| r.recall).sum::<f64>() / present.len() as f64
    };

    Ok(Evaluation {
        n_samples: rows.len(),
        accuracy: ratio(true_pos.iter().sum(), rows.len()),
        balanced_accuracy,
        per_class,
    })
}

/// Fits random forests with fixed hyperparameters.
#[derive(Debug, Clone, Default)]
pub struct ForestTrainer {
    params: ForestParams,
}

impl ForestTrainer {
    #[must_use]
    pub fn new(params: ForestParams) -> Self {
        Self { params }
    }

    #[must_use]
    pub fn params(&self) -> &ForestParams {
        &self.params
    }

    /// Fit a forest on the given rows of `data`.
    ///
    /// The forest always knows every class of `data`, even ones absent from `rows`.
    ///
    /// # Errors
    /// Returns error for invalid parameters or an empty row set.
    pub fn fit(&self, data: &TrainingMatrix, rows: &[usize]) -> Result<RandomForestModel, TrainError> {
        self.params.validate()?;
        if rows.is_empty() {
            return Err(TrainError::NoData);
        }

        let n_features = data.n_features();
        let n_classes = data.classes.len();
        let mut rng = ChaCha20Rng::seed_from_u64(self.params.seed);
        let mut trees = Vec::with_capacity(self.params.n_estimators);
        let mut importance = vec![0.0; n_features];

        for t in 0..self.params.n_estimators {
            let tree_seed: u64 = rng.gen();
            let mut tree_rng = ChaCha20Rng::seed_from_u64(tree_seed);

            let weights = self.sample_weights(data, rows, &mut tree_rng);
            let mut builder = TreeBuilder {
                data,
                params: &self.params,
                weights: &weights,
                n_classes,
                max_features: self.params.max_features.resolve(n_features),
                rng: &mut tree_rng,
                nodes: Vec::new(),
                importance: vec![0.0; n_features],
            };
            let sample: Vec<usize> = rows.iter().copied().filter(|&r| weights[r] > 0.0).collect();
            builder.build(sample, 0);

            let total: f64 = builder.importance.iter().sum();
            if total > 0.0 {
                for (acc, v) in importance.iter_mut().zip(&builder.importance) {
                    *acc += v / total;
                }
            }
            tracing::debug!("Tree {} built with {} nodes", t, builder.nodes.len());
            trees.push(DecisionTree {
                nodes: builder.nodes,
            });
        }

        let total: f64 = importance.iter().sum();
        if total > 0.0 {
            importance.iter_mut().for_each(|v| *v /= total);
        }

        let artifact = ForestArtifact {
            format_version: FORMAT_VERSION,
            classes: data.classes.clone(),
            n_features,
            feature_importance: Some(importance),
            trees,
        };
        Ok(RandomForestModel::from_artifact(artifact)?)
    }

    /// Per-row sample weight for one tree: bootstrap multiplicity times class weight.
    fn sample_weights(&self, data: &TrainingMatrix, rows: &[usize], rng: &mut ChaCha20Rng) -> Vec<f64> {
        let mut counts = vec![0.0; data.len()];
        if self.params.bootstrap {
            for _ in 0..rows.len() {
                counts[rows[rng.gen_range(0..rows.len())]] += 1.0;
            }
        } else {
            for &r in rows {
                counts[r] = 1.0;
            }
        }

        if self.params.balanced_class_weight {
            let mut class_totals: BTreeMap<usize, f64> = BTreeMap::new();
            for (row, &count) in counts.iter().enumerate() {
                if count > 0.0 {
                    *class_totals.entry(data.labels[row]).or_default() += count;
                }
            }
            let n_samples: f64 = class_totals.values().sum();
            let n_present = class_totals.len() as f64;
            for (row, count) in counts.iter_mut().enumerate() {
                if *count > 0.0 {
                    let class_total = class_totals[&data.labels[row]];
                    *count *= n_samples / (n_present * class_total);
                }
            }
        }
        counts
    }
}

struct TreeBuilder<'a> {
    data: &'a TrainingMatrix,
    params: &'a ForestParams,
    weights: &'a [f64],
    n_classes: usize,
    max_features: usize,
    rng: &'a mut ChaCha20Rng,
    nodes: Vec<TreeNode>,
    importance: Vec<f64>,
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    impurity: f64,
    left_impurity_weighted: f64,
    right_impurity_weighted: f64,
}

fn gini(class_weights: &[f64], total: f64) -> f64 {
    if total <= 0.0 {
        return 0.0;
    }
    1.0 - class_weights.iter().map(|w| (w / total).powi(2)).sum::<f64>()
}

impl TreeBuilder<'_> {
    fn class_weights(&self, rows: &[usize]) -> Vec<f64> {
        let mut totals = vec![0.0; self.n_classes];
        for &r in rows {
            totals[self.data.labels[r]] += self.weights[r];
        }
        totals
    }

    /// Append the subtree for `rows` in preorder and return its root index.
    fn build(&mut self, rows: Vec<usize>, depth: usize) -> usize {
        let index = self.nodes.len();
        let class_weights = self.class_weights(&rows);
        let total: f64 = class_weights.iter().sum();
        let impurity = gini(&class_weights, total);

        let at_limit = self.params.max_depth.is_some_and(|d| depth >= d)
            || rows.len() < self.params.min_samples_split
            || rows.len() < 2 * self.params.min_samples_leaf
            || impurity <= f64::EPSILON;

        let split = if at_limit { None } else { self.find_split(&rows, impurity) };
        let Some(split) = split else {
            self.nodes.push(TreeNode::Leaf {
                distribution: class_weights,
            });
            return index;
        };

        self.importance[split.feature] += total * impurity
            - split.left_impurity_weighted
            - split.right_impurity_weighted;

        // Placeholder, patched once both children exist.
        self.nodes.push(TreeNode::Leaf {
            distribution: Vec::new(),
        });
        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
            .into_iter()
            .partition(|&r| f64::from(self.data.rows[r][split.feature]) <= split.threshold);
        let left = self.build(left_rows, depth + 1);
        let right = self.build(right_rows, depth + 1);
        self.nodes[index] = TreeNode::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        index
    }

    /// Best split among up to `max_features` non-constant features, visited in random order.
    fn find_split(&mut self, rows: &[usize], parent_impurity: f64) -> Option<BestSplit> {
        let mut features: Vec<usize> = (0..self.data.n_features()).collect();
        features.shuffle(&mut *self.rng);

        let mut best: Option<BestSplit> = None;
        let mut visited = 0usize;
        for feature in features {
            if visited >= self.max_features {
                break;
            }
            let mut values: Vec<(u8, usize)> = rows
                .iter()
                .map(|&r| (self.data.rows[r][feature], r))
                .collect();
            values.sort_unstable();
            if values.first().map(|v| v.0) == values.last().map(|v| v.0) {
                continue;
            }
            visited += 1;

            if let Some(candidate) = self.best_threshold(feature, &values) {
                if candidate.impurity < parent_impurity
                    && best.as_ref().map_or(true, |b| candidate.impurity < b.impurity)
                {
                    best = Some(candidate);
                }
            }
        }
        best
    }

    /// Sweep thresholds between distinct values of one feature.
    fn best_threshold(&self, feature: usize, sorted: &[(u8, usize)]) -> Option<BestSplit> {
        let mut right = vec![0.0; self.n_classes];
        for &(_, r) in sorted {
            right[self.data.labels[r]] += self.weights[r];
        }
        let total: f64 = right.iter().sum();
        let mut left = vec![0.0; self.n_classes];
        let mut left_total = 0.0;

        let min_leaf = self.params.min_samples_leaf;
        let mut best: Option<BestSplit> = None;
        for i in 0..sorted.len() - 1 {
            let (value, r) = sorted[i];
            let w = self.weights[r];
            let class = self.data.labels[r];
            left[class] += w;
            right[class] -= w;
            left_total += w;

            let next = sorted[i + 1].0;
            if next == value || i + 1 < min_leaf || sorted.len() - (i + 1) < min_leaf {
                continue;
            }

            let right_total = total - left_total;
            let left_weighted = left_total * gini(&left, left_total);
            let right_weighted = right_total * gini(&right, right_total);
            let impurity = (left_weighted + right_weighted) / total;
            if best.as_ref().map_or(true, |b| impurity < b.impurity) {
                best = Some(BestSplit {
                    feature,
                    threshold: (f64::from(value) + f64::from(next)) / 2.0,
                    impurity,
                    left_impurity_weighted: left_weighted,
                    right_impurity_weighted: right_weighted,
                });
            }
        }
        best
    }
}

/// Features ranked by importance, most important first.
#[must_use]
pub fn top_features<'a>(vocabulary: &'a SymptomVocabulary, importance: &[f64], n: usize) -> Vec<(&'a str, f64)> {
    let mut ranked: Vec<(&str, f64)> = vocabulary
        .symptoms()
        .iter()
        .map(String::as_str)
        .zip(importance.iter().copied())
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked.truncate(n);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FeatureVector;
    use crate::ports::ClassProbabilities;

    fn record(disease: &str, symptoms: &[&str]) -> SymptomRecord {
        SymptomRecord {
            disease: disease.to_string(),
            symptoms: symptoms.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    fn toy_records() -> Vec<SymptomRecord> {
        let mut records = Vec::new();
        for _ in 0..5 {
            records.push(record("Flu", &["high_fever", "cough", "fatigue"]));
            records.push(record("Flu", &["high_fever", "cough"]));
            records.push(record("Allergy", &["sneezing", "itching"]));
            records.push(record("Allergy", &["sneezing", "watery_eyes"]));
            records.push(record("Heart attack", &["chest_pain", "sweating"]));
            records.push(record("Heart attack", &["chest_pain", "vomiting", "sweating"]));
        }
        records
    }

    fn small_params() -> ForestParams {
        ForestParams {
            n_estimators: 15,
            ..ForestParams::default()
        }
    }

    #[test]
    fn test_matrix_encoding() {
        let data = TrainingMatrix::from_records(&toy_records()).expect("matrix");
        assert_eq!(data.len(), 30);
        assert_eq!(data.classes(), &["Allergy", "Flu", "Heart attack"]);
        assert_eq!(data.vocabulary().symptoms()[0], "chest_pain");
        assert_eq!(data.n_features(), 9);
        assert_eq!(data.labels()[0], 1);
    }

    #[test]
    fn test_forest_predicts_separable_training_rows() {
        let data = TrainingMatrix::from_records(&toy_records()).expect("matrix");
        let model = ForestTrainer::new(small_params())
            .fit(&data, &data.all_rows())
            .expect("fit");

        let eval = evaluate(&model, &data, &data.all_rows()).expect("evaluate");
        assert!((eval.accuracy - 1.0).abs() < 1e-12);
        assert!((eval.balanced_accuracy - 1.0).abs() < 1e-12);

        let x = data.vocabulary().encode(&["chest_pain", "sweating"]).expect("encode");
        let (label, probs) = model.predict(&x).expect("predict");
        assert_eq!(label, "Heart attack");
        let sum: f64 = probs.probabilities().iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_training_is_deterministic_for_seed() {
        let data = TrainingMatrix::from_records(&toy_records()).expect("matrix");
        let trainer = ForestTrainer::new(small_params());
        let a = trainer.fit(&data, &data.all_rows()).expect("fit a");
        let b = trainer.fit(&data, &data.all_rows()).expect("fit b");
        assert_eq!(a.artifact().trees, b.artifact().trees);
        assert_eq!(a.artifact().feature_importance, b.artifact().feature_importance);
    }

    #[test]
    fn test_importance_sums_to_one() {
        let data = TrainingMatrix::from_records(&toy_records()).expect("matrix");
        let model = ForestTrainer::new(small_params())
            .fit(&data, &data.all_rows())
            .expect("fit");
        let importance = model.feature_importance().expect("importance");
        assert_eq!(importance.len(), data.n_features());
        let sum: f64 = importance.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);

        let top = top_features(data.vocabulary(), importance, 3);
        assert_eq!(top.len(), 3);
        assert!(top[0].1 >= top[1].1 && top[1].1 >= top[2].1);
    }

    #[test]
    fn test_single_class_gives_single_leaf() {
        let records = vec![record("Flu", &["cough"]), record("Flu", &["fever"])];
        let data = TrainingMatrix::from_records(&records).expect("matrix");
        let model = ForestTrainer::new(small_params())
            .fit(&data, &data.all_rows())
            .expect("fit");
        assert!(model.artifact().trees.iter().all(|t| t.nodes.len() == 1));
        let probs = model
            .predict_proba(&FeatureVector::from_values(vec![1, 0]))
            .expect("predict");
        assert_eq!(probs.probabilities(), &[1.0]);
    }

    #[test]
    fn test_stratified_split_keeps_every_class_in_train() {
        let labels = vec![0, 0, 0, 0, 0, 1, 1, 1, 1, 1, 2];
        let (train, test) = stratified_split(&labels, 0.2, 42);
        assert_eq!(train.len() + test.len(), labels.len());
        assert_eq!(test.iter().filter(|&&r| labels[r] == 0).count(), 1);
        assert_eq!(test.iter().filter(|&&r| labels[r] == 1).count(), 1);
        assert!(train.iter().any(|&r| labels[r] == 2));
        assert_eq!(stratified_split(&labels, 0.2, 42), (train, test));
    }

    #[test]
    fn test_dataset_stats() {
        let records = vec![
            record("Flu", &["high_fever", "cough", "fatigue"]),
            record("Flu", &["high_fever", "cough"]),
            record("Allergy", &["sneezing"]),
            record("Allergy", &["sneezing", "high_fever"]),
        ];
        let data = TrainingMatrix::from_records(&records).expect("matrix");
        let stats = data.stats(2);
        assert_eq!(stats.min_symptoms, 1);
        assert_eq!(stats.max_symptoms, 3);
        assert!((stats.mean_symptoms - 2.0).abs() < 1e-12);
        assert_eq!(
            stats.most_common,
            vec![("high_fever".to_string(), 3), ("cough".to_string(), 2)]
        );
        assert_eq!(
            stats.least_common,
            vec![("fatigue".to_string(), 1), ("cough".to_string(), 2)]
        );
    }

    /// Always answers with one fixed label.
    struct ConstantClassifier {
        classes: Vec<String>,
        answer: usize,
    }

    impl SymptomClassifier for ConstantClassifier {
        fn predict_proba(&self, _features: &FeatureVector) -> Result<ClassProbabilities, ModelError> {
            let mut probs = vec![0.0; self.classes.len()];
            probs[self.answer] = 1.0;
            ClassProbabilities::new(self.classes.clone(), probs)
        }

        fn classes(&self) -> &[String] {
            &self.classes
        }

        fn n_features(&self) -> usize {
            9
        }
    }

    #[test]
    fn test_per_class_report() {
        let data = TrainingMatrix::from_records(&toy_records()).expect("matrix");
        let always_flu = ConstantClassifier {
            classes: data.classes().to_vec(),
            answer: 1,
        };
        let eval = evaluate(&always_flu, &data, &data.all_rows()).expect("evaluate");

        assert_eq!(eval.per_class.len(), 3);
        let allergy = &eval.per_class[0];
        assert_eq!(allergy.class, "Allergy");
        assert_eq!(allergy.support, 10);
        assert_eq!(allergy.recall, 0.0);
        assert_eq!(allergy.f1, 0.0);

        let flu = &eval.per_class[1];
        assert_eq!(flu.support, 10);
        assert!((flu.precision - 1.0 / 3.0).abs() < 1e-12);
        assert!((flu.recall - 1.0).abs() < 1e-12);
        assert!((flu.f1 - 0.5).abs() < 1e-12);

        assert!((eval.accuracy - 1.0 / 3.0).abs() < 1e-12);
        assert!((eval.balanced_accuracy - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_report_skips_classes_absent_from_rows() {
        let data = TrainingMatrix::from_records(&toy_records()).expect("matrix");
        let model = ForestTrainer::new(small_params())
            .fit(&data, &data.all_rows())
            .expect("fit");
        let flu_rows: Vec<usize> = data
            .all_rows()
            .into_iter()
            .filter(|&r| data.labels()[r] == 1)
            .collect();
        let eval = evaluate(&model, &data, &flu_rows).expect("evaluate");
        assert_eq!(eval.per_class.len(), 1);
        assert_eq!(eval.per_class[0].class, "Flu");
        assert_eq!(eval.per_class[0].support, flu_rows.len());
        assert!((eval.per_class[0].f1 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_params_rejected() {
        let data = TrainingMatrix::from_records(&toy_records()).expect("matrix");
        let params = ForestParams {
            n_estimators: 0,
            ..ForestParams::default()
        };
        assert!(matches!(
            ForestTrainer::new(params).fit(&data, &data.all_rows()),
            Err(TrainError::InvalidParams(_))
        ));
        assert!(matches!(
            TrainingMatrix::from_records(&[]),
            Err(TrainError::NoData)
        ));
    }
}
