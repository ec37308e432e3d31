//! Training utility for the symptom random forest.
//!
//! Reads the symptom dataset, logs its shape, reports held-out accuracy with
//! a per-disease breakdown, refits on every row and writes
//! `disease_rf_model.json` and `symptom_list.json` to the output directory.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin train_model -- [--dataset <csv>] [--output-dir <dir>] \
//!     [--n-estimators <n>] [--max-depth <n>] [--min-samples-split <n>] \
//!     [--min-samples-leaf <n>] [--seed <u64>] [--test-size <0..1>]
//! ```

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use symptriage::adapters::dataset::load_symptom_records;
use symptriage::adapters::forest::train::{
    evaluate, stratified_split, top_features, Evaluation, ForestParams, ForestTrainer,
    TrainingMatrix,
};
use symptriage::adapters::forest::{save_vocabulary, MODEL_FILE, SYMPTOM_LIST_FILE};
use symptriage::adapters::sanitize::SanitizingMakeWriter;
use symptriage::ports::SymptomClassifier;

#[derive(Debug)]
struct Options {
    dataset: PathBuf,
    output_dir: PathBuf,
    test_size: f64,
    params: ForestParams,
}

fn usage() -> String {
    "Usage: train_model [--dataset <csv>] [--output-dir <dir>] [--n-estimators <n>] \
[--max-depth <n>] [--min-samples-split <n>] [--min-samples-leaf <n>] [--seed <u64>] \
[--test-size <fraction>]"
        .to_string()
}

fn parse_number<T: std::str::FromStr>(flag: &str, value: Option<String>) -> Result<T, String> {
    let value = value.ok_or_else(usage)?;
    value
        .trim()
        .parse::<T>()
        .map_err(|_| format!("{flag} must be a number, got {value:?}"))
}

fn parse_args<I>(args: I) -> Result<Options, String>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let mut options = Options {
        dataset: PathBuf::from("dataset/dataset.csv"),
        output_dir: PathBuf::from("models"),
        test_size: 0.2,
        params: ForestParams::default(),
    };

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--dataset" => options.dataset = PathBuf::from(args.next().ok_or_else(usage)?),
            "--output-dir" => options.output_dir = PathBuf::from(args.next().ok_or_else(usage)?),
            "--n-estimators" => options.params.n_estimators = parse_number(&arg, args.next())?,
            "--max-depth" => options.params.max_depth = Some(parse_number(&arg, args.next())?),
            "--min-samples-split" => {
                options.params.min_samples_split = parse_number(&arg, args.next())?;
            }
            "--min-samples-leaf" => {
                options.params.min_samples_leaf = parse_number(&arg, args.next())?;
            }
            "--seed" => options.params.seed = parse_number(&arg, args.next())?,
            "--test-size" => {
                let fraction: f64 = parse_number(&arg, args.next())?;
                if !(0.0..1.0).contains(&fraction) {
                    return Err("--test-size must be in [0, 1)".to_string());
                }
                options.test_size = fraction;
            }
            "-h" | "--help" => return Err(usage()),
            other => return Err(format!("Unknown argument: {other}\n{}", usage())),
        }
    }

    Ok(options)
}

fn log_class_report(evaluation: &Evaluation) {
    tracing::info!(
        "{:<32} {:>9} {:>9} {:>9} {:>9}",
        "disease",
        "precision",
        "recall",
        "f1-score",
        "support"
    );
    for row in &evaluation.per_class {
        tracing::info!(
            "{:<32} {:>9.2} {:>9.2} {:>9.2} {:>9}",
            row.class,
            row.precision,
            row.recall,
            row.f1,
            row.support
        );
    }
}

fn main() -> Result<()> {
    let options = match parse_args(std::env::args().skip(1)) {
        Ok(options) => options,
        Err(msg) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
    };

    let (writer, _guard) = tracing_appender::non_blocking(std::io::stdout());
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(SanitizingMakeWriter::new(writer)))
        .init();

    let records = load_symptom_records(&options.dataset)
        .with_context(|| format!("Failed to read dataset {:?}", options.dataset))?;
    let data = TrainingMatrix::from_records(&records)?;
    tracing::info!(
        "Dataset: {} rows, {} symptoms, {} diseases",
        data.len(),
        data.n_features(),
        data.classes().len()
    );
    let stats = data.stats(5);
    tracing::info!(
        "Symptoms per row - Min: {}, Max: {}, Avg: {:.2}",
        stats.min_symptoms,
        stats.max_symptoms,
        stats.mean_symptoms
    );
    tracing::info!("Most common symptoms: {:?}", stats.most_common);
    tracing::info!("Least common symptoms: {:?}", stats.least_common);

    let trainer = ForestTrainer::new(options.params.clone());

    if options.test_size > 0.0 {
        let (train_rows, test_rows) =
            stratified_split(data.labels(), options.test_size, options.params.seed);
        if train_rows.is_empty() || test_rows.is_empty() {
            tracing::warn!("Dataset too small for a held-out split; skipping evaluation");
        } else {
            let model = trainer.fit(&data, &train_rows)?;
            let train_score = evaluate(&model, &data, &train_rows)?;
            let test_score = evaluate(&model, &data, &test_rows)?;
            tracing::info!(
                "Train accuracy {:.4} (balanced {:.4}) on {} rows",
                train_score.accuracy,
                train_score.balanced_accuracy,
                train_score.n_samples
            );
            tracing::info!(
                "Test accuracy {:.4} (balanced {:.4}) on {} rows",
                test_score.accuracy,
                test_score.balanced_accuracy,
                test_score.n_samples
            );
            log_class_report(&test_score);
        }
    }

    let model = trainer.fit(&data, &data.all_rows())?;
    if let Some(importance) = model.feature_importance() {
        tracing::info!("Top symptoms by importance:");
        for (rank, (symptom, score)) in top_features(data.vocabulary(), importance, 10)
            .into_iter()
            .enumerate()
        {
            tracing::info!("  {:>2}. {} ({:.4})", rank + 1, symptom, score);
        }
    }

    if options.output_dir.exists() && !options.output_dir.is_dir() {
        bail!("Output path {:?} is not a directory", options.output_dir);
    }
    std::fs::create_dir_all(&options.output_dir)
        .with_context(|| format!("Failed to create {:?}", options.output_dir))?;

    let model_path = options.output_dir.join(MODEL_FILE);
    let vocab_path = options.output_dir.join(SYMPTOM_LIST_FILE);
    model.save(&model_path)?;
    save_vocabulary(data.vocabulary(), &vocab_path)?;

    tracing::info!(
        "Wrote {} trees to {:?} and vocabulary to {:?}",
        model.n_trees(),
        model_path,
        vocab_path
    );
    Ok(())
}
