//! Runtime settings, read once from `SYMPTRIAGE_*` environment variables.

use std::path::PathBuf;

use crate::application::{AggregateConfig, MatcherConfig};
use crate::domain::SimilarityMetric;

/// Where logs go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogMode {
    /// File when stdout is a terminal (the TUI owns the screen), stdout otherwise.
    #[default]
    Auto,
    File,
    Stdout,
}

/// All settings of the predictor and its binaries.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub model_dir: PathBuf,
    pub description_csv: PathBuf,
    pub precaution_csv: PathBuf,
    pub severity_csv: PathBuf,
    pub matcher: MatcherConfig,
    pub aggregate: AggregateConfig,
    pub log_mode: LogMode,
    pub log_file: PathBuf,
    pub sanitize_max_bytes: usize,
}

impl Default for Settings {
    fn default() -> Self {
        let data_dir = PathBuf::from("dataset");
        Self {
            model_dir: PathBuf::from("models"),
            description_csv: data_dir.join("symptom_description.csv"),
            precaution_csv: data_dir.join("symptom_precaution.csv"),
            severity_csv: data_dir.join("symptom_severity.csv"),
            matcher: MatcherConfig::default(),
            aggregate: AggregateConfig::default(),
            log_mode: LogMode::Auto,
            log_file: PathBuf::from("symptriage.log"),
            sanitize_max_bytes: crate::adapters::sanitize::DEFAULT_SANITIZE_MAX_BYTES,
        }
    }
}

fn parse_var<T, F>(value: Option<String>, name: &str, parse: F) -> Option<T>
where
    F: FnOnce(&str) -> Option<T>,
{
    let raw = value?;
    let parsed = parse(raw.trim());
    if parsed.is_none() {
        tracing::warn!("Ignoring invalid value for {}: {:?}", name, raw);
    }
    parsed
}

fn unit_interval(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|x| (0.0..=1.0).contains(x))
}

fn positive(s: &str) -> Option<usize> {
    s.parse::<usize>().ok().filter(|&n| n > 0)
}

impl Settings {
    /// Defaults overridden by any valid `SYMPTRIAGE_*` variables.
    #[must_use]
    pub fn from_env_or_default() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Defaults overridden by values from `lookup`; invalid values are
    /// logged and ignored.
    ///
    /// `SYMPTRIAGE_DATA_DIR` relocates all three reference CSVs; the
    /// per-file variables take precedence over it.
    pub fn from_lookup<L>(lookup: L) -> Self
    where
        L: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(&format!("SYMPTRIAGE_{key}")).filter(|v| !v.trim().is_empty());
        let mut cfg = Self::default();

        if let Some(dir) = var("MODEL_DIR") {
            cfg.model_dir = PathBuf::from(dir.trim());
        }
        if let Some(dir) = var("DATA_DIR") {
            let dir = PathBuf::from(dir.trim());
            cfg.description_csv = dir.join("symptom_description.csv");
            cfg.precaution_csv = dir.join("symptom_precaution.csv");
            cfg.severity_csv = dir.join("symptom_severity.csv");
        }
        if let Some(path) = var("DESCRIPTION_CSV") {
            cfg.description_csv = PathBuf::from(path.trim());
        }
        if let Some(path) = var("PRECAUTION_CSV") {
            cfg.precaution_csv = PathBuf::from(path.trim());
        }
        if let Some(path) = var("SEVERITY_CSV") {
            cfg.severity_csv = PathBuf::from(path.trim());
        }

        if let Some(x) = parse_var(var("MATCH_CUTOFF"), "SYMPTRIAGE_MATCH_CUTOFF", unit_interval) {
            cfg.matcher.match_cutoff = x;
        }
        if let Some(x) = parse_var(var("SUGGEST_CUTOFF"), "SYMPTRIAGE_SUGGEST_CUTOFF", unit_interval) {
            cfg.matcher.suggest_cutoff = x;
        }
        if let Some(n) = parse_var(var("MAX_SUGGESTIONS"), "SYMPTRIAGE_MAX_SUGGESTIONS", |s| {
            s.parse::<usize>().ok()
        }) {
            cfg.matcher.max_suggestions = n;
        }
        if let Some(metric) = parse_var(var("SIMILARITY"), "SYMPTRIAGE_SIMILARITY", |s| {
            s.parse::<SimilarityMetric>().ok()
        }) {
            cfg.matcher.metric = metric;
        }

        if let Some(n) = parse_var(var("TOP_K"), "SYMPTRIAGE_TOP_K", positive) {
            cfg.aggregate.top_k = n;
        }
        if let Some(x) = parse_var(
            var("MIN_ALTERNATIVE_PROBABILITY"),
            "SYMPTRIAGE_MIN_ALTERNATIVE_PROBABILITY",
            unit_interval,
        ) {
            cfg.aggregate.min_alternative_probability = x;
        }

        if let Some(mode) = parse_var(var("LOG_MODE"), "SYMPTRIAGE_LOG_MODE", |s| {
            match s.to_lowercase().as_str() {
                "auto" => Some(LogMode::Auto),
                "file" => Some(LogMode::File),
                "stdout" => Some(LogMode::Stdout),
                _ => None,
            }
        }) {
            cfg.log_mode = mode;
        }
        if let Some(path) = var("LOG_FILE") {
            cfg.log_file = PathBuf::from(path.trim());
        }
        if let Some(n) = parse_var(var("SANITIZE_MAX_BYTES"), "SYMPTRIAGE_SANITIZE_MAX_BYTES", positive) {
            cfg.sanitize_max_bytes = n;
        }

        cfg
    }
}
