//! CSV adapter: Implementation of ReferenceSource, plus the training dataset reader.
//!
//! Expected schemas (headers are trimmed and matched case-insensitively):
//! - descriptions: `Disease, Description`
//! - precautions: `Disease, Precaution_1 .. Precaution_N`
//! - severities: `Symptom, weight`
//! - training dataset: `Disease, Symptom_1 .. Symptom_N`

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::domain::{DiseaseInfo, ReferenceData, SeverityTable};
use crate::ports::ReferenceSource;

/// Error type for reading CSV data files.
#[derive(Debug, thiserror::Error)]
pub enum ReferenceError {
    #[error("Failed to read {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: ::csv::Error,
    },

    #[error("{path}: missing required column {column}")]
    MissingColumn { path: String, column: String },

    #[error("{path}: line {line}: invalid value {value:?} in column {column}")]
    InvalidValue {
        path: String,
        line: u64,
        column: String,
        value: String,
    },

    #[error("{path}: no usable rows")]
    Empty { path: String },
}

/// Reference tables backed by three CSV files.
#[derive(Debug, Clone)]
pub struct CsvReferenceSource {
    pub description_path: PathBuf,
    pub precaution_path: PathBuf,
    pub severity_path: PathBuf,
}

/// A row of the training dataset: a disease and the symptoms listed for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymptomRecord {
    pub disease: String,
    pub symptoms: Vec<String>,
}

struct CsvTable {
    path: String,
    headers: Vec<String>,
    rows: Vec<(u64, Vec<String>)>,
}

impl CsvTable {
    fn read(path: &Path) -> Result<Self, ReferenceError> {
        let display = path.display().to_string();
        let wrap = |source: ::csv::Error| ReferenceError::Csv {
            path: display.clone(),
            source,
        };

        let mut reader = ::csv::ReaderBuilder::new()
            .trim(::csv::Trim::All)
            .flexible(true)
            .from_path(path)
            .map_err(wrap)?;

        let headers = reader
            .headers()
            .map_err(wrap)?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(wrap)?;
            let line = record.position().map_or(0, |p| p.line());
            rows.push((line, record.iter().map(str::to_string).collect()));
        }

        Ok(Self {
            path: display,
            headers,
            rows,
        })
    }

    fn column(&self, name: &str) -> Result<usize, ReferenceError> {
        self.headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .ok_or_else(|| ReferenceError::MissingColumn {
                path: self.path.clone(),
                column: name.to_string(),
            })
    }

    /// Indices of columns whose header starts with `prefix`, in file order.
    fn columns_with_prefix(&self, prefix: &str) -> Vec<usize> {
        let prefix = prefix.to_lowercase();
        self.headers
            .iter()
            .enumerate()
            .filter(|(_, h)| h.to_lowercase().starts_with(&prefix))
            .map(|(i, _)| i)
            .collect()
    }
}

/// Non-empty cell value; pandas-style `nan` placeholders count as empty.
fn cell(row: &[String], index: usize) -> Option<&str> {
    row.get(index)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("nan"))
}

impl CsvReferenceSource {
    /// Source using the conventional file names inside `data_dir`.
    #[must_use]
    pub fn in_dir(data_dir: &Path) -> Self {
        Self {
            description_path: data_dir.join("symptom_description.csv"),
            precaution_path: data_dir.join("symptom_precaution.csv"),
            severity_path: data_dir.join("symptom_severity.csv"),
        }
    }

    fn load_diseases(&self) -> Result<HashMap<String, DiseaseInfo>, ReferenceError> {
        let mut diseases: HashMap<String, DiseaseInfo> = HashMap::new();

        let desc = CsvTable::read(&self.description_path)?;
        let disease_col = desc.column("Disease")?;
        let description_col = desc.column("Description")?;
        for (_, row) in &desc.rows {
            let Some(disease) = cell(row, disease_col) else {
                continue;
            };
            diseases.entry(disease.to_string()).or_default().description =
                cell(row, description_col).map(str::to_string);
        }

        let prec = CsvTable::read(&self.precaution_path)?;
        let disease_col = prec.column("Disease")?;
        let precaution_cols = prec.columns_with_prefix("Precaution");
        if precaution_cols.is_empty() {
            return Err(ReferenceError::MissingColumn {
                path: prec.path.clone(),
                column: "Precaution_1".to_string(),
            });
        }
        for (_, row) in &prec.rows {
            let Some(disease) = cell(row, disease_col) else {
                continue;
            };
            diseases.entry(disease.to_string()).or_default().precautions = precaution_cols
                .iter()
                .filter_map(|&i| cell(row, i))
                .map(str::to_string)
                .collect();
        }

        Ok(diseases)
    }

    fn load_severity(&self) -> Result<SeverityTable, ReferenceError> {
        let table = CsvTable::read(&self.severity_path)?;
        let symptom_col = table.column("Symptom")?;
        let weight_col = table.column("weight")?;

        let mut rows = Vec::with_capacity(table.rows.len());
        for (line, row) in &table.rows {
            let Some(symptom) = cell(row, symptom_col) else {
                continue;
            };
            let raw = cell(row, weight_col).unwrap_or_default();
            let weight: f64 = raw.parse().map_err(|_| ReferenceError::InvalidValue {
                path: table.path.clone(),
                line: *line,
                column: "weight".to_string(),
                value: raw.to_string(),
            })?;
            rows.push((symptom.to_string(), weight));
        }

        if rows.is_empty() {
            return Err(ReferenceError::Empty { path: table.path });
        }
        Ok(SeverityTable::new(rows))
    }
}

impl ReferenceSource for CsvReferenceSource {
    type Error = ReferenceError;

    fn load_reference(&self) -> Result<ReferenceData, Self::Error> {
        let diseases = self.load_diseases()?;
        let severity = self.load_severity()?;

        tracing::info!(
            "Loaded reference data: {} diseases, {} symptom severities (mean {:.2})",
            diseases.len(),
            severity.len(),
            severity.mean()
        );

        Ok(ReferenceData::new(diseases, severity))
    }
}

/// Read the training dataset: one disease per row and its symptom columns.
///
/// Rows without a disease or without any symptom are skipped.
///
/// # Errors
/// Returns error if the file cannot be read, lacks the `Disease` column or
/// any `Symptom*` column, or has no usable rows.
pub fn load_symptom_records(path: &Path) -> Result<Vec<SymptomRecord>, ReferenceError> {
    let table = CsvTable::read(path)?;
    let disease_col = table.column("Disease")?;
    let symptom_cols = table.columns_with_prefix("Symptom");
    if symptom_cols.is_empty() {
        return Err(ReferenceError::MissingColumn {
            path: table.path.clone(),
            column: "Symptom_1".to_string(),
        });
    }

    let mut records = Vec::with_capacity(table.rows.len());
    let mut skipped = 0usize;
    for (_, row) in &table.rows {
        let Some(disease) = cell(row, disease_col) else {
            skipped += 1;
            continue;
        };
        let symptoms: Vec<String> = symptom_cols
            .iter()
            .filter_map(|&i| cell(row, i))
            .map(str::to_string)
            .collect();
        if symptoms.is_empty() {
            skipped += 1;
            continue;
        }
        records.push(SymptomRecord {
            disease: disease.to_string(),
            symptoms,
        });
    }

    if skipped > 0 {
        tracing::warn!("Skipped {} dataset rows without a disease or symptoms", skipped);
    }
    if records.is_empty() {
        return Err(ReferenceError::Empty { path: table.path });
    }

    tracing::info!(
        "Loaded {} training rows from {} ({} symptom columns)",
        records.len(),
        table.path,
        symptom_cols.len()
    );
    Ok(records)
}
