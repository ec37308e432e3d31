//! Adapters layer: Concrete implementations of ports.
//!
//! These modules contain the actual integration with files and libraries:
//! - `dataset`: CSV reference tables and the training dataset (`csv`)
//! - `forest`: random forest artifact, inference and training (`serde_json`, `rand`)
//! - `sanitize`: PII filtering for logs

pub mod dataset;
pub mod forest;
pub mod sanitize;

pub use dataset::{CsvReferenceSource, ReferenceError};
pub use forest::RandomForestModel;
