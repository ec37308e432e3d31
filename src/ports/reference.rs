//! Reference source port: Trait for loading static reference data.
//!
//! This trait abstracts where descriptions, precautions and severities come
//! from (CSV files in the shipped adapter).

use crate::domain::ReferenceData;

/// Trait for a source of disease and symptom reference data.
///
/// Called once at startup; the result is never reloaded.
pub trait ReferenceSource {
    /// Error type for loading.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load every reference table.
    ///
    /// # Errors
    /// Returns error if any table is missing or malformed.
    fn load_reference(&self) -> Result<ReferenceData, Self::Error>;
}
