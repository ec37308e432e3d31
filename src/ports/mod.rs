//! Ports layer: Trait definitions for external operations.
//!
//! Following Hexagonal Architecture, these traits define the boundaries
//! between the application and external systems (model artifact, reference files).

mod classifier;
mod reference;

pub use classifier::{ClassProbabilities, ModelError, SymptomClassifier};
pub use reference::ReferenceSource;
