//! TUI module: Terminal User Interface using Ratatui.
//!
//! Provides a medical-themed interface for:
//! - Dashboard with model and session status
//! - Symptom entry with vocabulary hints
//! - Prediction results
//! - Symptom browser

mod app;
mod styles;
mod ui;

pub use app::App;
pub use styles::MedicalTheme;
