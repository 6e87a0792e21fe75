//! Training run reporting: terminal summary and JSON export

pub mod run_export;
pub mod summary;

pub use run_export::{export_training_run, ExportParams, TrainingRunExport};
pub use summary::{display_coefficients, TrainingSummary};
