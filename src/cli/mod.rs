//! Command-line interface

pub mod args;

pub use args::{default_artifact_path, run_report_path, Cli, Commands};
