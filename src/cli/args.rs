//! Command-line argument definitions using clap

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

/// Riskpipe - train, persist and serve schema-checked logistic risk models
#[derive(Parser, Debug)]
#[command(name = "riskpipe")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fit a logistic risk model on a tabular dataset and persist it
    Train {
        /// Input dataset (CSV or Parquet)
        input: PathBuf,

        /// Binary 0/1 outcome column
        #[arg(short, long, default_value = "stroke")]
        outcome: String,

        /// Output path for the model artifact.
        /// Defaults to the input directory with a '_model.json' suffix
        /// (e.g. stroke.csv → stroke_model.json).
        #[arg(short, long)]
        artifact: Option<PathBuf>,

        /// Fraction of rows held out for evaluation (stratified)
        #[arg(long, default_value = "0.2", value_parser = validate_fraction)]
        test_fraction: f64,

        /// Seed for the stratified split shuffle
        #[arg(long, default_value = "42")]
        seed: u64,

        /// IRLS iteration budget; the fit aborts if it is exhausted
        #[arg(long, default_value = "25")]
        max_iterations: usize,

        /// IRLS relative deviance tolerance
        #[arg(long, default_value = "1e-8")]
        tolerance: f64,

        /// Decision threshold on the class-1 probability used for
        /// held-out evaluation
        #[arg(long, default_value = "0.5", value_parser = validate_threshold)]
        threshold: f64,

        /// Columns to drop before schema inference (comma-separated),
        /// typically record identifiers
        #[arg(long, value_delimiter = ',')]
        drop_columns: Vec<String>,

        /// Number of rows to use for CSV schema inference.
        /// Use 0 for a full table scan.
        #[arg(long, default_value = "10000")]
        infer_schema_length: usize,

        /// Skip writing the JSON run report next to the artifact
        #[arg(long, default_value = "false")]
        no_report: bool,
    },

    /// Score a single record with a persisted model artifact
    Predict {
        /// Model artifact produced by `train`
        artifact: PathBuf,

        /// Predictor field as name=value; repeat once per column
        #[arg(short, long = "field", value_parser = parse_key_val)]
        fields: Vec<(String, String)>,

        /// Decision threshold on the class-1 probability
        #[arg(long, default_value = "0.5", value_parser = validate_threshold)]
        threshold: f64,
    },

    /// Serve predictions from a persisted model artifact over HTTP
    Serve {
        /// Model artifact produced by `train`
        artifact: PathBuf,

        /// Bind address
        #[arg(short, long, default_value = "127.0.0.1:8080")]
        bind: String,

        /// Decision threshold on the class-1 probability
        #[arg(long, default_value = "0.5", value_parser = validate_threshold)]
        threshold: f64,
    },
}

/// Derive the default artifact path from the input file.
/// The derived path is in the same directory as the input with a
/// '_model.json' suffix.
pub fn default_artifact_path(input: &Path) -> PathBuf {
    let parent = input.parent().unwrap_or_else(|| Path::new("."));
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    parent.join(format!("{}_model.json", stem))
}

/// Derive the run report path from the artifact path
/// (model.json → model_run.json).
pub fn run_report_path(artifact: &Path) -> PathBuf {
    let parent = artifact.parent().unwrap_or_else(|| Path::new("."));
    let stem = artifact
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("model");
    parent.join(format!("{}_run.json", stem))
}

/// Parse a name=value field pair
fn parse_key_val(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("'{}' is not a name=value pair", s)),
    }
}

/// Validator for the test_fraction parameter
fn validate_fraction(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;

    if value <= 0.0 || value >= 1.0 {
        Err(format!(
            "test_fraction must be between 0 and 1 exclusive, got {}",
            value
        ))
    } else {
        Ok(value)
    }
}

/// Validator for the decision threshold parameter
fn validate_threshold(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;

    if !(0.0..=1.0).contains(&value) {
        Err(format!(
            "threshold must be between 0.0 and 1.0, got {}",
            value
        ))
    } else {
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_val() {
        assert_eq!(
            parse_key_val("age=67").unwrap(),
            ("age".to_string(), "67".to_string())
        );
        assert_eq!(
            parse_key_val("work_type=Private job").unwrap(),
            ("work_type".to_string(), "Private job".to_string())
        );
        // Value may contain '='
        assert_eq!(
            parse_key_val("note=a=b").unwrap(),
            ("note".to_string(), "a=b".to_string())
        );
        assert!(parse_key_val("no-separator").is_err());
        assert!(parse_key_val("=value").is_err());
    }

    #[test]
    fn test_validate_fraction() {
        assert!(validate_fraction("0.2").is_ok());
        assert!(validate_fraction("0").is_err());
        assert!(validate_fraction("1").is_err());
        assert!(validate_fraction("abc").is_err());
    }

    #[test]
    fn test_validate_threshold() {
        assert!(validate_threshold("0.5").is_ok());
        assert!(validate_threshold("0").is_ok());
        assert!(validate_threshold("1").is_ok());
        assert!(validate_threshold("1.5").is_err());
    }

    #[test]
    fn test_default_artifact_path() {
        assert_eq!(
            default_artifact_path(Path::new("data/stroke.csv")),
            PathBuf::from("data/stroke_model.json")
        );
    }

    #[test]
    fn test_run_report_path() {
        assert_eq!(
            run_report_path(Path::new("data/stroke_model.json")),
            PathBuf::from("data/stroke_model_run.json")
        );
    }
}
