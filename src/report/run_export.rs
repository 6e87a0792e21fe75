//! Training run export functionality

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;

use crate::pipeline::{FittedPipeline, FitOptions};
use crate::report::TrainingSummary;

/// Metadata about the training run
#[derive(Serialize)]
pub struct RunMetadata {
    /// Timestamp of the run (ISO 8601 format)
    pub timestamp: String,
    /// riskpipe version
    pub riskpipe_version: String,
    /// Input file path
    pub input_file: String,
    /// Outcome column name
    pub outcome_column: String,
    /// Split seed
    pub seed: u64,
    /// Held-out fraction
    pub test_fraction: f64,
    /// IRLS iteration budget
    pub max_iterations: usize,
    /// IRLS deviance tolerance
    pub tolerance: f64,
    /// Decision threshold used for evaluation
    pub threshold: f64,
}

/// Summary statistics of the run
#[derive(Serialize)]
pub struct RunSummaryStats {
    pub rows_total: usize,
    pub rows_dropped_incomplete: usize,
    pub rows_train: usize,
    pub rows_test: usize,
    pub predictors: usize,
    pub encoded_features: usize,
    pub irls_iterations: usize,
    pub deviance: f64,
    pub accuracy: f64,
    pub auc: f64,
    pub gini: f64,
}

/// One fitted coefficient
#[derive(Serialize)]
pub struct CoefficientEntry {
    pub feature: String,
    pub weight: f64,
}

/// Complete training run export with metadata
#[derive(Serialize)]
pub struct TrainingRunExport {
    /// Metadata about the run
    pub metadata: RunMetadata,
    /// Summary statistics
    pub summary: RunSummaryStats,
    /// Fitted intercept
    pub intercept: f64,
    /// Per-feature fitted weights
    pub coefficients: Vec<CoefficientEntry>,
}

/// Parameters for the run export
pub struct ExportParams<'a> {
    pub input_file: &'a str,
    pub outcome_column: &'a str,
    pub seed: u64,
    pub test_fraction: f64,
    pub fit: &'a FitOptions,
    pub threshold: f64,
}

/// Export the training run to a JSON file next to the artifact.
///
/// # Arguments
/// * `pipeline` - The fitted pipeline the run produced
/// * `summary` - The displayed training summary
/// * `output_path` - Path to write the JSON file
/// * `params` - Run parameters for metadata
pub fn export_training_run(
    pipeline: &FittedPipeline,
    summary: &TrainingSummary,
    output_path: &Path,
    params: &ExportParams,
) -> Result<()> {
    let coefficients = pipeline
        .features
        .feature_names
        .iter()
        .zip(&pipeline.model.weights)
        .map(|(feature, &weight)| CoefficientEntry {
            feature: feature.clone(),
            weight,
        })
        .collect();

    let export = TrainingRunExport {
        metadata: RunMetadata {
            timestamp: Utc::now().to_rfc3339(),
            riskpipe_version: env!("CARGO_PKG_VERSION").to_string(),
            input_file: params.input_file.to_string(),
            outcome_column: params.outcome_column.to_string(),
            seed: params.seed,
            test_fraction: params.test_fraction,
            max_iterations: params.fit.max_iterations,
            tolerance: params.fit.tolerance,
            threshold: params.threshold,
        },
        summary: RunSummaryStats {
            rows_total: summary.rows_total,
            rows_dropped_incomplete: summary.rows_dropped_incomplete,
            rows_train: summary.rows_train,
            rows_test: summary.rows_test,
            predictors: summary.predictors,
            encoded_features: summary.encoded_features,
            irls_iterations: summary.irls_iterations,
            deviance: summary.deviance,
            accuracy: summary.evaluation.accuracy,
            auc: summary.evaluation.auc,
            gini: summary.evaluation.gini,
        },
        intercept: pipeline.model.intercept,
        coefficients,
    };

    let file = File::create(output_path)
        .with_context(|| format!("Failed to create run report: {}", output_path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), &export)
        .with_context(|| format!("Failed to write run report: {}", output_path.display()))?;

    Ok(())
}
