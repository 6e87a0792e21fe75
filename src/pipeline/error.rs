//! Fit-time pipeline errors
//!
//! These are fatal to the training operation: there is no safe partial
//! state to continue from, so they propagate to the operator and nothing
//! is persisted.

use thiserror::Error;

/// Errors raised while splitting data or fitting the pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Stratified splitting requires at least two outcome classes.
    #[error("stratification column '{column}' has fewer than two distinct classes")]
    TooFewClasses { column: String },

    /// The requested split would leave a partition with no rows.
    #[error("the {partition} partition would be empty at test fraction {fraction}")]
    EmptyPartition {
        partition: &'static str,
        fraction: f64,
    },

    /// Test fraction must be strictly between 0 and 1.
    #[error("test fraction must be between 0 and 1 exclusive, got {fraction}")]
    InvalidFraction { fraction: f64 },

    /// A transformed feature contributes no variance, making the design
    /// matrix rank deficient. Reported with the feature named rather than
    /// silently dropped; the usual cause is a categorical level present
    /// in the schema but absent from the training partition.
    #[error("feature '{feature}' has zero variance in the training partition (rank-deficient design matrix)")]
    RankDeficient { feature: String },

    /// IRLS did not converge within its iteration budget.
    #[error("IRLS did not converge within {iterations} iterations (last relative deviance change {last_change:.3e}, tolerance {tolerance:.1e})")]
    NotConverged {
        iterations: usize,
        last_change: f64,
        tolerance: f64,
    },

    /// The deviance became non-finite mid-fit.
    #[error("deviance became non-finite at IRLS iteration {iteration}; the fit is diverging")]
    DivergedFit { iteration: usize },

    /// Underlying dataframe operation failed.
    #[error("dataframe operation failed: {message}")]
    Frame { message: String },
}

impl From<polars::prelude::PolarsError> for PipelineError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        PipelineError::Frame {
            message: err.to_string(),
        }
    }
}
