//! The fitted-pipeline artifact
//!
//! An immutable bundle of the dataset schema, the learned preprocessing
//! transform and the fitted coefficients, created once at training time
//! and persisted as JSON. At serve time it is loaded read-only and
//! shared by all requests; prediction is a pure function of the artifact
//! and the request.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::encode::FeatureSpace;
use super::logistic::{sigmoid, LogisticModel};
use crate::schema::{coerce_request, DatasetSchema, SchemaError};

/// Default decision threshold on the class-1 probability. The source
/// walkthrough fixes this at 0.5; it stays configurable at predict time.
pub const DEFAULT_THRESHOLD: f64 = 0.5;

/// The serialized pipeline could not be read back.
/// Fatal at server startup; there is no model to serve without it.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("failed to read model artifact: {0}")]
    Io(#[from] std::io::Error),

    #[error("model artifact is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Provenance recorded alongside the model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    /// Training timestamp (ISO 8601)
    pub created_at: String,
    /// riskpipe version that produced the artifact
    pub tool_version: String,
    /// Rows in the training partition
    pub training_rows: usize,
    /// IRLS iterations to convergence
    pub irls_iterations: usize,
}

impl ArtifactMetadata {
    pub fn new(training_rows: usize, irls_iterations: usize) -> Self {
        Self {
            created_at: Utc::now().to_rfc3339(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            training_rows,
            irls_iterations,
        }
    }
}

/// The immutable fitted pipeline: schema contract, preprocessing
/// transform and model coefficients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FittedPipeline {
    pub schema: DatasetSchema,
    pub features: FeatureSpace,
    pub model: LogisticModel,
    pub metadata: ArtifactMetadata,
}

/// A prediction at full precision
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    /// 0 or 1
    pub class: u8,
    /// Probability of class 0
    pub prob_no_event: f64,
    /// Probability of class 1
    pub prob_event: f64,
}

/// Display form of a prediction: probabilities rounded to three decimal
/// places. Internal computation keeps full precision; only reporting
/// rounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoundedPrediction {
    pub predicted_class: u8,
    pub prob_0: f64,
    pub prob_1: f64,
}

impl Prediction {
    pub fn rounded(&self) -> RoundedPrediction {
        RoundedPrediction {
            predicted_class: self.class,
            prob_0: round3(self.prob_no_event),
            prob_1: round3(self.prob_event),
        }
    }
}

fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

impl FittedPipeline {
    /// Predict from a raw stringly-typed request.
    ///
    /// Validates and coerces every field against the fit-time schema,
    /// applies the stored preprocessing transform verbatim, and runs the
    /// linear model. Stateless and deterministic: identical inputs give
    /// bit-identical outputs.
    pub fn predict_record(
        &self,
        fields: &HashMap<String, String>,
        threshold: f64,
    ) -> Result<Prediction, SchemaError> {
        let values = coerce_request(&self.schema, fields)?;
        let features = self.features.transform_record(&values);
        Ok(self.predict_features(&features, threshold))
    }

    /// Predict from an already-transformed feature vector.
    ///
    /// The boundary case `prob_event == threshold` classifies as 1.
    pub fn predict_features(&self, features: &[f64], threshold: f64) -> Prediction {
        let prob_event = sigmoid(self.model.logit(features));
        Prediction {
            class: if prob_event >= threshold { 1 } else { 0 },
            prob_no_event: 1.0 - prob_event,
            prob_event,
        }
    }

    /// Persist the artifact as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<(), ArtifactError> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        Ok(())
    }

    /// Load a persisted artifact.
    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }
}
