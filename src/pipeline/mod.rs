//! Pipeline module - schema-checked train/serve stages
//!
//! Stages run strictly in order: load and validate a dataset, split it
//! with stratification, fit the preprocessing + model bundle, persist
//! it, and evaluate on the held-out partition.

pub mod artifact;
pub mod encode;
pub mod error;
pub mod loader;
pub mod logistic;
pub mod metrics;
pub mod split;

pub use artifact::{
    ArtifactError, ArtifactMetadata, FittedPipeline, Prediction, RoundedPrediction,
    DEFAULT_THRESHOLD,
};
pub use encode::{outcome_vector, ColumnTransform, FeatureSpace};
pub use error::PipelineError;
pub use loader::{drop_incomplete_rows, load_dataset};
pub use logistic::{fit_logistic, sigmoid, FitOptions, FitOutcome, LogisticModel};
pub use metrics::{evaluate_frame, evaluate_scores, roc_auc, ConfusionCounts, Evaluation};
pub use split::{stratified_split, SplitFrames};
