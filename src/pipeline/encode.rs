//! Preprocessing feature space: dummy encoding and standardization
//!
//! A `FeatureSpace` is learned once from the training partition and then
//! applied verbatim at prediction time; it never re-fits. Categorical
//! columns become reference-dropped indicator features, numeric columns
//! are centered and scaled with the training mean and standard deviation.

use faer::Mat;
use polars::prelude::*;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::error::PipelineError;
use crate::schema::{column_to_strings, ColumnKind, DatasetSchema, FieldValue};

/// Learned transform for one schema column
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ColumnTransform {
    /// Center/scale with constants learned from the training partition
    Standardize { mean: f64, std: f64 },
    /// Reference-dropped indicator encoding over the fit-time levels;
    /// the first level is the reference and emits no feature
    DummyEncode { levels: Vec<String> },
}

/// The fitted preprocessing transform: one entry per predictor column,
/// in schema order, plus the derived transformed-feature names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureSpace {
    pub transforms: Vec<(String, ColumnTransform)>,
    pub feature_names: Vec<String>,
}

impl FeatureSpace {
    /// Learn the feature space from the training partition.
    ///
    /// Scaling constants use the sample standard deviation (n - 1).
    /// A numeric column with zero variance is rejected as rank-deficient
    /// rather than producing a constant feature.
    pub fn fit(schema: &DatasetSchema, train: &DataFrame) -> Result<Self, PipelineError> {
        let mut transforms = Vec::with_capacity(schema.columns.len());

        for spec in &schema.columns {
            let transform = match &spec.kind {
                ColumnKind::Numeric { .. } => {
                    let (mean, std) = column_mean_std(train, &spec.name)?;
                    if std == 0.0 {
                        return Err(PipelineError::RankDeficient {
                            feature: spec.name.clone(),
                        });
                    }
                    ColumnTransform::Standardize { mean, std }
                }
                ColumnKind::Categorical { levels } => ColumnTransform::DummyEncode {
                    levels: levels.clone(),
                },
            };
            transforms.push((spec.name.clone(), transform));
        }

        let feature_names = derive_feature_names(&transforms);
        Ok(Self {
            transforms,
            feature_names,
        })
    }

    /// Number of transformed features (design matrix width, intercept
    /// excluded).
    pub fn width(&self) -> usize {
        self.feature_names.len()
    }

    /// Apply the stored transform to a whole frame, producing the
    /// design matrix (rows x transformed features, no intercept column).
    ///
    /// Columns are transformed in parallel and assembled in schema order.
    /// The frame is expected to have passed `DatasetSchema::validate_frame`;
    /// a level outside the fit-time domain is still rejected here rather
    /// than encoded as all-zeros.
    pub fn transform_frame(&self, df: &DataFrame) -> Result<Mat<f64>, PipelineError> {
        let n_rows = df.height();

        let blocks: Vec<Result<Vec<Vec<f64>>, PipelineError>> = self
            .transforms
            .par_iter()
            .map(|(name, transform)| transform_column(df, name, transform))
            .collect();

        let mut features: Vec<Vec<f64>> = Vec::with_capacity(self.width());
        for block in blocks {
            features.extend(block?);
        }

        let mut x = Mat::<f64>::zeros(n_rows, features.len());
        for (col_idx, column) in features.iter().enumerate() {
            for (row_idx, &value) in column.iter().enumerate() {
                x[(row_idx, col_idx)] = value;
            }
        }

        Ok(x)
    }

    /// Apply the stored transform to a single coerced record.
    ///
    /// `values` must come from `coerce_request` against the same schema,
    /// so it is aligned with the transforms by index.
    pub fn transform_record(&self, values: &[FieldValue]) -> Vec<f64> {
        debug_assert_eq!(values.len(), self.transforms.len());

        let mut features = Vec::with_capacity(self.width());
        for (value, (_, transform)) in values.iter().zip(&self.transforms) {
            match (value, transform) {
                (FieldValue::Numeric(v), ColumnTransform::Standardize { mean, std }) => {
                    features.push((v - mean) / std);
                }
                (FieldValue::Level(index), ColumnTransform::DummyEncode { levels }) => {
                    for level_idx in 1..levels.len() {
                        features.push(if *index == level_idx { 1.0 } else { 0.0 });
                    }
                }
                // coerce_request and fit both follow schema order; a kind
                // mismatch here is a programming error, not bad input.
                _ => unreachable!("record value kind mismatches the fitted transform"),
            }
        }
        features
    }
}

/// Transform one column into its block of feature vectors.
fn transform_column(
    df: &DataFrame,
    name: &str,
    transform: &ColumnTransform,
) -> Result<Vec<Vec<f64>>, PipelineError> {
    let col = df.column(name).map_err(|_| PipelineError::Frame {
        message: format!("column '{}' not found during transform", name),
    })?;

    match transform {
        ColumnTransform::Standardize { mean, std } => {
            let float_col = col.cast(&DataType::Float64)?;
            let ca = float_col.f64()?;
            let mut out = Vec::with_capacity(df.height());
            for value in ca.iter() {
                match value {
                    Some(v) => out.push((v - mean) / std),
                    None => {
                        return Err(PipelineError::Frame {
                            message: format!("column '{}' contains null values", name),
                        })
                    }
                }
            }
            Ok(vec![out])
        }
        ColumnTransform::DummyEncode { levels } => {
            let strings = column_to_strings(col).map_err(|e| PipelineError::Frame {
                message: e.to_string(),
            })?;
            let width = levels.len().saturating_sub(1);
            let mut out = vec![vec![0.0f64; df.height()]; width];
            for (row_idx, value) in strings.iter().enumerate() {
                let value = value.as_ref().ok_or_else(|| PipelineError::Frame {
                    message: format!("column '{}' contains null values", name),
                })?;
                let level_idx =
                    levels
                        .iter()
                        .position(|l| l == value)
                        .ok_or_else(|| PipelineError::Frame {
                            message: format!(
                                "column '{}' has level '{}' not seen at fit time",
                                name, value
                            ),
                        })?;
                if level_idx > 0 {
                    out[level_idx - 1][row_idx] = 1.0;
                }
            }
            Ok(out)
        }
    }
}

/// Weighted-free mean and sample standard deviation of a numeric column.
fn column_mean_std(df: &DataFrame, name: &str) -> Result<(f64, f64), PipelineError> {
    let col = df.column(name).map_err(|_| PipelineError::Frame {
        message: format!("column '{}' not found", name),
    })?;
    let float_col = col.cast(&DataType::Float64)?;
    let ca = float_col.f64()?;

    let values: Vec<f64> = ca.into_iter().flatten().collect();
    if values.len() < 2 {
        return Err(PipelineError::Frame {
            message: format!(
                "column '{}' needs at least two observed values to fit scaling",
                name
            ),
        });
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / (n - 1.0);
    Ok((mean, var.sqrt()))
}

/// Names of the transformed features, in emission order.
fn derive_feature_names(transforms: &[(String, ColumnTransform)]) -> Vec<String> {
    let mut names = Vec::new();
    for (column, transform) in transforms {
        match transform {
            ColumnTransform::Standardize { .. } => names.push(column.clone()),
            ColumnTransform::DummyEncode { levels } => {
                for level in levels.iter().skip(1) {
                    names.push(format!("{}_{}", column, level));
                }
            }
        }
    }
    names
}

/// Extract the outcome column as a 0/1 float vector for the fit.
pub fn outcome_vector(df: &DataFrame, outcome: &str) -> Result<Vec<f64>, PipelineError> {
    let col = df.column(outcome).map_err(|_| PipelineError::Frame {
        message: format!("outcome column '{}' not found", outcome),
    })?;
    let float_col = col.cast(&DataType::Float64)?;
    let ca = float_col.f64()?;

    let mut y = Vec::with_capacity(df.height());
    for value in ca.iter() {
        match value {
            Some(v) => y.push(v),
            None => {
                return Err(PipelineError::Frame {
                    message: format!("outcome column '{}' contains null values", outcome),
                })
            }
        }
    }
    Ok(y)
}
