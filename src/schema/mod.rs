//! Dataset schema: declared column kinds and their fit-time domains
//!
//! The schema is the contract between training data and prediction
//! requests: every column present at fit time must be present, by name
//! and kind, at prediction time, and categorical values must lie within
//! the level domain observed at fit time.

pub mod error;
pub mod request;

pub use error::SchemaError;
pub use request::{coerce_request, FieldValue};

use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Tolerance for floating point comparison when checking binary 0/1 outcomes
const BINARY_TOLERANCE: f64 = 1e-9;

/// Declared kind of a predictor column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColumnKind {
    /// Fixed finite domain of levels, sorted for determinism.
    /// The first level is the dummy-encoding reference level.
    Categorical { levels: Vec<String> },
    /// Continuous numeric, with an optional declared plausible range
    /// used to reject implausible request values.
    Numeric { bounds: Option<(f64, f64)> },
}

impl ColumnKind {
    /// Short human-readable kind name for error messages.
    pub fn describe(&self) -> &'static str {
        match self {
            ColumnKind::Categorical { .. } => "categorical",
            ColumnKind::Numeric { .. } => "numeric",
        }
    }
}

/// A single predictor column: name plus declared kind
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    pub kind: ColumnKind,
}

/// Ordered predictor schema plus the designated binary outcome column
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetSchema {
    /// Predictor columns in dataset order (outcome excluded)
    pub columns: Vec<ColumnSpec>,
    /// Name of the binary 0/1 outcome column
    pub outcome: String,
}

impl DatasetSchema {
    /// Infer a schema from a DataFrame.
    ///
    /// String and boolean columns become categorical with their sorted
    /// distinct non-null values as the level domain; primitive numeric
    /// columns become numeric with no declared bounds. Columns listed in
    /// `drop` are excluded. The outcome column must be binary 0/1.
    ///
    /// # Arguments
    /// * `df` - The dataset to derive the schema from
    /// * `outcome` - Name of the binary outcome column
    /// * `drop` - Column names to exclude (identifiers, bookkeeping columns)
    pub fn infer(df: &DataFrame, outcome: &str, drop: &[String]) -> Result<Self, SchemaError> {
        let outcome_col = df
            .column(outcome)
            .map_err(|_| SchemaError::MissingColumn {
                column: outcome.to_string(),
            })?;
        check_binary_outcome(outcome_col, outcome)?;

        let mut columns = Vec::new();
        for col in df.get_columns() {
            let name = col.name().as_str();
            if name == outcome || drop.iter().any(|d| d == name) {
                continue;
            }

            let kind = if col.dtype().is_primitive_numeric() {
                ColumnKind::Numeric { bounds: None }
            } else {
                match col.dtype() {
                    DataType::String | DataType::Boolean => ColumnKind::Categorical {
                        levels: unique_strings(col)?,
                    },
                    other => {
                        return Err(SchemaError::UnsupportedType {
                            column: name.to_string(),
                            dtype: format!("{:?}", other),
                        })
                    }
                }
            };

            columns.push(ColumnSpec {
                name: name.to_string(),
                kind,
            });
        }

        Ok(Self {
            columns,
            outcome: outcome.to_string(),
        })
    }

    /// Look up a predictor column by name.
    pub fn column(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Names of the predictor columns, in schema order.
    pub fn predictor_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Declare a plausible range for a numeric column. Requests outside
    /// the range are rejected at coercion time.
    pub fn set_bounds(&mut self, column: &str, min: f64, max: f64) -> Result<(), SchemaError> {
        let spec = self
            .columns
            .iter_mut()
            .find(|c| c.name == column)
            .ok_or_else(|| SchemaError::MissingColumn {
                column: column.to_string(),
            })?;
        match &mut spec.kind {
            ColumnKind::Numeric { bounds } => {
                *bounds = Some((min, max));
                Ok(())
            }
            ColumnKind::Categorical { .. } => Err(SchemaError::WrongKind {
                column: column.to_string(),
                expected: "numeric",
                found: "categorical".to_string(),
            }),
        }
    }

    /// Validate a second dataset against this schema.
    ///
    /// Checks that every predictor column is present with a compatible
    /// kind and that categorical columns contain only fit-time levels.
    /// The first violation is returned with the offending column named;
    /// an un-harmonized dataset whose category labels differ from
    /// training is rejected here rather than silently mis-encoded.
    pub fn validate_frame(&self, df: &DataFrame) -> Result<(), SchemaError> {
        for spec in &self.columns {
            let col = df
                .column(&spec.name)
                .map_err(|_| SchemaError::MissingColumn {
                    column: spec.name.clone(),
                })?;

            match &spec.kind {
                ColumnKind::Numeric { .. } => {
                    if !col.dtype().is_primitive_numeric() {
                        return Err(SchemaError::WrongKind {
                            column: spec.name.clone(),
                            expected: spec.kind.describe(),
                            found: format!("{:?}", col.dtype()),
                        });
                    }
                }
                ColumnKind::Categorical { levels } => {
                    match col.dtype() {
                        DataType::String | DataType::Boolean => {}
                        other => {
                            return Err(SchemaError::WrongKind {
                                column: spec.name.clone(),
                                expected: spec.kind.describe(),
                                found: format!("{:?}", other),
                            })
                        }
                    }
                    for value in unique_strings(col)? {
                        if !levels.contains(&value) {
                            return Err(SchemaError::UnknownLevel {
                                column: spec.name.clone(),
                                value,
                            });
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

/// Verify that an outcome column contains only 0 and 1 values.
fn check_binary_outcome(col: &Column, name: &str) -> Result<(), SchemaError> {
    if !col.dtype().is_primitive_numeric() {
        return Err(SchemaError::OutcomeNotBinary {
            column: name.to_string(),
            values: unique_strings(col).unwrap_or_default(),
        });
    }

    let float_col = col
        .cast(&DataType::Float64)
        .map_err(|e| SchemaError::Column {
            column: name.to_string(),
            message: e.to_string(),
        })?;
    let unique = float_col.unique().map_err(|e| SchemaError::Column {
        column: name.to_string(),
        message: e.to_string(),
    })?;
    let values: Vec<f64> = unique
        .f64()
        .map_err(|e| SchemaError::Column {
            column: name.to_string(),
            message: e.to_string(),
        })?
        .into_iter()
        .flatten()
        .collect();

    let is_binary = values
        .iter()
        .all(|&v| (v - 0.0).abs() < BINARY_TOLERANCE || (v - 1.0).abs() < BINARY_TOLERANCE);
    // A single-class column is still schema-valid; the split rejects it later.
    if values.is_empty() || !is_binary {
        return Err(SchemaError::OutcomeNotBinary {
            column: name.to_string(),
            values: values.iter().map(|v| format!("{}", v)).collect(),
        });
    }

    Ok(())
}

/// Sorted distinct non-null values of a column, as strings.
pub(crate) fn unique_strings(col: &Column) -> Result<Vec<String>, SchemaError> {
    let to_schema_err = |e: PolarsError| SchemaError::Column {
        column: col.name().to_string(),
        message: e.to_string(),
    };

    let unique = col.unique().map_err(to_schema_err)?;
    let mut values: Vec<String> = match unique.dtype() {
        DataType::String => unique
            .str()
            .map_err(to_schema_err)?
            .into_iter()
            .filter_map(|v| v.map(|s| s.to_string()))
            .collect(),
        DataType::Boolean => unique
            .bool()
            .map_err(to_schema_err)?
            .into_iter()
            .filter_map(|v| v.map(|b| b.to_string()))
            .collect(),
        _ => {
            let cast = unique
                .cast(&DataType::String)
                .map_err(to_schema_err)?;
            cast.str()
                .map_err(to_schema_err)?
                .into_iter()
                .filter_map(|v| v.map(|s| s.to_string()))
                .collect()
        }
    };

    values.sort();
    Ok(values)
}

/// Convert a column to per-row strings for grouping and comparison.
pub(crate) fn column_to_strings(col: &Column) -> Result<Vec<Option<String>>, SchemaError> {
    let to_schema_err = |e: PolarsError| SchemaError::Column {
        column: col.name().to_string(),
        message: e.to_string(),
    };

    let values: Vec<Option<String>> = match col.dtype() {
        DataType::String => col
            .str()
            .map_err(to_schema_err)?
            .into_iter()
            .map(|v| v.map(|s| s.to_string()))
            .collect(),
        DataType::Boolean => col
            .bool()
            .map_err(to_schema_err)?
            .into_iter()
            .map(|v| v.map(|b| b.to_string()))
            .collect(),
        _ => {
            let cast = col.cast(&DataType::String).map_err(to_schema_err)?;
            cast.str()
                .map_err(to_schema_err)?
                .into_iter()
                .map(|v| v.map(|s| s.to_string()))
                .collect()
        }
    };

    Ok(values)
}
