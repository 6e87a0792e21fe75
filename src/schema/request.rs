//! Prediction request coercion
//!
//! External requests arrive stringly-typed (query parameters, CLI
//! key=value pairs). Each field is validated for presence and coerced
//! into its declared kind before any feature transform runs. Nothing is
//! defaulted silently: a missing or malformed field is an error naming
//! the column.

use std::collections::HashMap;

use crate::schema::{ColumnKind, DatasetSchema, SchemaError};

/// A request field coerced into its declared kind
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue {
    /// Parsed numeric value
    Numeric(f64),
    /// Index into the column's fit-time level domain
    Level(usize),
}

/// Validate and coerce a raw request against the schema.
///
/// Returns one value per predictor column, in schema order. Extra fields
/// in the request are ignored; the outcome column is never expected.
///
/// # Errors
/// * `MissingColumn` - a predictor field is absent
/// * `NotNumeric` / `NonFinite` / `OutOfRange` - numeric coercion failed
/// * `UnknownLevel` - categorical value outside the fit-time domain
///   (matched case-sensitively)
pub fn coerce_request(
    schema: &DatasetSchema,
    fields: &HashMap<String, String>,
) -> Result<Vec<FieldValue>, SchemaError> {
    let mut values = Vec::with_capacity(schema.columns.len());

    for spec in &schema.columns {
        let raw = fields
            .get(&spec.name)
            .ok_or_else(|| SchemaError::MissingColumn {
                column: spec.name.clone(),
            })?;

        let value = match &spec.kind {
            ColumnKind::Numeric { bounds } => {
                let parsed: f64 =
                    raw.trim()
                        .parse()
                        .map_err(|_| SchemaError::NotNumeric {
                            column: spec.name.clone(),
                            value: raw.clone(),
                        })?;
                if !parsed.is_finite() {
                    return Err(SchemaError::NonFinite {
                        column: spec.name.clone(),
                        value: raw.clone(),
                    });
                }
                if let Some((min, max)) = bounds {
                    if parsed < *min || parsed > *max {
                        return Err(SchemaError::OutOfRange {
                            column: spec.name.clone(),
                            value: parsed,
                            min: *min,
                            max: *max,
                        });
                    }
                }
                FieldValue::Numeric(parsed)
            }
            ColumnKind::Categorical { levels } => {
                let index = levels.iter().position(|l| l == raw).ok_or_else(|| {
                    SchemaError::UnknownLevel {
                        column: spec.name.clone(),
                        value: raw.clone(),
                    }
                })?;
                FieldValue::Level(index)
            }
        };

        values.push(value);
    }

    Ok(values)
}
