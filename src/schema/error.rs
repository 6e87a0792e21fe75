//! Schema mismatch errors
//!
//! Every variant names the offending column so callers can surface it
//! without parsing the message. Coercion errors at inference time are
//! recovered into structured responses; schema errors at training time
//! abort the run.

use thiserror::Error;

/// A request or dataset column is missing, mistyped, or carries a value
/// outside the domain observed at fit time.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Required column or request field is absent.
    #[error("missing required field '{column}'")]
    MissingColumn { column: String },

    /// Dataset column exists but has the wrong kind (e.g. a string column
    /// where the schema declares a numeric one).
    #[error("column '{column}' must be {expected}, found {found}")]
    WrongKind {
        column: String,
        expected: &'static str,
        found: String,
    },

    /// Numeric field could not be parsed as a number.
    #[error("field '{column}' must be numeric, got '{value}'")]
    NotNumeric { column: String, value: String },

    /// Numeric field parsed but is NaN or infinite.
    #[error("field '{column}' must be a finite number, got '{value}'")]
    NonFinite { column: String, value: String },

    /// Numeric field is outside the declared plausible range.
    #[error("field '{column}' value {value} is outside the plausible range [{min}, {max}]")]
    OutOfRange {
        column: String,
        value: f64,
        min: f64,
        max: f64,
    },

    /// Categorical value was not in the fit-time level domain.
    /// Matching is case-sensitive; this is the rejection an un-harmonized
    /// dataset is expected to hit.
    #[error("field '{column}' has unknown level '{value}' not seen at fit time")]
    UnknownLevel { column: String, value: String },

    /// The designated outcome column is not binary 0/1.
    #[error("outcome column '{column}' is not binary 0/1 (found values: {values:?})")]
    OutcomeNotBinary { column: String, values: Vec<String> },

    /// Column dtype has no schema mapping (not numeric, string or boolean).
    #[error("column '{column}' has unsupported data type {dtype}")]
    UnsupportedType { column: String, dtype: String },

    /// Underlying dataframe operation failed while inspecting a column.
    #[error("failed to read column '{column}': {message}")]
    Column { column: String, message: String },
}

impl SchemaError {
    /// The column this error is about.
    pub fn column(&self) -> &str {
        match self {
            SchemaError::MissingColumn { column }
            | SchemaError::WrongKind { column, .. }
            | SchemaError::NotNumeric { column, .. }
            | SchemaError::NonFinite { column, .. }
            | SchemaError::OutOfRange { column, .. }
            | SchemaError::UnknownLevel { column, .. }
            | SchemaError::OutcomeNotBinary { column, .. }
            | SchemaError::UnsupportedType { column, .. }
            | SchemaError::Column { column, .. } => column,
        }
    }
}
