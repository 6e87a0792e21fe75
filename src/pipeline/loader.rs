//! Dataset loader for CSV and Parquet files

use anyhow::{Context, Result};
use polars::prelude::*;
use std::path::Path;

/// Load a dataset from a file (CSV or Parquet based on extension)
///
/// # Arguments
/// * `path` - Input file path
/// * `infer_schema_length` - Number of rows used for CSV type inference;
///   0 means a full table scan
pub fn load_dataset(path: &Path, infer_schema_length: usize) -> Result<DataFrame> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let infer = if infer_schema_length == 0 {
        None
    } else {
        Some(infer_schema_length)
    };

    let lf = match extension.as_str() {
        "csv" => LazyCsvReader::new(path)
            .with_infer_schema_length(infer)
            .finish()
            .with_context(|| format!("Failed to load CSV file: {}", path.display()))?,
        "parquet" => LazyFrame::scan_parquet(path, Default::default())
            .with_context(|| format!("Failed to load Parquet file: {}", path.display()))?,
        _ => anyhow::bail!(
            "Unsupported file format: {}. Supported formats: csv, parquet",
            extension
        ),
    };

    lf.collect()
        .with_context(|| format!("Failed to materialize dataset: {}", path.display()))
}

/// Drop rows containing any null value, returning the filtered frame and
/// the number of rows removed.
///
/// The fitted scaler statistics must come from fully observed rows;
/// imputing would leak made-up values into the model.
pub fn drop_incomplete_rows(df: &DataFrame) -> Result<(DataFrame, usize)> {
    if df.height() == 0 || df.width() == 0 {
        return Ok((df.clone(), 0));
    }

    let mut mask: Option<BooleanChunked> = None;
    for col in df.get_columns() {
        let not_null = col.as_materialized_series().is_not_null();
        mask = Some(match mask {
            Some(m) => &m & &not_null,
            None => not_null,
        });
    }

    let mask = mask.expect("non-empty frame has at least one column");
    let kept = df.filter(&mask)?;
    let dropped = df.height() - kept.height();
    Ok((kept, dropped))
}
