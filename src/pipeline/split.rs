//! Stratified train/test splitting
//!
//! The split preserves the outcome class proportions in both partitions
//! and is deterministic for a fixed seed, so a training run can be
//! reproduced exactly.

use polars::prelude::*;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::BTreeMap;

use super::error::PipelineError;
use crate::schema::column_to_strings;

/// The two disjoint partitions produced by a stratified split
#[derive(Debug)]
pub struct SplitFrames {
    pub train: DataFrame,
    pub test: DataFrame,
}

/// Split a dataset into train and test partitions, stratified by class.
///
/// Rows are grouped by the stratification column, each group is shuffled
/// with a seeded RNG, and `test_fraction` of each group (rounded) goes to
/// the test partition. Class proportions are therefore approximately
/// preserved on both sides.
///
/// # Errors
/// * `InvalidFraction` - `test_fraction` outside (0, 1)
/// * `TooFewClasses` - the stratification column has one distinct class
/// * `EmptyPartition` - either partition would end up with no rows
pub fn stratified_split(
    df: &DataFrame,
    stratify_by: &str,
    test_fraction: f64,
    seed: u64,
) -> Result<SplitFrames, PipelineError> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(PipelineError::InvalidFraction {
            fraction: test_fraction,
        });
    }

    let col = df
        .column(stratify_by)
        .map_err(|_| PipelineError::Frame {
            message: format!("stratification column '{}' not found", stratify_by),
        })?;
    let values = column_to_strings(col).map_err(|e| PipelineError::Frame {
        message: e.to_string(),
    })?;

    // BTreeMap keeps class iteration order stable across runs.
    let mut classes: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for (idx, value) in values.iter().enumerate() {
        if let Some(v) = value {
            classes.entry(v.clone()).or_default().push(idx);
        }
    }

    if classes.len() < 2 {
        return Err(PipelineError::TooFewClasses {
            column: stratify_by.to_string(),
        });
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut in_test = vec![false; df.height()];

    for indices in classes.values() {
        let mut shuffled = indices.clone();
        shuffled.shuffle(&mut rng);
        let test_count = (shuffled.len() as f64 * test_fraction).round() as usize;
        for &idx in shuffled.iter().take(test_count) {
            in_test[idx] = true;
        }
    }

    let test_mask = BooleanChunked::from_slice("test_mask".into(), &in_test);
    let test = df.filter(&test_mask)?;
    let train = df.filter(&!&test_mask)?;

    if test.height() == 0 {
        return Err(PipelineError::EmptyPartition {
            partition: "test",
            fraction: test_fraction,
        });
    }
    if train.height() == 0 {
        return Err(PipelineError::EmptyPartition {
            partition: "train",
            fraction: test_fraction,
        });
    }

    Ok(SplitFrames { train, test })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stroke_frame(rows: usize, prevalence: f64) -> DataFrame {
        let event_count = (rows as f64 * prevalence).round() as usize;
        let stroke: Vec<i32> = (0..rows).map(|i| (i < event_count) as i32).collect();
        let age: Vec<f64> = (0..rows).map(|i| 20.0 + (i % 60) as f64).collect();
        df! {
            "age" => age,
            "stroke" => stroke,
        }
        .unwrap()
    }

    fn prevalence(df: &DataFrame) -> f64 {
        let col = df.column("stroke").unwrap().cast(&DataType::Float64).unwrap();
        let sum: f64 = col.f64().unwrap().into_iter().flatten().sum();
        sum / df.height() as f64
    }

    #[test]
    fn test_split_sizes() {
        let df = stroke_frame(100, 0.2);
        let split = stratified_split(&df, "stroke", 0.2, 42).unwrap();
        assert_eq!(split.train.height() + split.test.height(), 100);
        assert_eq!(split.test.height(), 20);
    }

    #[test]
    fn test_split_preserves_prevalence() {
        let df = stroke_frame(500, 0.1);
        let split = stratified_split(&df, "stroke", 0.2, 42).unwrap();

        let p = prevalence(&df);
        assert!((prevalence(&split.train) - p).abs() < 0.02);
        assert!((prevalence(&split.test) - p).abs() < 0.02);
    }

    #[test]
    fn test_split_is_deterministic() {
        let df = stroke_frame(200, 0.3);
        let a = stratified_split(&df, "stroke", 0.2, 7).unwrap();
        let b = stratified_split(&df, "stroke", 0.2, 7).unwrap();
        assert!(a.train.equals(&b.train));
        assert!(a.test.equals(&b.test));
    }

    #[test]
    fn test_different_seeds_differ() {
        let df = stroke_frame(200, 0.3);
        let a = stratified_split(&df, "stroke", 0.2, 1).unwrap();
        let b = stratified_split(&df, "stroke", 0.2, 2).unwrap();
        assert!(!a.test.equals(&b.test));
    }

    #[test]
    fn test_single_class_rejected() {
        let df = df! {
            "age" => [1.0f64, 2.0, 3.0, 4.0],
            "stroke" => [1i32, 1, 1, 1],
        }
        .unwrap();
        let err = stratified_split(&df, "stroke", 0.2, 42).unwrap_err();
        assert!(matches!(err, PipelineError::TooFewClasses { .. }));
    }

    #[test]
    fn test_invalid_fraction_rejected() {
        let df = stroke_frame(10, 0.5);
        assert!(matches!(
            stratified_split(&df, "stroke", 0.0, 42),
            Err(PipelineError::InvalidFraction { .. })
        ));
        assert!(matches!(
            stratified_split(&df, "stroke", 1.0, 42),
            Err(PipelineError::InvalidFraction { .. })
        ));
    }

    #[test]
    fn test_tiny_fraction_yields_empty_test() {
        let df = stroke_frame(10, 0.5);
        let err = stratified_split(&df, "stroke", 0.01, 42).unwrap_err();
        assert!(matches!(err, PipelineError::EmptyPartition { .. }));
    }

    #[test]
    fn test_missing_column_errors() {
        let df = stroke_frame(10, 0.5);
        let err = stratified_split(&df, "outcome", 0.2, 42).unwrap_err();
        assert!(matches!(err, PipelineError::Frame { .. }));
    }
}
