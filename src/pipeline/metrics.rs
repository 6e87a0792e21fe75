//! Held-out evaluation metrics
//!
//! Scalar metrics only: accuracy, confusion counts, AUC via the
//! rank-sum statistic and the Gini coefficient derived from it.

use anyhow::{bail, Context, Result};
use polars::prelude::DataFrame;
use serde::Serialize;

use super::artifact::FittedPipeline;
use super::encode::outcome_vector;

/// Counts at the chosen decision threshold
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ConfusionCounts {
    pub true_positives: usize,
    pub false_positives: usize,
    pub true_negatives: usize,
    pub false_negatives: usize,
}

/// Evaluation of a fitted pipeline on a held-out partition
#[derive(Debug, Clone, Serialize)]
pub struct Evaluation {
    pub accuracy: f64,
    pub auc: f64,
    /// Gini coefficient, 2 * AUC - 1
    pub gini: f64,
    pub confusion: ConfusionCounts,
}

/// Score a labelled frame with the fitted pipeline and compute metrics.
///
/// The frame is validated against the fit-time schema first, so an
/// un-harmonized dataset fails here with the offending column named
/// instead of producing silently wrong scores.
pub fn evaluate_frame(
    pipeline: &FittedPipeline,
    df: &DataFrame,
    threshold: f64,
) -> Result<Evaluation> {
    pipeline
        .schema
        .validate_frame(df)
        .context("evaluation data does not conform to the fit-time schema")?;

    let x = pipeline.features.transform_frame(df)?;
    let labels = outcome_vector(df, &pipeline.schema.outcome)?;

    let mut scores = Vec::with_capacity(x.nrows());
    for i in 0..x.nrows() {
        let row: Vec<f64> = (0..x.ncols()).map(|j| x[(i, j)]).collect();
        scores.push(pipeline.predict_features(&row, threshold).prob_event);
    }

    evaluate_scores(&scores, &labels, threshold)
}

/// Compute metrics from class-1 probabilities and 0/1 labels.
pub fn evaluate_scores(scores: &[f64], labels: &[f64], threshold: f64) -> Result<Evaluation> {
    if scores.len() != labels.len() || scores.is_empty() {
        bail!("scores and labels must be non-empty and equal length");
    }

    let mut confusion = ConfusionCounts {
        true_positives: 0,
        false_positives: 0,
        true_negatives: 0,
        false_negatives: 0,
    };

    for (&score, &label) in scores.iter().zip(labels) {
        let predicted = score >= threshold;
        let actual = label >= 0.5;
        match (predicted, actual) {
            (true, true) => confusion.true_positives += 1,
            (true, false) => confusion.false_positives += 1,
            (false, false) => confusion.true_negatives += 1,
            (false, true) => confusion.false_negatives += 1,
        }
    }

    let correct = confusion.true_positives + confusion.true_negatives;
    let accuracy = correct as f64 / scores.len() as f64;
    let auc = roc_auc(scores, labels)?;

    Ok(Evaluation {
        accuracy,
        auc,
        gini: 2.0 * auc - 1.0,
        confusion,
    })
}

/// AUC by the Mann-Whitney rank statistic, with ties assigned their
/// average rank.
pub fn roc_auc(scores: &[f64], labels: &[f64]) -> Result<f64> {
    let n_pos = labels.iter().filter(|&&l| l >= 0.5).count();
    let n_neg = labels.len() - n_pos;
    if n_pos == 0 || n_neg == 0 {
        bail!("AUC requires both outcome classes in the evaluation data");
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| {
        scores[a]
            .partial_cmp(&scores[b])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    // Average ranks over tied score groups.
    let mut ranks = vec![0.0f64; scores.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && scores[order[j + 1]] == scores[order[i]] {
            j += 1;
        }
        let avg_rank = (i + j) as f64 / 2.0 + 1.0;
        for &idx in &order[i..=j] {
            ranks[idx] = avg_rank;
        }
        i = j + 1;
    }

    let rank_sum_pos: f64 = labels
        .iter()
        .zip(&ranks)
        .filter(|(&l, _)| l >= 0.5)
        .map(|(_, &r)| r)
        .sum();

    let auc = (rank_sum_pos - n_pos as f64 * (n_pos as f64 + 1.0) / 2.0)
        / (n_pos as f64 * n_neg as f64);
    Ok(auc)
}
