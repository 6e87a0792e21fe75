//! Logistic regression fit via iteratively reweighted least squares
//!
//! Each IRLS step solves the weighted normal equations
//! `(XᵀWX) β = XᵀWz` with a Cholesky factorization; convergence is
//! judged on the relative change in deviance, with the classic budget of
//! 25 iterations and tolerance 1e-8. Failure to converge aborts the fit:
//! a partially converged model is never returned.

use faer::Mat;
use serde::{Deserialize, Serialize};

use super::error::PipelineError;

/// Lower bound on the working weights mu * (1 - mu) to keep the
/// normal equations well-conditioned near saturated probabilities.
const MIN_WORKING_WEIGHT: f64 = 1e-10;

/// Cholesky pivot below this fraction of the diagonal scale is treated
/// as rank deficiency.
const PIVOT_TOLERANCE: f64 = 1e-12;

/// Clamp for probabilities inside the deviance to avoid log(0).
const PROB_CLAMP: f64 = 1e-12;

/// Fitted model coefficients: one weight per transformed feature plus
/// the intercept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticModel {
    pub intercept: f64,
    pub weights: Vec<f64>,
}

impl LogisticModel {
    /// Linear predictor for one transformed feature vector.
    pub fn logit(&self, features: &[f64]) -> f64 {
        self.intercept
            + self
                .weights
                .iter()
                .zip(features)
                .map(|(w, x)| w * x)
                .sum::<f64>()
    }
}

/// Solver configuration
#[derive(Debug, Clone, Copy)]
pub struct FitOptions {
    pub max_iterations: usize,
    pub tolerance: f64,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            max_iterations: 25,
            tolerance: 1e-8,
        }
    }
}

/// Result of a converged fit
#[derive(Debug, Clone)]
pub struct FitOutcome {
    pub model: LogisticModel,
    pub iterations: usize,
    pub deviance: f64,
}

/// Numerically stable logistic function.
pub fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// Fit a logistic regression on a transformed design matrix.
///
/// # Arguments
/// * `x` - Design matrix (rows x features), intercept excluded; the
///   intercept column is added internally
/// * `y` - Binary outcomes, one 0.0/1.0 per row
/// * `feature_names` - One name per design matrix column, used to report
///   rank deficiency precisely
///
/// # Errors
/// * `RankDeficient` - a zero-variance or collinear feature, named
/// * `NotConverged` - the iteration budget ran out
/// * `DivergedFit` - the deviance became non-finite
pub fn fit_logistic(
    x: &Mat<f64>,
    y: &[f64],
    feature_names: &[String],
    opts: &FitOptions,
) -> Result<FitOutcome, PipelineError> {
    let n = x.nrows();
    let p = x.ncols() + 1;
    assert_eq!(n, y.len(), "design matrix and outcome length mismatch");
    assert_eq!(x.ncols(), feature_names.len());

    check_column_variance(x, feature_names)?;

    // Design matrix with the intercept as column 0.
    let mut xd = Mat::<f64>::zeros(n, p);
    for i in 0..n {
        xd[(i, 0)] = 1.0;
        for j in 0..x.ncols() {
            xd[(i, j + 1)] = x[(i, j)];
        }
    }

    let mut beta = Mat::<f64>::zeros(p, 1);
    let mut previous_deviance = f64::INFINITY;
    let mut last_change = f64::INFINITY;

    for iteration in 1..=opts.max_iterations {
        let eta = &xd * &beta;

        let mut xw = Mat::<f64>::zeros(n, p);
        let mut wz = Mat::<f64>::zeros(n, 1);
        let mut deviance = 0.0;

        for i in 0..n {
            let e = eta[(i, 0)];
            let mu = sigmoid(e);
            let w = (mu * (1.0 - mu)).max(MIN_WORKING_WEIGHT);
            let z = e + (y[i] - mu) / w;

            for j in 0..p {
                xw[(i, j)] = xd[(i, j)] * w;
            }
            wz[(i, 0)] = w * z;

            let mu_c = mu.clamp(PROB_CLAMP, 1.0 - PROB_CLAMP);
            deviance -= 2.0 * (y[i] * mu_c.ln() + (1.0 - y[i]) * (1.0 - mu_c).ln());
        }

        if !deviance.is_finite() {
            return Err(PipelineError::DivergedFit { iteration });
        }

        let xtwx = xd.transpose() * &xw;
        let xtwz = xd.transpose() * &wz;
        let rhs: Vec<f64> = (0..p).map(|j| xtwz[(j, 0)]).collect();

        let solution = cholesky_solve(&xtwx, &rhs).map_err(|pivot| {
            PipelineError::RankDeficient {
                feature: pivot_feature_name(pivot, feature_names),
            }
        })?;
        for j in 0..p {
            beta[(j, 0)] = solution[j];
        }

        last_change = (previous_deviance - deviance).abs() / (deviance.abs() + 0.1);
        if last_change < opts.tolerance {
            return Ok(FitOutcome {
                model: LogisticModel {
                    intercept: beta[(0, 0)],
                    weights: (1..p).map(|j| beta[(j, 0)]).collect(),
                },
                iterations: iteration,
                deviance,
            });
        }
        previous_deviance = deviance;
    }

    Err(PipelineError::NotConverged {
        iterations: opts.max_iterations,
        last_change,
        tolerance: opts.tolerance,
    })
}

/// Reject constant design columns up front with the feature named.
fn check_column_variance(x: &Mat<f64>, feature_names: &[String]) -> Result<(), PipelineError> {
    for j in 0..x.ncols() {
        let first = x[(0, j)];
        if (1..x.nrows()).all(|i| x[(i, j)] == first) {
            return Err(PipelineError::RankDeficient {
                feature: feature_names[j].clone(),
            });
        }
    }
    Ok(())
}

fn pivot_feature_name(pivot: usize, feature_names: &[String]) -> String {
    if pivot == 0 {
        "(intercept)".to_string()
    } else {
        feature_names[pivot - 1].clone()
    }
}

/// Solve `A x = b` for symmetric positive-definite `A`.
///
/// Returns the index of the failing pivot when the matrix is not
/// positive definite (rank-deficient normal equations).
fn cholesky_solve(a: &Mat<f64>, b: &[f64]) -> Result<Vec<f64>, usize> {
    let p = a.nrows();
    debug_assert_eq!(p, a.ncols());
    debug_assert_eq!(p, b.len());

    let mut l = vec![vec![0.0f64; p]; p];
    for i in 0..p {
        for j in 0..=i {
            let mut sum = a[(i, j)];
            for k in 0..j {
                sum -= l[i][k] * l[j][k];
            }
            if i == j {
                let scale = a[(i, i)].abs().max(1.0);
                if sum <= PIVOT_TOLERANCE * scale {
                    return Err(i);
                }
                l[i][j] = sum.sqrt();
            } else {
                l[i][j] = sum / l[j][j];
            }
        }
    }

    // L y = b
    let mut y = vec![0.0f64; p];
    for i in 0..p {
        let mut sum = b[i];
        for k in 0..i {
            sum -= l[i][k] * y[k];
        }
        y[i] = sum / l[i][i];
    }

    // Lᵀ x = y
    let mut x = vec![0.0f64; p];
    for i in (0..p).rev() {
        let mut sum = y[i];
        for k in (i + 1)..p {
            sum -= l[k][i] * x[k];
        }
        x[i] = sum / l[i][i];
    }

    Ok(x)
}
