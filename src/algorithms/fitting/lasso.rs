// src/algorithms/fitting/lasso.rs

use super::{check_shapes, AttributionFitter, LinearFit};
use crate::core::Result;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use tracing::debug;

/// Settings of the penalty path.
#[derive(Debug, Clone)]
pub struct LassoPathConfig {
    pub n_lambda: usize,
    /// Smallest penalty as a fraction of the largest, when rows outnumber columns.
    pub lambda_min_ratio: f64,
    /// Same fraction when columns are at least as many as rows.
    pub lambda_min_ratio_wide: f64,
    /// Convergence threshold on coefficient change, relative to the null deviance.
    pub threshold: f64,
    pub max_iterations: usize,
    /// Stop once the explained deviance ratio reaches this value.
    pub max_dev_ratio: f64,
    /// Stop once one step improves the deviance ratio by less than this fraction.
    pub min_dev_change: f64,
    /// Points computed before either stopping rule applies.
    pub min_points: usize,
}

impl Default for LassoPathConfig {
    fn default() -> Self {
        LassoPathConfig {
            n_lambda: 100,
            lambda_min_ratio: 1e-4,
            lambda_min_ratio_wide: 1e-2,
            threshold: 1e-7,
            max_iterations: 100_000,
            max_dev_ratio: 0.999,
            min_dev_change: 1e-5,
            min_points: 5,
        }
    }
}

/// One solution along the penalty path, on the original column scale.
#[derive(Debug, Clone)]
pub struct PathPoint {
    pub lambda: f64,
    pub intercept: f64,
    pub coefficients: Array1<f64>,
    pub dev_ratio: f64,
}

impl PathPoint {
    pub fn nonzero(&self) -> usize {
        self.coefficients.iter().filter(|&&c| c != 0.0).count()
    }
}

/// L1-penalized least squares solved by coordinate descent over a
/// decreasing penalty sequence, keeping the last path point with at most
/// `max_nonzero` non-zero coefficients.
#[derive(Debug, Clone)]
pub struct LassoPath {
    pub max_nonzero: usize,
    pub config: LassoPathConfig,
}

impl LassoPath {
    pub fn new(max_nonzero: usize) -> Self {
        LassoPath {
            max_nonzero,
            config: LassoPathConfig::default(),
        }
    }

    pub fn with_config(mut self, config: LassoPathConfig) -> Self {
        self.config = config;
        self
    }

    /// Computes the whole path. The first point is always the null model.
    pub fn path(&self, y: ArrayView1<f64>, x: ArrayView2<f64>) -> Result<Vec<PathPoint>> {
        check_shapes(y, x)?;
        let (n, k) = x.dim();
        let nf = n as f64;

        let y_mean = y.sum() / nf;
        let mut resid = y.mapv(|v| v - y_mean);
        let null_dev = resid.dot(&resid) / nf;

        let means = x.mean_axis(Axis(0)).unwrap_or_else(|| Array1::zeros(k));
        let mut xs = Array2::<f64>::zeros((n, k));
        let mut scales = Array1::<f64>::zeros(k);
        for j in 0..k {
            let centered = x.column(j).mapv(|v| v - means[j]);
            let sd = (centered.dot(&centered) / nf).sqrt();
            if sd > 0.0 {
                xs.column_mut(j).assign(&(centered / sd));
                scales[j] = sd;
            }
        }
        let active: Vec<usize> = (0..k).filter(|&j| scales[j] > 0.0).collect();

        let null_point = PathPoint {
            lambda: f64::INFINITY,
            intercept: y_mean,
            coefficients: Array1::zeros(k),
            dev_ratio: 0.0,
        };
        let lambda_max = active
            .iter()
            .map(|&j| (xs.column(j).dot(&resid) / nf).abs())
            .fold(0.0_f64, f64::max);
        if null_dev == 0.0 || lambda_max == 0.0 {
            return Ok(vec![null_point]);
        }

        let ratio = if n > k {
            self.config.lambda_min_ratio
        } else {
            self.config.lambda_min_ratio_wide
        };
        let steps = self.config.n_lambda.max(2);
        let lambdas: Vec<f64> = (0..steps)
            .map(|t| lambda_max * ratio.powf(t as f64 / (steps - 1) as f64))
            .collect();

        let mut beta = Array1::<f64>::zeros(k);
        let mut points = Vec::with_capacity(steps);
        let mut prev_dev_ratio = 0.0;
        for (t, &lambda) in lambdas.iter().enumerate() {
            for _ in 0..self.config.max_iterations {
                let mut max_change = 0.0_f64;
                for &j in &active {
                    let xj = xs.column(j);
                    let old = beta[j];
                    let z = xj.dot(&resid) / nf + old;
                    let new = soft_threshold(z, lambda);
                    if new != old {
                        resid.scaled_add(old - new, &xj);
                        beta[j] = new;
                        max_change = max_change.max((new - old).powi(2));
                    }
                }
                if max_change < self.config.threshold * null_dev {
                    break;
                }
            }

            let dev_ratio = 1.0 - resid.dot(&resid) / nf / null_dev;
            let coefficients = Array1::from_iter(
                (0..k).map(|j| if scales[j] > 0.0 { beta[j] / scales[j] } else { 0.0 }),
            );
            let intercept = y_mean - coefficients.dot(&means);
            points.push(PathPoint {
                lambda,
                intercept,
                coefficients,
                dev_ratio,
            });

            if t + 1 >= self.config.min_points
                && (dev_ratio >= self.config.max_dev_ratio
                    || dev_ratio - prev_dev_ratio < self.config.min_dev_change * dev_ratio)
            {
                break;
            }
            prev_dev_ratio = dev_ratio;
        }
        Ok(points)
    }
}

impl AttributionFitter for LassoPath {
    fn fit(&self, delta: ArrayView1<f64>, design: ArrayView2<f64>) -> Result<LinearFit> {
        let points = self.path(delta, design)?;
        // The null model (first point) always satisfies the bound.
        let chosen = points
            .iter()
            .rposition(|p| p.nonzero() <= self.max_nonzero)
            .unwrap_or(0);
        debug!(
            points = points.len(),
            chosen,
            max_nonzero = self.max_nonzero,
            "selected lasso path point"
        );
        let point = &points[chosen];
        Ok(LinearFit {
            intercept: point.intercept,
            coefficients: point.coefficients.clone(),
        })
    }

    fn name(&self) -> &'static str {
        "lasso"
    }
}

fn soft_threshold(z: f64, lambda: f64) -> f64 {
    if z > lambda {
        z - lambda
    } else if z < -lambda {
        z + lambda
    } else {
        0.0
    }
}
