// src/algorithms/fitting/ols.rs

use super::{check_shapes, AttributionFitter, LinearFit};
use crate::core::Result;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use tracing::warn;

/// Ordinary least squares with an intercept.
///
/// Coefficients that the design cannot identify are NaN, never zero: a
/// constant column, or a column spanned by earlier columns. The intercept
/// enters last, so when the design columns already span it the intercept is
/// the term left undefined.
#[derive(Debug, Clone)]
pub struct OrdinaryLeastSquares {
    /// Relative norm below which a column counts as linearly dependent.
    pub tolerance: f64,
}

impl Default for OrdinaryLeastSquares {
    fn default() -> Self {
        OrdinaryLeastSquares { tolerance: 1e-7 }
    }
}

impl AttributionFitter for OrdinaryLeastSquares {
    fn fit(&self, delta: ArrayView1<f64>, design: ArrayView2<f64>) -> Result<LinearFit> {
        check_shapes(delta, design)?;
        let (n, k) = design.dim();

        let mut columns: Vec<Option<Array1<f64>>> = design
            .columns()
            .into_iter()
            .map(|col| {
                let first = col[0];
                if col.iter().all(|&v| v == first) {
                    None
                } else {
                    Some(col.to_owned())
                }
            })
            .collect();
        columns.push(Some(Array1::ones(n)));

        let solution = solve_in_order(&columns, delta, self.tolerance);
        let coefficients = Array1::from_iter(solution.iter().take(k).copied());
        let intercept = solution[k];

        let undefined = coefficients.iter().filter(|c| c.is_nan()).count();
        if undefined > 0 {
            warn!(undefined, columns = k, rows = n, "rank deficient least squares fit");
        }
        Ok(LinearFit {
            intercept,
            coefficients,
        })
    }

    fn name(&self) -> &'static str {
        "ols"
    }
}

/// Least squares over the given columns taken in order. `None` columns and
/// columns whose component orthogonal to the accepted ones is below
/// `tolerance` times their norm are skipped and get NaN.
fn solve_in_order(columns: &[Option<Array1<f64>>], y: ArrayView1<f64>, tolerance: f64) -> Vec<f64> {
    let p = columns.len();
    let mut basis: Vec<Array1<f64>> = Vec::new();
    let mut accepted: Vec<usize> = Vec::new();
    // r[[i, j]]: component of column j along basis vector i
    let mut r = Array2::<f64>::zeros((p, p));

    for (j, column) in columns.iter().enumerate() {
        let Some(column) = column else { continue };
        let norm0 = column.dot(column).sqrt();
        if norm0 == 0.0 {
            continue;
        }
        let mut v = column.clone();
        // Two passes of modified Gram-Schmidt keep the basis orthogonal.
        for _ in 0..2 {
            for (i, q) in basis.iter().enumerate() {
                let c = q.dot(&v);
                r[[i, j]] += c;
                v.scaled_add(-c, q);
            }
        }
        let norm = v.dot(&v).sqrt();
        if norm <= tolerance * norm0 {
            continue;
        }
        r[[basis.len(), j]] = norm;
        basis.push(v / norm);
        accepted.push(j);
    }

    let qty: Vec<f64> = basis.iter().map(|q| q.dot(&y)).collect();
    let m = accepted.len();
    let mut beta = vec![0.0; m];
    for a in (0..m).rev() {
        let mut s = qty[a];
        for b in (a + 1)..m {
            s -= r[[a, accepted[b]]] * beta[b];
        }
        beta[a] = s / r[[a, accepted[a]]];
    }

    let mut solution = vec![f64::NAN; p];
    for (a, &j) in accepted.iter().enumerate() {
        solution[j] = beta[a];
    }
    solution
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array2};

    #[test]
    fn recovers_exact_linear_relation() {
        let x: Array2<f64> = array![[1.0, 0.0], [0.0, 1.0], [1.0, 1.0], [0.0, 1.0], [1.0, 0.0]];
        let y = x.column(0).mapv(|v| 3.0 * v) + x.column(1).mapv(|v| -2.0 * v) + 0.5;
        let fit = OrdinaryLeastSquares::default().fit(y.view(), x.view()).unwrap();
        assert_abs_diff_eq!(fit.coefficients[0], 3.0, epsilon = 1e-10);
        assert_abs_diff_eq!(fit.coefficients[1], -2.0, epsilon = 1e-10);
        assert_abs_diff_eq!(fit.intercept, 0.5, epsilon = 1e-10);
    }

    #[test]
    fn matches_normal_equations_on_noisy_data() {
        let x: Array2<f64> = array![[1.0, 0.0], [0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 1.0], [1.0, 1.0]];
        let y = array![1.0, 2.0, 2.5, 1.5, 1.0, 3.5];
        let fit = OrdinaryLeastSquares::default().fit(y.view(), x.view()).unwrap();
        // Residuals are orthogonal to every column of [x, 1].
        let fitted = x.dot(&fit.coefficients) + fit.intercept;
        let resid = &y - &fitted;
        assert_abs_diff_eq!(resid.sum(), 0.0, epsilon = 1e-10);
        assert_abs_diff_eq!(resid.dot(&x.column(0)), 0.0, epsilon = 1e-10);
        assert_abs_diff_eq!(resid.dot(&x.column(1)), 0.0, epsilon = 1e-10);
    }

    #[test]
    fn zero_column_is_undefined() {
        let x: Array2<f64> = array![[1.0, 0.0], [0.0, 0.0], [1.0, 0.0], [0.0, 0.0]];
        let y = array![2.0, 0.0, 2.0, 0.0];
        let fit = OrdinaryLeastSquares::default().fit(y.view(), x.view()).unwrap();
        assert!(fit.coefficients[1].is_nan());
        assert_abs_diff_eq!(fit.coefficients[0], 2.0, epsilon = 1e-10);
        assert_eq!(fit.undefined(), vec![1]);
    }

    #[test]
    fn constant_ones_column_is_undefined() {
        let x: Array2<f64> = array![[1.0, 1.0], [1.0, 0.0], [1.0, 1.0], [1.0, 0.0]];
        let y = array![3.0, 1.0, 3.0, 1.0];
        let fit = OrdinaryLeastSquares::default().fit(y.view(), x.view()).unwrap();
        assert!(fit.coefficients[0].is_nan());
        assert_abs_diff_eq!(fit.coefficients[1], 2.0, epsilon = 1e-10);
        assert_abs_diff_eq!(fit.intercept, 1.0, epsilon = 1e-10);
    }

    #[test]
    fn duplicated_column_is_undefined() {
        let x: Array2<f64> = array![[1.0, 1.0, 0.0], [0.0, 0.0, 1.0], [1.0, 1.0, 1.0], [0.0, 0.0, 0.0]];
        let y = array![1.0, 2.0, 3.0, 0.0];
        let fit = OrdinaryLeastSquares::default().fit(y.view(), x.view()).unwrap();
        assert!(!fit.coefficients[0].is_nan());
        assert!(fit.coefficients[1].is_nan());
    }

    #[test]
    fn one_hot_rows_drop_the_intercept() {
        // Every row activates exactly one column, so the columns sum to the
        // intercept and each coefficient is the mean response of its rows.
        let x: Array2<f64> = array![[1.0, 0.0], [1.0, 0.0], [0.0, 1.0], [0.0, 1.0]];
        let y = array![1.0, 3.0, -4.0, -6.0];
        let fit = OrdinaryLeastSquares::default().fit(y.view(), x.view()).unwrap();
        assert_abs_diff_eq!(fit.coefficients[0], 2.0, epsilon = 1e-10);
        assert_abs_diff_eq!(fit.coefficients[1], -5.0, epsilon = 1e-10);
        assert!(fit.intercept.is_nan());
    }

    #[test]
    fn more_columns_than_rows_leaves_tail_undefined() {
        let x: Array2<f64> = array![[1.0, 0.0, 1.0, 0.0], [0.0, 1.0, 1.0, 1.0]];
        let y = array![1.0, 2.0];
        let fit = OrdinaryLeastSquares::default().fit(y.view(), x.view()).unwrap();
        assert_abs_diff_eq!(fit.coefficients[0], 1.0, epsilon = 1e-10);
        assert_abs_diff_eq!(fit.coefficients[1], 2.0, epsilon = 1e-10);
        assert!(fit.coefficients[2].is_nan());
        assert!(fit.coefficients[3].is_nan());
        assert!(fit.intercept.is_nan());
    }
}
