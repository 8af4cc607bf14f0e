// src/algorithms/fitting/mod.rs

//! Linear attribution fitters: regress the response deltas on the mask
//! columns and read one coefficient per aspect.

mod lasso;
mod ols;

pub use lasso::{LassoPath, LassoPathConfig};
pub use ols::OrdinaryLeastSquares;

use crate::algorithms::masks::MaskMatrix;
use crate::core::{AspectError, Result};
use ndarray::{Array1, ArrayView1, ArrayView2};

/// Coefficients of a fitted linear model `delta ~ intercept + mask`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearFit {
    /// NaN when the intercept is not identifiable from the mask columns.
    pub intercept: f64,
    /// One coefficient per mask column. NaN marks an undefined coefficient.
    pub coefficients: Array1<f64>,
}

impl LinearFit {
    /// Indices of mask columns whose coefficient is undefined.
    pub fn undefined(&self) -> Vec<usize> {
        self.coefficients
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_nan())
            .map(|(j, _)| j)
            .collect()
    }

    pub fn nonzero(&self) -> usize {
        self.coefficients.iter().filter(|&&c| c != 0.0).count()
    }
}

/// Strategy that turns response deltas and a design matrix into
/// per-column coefficients.
pub trait AttributionFitter {
    fn fit(&self, delta: ArrayView1<f64>, design: ArrayView2<f64>) -> Result<LinearFit>;

    fn name(&self) -> &'static str;
}

/// OLS when `max_nonzero == 0`, otherwise a lasso path bounded to
/// `max_nonzero` non-zero coefficients.
pub fn fitter_for(max_nonzero: usize) -> Box<dyn AttributionFitter> {
    if max_nonzero == 0 {
        Box::new(OrdinaryLeastSquares::default())
    } else {
        Box::new(LassoPath::new(max_nonzero))
    }
}

/// Fits `delta` on the mask columns with the strategy picked by `max_nonzero`.
pub fn fit_importance(
    delta: ArrayView1<f64>,
    mask: &MaskMatrix,
    max_nonzero: usize,
) -> Result<LinearFit> {
    let design = mask.mapv(f64::from);
    fitter_for(max_nonzero).fit(delta, design.view())
}

pub(crate) fn check_shapes(delta: ArrayView1<f64>, design: ArrayView2<f64>) -> Result<()> {
    if delta.len() != design.nrows() {
        return Err(AspectError::IncompatibleDimensions(format!(
            "Response has {} values but the design matrix has {} rows.",
            delta.len(),
            design.nrows()
        )));
    }
    if design.ncols() == 0 || design.nrows() == 0 {
        return Err(AspectError::InvalidParameter(
            "Design matrix must have at least one row and one column.".to_string(),
        ));
    }
    Ok(())
}
