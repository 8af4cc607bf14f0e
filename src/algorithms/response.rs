// src/algorithms/response.rs

use crate::core::{AspectError, Dataset, Result};
use crate::traits::PredictModel;
use ndarray::Array1;
use tracing::debug;

fn predict_batch<M: PredictModel + ?Sized>(model: &M, rows: &Dataset) -> Result<Array1<f64>> {
    let scores = model.predict(rows).map_err(AspectError::PredictionFailure)?;
    if scores.len() != rows.nrows() {
        return Err(AspectError::IncompatibleDimensions(format!(
            "Prediction function returned {} scores for {} rows.",
            scores.len(),
            rows.nrows()
        )));
    }
    Ok(scores)
}

/// `delta[i] = f(perturbed[i]) - f(sampled[i])`, using one batched
/// prediction call per dataset.
pub fn estimate_response<M: PredictModel + ?Sized>(
    model: &M,
    sampled: &Dataset,
    perturbed: &Dataset,
) -> Result<Array1<f64>> {
    if sampled.nrows() != perturbed.nrows() {
        return Err(AspectError::IncompatibleDimensions(format!(
            "Sampled data has {} rows but perturbed data has {}.",
            sampled.nrows(),
            perturbed.nrows()
        )));
    }
    let changed = predict_batch(model, perturbed)?;
    let original = predict_batch(model, sampled)?;
    debug!(rows = sampled.nrows(), "estimated response deltas");
    Ok(changed - original)
}
