// src/traits.rs

//! Capabilities the explanation pipeline needs from a model.

use crate::core::{Dataset, PredictError, Value};
use ndarray::Array1;

/// A model that scores a batch of rows.
///
/// `predict` receives all rows of one stage at once and must return exactly
/// one score per row, in row order.
pub trait PredictModel {
    fn predict(&self, rows: &Dataset) -> std::result::Result<Array1<f64>, PredictError>;

    /// Name attached to explanations of this model.
    fn label(&self) -> String {
        "model".to_string()
    }
}

impl<F> PredictModel for F
where
    F: Fn(&Dataset) -> std::result::Result<Array1<f64>, PredictError>,
{
    fn predict(&self, rows: &Dataset) -> std::result::Result<Array1<f64>, PredictError> {
        self(rows)
    }
}

/// A model bundled with the data it should be explained against, like the
/// explainer objects produced by model-wrapping tools.
pub trait Explainer {
    fn data(&self) -> &Dataset;

    fn predict(&self, rows: &Dataset) -> std::result::Result<Array1<f64>, PredictError>;

    fn label(&self) -> String;

    /// Known outcome for each row of `data()`, if any.
    fn outcome(&self) -> Option<&[Value]> {
        None
    }
}

/// Lets an explainer stand in wherever a bare model is expected.
pub(crate) struct ExplainerModel<'a, E: Explainer + ?Sized>(pub(crate) &'a E);

impl<E: Explainer + ?Sized> PredictModel for ExplainerModel<'_, E> {
    fn predict(&self, rows: &Dataset) -> std::result::Result<Array1<f64>, PredictError> {
        self.0.predict(rows)
    }

    fn label(&self) -> String {
        self.0.label()
    }
}
