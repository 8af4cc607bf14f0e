// src/core/errors.rs
use thiserror::Error;

/// Error raised by a caller-supplied prediction function.
pub type PredictError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum AspectError {
    /// The reference dataset and the target observation share no usable columns.
    #[error("Schema Mismatch: {0}")]
    SchemaMismatch(String),

    /// An aspect is empty, duplicated, or names a variable outside the common columns.
    #[error("Invalid Aspect Definition: {0}")]
    InvalidAspectDefinition(String),

    #[error("Invalid Parameter: {0}")]
    InvalidParameter(String),

    /// The prediction function failed. The original error is kept as the source.
    #[error("Prediction Failure: {0}")]
    PredictionFailure(#[source] PredictError),

    /// OLS could not identify the coefficients of these aspects.
    #[error("Degenerate Fit: coefficients undefined for aspects {aspects:?}")]
    DegenerateFit { aspects: Vec<String> },

    #[error("Incompatible Dimensions: {0}")]
    IncompatibleDimensions(String),

    #[error("Ndarray Error: {0}")]
    Ndarray(#[from] ndarray::ShapeError),
}

// Convenience type alias for Result
pub type Result<T> = std::result::Result<T, AspectError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn prediction_failure_keeps_source() {
        let inner: PredictError = "model exploded".into();
        let err = AspectError::PredictionFailure(inner);
        assert_eq!(err.to_string(), "Prediction Failure: model exploded");
        assert_eq!(err.source().map(|s| s.to_string()).as_deref(), Some("model exploded"));
    }

    #[test]
    fn degenerate_fit_lists_aspects() {
        let err = AspectError::DegenerateFit { aspects: vec!["b".to_string()] };
        assert!(err.to_string().contains("\"b\""));
    }
}
