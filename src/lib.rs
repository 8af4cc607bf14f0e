// src/lib.rs

//! `aspects_rs` estimates how much user-defined groups of variables
//! ("aspects") contribute to a model's prediction for a single observation.
//!
//! The pipeline draws binary masks over the aspects, copies the observation's
//! values for the active aspects into rows sampled from a reference dataset,
//! measures the change in prediction, and regresses that change on the masks.
//!
//! ```no_run
//! use aspects_rs::{aspect_importance, AspectImportanceConfig, AspectSet, Column, Dataset, Instance, PredictError};
//! use ndarray::Array1;
//!
//! # fn main() -> aspects_rs::Result<()> {
//! let data = Dataset::new(vec![
//!     Column::number("age", vec![30.0, 45.0, 60.0]),
//!     Column::number("income", vec![20.0, 35.0, 50.0]),
//!     Column::number("debt", vec![5.0, 1.0, 0.0]),
//! ])?;
//! let observation = Instance::new([("age", 50.0), ("income", 10.0), ("debt", 8.0)])?;
//! let aspects = AspectSet::from_groups([
//!     ("demographics", vec!["age"]),
//!     ("finances", vec!["income", "debt"]),
//! ])?;
//!
//! let model = |rows: &Dataset| -> Result<Array1<f64>, PredictError> {
//!     let income = rows.column("income").and_then(|c| c.as_numbers()).ok_or("income")?;
//!     let debt = rows.column("debt").and_then(|c| c.as_numbers()).ok_or("debt")?;
//!     Ok(&income - &debt)
//! };
//!
//! let config = AspectImportanceConfig::default().with_seed(42);
//! let explanation = aspect_importance(&model, &data, &observation, &aspects, &config)?;
//! for row in &explanation.rows {
//!     println!("{}: {}", row.aspect, row.importance);
//! }
//! # Ok(())
//! # }
//! ```

pub mod algorithms;
pub mod core;
pub mod traits;
pub mod utils;

// Re-export key components for easier use by library consumers
pub use crate::algorithms::{
    aspect_importance, aspect_importance_with_rng, explain_aspects, generate_masks, group_variables,
    AspectImportanceConfig, Linkage, SampleMethod,
};
pub use crate::core::{
    Aspect, AspectError, AspectImportance, AspectImportanceRow, AspectSet, Column, ColumnType,
    CorrelationSign, Dataset, Instance, PredictError, Result, Value,
};
pub use crate::traits::{Explainer, PredictModel};
