pub mod aspect_importance;
pub mod diagnostics;
pub mod fitting;
pub mod grouping;
pub mod masks;
pub mod perturbation;
pub mod response;

pub use aspect_importance::{aspect_importance, aspect_importance_with_rng, explain_aspects, AspectImportanceConfig};
pub use diagnostics::{annotate, correlation_summary, CorrelationSummary};
pub use fitting::{fit_importance, fitter_for, AttributionFitter, LassoPath, LinearFit, OrdinaryLeastSquares};
pub use grouping::{group_variables, Linkage};
pub use masks::{generate_masks, MaskMatrix, SampleMethod};
pub use perturbation::{build_perturbed, PerturbedSample};
pub use response::estimate_response;
