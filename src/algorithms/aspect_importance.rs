// src/algorithms/aspect_importance.rs

use crate::algorithms::diagnostics::annotate;
use crate::algorithms::fitting::fitter_for;
use crate::algorithms::masks::{generate_masks, SampleMethod};
use crate::algorithms::perturbation::{build_perturbed, common_columns, validate_aspects};
use crate::algorithms::response::estimate_response;
use crate::core::{AspectError, AspectImportance, AspectSet, Dataset, Instance, Result};
use crate::traits::{Explainer, ExplainerModel, PredictModel};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Configuration for an aspect importance run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AspectImportanceConfig {
    /// Number of perturbed samples N.
    pub n_samples: usize,
    /// Upper bound on non-zero coefficients. 0 fits plain OLS.
    pub max_nonzero: usize,
    pub sample_method: SampleMethod,
    /// Expected active aspects per sample for [`SampleMethod::Binomial`].
    pub frequency: f64,
    /// Compute the Spearman diagnostics for multi-variable aspects.
    pub show_cor: bool,
    /// Seed for mask generation and row sampling. `None` uses OS entropy.
    pub seed: Option<u64>,
    /// Overrides the model's label.
    pub label: Option<String>,
    /// Fail instead of reporting NaN when OLS cannot identify a coefficient.
    pub fail_on_degenerate_fit: bool,
}

impl Default for AspectImportanceConfig {
    fn default() -> Self {
        AspectImportanceConfig {
            n_samples: 1000,
            max_nonzero: 0,
            sample_method: SampleMethod::UniformPair,
            frequency: 2.0,
            show_cor: true,
            seed: None,
            label: None,
            fail_on_degenerate_fit: false,
        }
    }
}

impl AspectImportanceConfig {
    pub fn with_n_samples(mut self, n: usize) -> Self {
        self.n_samples = n;
        self
    }

    pub fn with_max_nonzero(mut self, max_nonzero: usize) -> Self {
        self.max_nonzero = max_nonzero;
        self
    }

    pub fn with_sample_method(mut self, method: SampleMethod) -> Self {
        self.sample_method = method;
        self
    }

    pub fn with_frequency(mut self, f: f64) -> Self {
        self.frequency = f;
        self
    }

    pub fn with_show_cor(mut self, show_cor: bool) -> Self {
        self.show_cor = show_cor;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_fail_on_degenerate_fit(mut self, fail: bool) -> Self {
        self.fail_on_degenerate_fit = fail;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.n_samples == 0 {
            return Err(AspectError::InvalidParameter(
                "n_samples must be positive.".to_string(),
            ));
        }
        if !(self.frequency > 0.0 && self.frequency.is_finite()) {
            return Err(AspectError::InvalidParameter(format!(
                "frequency must be a positive finite number, got {}.",
                self.frequency
            )));
        }
        Ok(())
    }
}

/// Explains `instance` with a freshly seeded random source (see
/// [`AspectImportanceConfig::seed`]).
pub fn aspect_importance<M: PredictModel + ?Sized>(
    model: &M,
    data: &Dataset,
    instance: &Instance,
    aspects: &AspectSet,
    config: &AspectImportanceConfig,
) -> Result<AspectImportance> {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    aspect_importance_with_rng(model, data, instance, aspects, config, &mut rng)
}

/// Estimates how much each aspect moves the model's prediction towards the
/// value it takes on `instance`.
///
/// All preconditions are checked before any sampling or prediction happens.
pub fn aspect_importance_with_rng<M, R>(
    model: &M,
    data: &Dataset,
    instance: &Instance,
    aspects: &AspectSet,
    config: &AspectImportanceConfig,
    rng: &mut R,
) -> Result<AspectImportance>
where
    M: PredictModel + ?Sized,
    R: Rng + ?Sized,
{
    config.validate()?;
    let (common, target) = common_columns(data, instance)?;
    validate_aspects(aspects, &common, &target)?;
    if common.nrows() == 0 {
        return Err(AspectError::InvalidParameter(
            "Reference data has no rows to sample from.".to_string(),
        ));
    }

    let mask = generate_masks(
        config.n_samples,
        aspects.len(),
        config.sample_method,
        config.frequency,
        rng,
    )?;
    let sample = build_perturbed(data, instance, aspects, &mask, rng)?;
    let delta = estimate_response(model, &sample.sampled, &sample.perturbed)?;

    let fitter = fitter_for(config.max_nonzero);
    debug!(
        fitter = fitter.name(),
        n_samples = config.n_samples,
        aspects = aspects.len(),
        "fitting aspect importance"
    );
    let design = mask.mapv(f64::from);
    let fit = fitter.fit(delta.view(), design.view())?;

    let names: Vec<&str> = aspects.names().collect();
    let degenerate_aspects: Vec<String> = fit
        .undefined()
        .into_iter()
        .map(|j| names[j].to_string())
        .collect();
    if !degenerate_aspects.is_empty() {
        if config.fail_on_degenerate_fit {
            return Err(AspectError::DegenerateFit {
                aspects: degenerate_aspects,
            });
        }
        warn!(aspects = ?degenerate_aspects, "importance undefined for some aspects");
    }

    let rows = annotate(fit.coefficients.view(), aspects, data, config.show_cor)?;
    Ok(AspectImportance {
        label: config.label.clone().unwrap_or_else(|| model.label()),
        rows,
        degenerate_aspects,
        suspected_outcome: None,
    })
}

/// Explains `instance` for a model packaged with its own reference data.
/// Warns when the reference data seems to contain the outcome itself.
pub fn explain_aspects<E: Explainer + ?Sized>(
    explainer: &E,
    instance: &Instance,
    aspects: &AspectSet,
    config: &AspectImportanceConfig,
) -> Result<AspectImportance> {
    let suspected_outcome = explainer
        .outcome()
        .and_then(|outcome| explainer.data().find_outcome_column(outcome))
        .map(str::to_string);
    if let Some(column) = &suspected_outcome {
        warn!(
            column = column.as_str(),
            "reference data appears to contain the outcome; importances may be biased"
        );
    }
    let mut result = aspect_importance(
        &ExplainerModel(explainer),
        explainer.data(),
        instance,
        aspects,
        config,
    )?;
    result.suspected_outcome = suspected_outcome;
    Ok(result)
}
