// src/algorithms/perturbation.rs

use crate::algorithms::masks::MaskMatrix;
use crate::core::{AspectError, AspectSet, Dataset, Instance, Result, Value};
use rand::Rng;
use std::collections::HashSet;
use tracing::debug;

/// Background rows drawn for one explanation and their perturbed copies.
/// Row `i` of `perturbed` is row `i` of `sampled` with the active aspects of
/// mask row `i` overwritten by the observation's values.
#[derive(Debug, Clone)]
pub struct PerturbedSample {
    pub indices: Vec<usize>,
    pub sampled: Dataset,
    pub perturbed: Dataset,
}

/// Restricts both inputs to the columns they share, in the observation's
/// column order.
///
/// A shared column whose type differs between the two inputs is kept; it only
/// matters if an aspect refers to it, which [`validate_aspects`] rejects.
pub fn common_columns(reference: &Dataset, target: &Instance) -> Result<(Dataset, Instance)> {
    let common: Vec<&str> = target
        .names()
        .filter(|name| reference.column(name).is_some())
        .collect();
    if common.is_empty() {
        return Err(AspectError::SchemaMismatch(
            "Reference data and observation have no columns in common.".to_string(),
        ));
    }
    let conflicting: Vec<&str> = common
        .iter()
        .copied()
        .filter(|&name| {
            reference.column_type(name) != target.get(name).map(Value::column_type)
        })
        .collect();
    if !conflicting.is_empty() {
        debug!(columns = ?conflicting, "shared columns differ in type; keeping reference values");
    }

    let data = reference.select(&common)?;
    let instance = Instance::new(
        common
            .iter()
            .filter_map(|&name| target.get(name).map(|v| (name, v.clone()))),
    )?;
    Ok((data, instance))
}

/// Checks that every aspect is non-empty, uniquely named, and only refers to
/// columns of `data` whose type matches the observation's value.
pub fn validate_aspects(aspects: &AspectSet, data: &Dataset, target: &Instance) -> Result<()> {
    if aspects.is_empty() {
        return Err(AspectError::InvalidParameter(
            "At least one aspect is required.".to_string(),
        ));
    }
    let mut names = HashSet::new();
    for aspect in aspects {
        if !names.insert(aspect.name.as_str()) {
            return Err(AspectError::InvalidAspectDefinition(format!(
                "Aspect '{}' is defined more than once.",
                aspect.name
            )));
        }
        if aspect.variables.is_empty() {
            return Err(AspectError::InvalidAspectDefinition(format!(
                "Aspect '{}' has no variables.",
                aspect.name
            )));
        }
        for variable in &aspect.variables {
            let (Some(column_type), Some(value)) = (data.column_type(variable), target.get(variable))
            else {
                return Err(AspectError::InvalidAspectDefinition(format!(
                    "Aspect '{}' refers to '{}', which is not shared by the data and the observation.",
                    aspect.name, variable
                )));
            };
            if column_type != value.column_type() {
                return Err(AspectError::SchemaMismatch(format!(
                    "Aspect '{}' uses '{}', which is {:?} in the reference data but {:?} in the observation.",
                    aspect.name,
                    variable,
                    column_type,
                    value.column_type()
                )));
            }
        }
    }
    Ok(())
}

/// Draws `mask.nrows()` rows of `reference` with replacement and applies the
/// mask to copies of them.
pub fn build_perturbed<R: Rng + ?Sized>(
    reference: &Dataset,
    target: &Instance,
    aspects: &AspectSet,
    mask: &MaskMatrix,
    rng: &mut R,
) -> Result<PerturbedSample> {
    let (data, target) = common_columns(reference, target)?;
    validate_aspects(aspects, &data, &target)?;
    if mask.ncols() != aspects.len() {
        return Err(AspectError::IncompatibleDimensions(format!(
            "Mask has {} columns but {} aspects are defined.",
            mask.ncols(),
            aspects.len()
        )));
    }
    if data.nrows() == 0 {
        return Err(AspectError::InvalidParameter(
            "Reference data has no rows to sample from.".to_string(),
        ));
    }

    let n = mask.nrows();
    let indices: Vec<usize> = (0..n).map(|_| rng.gen_range(0..data.nrows())).collect();
    let sampled = data.take_rows(&indices)?;
    let mut perturbed = sampled.clone();

    // Observation values for each aspect, resolved once.
    let replacements: Vec<Vec<(&str, &Value)>> = aspects
        .iter()
        .map(|aspect| {
            aspect
                .variables
                .iter()
                .filter_map(|v| target.get(v).map(|value| (v.as_str(), value)))
                .collect()
        })
        .collect();

    for (i, mask_row) in mask.rows().into_iter().enumerate() {
        for (j, _) in mask_row.iter().enumerate().filter(|(_, m)| **m == 1) {
            for &(name, value) in &replacements[j] {
                perturbed.set_value(i, name, value)?;
            }
        }
    }

    debug!(
        rows = n,
        aspects = aspects.len(),
        columns = data.ncols(),
        "built perturbed sample"
    );
    Ok(PerturbedSample {
        indices,
        sampled,
        perturbed,
    })
}
