// src/algorithms/grouping.rs

//! Builds aspects by clustering numeric variables on their rank correlation.

use crate::core::{AspectError, AspectSet, ColumnType, Dataset, Result};
use crate::utils::spearman_matrix;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Distance between two clusters, from the distances between their members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Linkage {
    #[default]
    Complete,
    Single,
    Average,
}

impl Linkage {
    fn distance(&self, a: &[usize], b: &[usize], d: &Array2<f64>) -> f64 {
        let pairs = a.iter().flat_map(|&i| b.iter().map(move |&j| d[[i, j]]));
        match self {
            Linkage::Complete => pairs.fold(f64::NEG_INFINITY, f64::max),
            Linkage::Single => pairs.fold(f64::INFINITY, f64::min),
            Linkage::Average => {
                let (sum, count) = pairs.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
                sum / count as f64
            }
        }
    }
}

/// Groups the columns of `data` by agglomerative clustering on
/// `1 - |spearman|`, cutting the tree at height `h`.
///
/// Aspects are named `aspect.group1`, `aspect.group2`, ... in order of their
/// first variable's column position.
pub fn group_variables(data: &Dataset, h: f64, linkage: Linkage) -> Result<AspectSet> {
    if !(0.0..=1.0).contains(&h) {
        return Err(AspectError::InvalidParameter(format!(
            "Cut height must lie in [0, 1], got {}.",
            h
        )));
    }
    if data.ncols() < 2 {
        return Err(AspectError::InvalidParameter(
            "At least two variables are needed to group.".to_string(),
        ));
    }
    if let Some(column) = data
        .columns()
        .iter()
        .find(|c| c.column_type() != ColumnType::Number)
    {
        return Err(AspectError::InvalidParameter(format!(
            "Variable '{}' is not numeric; only numeric variables can be grouped.",
            column.name()
        )));
    }

    let p = data.ncols();
    let values = data.to_array()?;
    let distances = spearman_matrix(values.view()).mapv(|r| {
        if r.is_nan() {
            1.0
        } else {
            1.0 - r.abs()
        }
    });
    if distances.iter().any(|&d| d == 1.0) {
        warn!("some rank correlations are undefined or zero; treating them as unrelated");
    }

    let mut clusters: Vec<Vec<usize>> = (0..p).map(|j| vec![j]).collect();
    while clusters.len() > 1 {
        let mut best: Option<(usize, usize, f64)> = None;
        for a in 0..clusters.len() {
            for b in (a + 1)..clusters.len() {
                let d = linkage.distance(&clusters[a], &clusters[b], &distances);
                if best.map_or(true, |(_, _, bd)| d < bd) {
                    best = Some((a, b, d));
                }
            }
        }
        match best {
            Some((a, b, d)) if d <= h => {
                let merged = clusters.remove(b);
                clusters[a].extend(merged);
            }
            _ => break,
        }
    }

    for cluster in &mut clusters {
        cluster.sort_unstable();
    }
    clusters.sort_by_key(|c| c[0]);
    debug!(groups = clusters.len(), variables = p, h, "grouped variables");

    let names: Vec<&str> = data.column_names().collect();
    AspectSet::from_groups(clusters.iter().enumerate().map(|(i, cluster)| {
        (
            format!("aspect.group{}", i + 1),
            cluster.iter().map(|&j| names[j]).collect::<Vec<_>>(),
        )
    }))
}
