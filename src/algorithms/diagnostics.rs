// src/algorithms/diagnostics.rs

use crate::core::{AspectImportanceRow, AspectSet, ColumnType, CorrelationSign, Dataset, Result};
use crate::utils::{round_significant, spearman_matrix};
use ndarray::{Array2, ArrayView1};
use std::cmp::Ordering;
use tracing::warn;

/// Significant digits kept in reported importances.
pub const IMPORTANCE_DIGITS: usize = 4;

/// Weakest absolute pairwise correlation and consensus sign of an aspect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorrelationSummary {
    pub min_cor: f64,
    pub sign: CorrelationSign,
}

/// Spearman summary over the aspect's variables. `None` unless the aspect has
/// more than one variable, all numeric, and every pairwise correlation is
/// defined.
pub fn correlation_summary(variables: &[String], data: &Dataset) -> Option<CorrelationSummary> {
    if variables.len() < 2 {
        return None;
    }
    let columns: Vec<ArrayView1<f64>> = variables
        .iter()
        .map(|v| {
            data.column(v)
                .filter(|c| c.column_type() == ColumnType::Number)
                .and_then(|c| c.as_numbers())
        })
        .collect::<Option<_>>()?;

    let mut values = Array2::<f64>::zeros((data.nrows(), columns.len()));
    for (j, column) in columns.iter().enumerate() {
        values.column_mut(j).assign(column);
    }
    let cor = spearman_matrix(values.view());

    let p = cor.nrows();
    let mut min_abs = f64::INFINITY;
    let mut any_negative = false;
    for i in 0..p {
        for j in (i + 1)..p {
            let r = cor[[i, j]];
            if r.is_nan() {
                warn!(variables = ?variables, "undefined rank correlation inside aspect");
                return None;
            }
            min_abs = min_abs.min(r.abs());
            any_negative |= r < 0.0;
        }
    }
    // The diagonal is always positive, so one negative pair means mixed signs.
    let sign = if any_negative {
        CorrelationSign::Neg
    } else {
        CorrelationSign::Pos
    };
    Some(CorrelationSummary {
        min_cor: min_abs,
        sign,
    })
}

/// Builds the result table: one row per aspect, ordered by descending
/// absolute coefficient (ties keep aspect order, undefined coefficients
/// last), importances rounded to [`IMPORTANCE_DIGITS`].
pub fn annotate(
    coefficients: ArrayView1<f64>,
    aspects: &AspectSet,
    data: &Dataset,
    show_cor: bool,
) -> Result<Vec<AspectImportanceRow>> {
    if coefficients.len() != aspects.len() {
        return Err(crate::core::AspectError::IncompatibleDimensions(format!(
            "{} coefficients for {} aspects.",
            coefficients.len(),
            aspects.len()
        )));
    }

    let mut order: Vec<usize> = (0..aspects.len()).collect();
    order.sort_by(|&a, &b| {
        let (ca, cb) = (coefficients[a].abs(), coefficients[b].abs());
        match (ca.is_nan(), cb.is_nan()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => cb.partial_cmp(&ca).unwrap_or(Ordering::Equal),
        }
    });

    let aspect_list: Vec<_> = aspects.iter().collect();
    Ok(order
        .into_iter()
        .map(|j| {
            let aspect = aspect_list[j];
            let summary = if show_cor {
                correlation_summary(&aspect.variables, data)
            } else {
                None
            };
            AspectImportanceRow {
                aspect: aspect.name.clone(),
                importance: round_significant(coefficients[j], IMPORTANCE_DIGITS),
                features: aspect.variables.clone(),
                min_cor: summary.map(|s| s.min_cor),
                sign: summary.map(|s| s.sign),
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Column;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn data() -> Dataset {
        Dataset::new(vec![
            Column::number("a", vec![1.0, 2.0, 3.0, 4.0, 5.0]),
            Column::number("b", vec![2.0, 1.0, 4.0, 3.0, 6.0]),
            Column::number("c", vec![5.0, 4.0, 3.0, 2.0, 1.0]),
            Column::number("flat", vec![1.0, 1.0, 1.0, 1.0, 1.0]),
            Column::categorical("k", ["x", "y", "x", "y", "x"]),
        ])
        .unwrap()
    }

    fn names(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn positive_group_reports_pos() {
        let s = correlation_summary(&names(&["a", "b"]), &data()).unwrap();
        assert_eq!(s.sign, CorrelationSign::Pos);
        assert_abs_diff_eq!(s.min_cor, 0.8, epsilon = 1e-12);
    }

    #[test]
    fn mixed_group_reports_neg() {
        let s = correlation_summary(&names(&["a", "b", "c"]), &data()).unwrap();
        assert_eq!(s.sign, CorrelationSign::Neg);
        assert_abs_diff_eq!(s.min_cor, 0.8, epsilon = 1e-12);
        let pair = correlation_summary(&names(&["a", "c"]), &data()).unwrap();
        assert_eq!(pair.sign, CorrelationSign::Neg);
        assert_abs_diff_eq!(pair.min_cor, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn diagnostics_skip_single_categorical_and_constant() {
        let d = data();
        assert!(correlation_summary(&names(&["a"]), &d).is_none());
        assert!(correlation_summary(&names(&["a", "k"]), &d).is_none());
        assert!(correlation_summary(&names(&["a", "flat"]), &d).is_none());
    }

    #[test]
    fn annotate_sorts_by_absolute_importance() {
        let aspects = AspectSet::from_groups([
            ("first", vec!["a"]),
            ("second", vec!["a", "b"]),
            ("third", vec!["c"]),
            ("fourth", vec!["k"]),
        ])
        .unwrap();
        let coefs = array![0.5, -2.123456, 0.5, f64::NAN];
        let rows = annotate(coefs.view(), &aspects, &data(), true).unwrap();
        let order: Vec<_> = rows.iter().map(|r| r.aspect.as_str()).collect();
        assert_eq!(order, vec!["second", "first", "third", "fourth"]);
        assert_eq!(rows[0].importance, -2.123);
        assert_eq!(rows[0].sign, Some(CorrelationSign::Pos));
        assert!(rows[1].min_cor.is_none());
        assert!(rows[3].importance.is_nan());
    }

    #[test]
    fn annotate_without_correlations() {
        let aspects = AspectSet::from_groups([("g", vec!["a", "b"])]).unwrap();
        let rows = annotate(array![1.0].view(), &aspects, &data(), false).unwrap();
        assert!(rows[0].min_cor.is_none());
        assert!(rows[0].sign.is_none());
    }
}
