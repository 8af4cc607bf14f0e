// src/utils/stats.rs
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use std::cmp::Ordering;

/// Ranks starting at 1, ties get the average of the ranks they span.
pub fn average_ranks(values: ArrayView1<f64>) -> Array1<f64> {
    let n = values.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| values[a].partial_cmp(&values[b]).unwrap_or(Ordering::Equal));

    let mut ranks = Array1::zeros(n);
    let mut i = 0;
    while i < n {
        let mut j = i + 1;
        while j < n && values[order[j]] == values[order[i]] {
            j += 1;
        }
        // positions i..j (0-based) share rank (i+1 + j) / 2
        let rank = (i + 1 + j) as f64 / 2.0;
        for &idx in &order[i..j] {
            ranks[idx] = rank;
        }
        i = j;
    }
    ranks
}

/// Pearson correlation. NaN when either input is constant or shorter than 2.
pub fn pearson(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    let n = a.len();
    if n < 2 || n != b.len() {
        return f64::NAN;
    }
    let mean_a = a.sum() / n as f64;
    let mean_b = b.sum() / n as f64;
    let (mut cov, mut var_a, mut var_b) = (0.0, 0.0, 0.0);
    for (&x, &y) in a.iter().zip(b.iter()) {
        let dx = x - mean_a;
        let dy = y - mean_b;
        cov += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }
    if var_a == 0.0 || var_b == 0.0 {
        return f64::NAN;
    }
    (cov / (var_a * var_b).sqrt()).clamp(-1.0, 1.0)
}

/// Spearman correlation matrix between the columns of `data`.
pub fn spearman_matrix(data: ArrayView2<f64>) -> Array2<f64> {
    let p = data.ncols();
    let ranks: Vec<Array1<f64>> = data.columns().into_iter().map(average_ranks).collect();
    let mut out = Array2::from_elem((p, p), 1.0);
    for i in 0..p {
        for j in (i + 1)..p {
            let r = pearson(ranks[i].view(), ranks[j].view());
            out[[i, j]] = r;
            out[[j, i]] = r;
        }
    }
    out
}

/// Rounds to `digits` significant digits. Non-finite values and zero pass
/// through unchanged.
pub fn round_significant(value: f64, digits: usize) -> f64 {
    if !value.is_finite() || value == 0.0 || digits == 0 {
        return value;
    }
    // Scientific formatting keeps exactly `digits` significant digits and
    // parses back to the nearest double, so re-rounding is a no-op.
    format!("{:.*e}", digits - 1, value).parse().unwrap_or(value)
}
