// src/algorithms/masks.rs

use crate::core::{AspectError, Result};
use ndarray::Array2;
use rand::Rng;
use rand_distr::{Binomial, Distribution};
use serde::{Deserialize, Serialize};

/// Binary `n × k` matrix: entry `[i, j] == 1` when aspect `j` of sample `i`
/// takes the explained observation's values.
pub type MaskMatrix = Array2<u8>;

/// How active aspects are chosen for each sampled row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SampleMethod {
    /// Two draws with replacement per row. A collision leaves one active aspect.
    #[default]
    UniformPair,
    /// `max(1, Binomial(k, f / k))` draws with replacement per row.
    Binomial,
}

/// Generates an `n × k` mask matrix with no all-zero row.
///
/// `f` is the expected number of active aspects per row for
/// [`SampleMethod::Binomial`]; it is validated but unused by
/// [`SampleMethod::UniformPair`].
pub fn generate_masks<R: Rng + ?Sized>(
    n: usize,
    k: usize,
    method: SampleMethod,
    f: f64,
    rng: &mut R,
) -> Result<MaskMatrix> {
    if n == 0 {
        return Err(AspectError::InvalidParameter(
            "Number of sampled rows must be positive.".to_string(),
        ));
    }
    if k == 0 {
        return Err(AspectError::InvalidParameter(
            "Number of aspects must be positive.".to_string(),
        ));
    }
    if !(f > 0.0 && f.is_finite()) {
        return Err(AspectError::InvalidParameter(format!(
            "Frequency f must be a positive finite number, got {}.",
            f
        )));
    }

    let mut mask = MaskMatrix::zeros((n, k));
    match method {
        SampleMethod::UniformPair => {
            for mut row in mask.rows_mut() {
                row[rng.gen_range(0..k)] = 1;
                row[rng.gen_range(0..k)] = 1;
            }
        }
        SampleMethod::Binomial => {
            // f > k would push the success probability past 1
            let p = (f / k as f64).min(1.0);
            let binomial = Binomial::new(k as u64, p).map_err(|e| {
                AspectError::InvalidParameter(format!("Invalid binomial parameters: {}", e))
            })?;
            for mut row in mask.rows_mut() {
                let draws = binomial.sample(rng).max(1);
                for _ in 0..draws {
                    row[rng.gen_range(0..k)] = 1;
                }
            }
        }
    }
    Ok(mask)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn active_counts(mask: &MaskMatrix) -> Vec<usize> {
        mask.rows()
            .into_iter()
            .map(|r| r.iter().filter(|&&v| v == 1).count())
            .collect()
    }

    #[test]
    fn uniform_pair_sets_one_or_two_aspects() {
        let mut rng = StdRng::seed_from_u64(7);
        let mask = generate_masks(500, 6, SampleMethod::UniformPair, 2.0, &mut rng).unwrap();
        assert_eq!(mask.dim(), (500, 6));
        let counts = active_counts(&mask);
        assert!(counts.iter().all(|&c| c == 1 || c == 2));
        // Collisions happen with probability 1/k per row
        assert!(counts.iter().any(|&c| c == 1));
    }

    #[test]
    fn single_aspect_is_always_active() {
        let mut rng = StdRng::seed_from_u64(1);
        for method in [SampleMethod::UniformPair, SampleMethod::Binomial] {
            let mask = generate_masks(20, 1, method, 2.0, &mut rng).unwrap();
            assert!(mask.iter().all(|&v| v == 1));
        }
    }

    #[test]
    fn binomial_mean_tracks_frequency() {
        let mut rng = StdRng::seed_from_u64(42);
        let (n, k, f) = (20_000, 10, 3.0);
        let mask = generate_masks(n, k, SampleMethod::Binomial, f, &mut rng).unwrap();
        let counts = active_counts(&mask);
        assert!(counts.iter().all(|&c| c >= 1));
        let mean_draws = counts.iter().sum::<usize>() as f64 / n as f64;
        // Repeated draws collapse, so unique counts sit a little below f.
        assert!(mean_draws > 2.0 && mean_draws <= 3.2, "mean was {}", mean_draws);
    }

    #[test]
    fn frequency_above_k_is_clamped() {
        let mut rng = StdRng::seed_from_u64(3);
        let mask = generate_masks(50, 3, SampleMethod::Binomial, 10.0, &mut rng).unwrap();
        assert!(active_counts(&mask).iter().all(|&c| (1..=3).contains(&c)));
    }

    #[test]
    fn rejects_bad_parameters() {
        let mut rng = StdRng::seed_from_u64(0);
        for (n, k, f) in [(0, 3, 2.0), (3, 0, 2.0), (3, 3, 0.0), (3, 3, -1.0), (3, 3, f64::NAN)] {
            let err = generate_masks(n, k, SampleMethod::Binomial, f, &mut rng).unwrap_err();
            assert!(matches!(err, AspectError::InvalidParameter(_)));
        }
    }

    #[test]
    fn same_seed_same_masks() {
        let a = generate_masks(30, 4, SampleMethod::Binomial, 2.0, &mut StdRng::seed_from_u64(9)).unwrap();
        let b = generate_masks(30, 4, SampleMethod::Binomial, 2.0, &mut StdRng::seed_from_u64(9)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn method_parses_from_kebab_case() {
        let m: SampleMethod = serde_json::from_str("\"uniform-pair\"").unwrap();
        assert_eq!(m, SampleMethod::UniformPair);
        let m: SampleMethod = serde_json::from_str("\"binomial\"").unwrap();
        assert_eq!(m, SampleMethod::Binomial);
    }
}
