//! Property-based tests for mask generation, rounding and result ordering.

use aspects_rs::utils::round_significant;
use aspects_rs::{
    aspect_importance, generate_masks, AspectImportanceConfig, AspectSet, Column, Dataset,
    Instance, PredictError, SampleMethod,
};
use ndarray::Array1;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn method() -> impl Strategy<Value = SampleMethod> {
    prop_oneof![Just(SampleMethod::UniformPair), Just(SampleMethod::Binomial)]
}

// --- Mask generation ---

proptest! {
    #[test]
    fn masks_have_shape_binary_entries_and_no_empty_row(
        n in 1usize..200,
        k in 1usize..15,
        f in 0.1f64..20.0,
        method in method(),
        seed in any::<u64>(),
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mask = generate_masks(n, k, method, f, &mut rng).unwrap();
        prop_assert_eq!(mask.dim(), (n, k));
        prop_assert!(mask.iter().all(|&v| v == 0 || v == 1));
        prop_assert!(mask.rows().into_iter().all(|row| row.iter().any(|&v| v == 1)));
    }

    #[test]
    fn uniform_pair_never_activates_more_than_two(
        n in 1usize..100,
        k in 1usize..15,
        seed in any::<u64>(),
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mask = generate_masks(n, k, SampleMethod::UniformPair, 2.0, &mut rng).unwrap();
        for row in mask.rows() {
            let active = row.iter().filter(|&&v| v == 1).count();
            prop_assert!(active == 1 || active == 2);
        }
    }
}

// --- Rounding ---

proptest! {
    #[test]
    fn rounding_is_idempotent(value in -1.0e12f64..1.0e12) {
        let once = round_significant(value, 4);
        prop_assert_eq!(round_significant(once, 4), once);
    }

    #[test]
    fn rounding_stays_within_relative_error(value in -1.0e300f64..1.0e300) {
        let rounded = round_significant(value, 4);
        prop_assert!((rounded - value).abs() <= value.abs() * 5e-4);
    }
}

// --- Result table ---

fn model(rows: &Dataset) -> Result<Array1<f64>, PredictError> {
    let mut out = Array1::zeros(rows.nrows());
    for (j, column) in rows.columns().iter().enumerate() {
        let values = column.as_numbers().ok_or("non-numeric column")?;
        out = out + &values.mapv(|v| (j as f64 + 1.0) * v * if j % 2 == 0 { 1.0 } else { -1.0 });
    }
    Ok(out)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn result_has_one_sorted_row_per_aspect(
        k in 1usize..6,
        seed in any::<u64>(),
        max_nonzero in 0usize..3,
    ) {
        let columns: Vec<Column> = (0..k)
            .map(|j| Column::number(format!("v{}", j), (0..12).map(|i| ((i * (j + 2)) % 5) as f64).collect()))
            .collect();
        let data = Dataset::new(columns).unwrap();
        let target = Instance::new((0..k).map(|j| (format!("v{}", j), 7.0))).unwrap();
        let aspects = AspectSet::from_groups((0..k).map(|j| (format!("a{}", j), vec![format!("v{}", j)]))).unwrap();
        let config = AspectImportanceConfig::default()
            .with_seed(seed)
            .with_n_samples(80)
            .with_max_nonzero(max_nonzero);

        let result = aspect_importance(&model, &data, &target, &aspects, &config).unwrap();
        prop_assert_eq!(result.len(), k);
        prop_assert!(result.rows.iter().all(|r| r.aspect != "(Intercept)"));
        let mut names: Vec<&str> = result.rows.iter().map(|r| r.aspect.as_str()).collect();
        names.sort_unstable();
        let mut expected: Vec<String> = (0..k).map(|j| format!("a{}", j)).collect();
        expected.sort_unstable();
        prop_assert_eq!(names, expected.iter().map(String::as_str).collect::<Vec<_>>());

        // Undefined importances sort last; the defined ones are non-increasing.
        let defined: Vec<f64> = result.rows.iter().map(|r| r.importance).take_while(|v| !v.is_nan()).collect();
        prop_assert!(result.rows[defined.len()..].iter().all(|r| r.importance.is_nan()));
        prop_assert!(defined.windows(2).all(|w| w[0].abs() >= w[1].abs()));
        if max_nonzero > 0 {
            prop_assert!(defined.iter().filter(|&&v| v != 0.0).count() <= max_nonzero);
        }
    }
}
