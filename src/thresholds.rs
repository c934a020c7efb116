//! Threshold Classifier
//!
//! Canonical colour-scale break points from the flat display values.
//! Sparse data (fewer than `even_spacing_below` valid samples) is split
//! evenly between min and max; larger data is sampled at the configured
//! percentiles. Either way the list starts at the smallest valid value,
//! ends at the largest, and is strictly increasing.

use crate::config::EngineConfig;

/// Finite and non-zero (drops NaN, ±inf, 0 and -0)
#[inline]
pub fn is_classifiable(value: f64) -> bool {
    value.is_finite() && value != 0.0
}

/// Valid values, sorted ascending
pub fn valid_sorted(values: &[f64]) -> Vec<f64> {
    let mut valid: Vec<f64> = values.iter().copied().filter(|v| is_classifiable(*v)).collect();
    valid.sort_by(f64::total_cmp);
    valid
}

pub fn calculate_thresholds(values: &[f64], config: &EngineConfig) -> Vec<f64> {
    let sorted = valid_sorted(values);
    let (Some(&min), Some(&max)) = (sorted.first(), sorted.last()) else {
        return Vec::new();
    };

    let mut thresholds = if sorted.len() < config.even_spacing_below {
        even_breaks(min, max, config.even_spacing_segments)
    } else {
        percentile_breaks(&sorted, &config.percentiles)
    };

    thresholds.sort_by(f64::total_cmp);
    thresholds.dedup();

    tracing::debug!(
        "Thresholds: {} break points from {} valid values",
        thresholds.len(),
        sorted.len()
    );

    thresholds
}

/// `segments - 1` interior points between min and max, with both ends
fn even_breaks(min: f64, max: f64, segments: usize) -> Vec<f64> {
    let segments = segments.max(1);
    let step = (max - min) / segments as f64;

    let mut breaks = Vec::with_capacity(segments + 1);
    breaks.push(min);
    breaks.extend((1..segments).map(|i| min + step * i as f64));
    breaks.push(max);
    breaks
}

/// Value at `floor(n * p / 100)` for each interior percentile, with min and max
fn percentile_breaks(sorted: &[f64], percentiles: &[f64]) -> Vec<f64> {
    let n = sorted.len();
    let last = n - 1;

    let mut breaks = Vec::with_capacity(percentiles.len() + 2);
    if let Some(&min) = sorted.first() {
        breaks.push(min);
    }
    for &p in percentiles {
        if p > 0.0 && p < 100.0 {
            let index = ((n as f64 * p / 100.0).floor() as usize).min(last);
            breaks.push(sorted[index]);
        }
    }
    breaks.push(sorted[last]);
    breaks
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_small_sample_uses_even_spacing() {
        let thresholds = calculate_thresholds(&[10.0, 20.0, 30.0, 40.0, 100.0], &EngineConfig::default());

        assert_eq!(thresholds.len(), 11);
        assert_eq!(thresholds[0], 10.0);
        assert_relative_eq!(thresholds[1], 19.0);
        assert_relative_eq!(thresholds[5], 55.0);
        assert_relative_eq!(thresholds[9], 91.0);
        assert_eq!(thresholds[10], 100.0);
    }

    #[test]
    fn test_zero_and_non_finite_filtered() {
        let values = [0.0, f64::NAN, -0.0, 50.0, 75.0, f64::INFINITY];
        assert_eq!(valid_sorted(&values), vec![50.0, 75.0]);

        let thresholds = calculate_thresholds(&values, &EngineConfig::default());
        assert_eq!(thresholds.first(), Some(&50.0));
        assert_eq!(thresholds.last(), Some(&75.0));
    }

    #[test]
    fn test_empty_input() {
        assert!(calculate_thresholds(&[], &EngineConfig::default()).is_empty());
        assert!(calculate_thresholds(&[0.0, f64::NAN], &EngineConfig::default()).is_empty());
    }

    #[test]
    fn test_single_value_collapses() {
        assert_eq!(calculate_thresholds(&[42.0, 42.0], &EngineConfig::default()), vec![42.0]);
    }

    #[test]
    fn test_percentile_path() {
        // 1..=100
        let values: Vec<f64> = (1..=100).map(f64::from).collect();
        let thresholds = calculate_thresholds(&values, &EngineConfig::default());

        // floor(100 * p / 100) indexes the sorted list: p=5 → 6.0, p=95 → 96.0
        assert_eq!(
            thresholds,
            vec![1.0, 6.0, 11.0, 16.0, 41.0, 66.0, 81.0, 86.0, 91.0, 96.0, 100.0]
        );
    }

    #[test]
    fn test_custom_percentiles_and_cutoff() {
        let config = EngineConfig {
            even_spacing_below: 2,
            ..EngineConfig::default().with_percentiles(vec![0.0, 50.0, 100.0])
        };
        let thresholds = calculate_thresholds(&[-10.0, 5.0, 20.0, 40.0], &config);
        assert_eq!(thresholds, vec![-10.0, 20.0, 40.0]);
    }

    #[test]
    fn test_thresholds_monotonic_and_bounded() {
        let mut rng = StdRng::seed_from_u64(7);
        let config = EngineConfig::default();

        for size in [3usize, 29, 30, 250] {
            let values: Vec<f64> = (0..size)
                .map(|_| if rng.gen_bool(0.1) { 0.0 } else { rng.gen_range(-5_000.0..50_000.0) })
                .collect();
            let valid = valid_sorted(&values);
            let thresholds = calculate_thresholds(&values, &config);

            assert!(thresholds.windows(2).all(|w| w[0] < w[1]));
            assert_eq!(thresholds.first(), valid.first());
            assert_eq!(thresholds.last(), valid.last());
        }
    }
}
