//! Legend helpers
//!
//! Everything here is presentation-side: the canonical thresholds from
//! [`crate::thresholds`] drive the colour scale unchanged, while
//! [`simplify_for_legend`] produces a coarser list whose formatted labels do
//! not collide.

use crate::config::EngineConfig;
use crate::thresholds::is_classifiable;

/// Compact label: K/M/B unit suffix, two decimals when fractional
pub fn short_format(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }

    let abs = value.abs();
    let (scaled, suffix) = if abs >= 1.0e9 {
        (abs / 1.0e9, "B")
    } else if abs >= 1.0e6 {
        (abs / 1.0e6, "M")
    } else if abs >= 1.0e3 {
        (abs / 1.0e3, "K")
    } else {
        (abs, "")
    };

    let number = if scaled.fract() == 0.0 {
        format!("{}", scaled)
    } else {
        format!("{:.2}", scaled)
    };
    let sign = if value < 0.0 { "-" } else { "" };
    format!("{}{}{}", sign, number, suffix)
}

pub fn legend_labels(points: &[f64]) -> Vec<String> {
    points.iter().map(|p| short_format(*p)).collect()
}

/// Would any two adjacent labels be indistinguishable?
///
/// Equal formatted text, or same-sign magnitudes within `ratio` of each other.
pub fn labels_collide(points: &[f64], ratio: f64) -> bool {
    points.windows(2).any(|pair| {
        let (a, b) = (pair[0], pair[1]);
        if short_format(a) == short_format(b) {
            return true;
        }
        if a == 0.0 || b == 0.0 || a.signum() != b.signum() {
            return false;
        }
        let (lo, hi) = if a.abs() < b.abs() { (a.abs(), b.abs()) } else { (b.abs(), a.abs()) };
        hi / lo < ratio
    })
}

/// Every other point, always keeping the last
fn halve(points: &[f64]) -> Vec<f64> {
    let mut halved: Vec<f64> = points.iter().step_by(2).copied().collect();
    if let (Some(&last), Some(&kept)) = (points.last(), halved.last()) {
        if kept != last {
            halved.push(last);
        }
    }
    halved
}

/// Round every point to a multiple of `unit`, kept inside `[min, max]`
fn round_to_unit(points: &[f64], unit: f64, min: f64, max: f64) -> Vec<f64> {
    let mut rounded: Vec<f64> = points
        .iter()
        .map(|p| ((p / unit).round() * unit).clamp(min, max))
        .collect();
    rounded.sort_by(f64::total_cmp);
    rounded.dedup();
    rounded
}

/// Round magnitudes kept strictly inside (min, max), with both ends
fn magnitude_fallback(min: f64, max: f64) -> Vec<f64> {
    let max_abs = min.abs().max(max.abs());
    let magnitudes: [f64; 3] = if max_abs >= 1.0e6 {
        [1.0e6, 1.0e7, 1.0e8]
    } else {
        [10.0, 100.0, 1000.0]
    };

    let mut points = vec![min, max];
    points.extend(
        magnitudes
            .iter()
            .flat_map(|m| [*m, -*m])
            .filter(|m| *m > min && *m < max),
    );
    points.sort_by(f64::total_cmp);
    points.dedup();
    points
}

/// Coarsen break points until adjacent legend labels no longer collide
///
/// Tries, in order: halving the list, rounding to 1/5/10/50/100 × the
/// magnitude scale, then a fixed set of round magnitudes.
pub fn simplify_for_legend(thresholds: &[f64], config: &EngineConfig) -> Vec<f64> {
    let min_points = config.min_legend_points;
    let ratio = config.label_ratio;

    if thresholds.len() < min_points || !labels_collide(thresholds, ratio) {
        return thresholds.to_vec();
    }

    let mut candidate = halve(thresholds);
    while candidate.len() >= min_points {
        if !labels_collide(&candidate, ratio) {
            return candidate;
        }
        let next = halve(&candidate);
        if next.len() == candidate.len() {
            break;
        }
        candidate = next;
    }

    let (Some(&min), Some(&max)) = (thresholds.first(), thresholds.last()) else {
        return Vec::new();
    };
    let max_abs = min.abs().max(max.abs());
    if max_abs > 0.0 {
        let scale = 10f64.powf(max_abs.log10().floor()) / 100.0;
        for unit in [1.0, 5.0, 10.0, 50.0, 100.0] {
            let rounded = round_to_unit(thresholds, unit * scale, min, max);
            if rounded.len() >= min_points && !labels_collide(&rounded, ratio) {
                return rounded;
            }
        }
    }

    magnitude_fallback(min, max)
}

/// Bucket for a value: first `i` with `value <= thresholds[i]`; values above
/// the last threshold take the last bucket
pub fn color_index(value: f64, thresholds: &[f64]) -> Option<usize> {
    if thresholds.is_empty() || !is_classifiable(value) {
        return None;
    }
    let index = thresholds.partition_point(|t| *t < value);
    Some(index.min(thresholds.len() - 1))
}

/// Colour for a value from an ordered colour range
pub fn color_for<'c, C>(value: f64, thresholds: &[f64], colors: &'c [C]) -> Option<&'c C> {
    let index = color_index(value, thresholds)?;
    colors.get(index.min(colors.len().checked_sub(1)?))
}

/// Share of valid values falling in each bucket
pub fn bucket_distribution(values: &[f64], thresholds: &[f64]) -> Vec<f64> {
    let mut counts = vec![0usize; thresholds.len()];
    let mut total = 0usize;
    for index in values.iter().filter_map(|v| color_index(*v, thresholds)) {
        counts[index] += 1;
        total += 1;
    }

    if total == 0 {
        return vec![0.0; thresholds.len()];
    }
    counts.into_iter().map(|c| c as f64 / total as f64).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_short_format() {
        assert_eq!(short_format(950.0), "950");
        assert_eq!(short_format(12.347), "12.35");
        assert_eq!(short_format(1500.0), "1.50K");
        assert_eq!(short_format(2_000_000.0), "2M");
        assert_eq!(short_format(-3_250_000_000.0), "-3.25B");
        assert_eq!(short_format(f64::NAN), "0");
    }

    #[test]
    fn test_labels_collide() {
        assert!(labels_collide(&[1001.0, 1002.0], 1.25));
        assert!(labels_collide(&[100.0, 120.0], 1.25));
        assert!(!labels_collide(&[100.0, 130.0], 1.25));
        assert!(!labels_collide(&[-100.0, 110.0], 1.25));
    }

    #[test]
    fn test_non_colliding_list_is_kept() {
        let points = vec![10.0, 100.0, 1000.0, 10_000.0];
        assert_eq!(simplify_for_legend(&points, &EngineConfig::default()), points);
    }

    #[test]
    fn test_halving_resolves_dense_tail() {
        let points = vec![10.0, 11.0, 100.0, 105.0, 1000.0];
        let simplified = simplify_for_legend(&points, &EngineConfig::default());
        assert_eq!(simplified, vec![10.0, 100.0, 1000.0]);
    }

    #[test]
    fn test_fallback_magnitudes_bounded_by_range() {
        // Every candidate collides; ends up on round magnitudes
        let points = vec![5.0, 5.5, 6.0, 6.5, 7.0, 7.5];
        let simplified = simplify_for_legend(&points, &EngineConfig::default());
        assert_eq!(simplified.first(), Some(&5.0));
        assert_eq!(simplified.last(), Some(&7.5));
        assert!(simplified.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_rounded_points_stay_inside_range() {
        // Unit 10 wins; 12 and 99 would otherwise round to 10 and 100
        let points = vec![12.0, 13.0, 45.0, 48.0, 95.0, 99.0];
        let simplified = simplify_for_legend(&points, &EngineConfig::default());
        assert_eq!(simplified, vec![12.0, 50.0, 99.0]);
    }

    #[test]
    fn test_mixed_sign_thresholds() {
        let points = vec![-500.0, -450.0, -20.0, 15.0, 400.0, 420.0];
        let simplified = simplify_for_legend(&points, &EngineConfig::default());
        assert_eq!(simplified, vec![-500.0, 0.0, 400.0]);
        assert!(!labels_collide(&simplified, 1.25));
        assert_eq!(legend_labels(&simplified), vec!["-500", "0", "400"]);
    }

    #[test]
    fn test_magnitude_fallback_large_scale() {
        assert_eq!(magnitude_fallback(2.0e6, 5.0e7), vec![2.0e6, 1.0e7, 5.0e7]);
        assert_eq!(
            magnitude_fallback(-5.0e6, 2.0e7),
            vec![-5.0e6, -1.0e6, 1.0e6, 1.0e7, 2.0e7]
        );
        // Small scale, endpoints exactly on a magnitude are not repeated
        assert_eq!(magnitude_fallback(-1000.0, 50.0), vec![-1000.0, -100.0, -10.0, 10.0, 50.0]);
    }

    #[test]
    fn test_color_index_buckets() {
        let thresholds = [10.0, 20.0, 30.0];
        assert_eq!(color_index(5.0, &thresholds), Some(0));
        assert_eq!(color_index(10.0, &thresholds), Some(0));
        assert_eq!(color_index(10.5, &thresholds), Some(1));
        assert_eq!(color_index(99.0, &thresholds), Some(2));
        assert_eq!(color_index(0.0, &thresholds), None);
        assert_eq!(color_index(5.0, &[]), None);

        let colors = ["#fff", "#ccc", "#000"];
        assert_eq!(color_for(25.0, &thresholds, &colors), Some(&"#000"));
        assert_eq!(color_for(25.0, &thresholds, &[] as &[&str]), None);
    }

    #[test]
    fn test_bucket_distribution() {
        let shares = bucket_distribution(&[1.0, 15.0, 16.0, 0.0, 40.0], &[10.0, 20.0, 30.0]);
        assert_relative_eq!(shares[0], 0.25);
        assert_relative_eq!(shares[1], 0.5);
        assert_relative_eq!(shares[2], 0.25);
        assert_eq!(bucket_distribution(&[], &[1.0]), vec![0.0]);
    }
}
