//! Order statistics over small per-frequency sample sets.

/// Arithmetic mean. Caller guarantees a non-empty slice.
pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Statistical median: middle value, or the average of the two middle values
/// for an even count.
pub fn median(values: &[f64]) -> f64 {
    quantile(values, 0.5)
}

/// Quantile with linear interpolation between closest ranks.
///
/// `h = (n - 1) q`, interpolating between `floor(h)` and `ceil(h)`. This is
/// the classic "linear" method, so `q = 0.25` on `[80, 81, 82, 120]` gives
/// `80.75`.
pub fn quantile(values: &[f64], q: f64) -> f64 {
    debug_assert!(!values.is_empty());
    debug_assert!((0.0..=1.0).contains(&q));

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let h = (sorted.len() - 1) as f64 * q;
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    if lo == hi {
        return sorted[lo];
    }
    sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_of_symmetric_values() {
        assert_eq!(mean(&[80.0, 85.0, 90.0]), 85.0);
    }

    #[test]
    fn median_odd_and_even_counts() {
        assert_eq!(median(&[90.0, 80.0, 85.0]), 85.0);
        assert_eq!(median(&[80.0, 90.0]), 85.0);
        assert_eq!(median(&[42.0]), 42.0);
    }

    #[test]
    fn quartiles_use_linear_interpolation() {
        let values = [80.0, 81.0, 82.0, 120.0];
        assert!((quantile(&values, 0.25) - 80.75).abs() < 1e-12);
        assert!((quantile(&values, 0.75) - 91.5).abs() < 1e-12);
        assert_eq!(quantile(&values, 0.0), 80.0);
        assert_eq!(quantile(&values, 1.0), 120.0);
    }
}
