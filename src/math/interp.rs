//! Interpolation in the logarithm of frequency.
//!
//! Response curves live on log-spaced (or at least log-minded) frequency
//! axes, so "linear interpolation" here always means linear in `ln(f)`.
//! Queries outside the sampled span are absent, never extrapolated.

/// Interpolate `ys` at `x`, treating `ys` as linear in `ln(xs)` between
/// samples.
///
/// `xs` must be strictly increasing and positive (guaranteed for the grids of
/// validated curves). Returns `None` when `x` lies outside `[xs[0], xs[last]]`.
pub fn interp_log_x(xs: &[f64], ys: &[f64], x: f64) -> Option<f64> {
    let n = xs.len();
    if n == 0 || x < xs[0] || x > xs[n - 1] {
        return None;
    }
    if n == 1 {
        return Some(ys[0]);
    }

    // Index of the first grid point >= x.
    let hi = xs.partition_point(|&g| g < x);
    if hi == 0 {
        return Some(ys[0]);
    }
    if xs[hi] == x {
        return Some(ys[hi]);
    }

    let lo = hi - 1;
    let t = (x.ln() - xs[lo].ln()) / (xs[hi].ln() - xs[lo].ln());
    Some(ys[lo] + t * (ys[hi] - ys[lo]))
}

/// Whether two grids are numerically identical within relative tolerance.
///
/// Used by the resampler's no-op shortcut: re-interpolating onto an equal
/// grid would only add floating noise.
pub fn grids_match(a: &[f64], b: &[f64], rtol: f64) -> bool {
    a.len() == b.len()
        && a.iter()
            .zip(b)
            .all(|(&x, &y)| (x - y).abs() <= rtol * x.abs().max(y.abs()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_grid_points_are_returned_verbatim() {
        let xs = [100.0, 200.0, 400.0];
        let ys = [80.0, 86.0, 83.0];
        assert_eq!(interp_log_x(&xs, &ys, 100.0), Some(80.0));
        assert_eq!(interp_log_x(&xs, &ys, 200.0), Some(86.0));
        assert_eq!(interp_log_x(&xs, &ys, 400.0), Some(83.0));
    }

    #[test]
    fn midpoint_in_log_domain() {
        // Geometric mean of the endpoints is the halfway point in ln(f).
        let xs = [100.0, 400.0];
        let ys = [80.0, 90.0];
        let mid = interp_log_x(&xs, &ys, 200.0).unwrap();
        assert!((mid - 85.0).abs() < 1e-12, "got {mid}");
    }

    #[test]
    fn outside_span_is_absent() {
        let xs = [100.0, 200.0];
        let ys = [80.0, 86.0];
        assert_eq!(interp_log_x(&xs, &ys, 99.9), None);
        assert_eq!(interp_log_x(&xs, &ys, 200.1), None);
    }

    #[test]
    fn single_point_curve_interpolates_to_itself() {
        assert_eq!(interp_log_x(&[100.0], &[81.0], 100.0), Some(81.0));
        assert_eq!(interp_log_x(&[100.0], &[81.0], 101.0), None);
    }

    #[test]
    fn grids_match_tolerates_float_noise() {
        let a = [100.0, 200.0, 400.0];
        let b = [100.0 * (1.0 + 1e-12), 200.0, 400.0];
        assert!(grids_match(&a, &b, 1e-9));
        assert!(!grids_match(&a, &b[..2], 1e-9));
        assert!(!grids_match(&a, &[100.0, 201.0, 400.0], 1e-9));
    }
}
