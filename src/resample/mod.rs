//! Log-spaced resampling pinned to a required frequency.
//!
//! The grid is the lattice `pinned_hz * 2^(k / ppo)` for integer `k`,
//! generated outward from the pinned point in both directions and clipped to
//! the curve's own span, so the pinned frequency lands exactly on a grid
//! point whenever it lies inside the span and no grid point ever requires
//! extrapolation. Amplitudes are interpolated linearly in `ln(f)`.
//!
//! Import, export, smoothing, and best-fit comparison all resample through
//! this one entry point, so its idempotence shortcut matters: resampling a
//! curve that is already on the requested grid returns the samples unchanged
//! instead of re-interpolating them. Without it, an import-time resample
//! followed by an export-time resample at the same settings would smooth the
//! data twice.

use crate::domain::Curve;
use crate::error::EngineError;
use crate::math::{grids_match, interp_log_x};

/// Relative tolerance for the "grid already matches" shortcut.
const GRID_MATCH_RTOL: f64 = 1e-9;

/// Slack, in grid steps, when clipping the lattice to the curve span. Keeps
/// endpoints that differ from the span bounds only by floating error.
const EDGE_EPS: f64 = 1e-9;

/// Resample `curve` onto a log-spaced grid with `points_per_octave` points
/// per octave, anchored so `pinned_hz` falls exactly on the lattice.
///
/// `points_per_octave == 0` means "no resampling": the input pair is returned
/// unchanged (as a fresh value). Negative or non-finite densities fail with
/// [`EngineError::InvalidResolution`]; a non-positive pin fails with
/// [`EngineError::InvalidAxis`]. A pin outside the curve span still anchors
/// the lattice; the out-of-span part is clipped away.
pub fn resample_to_grid(
    curve: &Curve,
    points_per_octave: f64,
    pinned_hz: f64,
) -> Result<Curve, EngineError> {
    if !points_per_octave.is_finite() || points_per_octave < 0.0 {
        return Err(EngineError::InvalidResolution(format!(
            "points per octave must be finite and >= 0, got {points_per_octave}"
        )));
    }
    // Checked before any grid arithmetic: a zero density would divide by zero
    // in the step computation below.
    if points_per_octave == 0.0 {
        return Ok(curve.clone());
    }
    if !pinned_hz.is_finite() || pinned_hz <= 0.0 {
        return Err(EngineError::InvalidAxis(format!(
            "pinned frequency must be finite and > 0, got {pinned_hz}"
        )));
    }

    let f_lo = curve.min_frequency();
    let f_hi = curve.max_frequency();

    // Lattice indices relative to the pin: k such that
    // f_lo <= pinned * 2^(k/ppo) <= f_hi, with a little slack for rounding.
    let k_lo = (points_per_octave * (f_lo / pinned_hz).log2() - EDGE_EPS).ceil() as i64;
    let k_hi = (points_per_octave * (f_hi / pinned_hz).log2() + EDGE_EPS).floor() as i64;
    if k_lo > k_hi {
        return Err(EngineError::InsufficientData(format!(
            "no grid points at {points_per_octave} per octave fall inside [{f_lo}, {f_hi}]"
        )));
    }

    let mut grid = Vec::with_capacity((k_hi - k_lo + 1) as usize);
    for k in k_lo..=k_hi {
        // Clamp to the span so rounding at the edges cannot push a grid point
        // outside the interpolable range.
        let f = (pinned_hz * (k as f64 / points_per_octave).exp2()).clamp(f_lo, f_hi);
        grid.push(f);
    }

    if grids_match(&grid, curve.frequencies(), GRID_MATCH_RTOL) {
        return Ok(curve.clone());
    }

    let xs = curve.frequencies();
    let ys = curve.amplitudes();
    let amplitudes: Vec<f64> = grid
        .iter()
        .map(|&f| {
            // In range by construction; the fallback is unreachable.
            interp_log_x(xs, ys, f).unwrap_or(ys[0])
        })
        .collect();

    Curve::from_xy(grid, amplitudes)
}
