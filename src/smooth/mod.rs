//! Smoothing algorithms over a curve.
//!
//! Algorithm selection is a closed enum; dispatch is one exhaustive `match`,
//! so adding a variant is a compile error until every consumer handles it.
//! All variants preserve the curve's overall frequency span and return a new
//! curve; naming the result (e.g. appending `smoothed 1/6`) is the caller's
//! job via [`crate::domain::CurveLabel`].
//!
//! Edge semantics differ by family and are part of the contract:
//!
//! - Butterworth runs zero-phase (forward plus backward) over the
//!   log-resampled signal, so it introduces no lateral shift
//! - Rectangular works on the original, possibly irregular grid with a
//!   window that simply contains fewer samples near the edges
//! - Gaussian convolves the log-resampled signal with a reflected-edge
//!   kernel

use serde::{Deserialize, Serialize};

use crate::domain::Curve;
use crate::error::EngineError;
use crate::math::{butter_lowpass, filtfilt};
use crate::resample::resample_to_grid;

/// Highest Butterworth order the direct-form design stays well conditioned
/// at in double precision.
const MAX_BUTTERWORTH_ORDER: u32 = 16;

/// The closed set of smoothing algorithms.
///
/// The classic presets are `Butterworth { order: 8 }`,
/// `Butterworth { order: 4 }`, `Rectangular`, and `Gaussian`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SmoothingKind {
    /// Zero-phase Butterworth low-pass on a log-resampled grid.
    Butterworth { order: u32 },
    /// Symmetric moving average on the original points, no resampling.
    Rectangular,
    /// Gaussian kernel on a log-resampled grid, sigma of half the bandwidth.
    Gaussian,
}

/// Parameters for one smoothing pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SmoothingSpec {
    pub kind: SmoothingKind,
    /// Width of the smoothing band in octaves. For Butterworth this is the
    /// distance between the filter's critical points; for Gaussian it is
    /// twice the kernel's standard deviation.
    pub bandwidth_octaves: f64,
    /// Grid density for the algorithms that resample (ignored by
    /// `Rectangular`).
    pub resolution_ppo: f64,
    /// Frequency pinned onto the resampling lattice.
    pub anchor_hz: f64,
}

impl Default for SmoothingSpec {
    fn default() -> Self {
        Self {
            kind: SmoothingKind::Butterworth { order: 8 },
            bandwidth_octaves: 1.0 / 6.0,
            resolution_ppo: 96.0,
            anchor_hz: 1000.0,
        }
    }
}

/// Smooth `curve` according to `spec`, producing a new curve.
pub fn smooth_curve(curve: &Curve, spec: &SmoothingSpec) -> Result<Curve, EngineError> {
    if !spec.bandwidth_octaves.is_finite() || spec.bandwidth_octaves <= 0.0 {
        return Err(EngineError::InvalidResolution(format!(
            "bandwidth must be finite and > 0 octaves, got {}",
            spec.bandwidth_octaves
        )));
    }

    match spec.kind {
        SmoothingKind::Butterworth { order } => smooth_butterworth(curve, spec, order),
        SmoothingKind::Rectangular => smooth_rectangular(curve, spec.bandwidth_octaves),
        SmoothingKind::Gaussian => smooth_gaussian(curve, spec),
    }
}

fn smooth_butterworth(
    curve: &Curve,
    spec: &SmoothingSpec,
    order: u32,
) -> Result<Curve, EngineError> {
    if order == 0 || order > MAX_BUTTERWORTH_ORDER {
        return Err(EngineError::UnsupportedAlgorithm(format!(
            "Butterworth order {order} outside 1..={MAX_BUTTERWORTH_ORDER}"
        )));
    }
    check_resolution(spec)?;

    let resampled = resample_to_grid(curve, spec.resolution_ppo, spec.anchor_hz)?;

    // Sample axis is octaves at `resolution_ppo` samples per octave, so the
    // Nyquist rate is ppo/2 cycles per octave and a band `bandwidth` octaves
    // wide corresponds to a cutoff of 1/bandwidth cycles per octave.
    let cutoff = 2.0 / (spec.bandwidth_octaves * spec.resolution_ppo);
    if cutoff >= 1.0 {
        return Err(EngineError::InvalidResolution(format!(
            "resolution {} ppo is too coarse for a {} octave bandwidth",
            spec.resolution_ppo, spec.bandwidth_octaves
        )));
    }

    let filter = butter_lowpass(order as usize, cutoff)?;
    let smoothed = filtfilt(&filter, resampled.amplitudes());

    let (freqs, _) = resampled.into_xy();
    Curve::from_xy(freqs, smoothed)
}

/// Moving average over `[f * 2^(-b/2), f * 2^(b/2)]` at each original point.
///
/// Works directly on irregular spacing; every sample inside the window
/// counts once, the center included. Near the span edges the window simply
/// holds fewer samples.
fn smooth_rectangular(curve: &Curve, bandwidth_octaves: f64) -> Result<Curve, EngineError> {
    let xs = curve.frequencies();
    let ys = curve.amplitudes();
    let half = (bandwidth_octaves / 2.0).exp2();

    let mut out = Vec::with_capacity(xs.len());
    let mut lo = 0usize;
    let mut hi = 0usize;
    for &center in xs {
        let f_lo = center / half;
        let f_hi = center * half;
        // Both window ends only ever move right.
        while xs[lo] < f_lo {
            lo += 1;
        }
        while hi < xs.len() && xs[hi] <= f_hi {
            hi += 1;
        }
        out.push(crate::math::mean(&ys[lo..hi]));
    }

    Curve::from_xy(xs.to_vec(), out)
}

fn smooth_gaussian(curve: &Curve, spec: &SmoothingSpec) -> Result<Curve, EngineError> {
    check_resolution(spec)?;

    let resampled = resample_to_grid(curve, spec.resolution_ppo, spec.anchor_hz)?;
    let sigma_samples = spec.bandwidth_octaves / 2.0 * spec.resolution_ppo;
    let smoothed = gaussian_convolve(resampled.amplitudes(), sigma_samples);

    let (freqs, _) = resampled.into_xy();
    Curve::from_xy(freqs, smoothed)
}

/// Convolve with a normalized Gaussian kernel, truncated at four sigma,
/// signal reflected at the edges.
fn gaussian_convolve(ys: &[f64], sigma: f64) -> Vec<f64> {
    let n = ys.len();
    let radius = (4.0 * sigma).ceil() as usize;
    if radius == 0 || n < 2 {
        return ys.to_vec();
    }

    let mut kernel = Vec::with_capacity(2 * radius + 1);
    for i in -(radius as i64)..=(radius as i64) {
        let u = i as f64 / sigma;
        kernel.push((-0.5 * u * u).exp());
    }
    let norm: f64 = kernel.iter().sum();

    (0..n)
        .map(|i| {
            let mut acc = 0.0;
            for (k, w) in kernel.iter().enumerate() {
                let j = i as i64 + k as i64 - radius as i64;
                acc += w * ys[reflect_index(j, n)];
            }
            acc / norm
        })
        .collect()
}

/// Reflect an out-of-range index back into `0..n` (edge sample repeated,
/// matching a `d c b a | a b c d | d c b a` extension).
fn reflect_index(mut j: i64, n: usize) -> usize {
    let n = n as i64;
    loop {
        if j < 0 {
            j = -j - 1;
        } else if j >= n {
            j = 2 * n - 1 - j;
        } else {
            return j as usize;
        }
    }
}

fn check_resolution(spec: &SmoothingSpec) -> Result<(), EngineError> {
    if !spec.resolution_ppo.is_finite() || spec.resolution_ppo <= 0.0 {
        return Err(EngineError::InvalidResolution(format!(
            "resolution must be finite and > 0 points per octave, got {}",
            spec.resolution_ppo
        )));
    }
    Ok(())
}
