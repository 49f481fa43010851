//! Typed failure kinds for the analysis engine.
//!
//! Every operation either fully succeeds, producing new values, or fails with
//! one of these kinds before touching anything. Errors are returned to the
//! caller, never logged and never retried; the computations are deterministic,
//! so retrying without changed input cannot change the outcome.

use thiserror::Error;

/// The closed set of engine failures.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// The frequency axis is unusable: a value is non-positive, non-finite,
    /// duplicated, or out of order. The engine never reorders input silently;
    /// callers wanting sorted input must sort before validating.
    #[error("invalid frequency axis: {0}")]
    InvalidAxis(String),

    /// Frequency and amplitude arrays differ in length.
    #[error("shape mismatch: {frequencies} frequencies vs {amplitudes} amplitudes")]
    ShapeMismatch {
        frequencies: usize,
        amplitudes: usize,
    },

    /// An amplitude value is not a finite real number.
    #[error("non-numeric amplitude: {0}")]
    NonNumeric(String),

    /// Not enough sample points to form a curve or a grid.
    #[error("insufficient data: {0}")]
    InsufficientData(String),

    /// A numeric parameter (points per octave, bandwidth, fence multiplier,
    /// band weight) is out of its valid range.
    #[error("invalid resolution: {0}")]
    InvalidResolution(String),

    /// A parameter combination the smoothing engine cannot honor, e.g. a
    /// Butterworth order of zero.
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// A multi-curve operation received fewer curves than it needs.
    #[error("insufficient curves: need at least {needed}, got {got}")]
    InsufficientCurves { needed: usize, got: usize },
}
