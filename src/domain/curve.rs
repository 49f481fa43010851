//! The canonical curve entity.
//!
//! A [`Curve`] is a validated, ordered (frequency, amplitude) sample pair.
//! The pair is immutable once validated: every analysis operation that
//! changes the samples returns a freshly allocated `Curve` instead of
//! mutating in place. Display metadata (names, visibility) lives in
//! [`crate::domain::CurveLabel`], owned by the caller and keyed by
//! [`CurveId`], so computation and presentation cannot drift apart.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Opaque identifier the caller assigns to a curve in its collection.
///
/// Multi-curve operations key their inputs and reports by this id; the engine
/// attaches no meaning to the value beyond equality and ordering.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct CurveId(pub u64);

impl std::fmt::Display for CurveId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02}", self.0)
    }
}

/// A validated frequency-response curve.
///
/// Invariants, enforced at construction:
/// - `frequencies.len() == amplitudes.len() >= 1`
/// - frequencies strictly increasing, all finite and `> 0`
/// - amplitudes all finite (linear-dB scale)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Curve {
    frequencies: Vec<f64>,
    amplitudes: Vec<f64>,
}

impl Curve {
    /// Validate two parallel sequences into a curve.
    ///
    /// Checks run in a fixed order so the reported kind is deterministic:
    /// shape, then point count, then the frequency axis, then amplitudes.
    /// Unsorted input is an error, not an implicit sort.
    pub fn from_xy(frequencies: Vec<f64>, amplitudes: Vec<f64>) -> Result<Self, EngineError> {
        if frequencies.len() != amplitudes.len() {
            return Err(EngineError::ShapeMismatch {
                frequencies: frequencies.len(),
                amplitudes: amplitudes.len(),
            });
        }
        if frequencies.is_empty() {
            return Err(EngineError::InsufficientData(
                "a curve needs at least one sample point".into(),
            ));
        }

        let mut prev: Option<f64> = None;
        for (i, &f) in frequencies.iter().enumerate() {
            if !f.is_finite() || f <= 0.0 {
                return Err(EngineError::InvalidAxis(format!(
                    "frequency at index {i} is {f}, expected a finite value > 0"
                )));
            }
            if let Some(p) = prev {
                if f == p {
                    return Err(EngineError::InvalidAxis(format!(
                        "duplicate frequency {f} at index {i}"
                    )));
                }
                if f < p {
                    return Err(EngineError::InvalidAxis(format!(
                        "frequencies not strictly increasing at index {i} ({p} then {f})"
                    )));
                }
            }
            prev = Some(f);
        }

        for (i, &a) in amplitudes.iter().enumerate() {
            if !a.is_finite() {
                return Err(EngineError::NonNumeric(format!(
                    "amplitude at index {i} is {a}"
                )));
            }
        }

        Ok(Self {
            frequencies,
            amplitudes,
        })
    }

    /// Validate a sequence of `(frequency, amplitude)` pairs.
    pub fn from_pairs(pairs: &[(f64, f64)]) -> Result<Self, EngineError> {
        let (frequencies, amplitudes) = pairs.iter().copied().unzip();
        Self::from_xy(frequencies, amplitudes)
    }

    pub fn frequencies(&self) -> &[f64] {
        &self.frequencies
    }

    pub fn amplitudes(&self) -> &[f64] {
        &self.amplitudes
    }

    /// Number of sample points.
    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    /// Lowest frequency on the grid.
    pub fn min_frequency(&self) -> f64 {
        self.frequencies[0]
    }

    /// Highest frequency on the grid.
    pub fn max_frequency(&self) -> f64 {
        self.frequencies[self.frequencies.len() - 1]
    }

    /// Consume the curve and return the raw pair.
    pub fn into_xy(self) -> (Vec<f64>, Vec<f64>) {
        (self.frequencies, self.amplitudes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_minimal_valid_curve() {
        let c = Curve::from_xy(vec![100.0], vec![85.0]).unwrap();
        assert_eq!(c.len(), 1);
        assert_eq!(c.min_frequency(), 100.0);
        assert_eq!(c.max_frequency(), 100.0);
    }

    #[test]
    fn rejects_length_mismatch() {
        let err = Curve::from_xy(vec![100.0, 200.0], vec![85.0]).unwrap_err();
        assert!(matches!(
            err,
            EngineError::ShapeMismatch {
                frequencies: 2,
                amplitudes: 1
            }
        ));
    }

    #[test]
    fn rejects_empty_input() {
        let err = Curve::from_xy(vec![], vec![]).unwrap_err();
        assert!(matches!(err, EngineError::InsufficientData(_)));
    }

    #[test]
    fn rejects_duplicate_frequency() {
        let err = Curve::from_xy(vec![100.0, 100.0, 200.0], vec![1.0, 2.0, 3.0]).unwrap_err();
        assert!(matches!(err, EngineError::InvalidAxis(_)));
    }

    #[test]
    fn rejects_unsorted_frequencies() {
        let err = Curve::from_xy(vec![200.0, 100.0, 300.0], vec![1.0, 2.0, 3.0]).unwrap_err();
        assert!(matches!(err, EngineError::InvalidAxis(_)));
    }

    #[test]
    fn rejects_non_positive_frequency() {
        let err = Curve::from_xy(vec![-10.0, 5.0], vec![1.0, 2.0]).unwrap_err();
        assert!(matches!(err, EngineError::InvalidAxis(_)));

        let err = Curve::from_xy(vec![0.0, 5.0], vec![1.0, 2.0]).unwrap_err();
        assert!(matches!(err, EngineError::InvalidAxis(_)));
    }

    #[test]
    fn rejects_non_finite_frequency() {
        let err = Curve::from_xy(vec![100.0, f64::NAN], vec![1.0, 2.0]).unwrap_err();
        assert!(matches!(err, EngineError::InvalidAxis(_)));
    }

    #[test]
    fn rejects_non_finite_amplitude() {
        let err = Curve::from_xy(vec![100.0, 200.0], vec![1.0, f64::INFINITY]).unwrap_err();
        assert!(matches!(err, EngineError::NonNumeric(_)));
    }

    #[test]
    fn from_pairs_matches_from_xy() {
        let a = Curve::from_pairs(&[(100.0, 80.0), (200.0, 82.0)]).unwrap();
        let b = Curve::from_xy(vec![100.0, 200.0], vec![80.0, 82.0]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn serde_round_trip_preserves_samples() {
        let c = Curve::from_xy(vec![20.0, 200.0, 2000.0], vec![80.0, 85.0, 79.5]).unwrap();
        let json = serde_json::to_string(&c).unwrap();
        let back: Curve = serde_json::from_str(&json).unwrap();
        assert_eq!(c, back);
    }
}
