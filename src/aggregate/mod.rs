//! Cross-curve statistics over heterogeneous frequency grids.
//!
//! Curves in a collection rarely share a grid, so every multi-curve
//! statistic here works on a union table: one column per distinct frequency
//! value appearing in any input curve, with a cell only where that exact
//! frequency exists in a curve's own grid. Absence is represented by the
//! cell not existing at all, never by a sentinel value, so a reducer cannot
//! accidentally fold a missing point into its arithmetic.
//!
//! Input curves are keyed by [`CurveId`]; results are deterministic in the
//! ids and samples alone, independent of insertion order.

use std::collections::{BTreeMap, BTreeSet};

use crate::domain::{Curve, CurveId};
use crate::error::EngineError;
use crate::math::{mean, median, quantile};

/// One column of the union table: a frequency and the curves that actually
/// sampled it.
struct Column {
    freq: f64,
    /// Present cells, ascending by id.
    cells: Vec<(CurveId, f64)>,
}

/// Build the union table. Columns come out ascending in frequency; cells
/// ascending by id because the input map iterates in id order.
fn union_table(curves: &BTreeMap<CurveId, Curve>) -> Vec<Column> {
    let mut freqs: Vec<f64> = curves
        .values()
        .flat_map(|c| c.frequencies().iter().copied())
        .collect();
    freqs.sort_by(f64::total_cmp);
    freqs.dedup();

    let mut columns: Vec<Column> = freqs
        .into_iter()
        .map(|freq| Column {
            freq,
            cells: Vec::new(),
        })
        .collect();

    for (&id, curve) in curves {
        // Both the column set and the curve's grid are ascending, so a
        // single forward scan matches each sample to its column.
        let mut col = 0usize;
        for (&f, &a) in curve.frequencies().iter().zip(curve.amplitudes()) {
            while columns[col].freq < f {
                col += 1;
            }
            debug_assert_eq!(columns[col].freq, f);
            columns[col].cells.push((id, a));
        }
    }

    columns
}

fn curve_from_columns(
    columns: &[Column],
    value: impl Fn(&Column) -> f64,
) -> Result<Curve, EngineError> {
    let mut freqs = Vec::with_capacity(columns.len());
    let mut amps = Vec::with_capacity(columns.len());
    for col in columns {
        // A column with no present values is dropped, not emitted as empty.
        if col.cells.is_empty() {
            continue;
        }
        freqs.push(col.freq);
        amps.push(value(col));
    }
    Curve::from_xy(freqs, amps)
}

fn column_values(col: &Column) -> Vec<f64> {
    col.cells.iter().map(|&(_, v)| v).collect()
}

/// Mean and median curves over a curve set.
#[derive(Debug, Clone)]
pub struct MeanMedian {
    pub mean: Curve,
    pub median: Curve,
}

/// Compute per-frequency arithmetic mean and statistical median across
/// `curves`, each column reduced over only the curves that sampled it.
///
/// Needs at least two curves. Amplitudes are dB and the mean is taken on the
/// dB values themselves.
pub fn mean_and_median(curves: &BTreeMap<CurveId, Curve>) -> Result<MeanMedian, EngineError> {
    if curves.len() < 2 {
        return Err(EngineError::InsufficientCurves {
            needed: 2,
            got: curves.len(),
        });
    }

    let columns = union_table(curves);
    Ok(MeanMedian {
        mean: curve_from_columns(&columns, |c| mean(&column_values(c)))?,
        median: curve_from_columns(&columns, |c| median(&column_values(c)))?,
    })
}

/// Result of interquartile-range fencing over a curve set.
#[derive(Debug, Clone)]
pub struct IqrAnalysis {
    pub lower_fence: Curve,
    pub median: Curve,
    pub upper_fence: Curve,
    /// Ids of curves with at least one of their own sampled values strictly
    /// outside the fences, ascending.
    pub outliers: Vec<CurveId>,
}

/// Classify outliers by Tukey fences.
///
/// Per column: `Q1`/`Q3` by linear-interpolation quantiles over the present
/// values, fences at `Q1 - k * IQR` and `Q3 + k * IQR` with the
/// caller-supplied multiplier `k`. A curve is an outlier when any of its own
/// present values falls strictly outside its column's fences; values the
/// curve never sampled play no part. The engine only classifies; hiding or
/// removing outliers is the caller's decision.
///
/// Needs at least three curves; `k` must be finite and non-negative.
pub fn iqr_outliers(
    curves: &BTreeMap<CurveId, Curve>,
    fence_multiplier: f64,
) -> Result<IqrAnalysis, EngineError> {
    if curves.len() < 3 {
        return Err(EngineError::InsufficientCurves {
            needed: 3,
            got: curves.len(),
        });
    }
    if !fence_multiplier.is_finite() || fence_multiplier < 0.0 {
        return Err(EngineError::InvalidResolution(format!(
            "fence multiplier must be finite and >= 0, got {fence_multiplier}"
        )));
    }

    let columns = union_table(curves);

    let mut outliers: BTreeSet<CurveId> = BTreeSet::new();
    let mut fences: Vec<(f64, f64)> = Vec::with_capacity(columns.len());
    for col in &columns {
        let values = column_values(col);
        let q1 = quantile(&values, 0.25);
        let q3 = quantile(&values, 0.75);
        let iqr = q3 - q1;
        let lo = q1 - fence_multiplier * iqr;
        let hi = q3 + fence_multiplier * iqr;
        fences.push((lo, hi));

        for &(id, v) in &col.cells {
            if v < lo || v > hi {
                outliers.insert(id);
            }
        }
    }

    let freqs: Vec<f64> = columns.iter().map(|c| c.freq).collect();
    let lower_fence = Curve::from_xy(freqs.clone(), fences.iter().map(|&(lo, _)| lo).collect())?;
    let upper_fence = Curve::from_xy(freqs, fences.iter().map(|&(_, hi)| hi).collect())?;
    let median_curve = curve_from_columns(&columns, |c| median(&column_values(c)))?;

    Ok(IqrAnalysis {
        lower_fence,
        median: median_curve,
        upper_fence,
        outliers: outliers.into_iter().collect(),
    })
}
