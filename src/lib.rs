//! `fr-curves` library crate.
//!
//! Numeric analysis of frequency-response curves: validation into a canonical
//! curve representation, log-spaced resampling pinned to a chosen frequency,
//! smoothing, cross-curve statistics over ragged grids, outlier fencing, and
//! best-fit ranking against a reference.
//!
//! The crate is the computation core only. Rendering, input acquisition,
//! settings storage, and user feedback belong to the embedding application;
//! everything here is a synchronous pure function from immutable curves to
//! freshly allocated results, safe to call from any thread.

pub mod aggregate;
pub mod bestfit;
pub mod data;
pub mod domain;
pub mod error;
pub mod math;
pub mod report;
pub mod resample;
pub mod smooth;
