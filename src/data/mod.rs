//! Deterministic synthetic curve data for tests and demos.

pub mod synth;

pub use synth::*;
