//! Domain types used throughout the engine.
//!
//! This module defines:
//!
//! - the validated curve entity ([`Curve`]) and its opaque id ([`CurveId`])
//! - display metadata kept apart from the numeric pair ([`CurveLabel`])
//! - the single-reference registry ([`ReferenceSlot`])

pub mod curve;
pub mod label;

pub use curve::*;
pub use label::*;
