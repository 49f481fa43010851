//! Plain-text rendering of analysis results.

pub mod format;

pub use format::*;
