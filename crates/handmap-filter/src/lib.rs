//! # Handmap-Filter
//!
//! Single-input, single-output recursive smoothing for gesture signals.
//!
//! Every mapping owns exactly one filter instance. Filters hold private
//! recursive state and are never shared between mappings.
//!
//! ## Filter Variants
//!
//! - **Passthrough**: output equals input
//! - **Low-pass**: `y = y·f + x·(1−f)`
//! - **Exponential**: `y = a·x + (1−a)·y`
//! - **Moving average**: mean of the last `n` inputs
//! - **Adaptive**: speed-based cutoff, smooth at rest and responsive in motion
//!
//! [`SmoothingSpec`] describes a filter as plain data and
//! [`SmoothingSpec::build`] turns it into a [`Smoother`], clamping parameters
//! into their valid domains.

pub mod filtering;
pub mod smoothing;

pub use filtering::*;
pub use smoothing::*;
