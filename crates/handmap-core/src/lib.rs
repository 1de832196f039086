//! # Handmap-Core
//!
//! Core types and gesture geometry for the handmap gesture-to-signal
//! mapping engine.
//!
//! ## Landmark Model
//!
//! A tracked hand arrives as 21 normalized landmarks in a fixed anatomical
//! order:
//!
//! ```text
//! 0          wrist
//! 1 ..= 4    thumb  (cmc, mcp, ip, tip)
//! 5 ..= 8    index  (mcp, pip, dip, tip)
//! 9 ..= 12   middle (mcp, pip, dip, tip)
//! 13 ..= 16  ring   (mcp, pip, dip, tip)
//! 17 ..= 20  pinky  (mcp, pip, dip, tip)
//! ```
//!
//! `x` and `y` are normalized to the frame, `z` is relative depth (more
//! negative is closer to the sensor).
//!
//! ## Gesture Extraction
//!
//! [`gesture::extract`] turns one hand into one scalar (pinch distance,
//! openness, curl, rotation, spread, velocity, ...). Extraction is pure and
//! never fails: degenerate geometry resolves to a defined default.

pub mod error;
pub mod geometry;
pub mod gesture;
pub mod landmarks;
pub mod types;

pub use error::{Error, Result};
pub use geometry::*;
pub use gesture::*;
pub use landmarks::*;
pub use types::*;
