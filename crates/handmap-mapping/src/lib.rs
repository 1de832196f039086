//! # Handmap-Mapping
//!
//! Turns per-frame hand observations into shaped control signals.
//!
//! ## Per-Frame Flow
//!
//! ```text
//! FrameObservation
//!     ↓
//! [MappingOrchestrator]  for each enabled mapping, in registration order
//!     ↓ resolve target hand (or external scalar)
//! [gesture::extract]     raw value
//!     ↓
//! [Smoother]             smoothed value (one filter per mapping)
//!     ↓
//! [curve::map_value]     normalize → curve → output range → invert
//!     ↓
//! output callbacks (target, parameter, value)
//! ```
//!
//! The orchestrator is an ordinary owned value: construct one per session
//! and drive it from a single thread. Independent instances share nothing.

pub mod config;
pub mod curve;
pub mod history;
pub mod mapping;
pub mod orchestrator;

pub use self::config::*;
pub use curve::*;
pub use history::*;
pub use mapping::*;
pub use orchestrator::*;
