//! ap-core: shared foundation for the autopilot control crates.
//!
//! Contains:
//! - numeric (Real + tolerances + sanitizing helpers)
//! - ids (compact arena indices for control elements)

pub mod ids;
pub mod numeric;

pub use ids::*;
pub use numeric::*;
