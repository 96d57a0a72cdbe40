//! Maneuver rate cascade: the fixed-wing attitude and speed control law.
//!
//! Six interacting loops are assembled from `ap-controls` primitives inside one
//! control environment:
//! - **Roll**: yaw-rate target and filtered airspeed give a coordinated-turn
//!   bank angle, tracked by a roll PID feeding a roll-rate PID
//! - **Climb angle / pitch**: climb angle (pitch minus angle of attack) tracked
//!   by an outer PID feeding the pitch PID
//! - **Velocity**: filtered airspeed tracked by a PID driving the throttle
//!
//! The cascade exposes loop tuning, supervisor overrides and diagnostics keyed
//! by [`LoopId`]. Tuning from another thread goes through a [`TuningHandle`]
//! and is applied at the start of the next tick.

pub mod cascade;
pub mod config;
pub mod data;
pub mod diagnostics;
pub mod error;
pub mod loops;
pub mod maneuver;
pub mod tuning;

pub use cascade::ManeuverRateCascade;
pub use config::CascadeConfig;
pub use data::{ControllerOutput, ControllerTarget, SensorData};
pub use diagnostics::{Diagnostic, DiagnosticSink, TracingSink};
pub use error::{CascadeError, CascadeResult};
pub use loops::{DataRequest, LoopId};
pub use maneuver::ManeuverOverride;
pub use tuning::{TuningCommand, TuningHandle};
