//! Control element graph primitives for the autopilot.
//!
//! A control law is assembled inside a [`ControlEnvironment`]: an arena of
//! scalar elements wired together by [`ElementId`] handles. Pure elements
//! (constants, inputs, gains, sums, constraints, switches, custom functions)
//! compute their value on demand from their upstream elements. Stateful
//! elements (low-pass filters, PID controllers) implement [`Evaluable`] and are
//! advanced once per tick, in registration order, before outputs are written.
//!
//! # Architecture
//!
//! - Signals are scalar [`Real`] values
//! - External sensor and output buffers are borrowed `Cell<Real>`s, so the
//!   environment can never outlive them
//! - Every element may only reference elements built before it, which keeps
//!   the graph acyclic by construction
//! - Constant, input, sum, difference, switch and constraint elements never
//!   hand a non-finite value downstream

pub mod constraint;
pub mod element;
pub mod environment;
pub mod error;
pub mod filter;
pub mod pid;

pub use ap_core::{ElementId, Real};
pub use constraint::{Constraint, ManualSwitch};
pub use element::{BinaryFn, Element, Evaluable, SignalSource};
pub use environment::ControlEnvironment;
pub use error::{ControlError, ControlResult};
pub use filter::LowPassFilter;
pub use pid::{PidController, PidParameters, PidStatus};
