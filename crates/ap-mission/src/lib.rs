//! Mission conditions that drive cascade overrides.
//!
//! A condition watches the vehicle position and fires a [`Trigger`] once per
//! boundary crossing. The [`OverrideSupervisor`] turns triggers into
//! [`ManeuverOverride`](ap_cascade::ManeuverOverride)s for the cascade.

pub mod condition;
pub mod error;
pub mod rectanguloid;
pub mod supervisor;

pub use condition::{Condition, RectanguloidCondition, Trigger};
pub use error::{MissionError, MissionResult};
pub use rectanguloid::Rectanguloid;
pub use supervisor::{GeofenceConfig, OverrideSupervisor};
