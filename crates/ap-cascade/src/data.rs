//! Externally owned buffers the cascade is bound to.
//!
//! Fields are `Cell`s: the owner writes new samples between ticks through a
//! shared reference while the cascade holds its borrow. Values are SI (meters,
//! seconds, radians).

use std::cell::Cell;

use ap_core::Real;
use serde::{Deserialize, Serialize};

/// Latest sensor sample.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorData {
    /// Sample time in seconds. Drives the tick `dt`.
    pub timestamp: Cell<Real>,
    pub airspeed: Cell<Real>,
    pub roll: Cell<Real>,
    pub pitch: Cell<Real>,
    pub roll_rate: Cell<Real>,
    pub pitch_rate: Cell<Real>,
    /// Longitudinal (body x) acceleration.
    pub acceleration_x: Cell<Real>,
    pub angle_of_attack: Cell<Real>,
}

/// Guidance targets for the cascade.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerTarget {
    pub yaw_rate: Cell<Real>,
    pub climb_angle: Cell<Real>,
    pub velocity: Cell<Real>,
}

impl ControllerTarget {
    pub fn new(yaw_rate: Real, climb_angle: Real, velocity: Real) -> Self {
        Self {
            yaw_rate: Cell::new(yaw_rate),
            climb_angle: Cell::new(climb_angle),
            velocity: Cell::new(velocity),
        }
    }
}

/// Normalized actuator commands in `[-1, 1]`, written at the end of each tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ControllerOutput {
    pub roll_output: Cell<Real>,
    pub pitch_output: Cell<Real>,
    pub throttle_output: Cell<Real>,
}
