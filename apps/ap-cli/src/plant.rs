//! Toy fixed-wing plant used to close the loop in `simulate`.
//!
//! First-order rate responses to the surface commands, a throttle/drag speed
//! balance and coordinated-turn heading kinematics. Good enough to watch the
//! cascade settle, not a flight model.

use ap_cascade::{ControllerOutput, SensorData};
use ap_core::{GRAVITY, Real};
use nalgebra::Vector3;

const ROLL_AUTHORITY: Real = 3.0;
const PITCH_AUTHORITY: Real = 1.5;
const RATE_DAMPING: Real = 2.0;
const MAX_THRUST_ACCEL: Real = 6.0;
const DRAG_COEFF: Real = 0.006;
const ANGLE_OF_ATTACK: Real = 0.04;

#[derive(Debug, Clone, PartialEq)]
pub struct Plant {
    pub roll: Real,
    pub roll_rate: Real,
    pub pitch: Real,
    pub pitch_rate: Real,
    pub airspeed: Real,
    pub acceleration_x: Real,
    pub heading: Real,
    pub position: Vector3<Real>,
}

impl Plant {
    pub fn new(airspeed: Real, altitude: Real) -> Self {
        Self {
            roll: 0.0,
            roll_rate: 0.0,
            pitch: ANGLE_OF_ATTACK,
            pitch_rate: 0.0,
            airspeed,
            acceleration_x: 0.0,
            heading: 0.0,
            position: Vector3::new(0.0, 0.0, altitude),
        }
    }

    /// Copy the plant state into the cascade's sensor buffer.
    pub fn publish(&self, time: Real, sensors: &SensorData) {
        sensors.timestamp.set(time);
        sensors.airspeed.set(self.airspeed);
        sensors.roll.set(self.roll);
        sensors.pitch.set(self.pitch);
        sensors.roll_rate.set(self.roll_rate);
        sensors.pitch_rate.set(self.pitch_rate);
        sensors.acceleration_x.set(self.acceleration_x);
        sensors.angle_of_attack.set(ANGLE_OF_ATTACK);
    }

    pub fn step(&mut self, out: &ControllerOutput, dt: Real) {
        let roll_cmd = out.roll_output.get();
        let pitch_cmd = out.pitch_output.get();
        // Throttle command spans [-1, 1]; thrust spans [0, max].
        let thrust = (out.throttle_output.get() + 1.0) / 2.0 * MAX_THRUST_ACCEL;

        self.roll_rate += (ROLL_AUTHORITY * roll_cmd - RATE_DAMPING * self.roll_rate) * dt;
        self.roll += self.roll_rate * dt;
        self.pitch_rate += (PITCH_AUTHORITY * pitch_cmd - RATE_DAMPING * self.pitch_rate) * dt;
        self.pitch += self.pitch_rate * dt;

        let climb = self.pitch - ANGLE_OF_ATTACK;
        self.acceleration_x =
            thrust - DRAG_COEFF * self.airspeed * self.airspeed - GRAVITY * climb.sin();
        self.airspeed = (self.airspeed + self.acceleration_x * dt).max(1.0);

        // Same sign convention as the cascade: negative roll for positive yaw rate.
        self.heading -= GRAVITY * self.roll.tan() / self.airspeed * dt;
        let ground = self.airspeed * climb.cos();
        self.position += Vector3::new(
            ground * self.heading.cos(),
            ground * self.heading.sin(),
            self.airspeed * climb.sin(),
        ) * dt;
    }
}
