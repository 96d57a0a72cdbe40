//! Edge-triggered mission conditions.
//!
//! A condition is fed the vehicle position each tick and reports a [`Trigger`]
//! only on the tick where the position crosses the condition boundary. Between
//! crossings it stays silent, so the supervisor applies each override once.

use ap_core::Real;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::rectanguloid::Rectanguloid;

/// Boundary crossing reported by a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    EnterRectanguloid,
    ExitRectanguloid,
}

/// Position-driven condition.
pub trait Condition {
    fn on_sensor_data(&mut self, position: &Vector3<Real>) -> Option<Trigger>;
}

/// Fires once when the vehicle enters the volume and once when it leaves.
///
/// The first sample always fires for the side it lands on.
#[derive(Debug, Clone)]
pub struct RectanguloidCondition {
    volume: Rectanguloid,
    in_triggered: bool,
    out_triggered: bool,
}

impl RectanguloidCondition {
    pub fn new(volume: Rectanguloid) -> Self {
        Self {
            volume,
            in_triggered: false,
            out_triggered: false,
        }
    }

    pub fn volume(&self) -> &Rectanguloid {
        &self.volume
    }

    /// Inside according to the last trigger.
    pub fn is_inside(&self) -> bool {
        self.in_triggered
    }
}

impl Condition for RectanguloidCondition {
    fn on_sensor_data(&mut self, position: &Vector3<Real>) -> Option<Trigger> {
        if self.volume.contains(position) {
            if self.in_triggered {
                return None;
            }
            self.in_triggered = true;
            self.out_triggered = false;
            debug!(x = position.x, y = position.y, z = position.z, "entered rectanguloid");
            Some(Trigger::EnterRectanguloid)
        } else {
            if self.out_triggered {
                return None;
            }
            self.out_triggered = true;
            self.in_triggered = false;
            debug!(x = position.x, y = position.y, z = position.z, "left rectanguloid");
            Some(Trigger::ExitRectanguloid)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn condition() -> RectanguloidCondition {
        let volume = Rectanguloid::new(Vector3::zeros(), 100.0, 50.0, 20.0, 0.0).unwrap();
        RectanguloidCondition::new(volume)
    }

    #[test]
    fn first_sample_outside_fires_exit() {
        let mut c = condition();
        assert_eq!(
            c.on_sensor_data(&Vector3::new(500.0, 0.0, 0.0)),
            Some(Trigger::ExitRectanguloid)
        );
        assert_eq!(c.on_sensor_data(&Vector3::new(400.0, 0.0, 0.0)), None);
    }

    #[test]
    fn fires_once_per_crossing() {
        let mut c = condition();
        let inside = Vector3::new(10.0, 0.0, 0.0);
        let outside = Vector3::new(80.0, 0.0, 0.0);

        assert_eq!(c.on_sensor_data(&inside), Some(Trigger::EnterRectanguloid));
        assert!(c.is_inside());
        assert_eq!(c.on_sensor_data(&inside), None);
        assert_eq!(c.on_sensor_data(&outside), Some(Trigger::ExitRectanguloid));
        assert!(!c.is_inside());
        assert_eq!(c.on_sensor_data(&outside), None);
        assert_eq!(c.on_sensor_data(&inside), Some(Trigger::EnterRectanguloid));
    }
}
