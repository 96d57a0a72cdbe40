//! Mapping of condition triggers onto cascade overrides.

use std::path::Path;

use ap_cascade::{CascadeResult, ManeuverOverride, ManeuverRateCascade, TuningHandle};
use ap_core::Real;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::condition::{Condition, RectanguloidCondition, Trigger};
use crate::error::{MissionError, MissionResult};
use crate::rectanguloid::Rectanguloid;

/// Geofence definition loaded from YAML.
///
/// ```yaml
/// volume:
///   center: [0.0, 0.0, 100.0]
///   major_side_length: 400
///   minor_side_length: 200
///   height: 80
///   major_side_orientation_deg: 30
/// on_enter: {}
/// on_exit:
///   pid:
///     ROLL: 0.35
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeofenceConfig {
    pub volume: Rectanguloid,
    #[serde(default)]
    pub on_enter: ManeuverOverride,
    #[serde(default)]
    pub on_exit: ManeuverOverride,
}

impl GeofenceConfig {
    pub fn from_yaml_str(yaml: &str) -> MissionResult<Self> {
        let config: Self = serde_yaml::from_str(yaml).map_err(|e| MissionError::Config {
            message: e.to_string(),
        })?;
        config.volume.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> MissionResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| MissionError::Config {
            message: format!("{}: {e}", path.display()),
        })?;
        Self::from_yaml_str(&text)
    }
}

/// Applies an override to the cascade whenever a geofence trigger fires.
#[derive(Debug, Clone)]
pub struct OverrideSupervisor {
    condition: RectanguloidCondition,
    on_enter: ManeuverOverride,
    on_exit: ManeuverOverride,
}

impl OverrideSupervisor {
    pub fn new(config: GeofenceConfig) -> Self {
        Self {
            condition: RectanguloidCondition::new(config.volume),
            on_enter: config.on_enter,
            on_exit: config.on_exit,
        }
    }

    pub fn condition(&self) -> &RectanguloidCondition {
        &self.condition
    }

    /// Override to apply for `trigger`.
    pub fn handle(&self, trigger: Trigger) -> &ManeuverOverride {
        match trigger {
            Trigger::EnterRectanguloid => &self.on_enter,
            Trigger::ExitRectanguloid => &self.on_exit,
        }
    }

    /// Feed a position; on a crossing, install the matching override.
    ///
    /// Returns the trigger that fired, if any.
    pub fn update(
        &mut self,
        position: &Vector3<Real>,
        cascade: &mut ManeuverRateCascade<'_>,
    ) -> Option<Trigger> {
        let trigger = self.condition.on_sensor_data(position)?;
        info!(?trigger, "geofence trigger");
        cascade.set_maneuver_override(self.handle(trigger));
        Some(trigger)
    }

    /// Same as [`update`](Self::update) but through the cascade's tuning queue.
    pub fn update_queued(
        &mut self,
        position: &Vector3<Real>,
        handle: &TuningHandle,
    ) -> CascadeResult<Option<Trigger>> {
        let Some(trigger) = self.condition.on_sensor_data(position) else {
            return Ok(None);
        };
        info!(?trigger, "geofence trigger");
        handle.set_maneuver_override(self.handle(trigger).clone())?;
        Ok(Some(trigger))
    }
}
