//! Cascade configuration loaded from YAML.

use std::collections::BTreeMap;
use std::path::Path;

use ap_controls::{PidParameters, Real};
use serde::{Deserialize, Serialize};

use crate::error::{CascadeError, CascadeResult};
use crate::loops::LoopId;

/// Tunable parameters of the whole cascade.
///
/// Every active loop section is required. Limits are symmetric magnitudes in
/// radians (rad/s for the roll-rate target).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CascadeConfig {
    pub roll: PidParameters,
    pub roll_rate: PidParameters,
    pub climb_angle: PidParameters,
    pub pitch: PidParameters,
    pub velocity: PidParameters,
    /// Bound on the coordinated-turn bank angle target.
    #[serde(default = "default_roll_target_limit")]
    pub roll_target_limit: Real,
    /// Bound on the roll PID output used as roll-rate target.
    #[serde(default = "default_roll_rate_target_limit")]
    pub roll_rate_target_limit: Real,
    /// Bound on the climb-angle PID output used as pitch target.
    #[serde(default = "default_pitch_target_limit")]
    pub pitch_target_limit: Real,
    /// Airspeed low-pass time constant in seconds.
    #[serde(default = "default_airspeed_time_constant")]
    pub airspeed_time_constant: Real,
}

fn default_roll_target_limit() -> Real {
    30.0_f64.to_radians()
}

fn default_roll_rate_target_limit() -> Real {
    60.0_f64.to_radians()
}

fn default_pitch_target_limit() -> Real {
    15.0_f64.to_radians()
}

fn default_airspeed_time_constant() -> Real {
    0.5
}

impl Default for CascadeConfig {
    fn default() -> Self {
        Self {
            roll: PidParameters::default(),
            roll_rate: PidParameters::default(),
            climb_angle: PidParameters::default(),
            pitch: PidParameters::default(),
            velocity: PidParameters::default(),
            roll_target_limit: default_roll_target_limit(),
            roll_rate_target_limit: default_roll_rate_target_limit(),
            pitch_target_limit: default_pitch_target_limit(),
            airspeed_time_constant: default_airspeed_time_constant(),
        }
    }
}

impl CascadeConfig {
    pub fn from_yaml_str(yaml: &str) -> CascadeResult<Self> {
        let config: Self = serde_yaml::from_str(yaml).map_err(|e| CascadeError::Config {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> CascadeResult<Self> {
        let yaml = std::fs::read_to_string(path).map_err(|e| CascadeError::Config {
            message: format!("{}: {}", path.display(), e),
        })?;
        Self::from_yaml_str(&yaml)
    }

    pub fn to_yaml_string(&self) -> CascadeResult<String> {
        serde_yaml::to_string(self).map_err(|e| CascadeError::Config {
            message: e.to_string(),
        })
    }

    /// Check limits and time constants. Gains are not checked.
    pub fn validate(&self) -> CascadeResult<()> {
        let limits = [
            ("roll_target_limit", self.roll_target_limit),
            ("roll_rate_target_limit", self.roll_rate_target_limit),
            ("pitch_target_limit", self.pitch_target_limit),
            ("airspeed_time_constant", self.airspeed_time_constant),
        ];
        for (name, value) in limits {
            if !value.is_finite() || value < 0.0 {
                return Err(CascadeError::Config {
                    message: format!("{name} must be finite and non-negative, got {value}"),
                });
            }
        }
        Ok(())
    }

    /// Parameters of every configured loop.
    pub fn pid_params(&self) -> BTreeMap<LoopId, PidParameters> {
        BTreeMap::from([
            (LoopId::Roll, self.roll),
            (LoopId::RollRate, self.roll_rate),
            (LoopId::ClimbAngle, self.climb_angle),
            (LoopId::Pitch, self.pitch),
            (LoopId::Velocity, self.velocity),
        ])
    }
}
