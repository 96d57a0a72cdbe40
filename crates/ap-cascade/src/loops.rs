//! Loop identifiers and data request kinds.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a control loop in the cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoopId {
    Roll,
    RollRate,
    ClimbAngle,
    Pitch,
    Velocity,
    /// Reserved. No rudder loop is wired, so lookups for it always miss.
    Rudder,
}

impl LoopId {
    /// Every identifier, reserved ones included.
    pub const ALL: [LoopId; 6] = [
        LoopId::Roll,
        LoopId::RollRate,
        LoopId::ClimbAngle,
        LoopId::Pitch,
        LoopId::Velocity,
        LoopId::Rudder,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LoopId::Roll => "ROLL",
            LoopId::RollRate => "ROLL_RATE",
            LoopId::ClimbAngle => "CLIMB_ANGLE",
            LoopId::Pitch => "PITCH",
            LoopId::Velocity => "VELOCITY",
            LoopId::Rudder => "RUDDER",
        }
    }
}

impl fmt::Display for LoopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of data a supervisor asks a subsystem for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataRequest {
    /// Tunable parameters of every PID loop.
    PidParams,
    MissionList,
    ActiveMission,
    LocalFrame,
    SafetyBounds,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_serde_name() {
        for id in LoopId::ALL {
            let yaml = serde_yaml::to_string(&id).unwrap();
            assert_eq!(yaml.trim(), id.as_str());
        }
    }

    #[test]
    fn parses_screaming_snake_case() {
        let id: LoopId = serde_yaml::from_str("CLIMB_ANGLE").unwrap();
        assert_eq!(id, LoopId::ClimbAngle);
        let req: DataRequest = serde_yaml::from_str("PID_PARAMS").unwrap();
        assert_eq!(req, DataRequest::PidParams);
    }
}
