//! Oriented box volume used as a geofence.

use ap_core::Real;
use nalgebra::{Rotation2, Vector2, Vector3};
use serde::{Deserialize, Serialize};

use crate::error::{MissionError, MissionResult};

/// Box centered at `center`, rotated about the vertical axis.
///
/// Serialized with the orientation in degrees; held in radians.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RectanguloidDef", into = "RectanguloidDef")]
pub struct Rectanguloid {
    pub center: Vector3<Real>,
    pub major_side_length: Real,
    pub minor_side_length: Real,
    pub height: Real,
    /// Heading of the major side, radians.
    pub major_side_orientation: Real,
}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct RectanguloidDef {
    center: [Real; 3],
    major_side_length: Real,
    minor_side_length: Real,
    height: Real,
    #[serde(default)]
    major_side_orientation_deg: Real,
}

impl From<RectanguloidDef> for Rectanguloid {
    fn from(def: RectanguloidDef) -> Self {
        Self {
            center: Vector3::from(def.center),
            major_side_length: def.major_side_length,
            minor_side_length: def.minor_side_length,
            height: def.height,
            major_side_orientation: def.major_side_orientation_deg.to_radians(),
        }
    }
}

impl From<Rectanguloid> for RectanguloidDef {
    fn from(r: Rectanguloid) -> Self {
        Self {
            center: r.center.into(),
            major_side_length: r.major_side_length,
            minor_side_length: r.minor_side_length,
            height: r.height,
            major_side_orientation_deg: r.major_side_orientation.to_degrees(),
        }
    }
}

impl Rectanguloid {
    pub fn new(
        center: Vector3<Real>,
        major_side_length: Real,
        minor_side_length: Real,
        height: Real,
        major_side_orientation: Real,
    ) -> MissionResult<Self> {
        let volume = Self {
            center,
            major_side_length,
            minor_side_length,
            height,
            major_side_orientation,
        };
        volume.validate()?;
        Ok(volume)
    }

    /// Reject non-positive or non-finite extents.
    pub fn validate(&self) -> MissionResult<()> {
        let extents = [self.major_side_length, self.minor_side_length, self.height];
        if extents.iter().any(|e| !e.is_finite() || *e <= 0.0) {
            return Err(MissionError::InvalidGeometry {
                what: "side lengths and height must be positive",
            });
        }
        if !self.center.iter().all(|c| c.is_finite()) || !self.major_side_orientation.is_finite() {
            return Err(MissionError::InvalidGeometry {
                what: "center and orientation must be finite",
            });
        }
        Ok(())
    }

    /// Strictly inside on all three axes.
    pub fn contains(&self, position: &Vector3<Real>) -> bool {
        let offset = position - self.center;
        let horizontal = Rotation2::new(-self.major_side_orientation)
            * Vector2::new(offset.x, offset.y);

        horizontal.x.abs() < self.major_side_length / 2.0
            && horizontal.y.abs() < self.minor_side_length / 2.0
            && offset.z.abs() < self.height / 2.0
    }
}
