//! Supervisor overrides of loop targets.

use std::collections::BTreeMap;

use ap_core::Real;
use serde::{Deserialize, Serialize};

use crate::loops::LoopId;

/// Fixed target values replacing the wired targets of selected loops.
///
/// Applying an override is a full replacement: loops without an entry lose any
/// override they had before.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManeuverOverride {
    #[serde(default)]
    pub pid: BTreeMap<LoopId, Real>,
}

impl ManeuverOverride {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the override for `id`.
    pub fn with(mut self, id: LoopId, target: Real) -> Self {
        self.pid.insert(id, target);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.pid.is_empty()
    }

    pub fn get(&self, id: LoopId) -> Option<Real> {
        self.pid.get(&id).copied()
    }
}
