//! Cross-thread tuning queue.
//!
//! The cascade is bound to `Cell` buffers and therefore stays on the thread
//! that ticks it. Other actors hold a [`TuningHandle`] and send commands that
//! the cascade drains, in order, at the start of its next tick.

use std::sync::mpsc::Sender;

use ap_controls::PidParameters;

use crate::error::{CascadeError, CascadeResult};
use crate::loops::LoopId;
use crate::maneuver::ManeuverOverride;

/// A queued mutation of cascade state.
#[derive(Debug, Clone, PartialEq)]
pub enum TuningCommand {
    TunePid { id: LoopId, params: PidParameters },
    SetOverride(ManeuverOverride),
}

/// Sending side of a cascade's tuning queue.
#[derive(Debug, Clone)]
pub struct TuningHandle {
    tx: Sender<TuningCommand>,
}

impl TuningHandle {
    pub(crate) fn new(tx: Sender<TuningCommand>) -> Self {
        Self { tx }
    }

    pub fn send(&self, command: TuningCommand) -> CascadeResult<()> {
        self.tx.send(command).map_err(|_| CascadeError::Disconnected)
    }

    /// Queue a parameter replacement for one loop.
    ///
    /// Unknown loops are reported by the cascade when the command is applied.
    pub fn tune_pid(&self, id: LoopId, params: PidParameters) -> CascadeResult<()> {
        self.send(TuningCommand::TunePid { id, params })
    }

    /// Queue a full-replace override.
    pub fn set_maneuver_override(&self, maneuver: ManeuverOverride) -> CascadeResult<()> {
        self.send(TuningCommand::SetOverride(maneuver))
    }
}
