//! Error types for cascade operations.

use ap_controls::ControlError;
use thiserror::Error;

use crate::loops::LoopId;

/// Result type for cascade operations.
pub type CascadeResult<T> = Result<T, CascadeError>;

/// Errors reported by the cascade's tuning and configuration surface.
///
/// Ticking never produces one of these.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CascadeError {
    /// Loop identifier is not wired in this cascade.
    #[error("Unknown control loop: {id}")]
    UnknownLoop { id: LoopId },

    /// Entry point kept for old call sites; it never does anything.
    #[error("Unsupported operation: {operation}")]
    Unsupported { operation: &'static str },

    /// Missing or malformed configuration.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Tuning queue has no receiving cascade anymore.
    #[error("Tuning queue disconnected")]
    Disconnected,

    #[error(transparent)]
    Control(#[from] ControlError),
}
