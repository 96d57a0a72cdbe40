//! Error types for control graph operations.

use ap_core::ElementId;
use thiserror::Error;

/// Result type for control graph operations.
pub type ControlResult<T> = Result<T, ControlError>;

/// Errors that can occur while building or adjusting a control graph.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ControlError {
    /// Invalid argument provided to a builder.
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    /// Element handle does not exist in this environment.
    #[error("Invalid element reference: {what}")]
    InvalidReference { what: String },

    /// Element exists but is not of the kind the operation needs.
    #[error("Element {id} is a {found}, expected a {expected}")]
    KindMismatch {
        id: ElementId,
        expected: &'static str,
        found: &'static str,
    },
}
