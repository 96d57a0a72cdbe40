//! Diagnostic reporting for rejected tuning and configuration calls.
//!
//! The cascade reports through the sink it owns instead of logging directly,
//! so embedders can route or capture rejections. [`TracingSink`] is the default.

use tracing::{error, warn};

use crate::loops::LoopId;

/// A rejected or ignored request.
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// Operation named a loop that is not wired.
    UnknownLoop {
        id: LoopId,
        operation: &'static str,
    },
    /// Deprecated no-op entry point was called.
    DeprecatedCall { operation: &'static str },
    /// Configuration was refused; nothing was applied.
    ConfigRejected { message: String },
}

/// Receiver of cascade diagnostics.
pub trait DiagnosticSink {
    fn report(&self, diagnostic: &Diagnostic);
}

impl<F> DiagnosticSink for F
where
    F: Fn(&Diagnostic),
{
    fn report(&self, diagnostic: &Diagnostic) {
        self(diagnostic)
    }
}

/// Forwards diagnostics to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, diagnostic: &Diagnostic) {
        match diagnostic {
            Diagnostic::UnknownLoop { id, operation } => {
                warn!(%id, operation, "unknown control loop, ignored");
            }
            Diagnostic::DeprecatedCall { operation } => {
                error!(operation, "deprecated function called");
            }
            Diagnostic::ConfigRejected { message } => {
                error!(%message, "cascade configuration rejected");
            }
        }
    }
}
