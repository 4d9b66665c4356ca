//! Error types for the open module.

use std::process::ExitStatus;

use thiserror::Error;

/// Why an open attempt did not hand the resource to an application.
#[derive(Debug, Error)]
pub enum OpenError {
    /// No application or launcher is available for this strategy.
    #[error("no handler available: {reason}")]
    NoHandler {
        /// Human-readable reason (missing launcher, unset variable, ...).
        reason: String,
    },

    /// The launcher process could not be started.
    #[error("failed to launch {program}: {source}")]
    Spawn {
        /// The program that failed to start.
        program: String,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The launcher ran but reported failure.
    #[error("{program} exited with {status}")]
    Exited {
        /// The program that failed.
        program: String,
        /// Its exit status.
        status: ExitStatus,
    },
}

impl OpenError {
    /// Creates a no-handler error.
    pub fn no_handler(reason: impl Into<String>) -> Self {
        Self::NoHandler {
            reason: reason.into(),
        }
    }

    /// Creates a spawn error. A missing binary is reported as [`OpenError::NoHandler`].
    pub fn spawn(program: impl Into<String>, source: std::io::Error) -> Self {
        let program = program.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            return Self::no_handler(format!("{program} not found"));
        }
        Self::Spawn { program, source }
    }

    /// Creates an exit-status error.
    pub fn exited(program: impl Into<String>, status: ExitStatus) -> Self {
        Self::Exited {
            program: program.into(),
            status,
        }
    }
}
