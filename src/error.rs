//! Error types for the timer core and its storage layer.

use std::path::PathBuf;

use thiserror::Error;

use crate::timer::{PhaseKind, TimerStatus};

/// Failure returned by a rejected command or an invalid settings update.
///
/// Every variant reflects caller misuse or bad input. None of them leave the
/// active phase in a different state than before the call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PomoError {
    /// Command is not legal in the timer's current status.
    #[error("cannot {command} while {status}")]
    InvalidTransition {
        command: &'static str,
        status: TimerStatus,
    },

    /// Command is not legal for this kind of phase.
    #[error("cannot {command} a {kind} phase")]
    InvalidPhaseKind {
        command: &'static str,
        kind: PhaseKind,
    },

    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// Settings value rejected before reaching the session config.
    #[error("invalid value for '{field}': {message}")]
    InvalidConfig {
        field: &'static str,
        message: String,
    },
}

/// Persistence errors.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T, E = PomoError> = std::result::Result<T, E>;
