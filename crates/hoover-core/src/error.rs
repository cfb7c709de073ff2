// ── Core error types ──
//
// Failures the pipeline can surface to its caller. Malformed capture
// lines are not represented here: they are skipped, never raised.

use thiserror::Error;

use crate::model::Channel;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Precondition errors ──────────────────────────────────────────
    #[error("Cannot prepare interface {interface}: {reason}")]
    InterfacePreparation { interface: String, reason: String },

    #[error("Cannot start capture on {interface}: {reason}")]
    CaptureStart { interface: String, reason: String },

    #[error("{tool} exited with {status}: {stderr}")]
    ToolFailed {
        tool: String,
        status: String,
        stderr: String,
    },

    // ── Runtime errors ───────────────────────────────────────────────
    #[error("Cannot switch {interface} to channel {channel}: {reason}")]
    ChannelSwitch {
        interface: String,
        channel: Channel,
        reason: String,
    },

    #[error("{task} task stopped unexpectedly: {reason}")]
    TaskFailed { task: String, reason: String },

    // ── Validation errors ────────────────────────────────────────────
    #[error("Invalid channel: {message}")]
    InvalidChannel { message: String },

    #[error("Invalid run state: {message}")]
    InvalidState { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
