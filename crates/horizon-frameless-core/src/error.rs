//! Error types for Horizon Frameless.
//!
//! Public registration operations never fail: they report duplicates and
//! unknown windows through their boolean results. `ChromeError` is returned
//! by internal platform helpers, whose callers log it and fall back.

use thiserror::Error;

/// Errors raised by platform helpers and configuration parsing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChromeError {
    /// A null or otherwise unusable window handle was supplied.
    #[error("invalid window handle")]
    InvalidHandle,

    /// The window has no chrome record.
    #[error("window is not registered")]
    NotRegistered,

    /// A platform API could not be resolved at runtime.
    #[error("platform capability unavailable: {0}")]
    CapabilityUnavailable(&'static str),

    /// A platform call failed.
    #[error("platform call failed: {0}")]
    Platform(String),

    /// A configuration value could not be understood.
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Result type for chrome helpers.
pub type ChromeResult<T> = Result<T, ChromeError>;
