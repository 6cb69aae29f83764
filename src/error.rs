//! Engine error type.
//!
//! The animation has no recoverable business errors. These variants cover the
//! defensive paths: a host that cannot hand out a drawing surface, a host that
//! refuses to schedule a frame, and configuration overrides that would break
//! the simulation invariants.

use thiserror::Error;

/// Errors surfaced by the engine and its hosts.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The drawing surface or its 2D context could not be acquired at mount.
    #[error("drawing surface unavailable: {0}")]
    SurfaceUnavailable(String),

    /// The frame host refused to register the next frame callback.
    #[error("frame host rejected request: {0}")]
    Host(String),

    /// A configuration value is outside its valid range.
    #[error("invalid config `{field}`: {reason}")]
    InvalidConfig {
        field: &'static str,
        reason: String,
    },
}

impl EngineError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, EngineError>;
