//! Error types for environment operations.

use thiserror::Error;

/// Errors surfaced to the driver of an environment.
///
/// Rule evaluation never produces one of these; they are all caller contract
/// violations detected before any state is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvError {
    /// Action code outside the configured action space.
    #[error("invalid action code {0}")]
    InvalidAction(u32),

    /// `step` or `render` called before `reset` (or after `close`).
    #[error("environment not initialized: call reset first")]
    NotInitialized,

    /// Render mode string not understood.
    #[error("unsupported render mode {0:?}; expected \"human\" or \"rgb_array\"")]
    UnsupportedRenderMode(String),
}

/// Errors raised while building or loading a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("unknown profile {0:?}")]
    UnknownProfile(String),

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
}
