//! Custom error types for taskscope.
//!
//! Only rejected operations surface as errors. Collaborator failures and
//! malformed records are absorbed by the session and reported through
//! `tracing`, so nothing in here is ever fatal to the host.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for taskscope operations
#[derive(Error, Debug)]
pub enum TaskScopeError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Failed to load configuration
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        path: Option<PathBuf>,
    },

    /// Invalid configuration value
    #[error("Invalid configuration: {field} - {reason}")]
    InvalidConfig { field: String, reason: String },

    // =========================================================================
    // Filter Input Errors
    // =========================================================================
    /// Token is not present in the registry
    #[error("Unknown token: {token}")]
    UnknownToken { token: String },

    /// Scope name did not match any known scope
    #[error("Unknown scope '{value}' (expected solution, project or class)")]
    UnknownScope { value: String },

    // =========================================================================
    // Token Registry Errors
    // =========================================================================
    /// Token text has the wrong shape
    #[error("Invalid token '{token}': {reason}")]
    InvalidToken { token: String, reason: String },

    /// Built-in tokens cannot be removed
    #[error("Cannot remove {token} token.")]
    ProtectedToken { token: String },

    /// Token already registered
    #[error("Token already registered: {token}")]
    DuplicateToken { token: String },

    /// Token not registered, nothing to remove
    #[error("Token not registered: {token}")]
    MissingToken { token: String },

    // =========================================================================
    // Record Errors
    // =========================================================================
    /// A raw task record could not be turned into a task
    #[error("Malformed task record: {reason}")]
    MalformedRecord { reason: String },

    // =========================================================================
    // Runtime Errors
    // =========================================================================
    /// Session constructed outside a tokio runtime
    #[error("No tokio runtime available: {detail}")]
    NoRuntime { detail: String },

    // =========================================================================
    // Wrapped Errors
    // =========================================================================
    /// IO error wrapper
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON error wrapper
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// TOML error wrapper
    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    /// Generic error wrapper
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TaskScopeError {
    // =========================================================================
    // Constructor helpers
    // =========================================================================

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            path: None,
        }
    }

    /// Create a configuration error with path
    pub fn config_with_path(message: impl Into<String>, path: PathBuf) -> Self {
        Self::Config {
            message: message.into(),
            path: Some(path),
        }
    }

    /// Create an invalid configuration error
    pub fn invalid_config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid token error
    pub fn invalid_token(token: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidToken {
            token: token.into(),
            reason: reason.into(),
        }
    }

    /// Create a malformed record error
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedRecord {
            reason: reason.into(),
        }
    }

    /// Get error code for exit status
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::UnknownToken { .. } | Self::UnknownScope { .. } => 2,
            Self::InvalidToken { .. }
            | Self::ProtectedToken { .. }
            | Self::DuplicateToken { .. }
            | Self::MissingToken { .. } => 3,
            Self::Config { .. } | Self::InvalidConfig { .. } | Self::Toml(_) => 7,
            _ => 1,
        }
    }
}

/// Type alias for taskscope results
pub type Result<T> = std::result::Result<T, TaskScopeError>;
