//! Error types for sandbox operations.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for sandbox commands.
#[derive(Error, Debug)]
pub enum Error {
    /// No sandbox matched the given pattern.
    #[error("no sandbox matching '{0}'")]
    NotFound(String),

    /// The operation needs at least one sandbox and there are none.
    #[error("no sandboxes found")]
    NoSandboxes,

    /// Failed to create a sandbox.
    #[error("failed to create sandbox: {0}")]
    SandboxCreation(String),

    /// Failed to clean up a sandbox.
    #[error("failed to clean up sandbox at {path}: {reason}")]
    SandboxCleanup { path: PathBuf, reason: String },

    /// Git operation failed.
    #[error("git operation failed: {0}")]
    Git(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error during sandbox operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for sandbox operations.
pub type Result<T> = std::result::Result<T, Error>;
