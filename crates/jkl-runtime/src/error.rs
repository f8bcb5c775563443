use jkl_model::JklError;
use std::io;
use thiserror::Error;

/// Error types for the runtime layer
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// A model or static mesh failed to load
    #[error("Model error: {0}")]
    Model(#[from] JklError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A host-provided collaborator reported a failure
    #[error("{collaborator} failed: {reason}")]
    Collaborator {
        collaborator: &'static str,
        reason: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    /// A scene aborted during init or a frame
    #[error("Scene error: {0}")]
    Scene(String),
}

impl RuntimeError {
    pub fn collaborator(collaborator: &'static str, reason: impl Into<String>) -> Self {
        Self::Collaborator {
            collaborator,
            reason: reason.into(),
        }
    }
}

/// Result type using RuntimeError
pub type Result<T> = std::result::Result<T, RuntimeError>;
