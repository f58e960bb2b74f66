//! Error types for deskext-core.

use thiserror::Error;

use crate::handle::ExtensionHandle;

/// Result type alias using deskext-core Error
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for host-internal operations
#[derive(Error, Debug)]
pub enum Error {
    // Handle errors
    #[error("Extension handle not allocated: {0}")]
    UnknownHandle(ExtensionHandle),

    // Command errors
    #[error("Invalid command: {0}")]
    InvalidCommand(String),
}

impl Error {
    /// Create an invalid command error
    pub fn invalid_command(message: impl Into<String>) -> Self {
        Self::InvalidCommand(message.into())
    }
}
