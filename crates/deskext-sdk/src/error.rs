//! SDK Error Types
//!
//! Host-facing errors. Errors reported to extension code use
//! [`ApiError`](crate::api::ApiError) instead.

use std::path::PathBuf;

use thiserror::Error;

use crate::api::ApiError;
use crate::utils::ValidationError;

/// SDK Result type alias
pub type SDKResult<T> = Result<T, SDKError>;

/// SDK errors
#[derive(Debug, Error)]
pub enum SDKError {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigValidationError),

    /// Host-internal error
    #[error(transparent)]
    Core(#[from] deskext_core::Error),

    /// Facade translation error
    #[error("api error: {0}")]
    Api(#[from] ApiError),

    /// Invalid extension manifest
    #[error("invalid manifest {path}: {message}")]
    Manifest { path: PathBuf, message: String },

    /// Entry not found
    #[error("{entity_type} not found: {id}")]
    NotFound { entity_type: String, id: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl SDKError {
    /// Create a manifest error
    pub fn manifest(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Manifest {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a manifest error from a failed field validation
    pub fn invalid_field(path: impl Into<PathBuf>, error: ValidationError) -> Self {
        Self::manifest(path, error.to_string())
    }

    /// Create a not found error
    pub fn not_found(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }

    /// Check if this error is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this error is a manifest error
    pub fn is_manifest(&self) -> bool {
        matches!(self, Self::Manifest { .. })
    }

    /// Reported API error carried by this error, if any
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Api(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ErrorCode;

    #[test]
    fn test_error_creation() {
        let err = SDKError::not_found("extension", "#4");
        assert!(err.is_not_found());
        assert!(err.to_string().contains("#4"));

        let err = SDKError::manifest("/tmp/ext/manifest.json", "missing name");
        assert!(err.is_manifest());
        assert!(err.to_string().contains("missing name"));
    }

    #[test]
    fn test_api_error_conversion() {
        let err: SDKError = ApiError::new(ErrorCode::InvalidPublisherTypeId, "bad").into();
        assert_eq!(
            err.api_error().map(|e| e.code),
            Some(ErrorCode::InvalidPublisherTypeId)
        );
    }
}
