//! Reported API errors.
//!
//! Everything crossing the boundary from extension code comes back as an
//! [`ApiError`] carrying a stable [`ErrorCode`]. The code strings are part of
//! the public contract; new codes may be added, existing ones never change.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Version of the error code contract. Bumped when codes are added.
pub const ERROR_CODE_CONTRACT_VERSION: u32 = 1;

/// Machine-readable error codes returned to extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    InvalidTradingEnvironmentId,
    InvalidCorrectnessId,
    InvalidOrderSideId,
    InvalidPublisherTypeId,
    InvalidUiActionCommitTypeId,
    InvalidUiActionStateId,
    InvalidCommandName,
    InvalidCommandDisplayIndex,
    InvalidMenuBarItemRank,
    ValueRequired,
    ExtensionUnloaded,
    ComponentDestroyed,
    StorageGetItemFailed,
    StorageSetItemFailed,
    StorageRemoveItemFailed,
    InvalidStorageKey,
}

impl ErrorCode {
    pub const ALL: [Self; 16] = [
        Self::InvalidTradingEnvironmentId,
        Self::InvalidCorrectnessId,
        Self::InvalidOrderSideId,
        Self::InvalidPublisherTypeId,
        Self::InvalidUiActionCommitTypeId,
        Self::InvalidUiActionStateId,
        Self::InvalidCommandName,
        Self::InvalidCommandDisplayIndex,
        Self::InvalidMenuBarItemRank,
        Self::ValueRequired,
        Self::ExtensionUnloaded,
        Self::ComponentDestroyed,
        Self::StorageGetItemFailed,
        Self::StorageSetItemFailed,
        Self::StorageRemoveItemFailed,
        Self::InvalidStorageKey,
    ];

    /// Stable code string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidTradingEnvironmentId => "InvalidTradingEnvironmentId",
            ErrorCode::InvalidCorrectnessId => "InvalidCorrectnessId",
            ErrorCode::InvalidOrderSideId => "InvalidOrderSideId",
            ErrorCode::InvalidPublisherTypeId => "InvalidPublisherTypeId",
            ErrorCode::InvalidUiActionCommitTypeId => "InvalidUiActionCommitTypeId",
            ErrorCode::InvalidUiActionStateId => "InvalidUiActionStateId",
            ErrorCode::InvalidCommandName => "InvalidCommandName",
            ErrorCode::InvalidCommandDisplayIndex => "InvalidCommandDisplayIndex",
            ErrorCode::InvalidMenuBarItemRank => "InvalidMenuBarItemRank",
            ErrorCode::ValueRequired => "ValueRequired",
            ErrorCode::ExtensionUnloaded => "ExtensionUnloaded",
            ErrorCode::ComponentDestroyed => "ComponentDestroyed",
            ErrorCode::StorageGetItemFailed => "StorageGetItemFailed",
            ErrorCode::StorageSetItemFailed => "StorageSetItemFailed",
            ErrorCode::StorageRemoveItemFailed => "StorageRemoveItemFailed",
            ErrorCode::InvalidStorageKey => "InvalidStorageKey",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error reported to extension code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("[{code}] {message}")]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn extension_unloaded() -> Self {
        Self::new(ErrorCode::ExtensionUnloaded, "extension has been unloaded")
    }

    pub fn component_destroyed() -> Self {
        Self::new(ErrorCode::ComponentDestroyed, "component has been destroyed")
    }

    pub fn is(&self, code: ErrorCode) -> bool {
        self.code == code
    }
}

/// Result type for boundary-crossing operations.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_strings_match_serde() {
        for code in ErrorCode::ALL {
            let json = serde_json::to_string(&code).unwrap();
            assert_eq!(json, format!("\"{}\"", code.as_str()));
        }
    }

    #[test]
    fn test_api_error_display() {
        let err = ApiError::new(ErrorCode::InvalidOrderSideId, "unknown side 'Short'");
        assert_eq!(err.to_string(), "[InvalidOrderSideId] unknown side 'Short'");
        assert!(err.is(ErrorCode::InvalidOrderSideId));
    }
}
