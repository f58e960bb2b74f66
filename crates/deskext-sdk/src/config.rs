//! SDK Configuration
//!
//! Tunables of the extension host. Every section has a `Default`, so a host
//! can start from `SDKConfig::default()` and override selectively.

use serde::{Deserialize, Serialize};

use deskext_core::EditPushPolicy;

/// Extension host configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SDKConfig {
    /// String table registry configuration
    pub registry: RegistryConfig,

    /// UiAction configuration
    pub ui_action: UiActionConfig,

    /// Component lifecycle configuration
    pub lifecycle: LifecycleConfig,

    /// Command registration configuration
    pub commands: CommandsConfig,

    /// Storage facade configuration
    pub storage: StorageConfig,
}

/// String table registry configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Slots allocated up front (default: 8)
    pub initial_capacity: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 8,
        }
    }
}

/// UiAction configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiActionConfig {
    /// What a host push does while the user is editing (default: preserve the edit)
    pub edit_push_policy: EditPushPolicy,
}

/// Component lifecycle configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleConfig {
    /// Log destroy requests for components the tracker does not hold (default: false)
    pub log_unknown_destroy: bool,
}

/// Command registration configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandsConfig {
    /// Reject commands whose display index is outside the string table (default: true)
    pub strict_display_index: bool,
}

impl Default for CommandsConfig {
    fn default() -> Self {
        Self {
            strict_display_index: true,
        }
    }
}

/// Storage facade configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Largest accepted value in bytes (default: 1 MiB)
    pub max_value_len: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            max_value_len: 1024 * 1024,
        }
    }
}

impl SDKConfig {
    /// Set the initial registry capacity
    pub fn with_initial_capacity(mut self, initial_capacity: usize) -> Self {
        self.registry.initial_capacity = initial_capacity;
        self
    }

    /// Set the push-during-edit policy
    pub fn with_edit_push_policy(mut self, policy: EditPushPolicy) -> Self {
        self.ui_action.edit_push_policy = policy;
        self
    }

    /// Set lifecycle configuration
    pub fn with_lifecycle(mut self, lifecycle: LifecycleConfig) -> Self {
        self.lifecycle = lifecycle;
        self
    }

    /// Set command registration configuration
    pub fn with_commands(mut self, commands: CommandsConfig) -> Self {
        self.commands = commands;
        self
    }

    /// Set storage configuration
    pub fn with_storage(mut self, storage: StorageConfig) -> Self {
        self.storage = storage;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.registry.initial_capacity == 0 {
            return Err(ConfigValidationError::InvalidValue {
                field: "registry.initial_capacity".into(),
                message: "must be greater than 0".into(),
            });
        }

        if self.storage.max_value_len == 0 {
            return Err(ConfigValidationError::InvalidValue {
                field: "storage.max_value_len".into(),
                message: "must be greater than 0".into(),
            });
        }

        Ok(())
    }
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SDKConfig::default();
        assert_eq!(config.registry.initial_capacity, 8);
        assert_eq!(config.ui_action.edit_push_policy, EditPushPolicy::PreserveEdit);
        assert!(config.commands.strict_display_index);
        assert!(!config.lifecycle.log_unknown_destroy);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = SDKConfig::default()
            .with_initial_capacity(2)
            .with_edit_push_policy(EditPushPolicy::ApplyImmediately)
            .with_storage(StorageConfig { max_value_len: 16 });

        assert_eq!(config.registry.initial_capacity, 2);
        assert_eq!(
            config.ui_action.edit_push_policy,
            EditPushPolicy::ApplyImmediately
        );
        assert_eq!(config.storage.max_value_len, 16);
    }

    #[test]
    fn test_config_validation() {
        let config = SDKConfig::default().with_initial_capacity(0);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("registry.initial_capacity"));

        let config = SDKConfig::default().with_storage(StorageConfig { max_value_len: 0 });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: SDKConfig =
            serde_json::from_str(r#"{"ui_action": {"edit_push_policy": "apply_immediately"}}"#)
                .unwrap();
        assert_eq!(
            config.ui_action.edit_push_policy,
            EditPushPolicy::ApplyImmediately
        );
        assert_eq!(config.registry.initial_capacity, 8);
    }
}
