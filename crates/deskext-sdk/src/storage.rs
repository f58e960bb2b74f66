//! Storage facade
//!
//! Per-extension key/value storage. Keys are namespaced by the owning
//! extension's identity before they reach the backend:
//!
//! ```text
//! <publisherType>|<publisherName>|<name>|<key>[|<subName>]
//! ```
//!
//! Keys and sub-names may not contain the separator, so no two distinct
//! `(key, subName)` pairs share a backend key.
//!
//! Every call is asynchronous and reports failures as [`ApiError`]s. The
//! facade checks the extension's [`Liveness`] before and after awaiting the
//! backend, so a result that lands after unload is discarded and reported as
//! `ExtensionUnloaded`.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use deskext_core::ExtensionInfo;

use crate::api::{ApiError, ApiMapping, ApiResult, ErrorCode};
use crate::liveness::Liveness;

const KEY_SEPARATOR: char = '|';

/// Backend failure.
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Key/value store behind the facade.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    async fn set(&self, key: &str, value: String) -> Result<(), StorageError>;

    /// Returns whether the key existed.
    async fn remove(&self, key: &str) -> Result<bool, StorageError>;
}

/// In-process backend.
#[derive(Debug, Default)]
pub struct MemoryStorageBackend {
    items: RwLock<HashMap<String, String>>,
}

impl MemoryStorageBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }

    /// All stored keys starting with `prefix`, sorted.
    pub async fn keys(&self, prefix: &str) -> Vec<String> {
        let mut keys: Vec<String> = self
            .items
            .read()
            .await
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl StorageBackend for MemoryStorageBackend {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        self.items.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.items.write().await.remove(key).is_some())
    }
}

/// Namespace prefix for one extension's keys, including the trailing separator.
pub fn storage_prefix(info: &ExtensionInfo) -> String {
    format!(
        "{}{sep}{}{sep}{}{sep}",
        info.publisher_type.to_api(),
        info.publisher_name,
        info.name,
        sep = KEY_SEPARATOR
    )
}

fn check_key_part(what: &str, part: &str) -> ApiResult<()> {
    if part.is_empty() {
        return Err(ApiError::new(
            ErrorCode::InvalidStorageKey,
            format!("storage {what} must not be empty"),
        ));
    }
    if part.contains(KEY_SEPARATOR) {
        return Err(ApiError::new(
            ErrorCode::InvalidStorageKey,
            format!("storage {what} '{part}' contains '{KEY_SEPARATOR}'"),
        ));
    }
    Ok(())
}

/// Storage service handed to one extension.
#[derive(Clone)]
pub struct StorageFacade {
    backend: Arc<dyn StorageBackend>,
    prefix: String,
    liveness: Liveness,
    max_value_len: usize,
}

impl StorageFacade {
    pub fn new(
        backend: Arc<dyn StorageBackend>,
        info: &ExtensionInfo,
        liveness: Liveness,
        max_value_len: usize,
    ) -> Self {
        Self {
            backend,
            prefix: storage_prefix(info),
            liveness,
            max_value_len,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    fn full_key(&self, key: &str, sub_name: Option<&str>) -> ApiResult<String> {
        check_key_part("key", key)?;
        match sub_name {
            Some(sub_name) => {
                check_key_part("sub-name", sub_name)?;
                Ok(format!("{}{key}{KEY_SEPARATOR}{sub_name}", self.prefix))
            }
            None => Ok(format!("{}{key}", self.prefix)),
        }
    }

    /// Map a backend result, discarding it if the extension unloaded meanwhile.
    fn settle<V>(
        &self,
        key: &str,
        result: Result<V, StorageError>,
        code: ErrorCode,
    ) -> ApiResult<V> {
        if !self.liveness.is_alive() {
            debug!(key, "storage result discarded after unload");
            return Err(ApiError::extension_unloaded());
        }
        result.map_err(|e| {
            warn!(key, error = %e, "storage operation failed");
            ApiError::new(code, e.to_string())
        })
    }

    async fn get(&self, key: &str, sub_name: Option<&str>) -> ApiResult<Option<String>> {
        self.liveness.check()?;
        let full = self.full_key(key, sub_name)?;
        let result = self.backend.get(&full).await;
        self.settle(&full, result, ErrorCode::StorageGetItemFailed)
    }

    async fn set(&self, key: &str, sub_name: Option<&str>, value: String) -> ApiResult<()> {
        self.liveness.check()?;
        let full = self.full_key(key, sub_name)?;
        if value.len() > self.max_value_len {
            return Err(ApiError::new(
                ErrorCode::StorageSetItemFailed,
                format!(
                    "value of {} bytes exceeds the {} byte limit",
                    value.len(),
                    self.max_value_len
                ),
            ));
        }
        let result = self.backend.set(&full, value).await;
        self.settle(&full, result, ErrorCode::StorageSetItemFailed)
    }

    async fn remove(&self, key: &str, sub_name: Option<&str>) -> ApiResult<()> {
        self.liveness.check()?;
        let full = self.full_key(key, sub_name)?;
        let result = self.backend.remove(&full).await;
        self.settle(&full, result, ErrorCode::StorageRemoveItemFailed)
            .map(|_| ())
    }

    pub async fn get_item(&self, key: &str) -> ApiResult<Option<String>> {
        self.get(key, None).await
    }

    pub async fn get_sub_named_item(&self, key: &str, sub_name: &str) -> ApiResult<Option<String>> {
        self.get(key, Some(sub_name)).await
    }

    pub async fn set_item(&self, key: &str, value: impl Into<String>) -> ApiResult<()> {
        self.set(key, None, value.into()).await
    }

    pub async fn set_sub_named_item(
        &self,
        key: &str,
        sub_name: &str,
        value: impl Into<String>,
    ) -> ApiResult<()> {
        self.set(key, Some(sub_name), value.into()).await
    }

    pub async fn remove_item(&self, key: &str) -> ApiResult<()> {
        self.remove(key, None).await
    }

    pub async fn remove_sub_named_item(&self, key: &str, sub_name: &str) -> ApiResult<()> {
        self.remove(key, Some(sub_name)).await
    }
}

impl std::fmt::Debug for StorageFacade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageFacade")
            .field("prefix", &self.prefix)
            .field("alive", &self.liveness.is_alive())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deskext_core::PublisherTypeId;
    use tokio::sync::Notify;

    fn info(name: &str) -> ExtensionInfo {
        ExtensionInfo {
            publisher_type: PublisherTypeId::User,
            publisher_name: "acme".into(),
            name: name.into(),
            version: "1.0.0".into(),
            short_description: String::new(),
            long_description: String::new(),
        }
    }

    fn facade(backend: Arc<dyn StorageBackend>, name: &str) -> (StorageFacade, Liveness) {
        let liveness = Liveness::new();
        (
            StorageFacade::new(backend, &info(name), liveness.clone(), 64),
            liveness,
        )
    }

    #[tokio::test]
    async fn test_keys_are_namespaced() {
        let backend = Arc::new(MemoryStorageBackend::new());
        let (depth, _) = facade(backend.clone(), "depth");
        let (trades, _) = facade(backend.clone(), "trades");

        depth.set_item("layout", "compact").await.unwrap();
        trades.set_item("layout", "wide").await.unwrap();
        depth
            .set_sub_named_item("columns", "bid", "price,qty")
            .await
            .unwrap();

        assert_eq!(depth.get_item("layout").await.unwrap().as_deref(), Some("compact"));
        assert_eq!(trades.get_item("layout").await.unwrap().as_deref(), Some("wide"));
        assert_eq!(
            depth.get_sub_named_item("columns", "bid").await.unwrap().as_deref(),
            Some("price,qty")
        );
        assert_eq!(depth.get_item("columns").await.unwrap(), None);

        let keys = backend.keys("User|acme|depth|").await;
        assert_eq!(keys, vec!["User|acme|depth|columns|bid", "User|acme|depth|layout"]);
    }

    #[tokio::test]
    async fn test_remove_items() {
        let backend = Arc::new(MemoryStorageBackend::new());
        let (storage, _) = facade(backend.clone(), "depth");

        storage.set_item("a", "1").await.unwrap();
        storage.set_sub_named_item("a", "x", "2").await.unwrap();
        storage.remove_sub_named_item("a", "x").await.unwrap();
        assert_eq!(storage.get_item("a").await.unwrap().as_deref(), Some("1"));
        storage.remove_item("a").await.unwrap();
        storage.remove_item("a").await.unwrap();
        assert!(backend.is_empty().await);
    }

    #[tokio::test]
    async fn test_invalid_keys_and_limits() {
        let (storage, _) = facade(Arc::new(MemoryStorageBackend::new()), "depth");

        let err = storage.get_item("").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidStorageKey);
        let err = storage.set_sub_named_item("k", "", "v").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidStorageKey);
        let err = storage.set_item("k", "x".repeat(65)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::StorageSetItemFailed);
    }

    #[tokio::test]
    async fn test_separator_in_key_rejected() {
        let (storage, _) = facade(Arc::new(MemoryStorageBackend::new()), "depth");

        let err = storage.set_item("layout|bid", "plain").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidStorageKey);
        let err = storage
            .set_sub_named_item("layout", "bid|ask", "v")
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidStorageKey);
        let err = storage.get_item("layout|bid").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidStorageKey);

        storage.set_sub_named_item("layout", "bid", "sub").await.unwrap();
        assert_eq!(storage.get_item("layout").await.unwrap(), None);
        assert_eq!(
            storage.get_sub_named_item("layout", "bid").await.unwrap().as_deref(),
            Some("sub")
        );
    }

    struct FailingBackend;

    #[async_trait]
    impl StorageBackend for FailingBackend {
        async fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Unavailable("offline".into()))
        }

        async fn set(&self, _key: &str, _value: String) -> Result<(), StorageError> {
            Err(StorageError::Backend("quota".into()))
        }

        async fn remove(&self, _key: &str) -> Result<bool, StorageError> {
            Err(StorageError::Backend("locked".into()))
        }
    }

    #[tokio::test]
    async fn test_backend_failures_are_reported() {
        let (storage, _) = facade(Arc::new(FailingBackend), "depth");
        assert_eq!(
            storage.get_item("k").await.unwrap_err().code,
            ErrorCode::StorageGetItemFailed
        );
        assert_eq!(
            storage.set_item("k", "v").await.unwrap_err().code,
            ErrorCode::StorageSetItemFailed
        );
        assert_eq!(
            storage.remove_item("k").await.unwrap_err().code,
            ErrorCode::StorageRemoveItemFailed
        );
    }

    /// Holds every read until released.
    struct GatedBackend {
        gate: Arc<Notify>,
        inner: MemoryStorageBackend,
    }

    #[async_trait]
    impl StorageBackend for GatedBackend {
        async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.gate.notified().await;
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
            self.inner.set(key, value).await
        }

        async fn remove(&self, key: &str) -> Result<bool, StorageError> {
            self.inner.remove(key).await
        }
    }

    #[tokio::test]
    async fn test_late_result_after_unload_is_discarded() {
        let gate = Arc::new(Notify::new());
        let backend = Arc::new(GatedBackend {
            gate: gate.clone(),
            inner: MemoryStorageBackend::new(),
        });
        let (storage, liveness) = facade(backend, "depth");
        storage.set_item("k", "v").await.unwrap();

        let pending = tokio::spawn({
            let storage = storage.clone();
            async move { storage.get_item("k").await }
        });
        tokio::task::yield_now().await;

        liveness.revoke();
        gate.notify_one();

        let err = pending.await.unwrap().unwrap_err();
        assert_eq!(err.code, ErrorCode::ExtensionUnloaded);
        assert_eq!(
            storage.set_item("k", "w").await.unwrap_err().code,
            ErrorCode::ExtensionUnloaded
        );
    }
}
