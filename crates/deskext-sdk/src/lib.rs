//! deskext-sdk - The extension boundary of the trading desktop
//!
//! Everything extension code can touch goes through this crate:
//!
//! - **api** - Exhaustive mappings between host ids and API names, error codes
//! - **registry** - Handle-indexed string tables
//! - **registrar** - Contribution requests queued during extension bootstrap
//! - **bridge** - Push/commit protocol over host UiActions
//! - **factory** - Component and control creation with lifecycle tracking
//! - **storage** - Namespaced per-extension key/value storage
//! - **loader** - Extension manifests on disk
//! - **host** - Load, activate and unload cascade
//!
//! # Example
//!
//! ```rust,no_run
//! use deskext_sdk::{ControlOptions, ExtensionHost, ExtensionLoader, SDKConfig};
//!
//! async fn example() -> anyhow::Result<()> {
//!     let host = ExtensionHost::new(SDKConfig::default())?;
//!     let bundle = ExtensionLoader::default()
//!         .load_from_dir("extensions/depth".as_ref())
//!         .await?;
//!
//!     let handle = host.load_bundle(&bundle);
//!     let ctx = host.activate(handle)?;
//!     host.drain_registrations(handle)?;
//!
//!     let qty = ctx.controls().create_integer_input(ControlOptions::captioned("Qty"))?;
//!     qty.action().push_value(Some(100));
//!
//!     host.unload(handle)?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod bridge;
pub mod config;
pub mod defect;
pub mod error;
pub mod factory;
pub mod host;
pub mod liveness;
pub mod loader;
pub mod registrar;
pub mod registry;
pub mod storage;
pub mod utils;

// ─────────────────────────────────────────────────────────────────────────────
// Re-exports
// ─────────────────────────────────────────────────────────────────────────────

pub use api::{
    ApiError, ApiMapping, ApiResult, CommandApi, ERROR_CODE_CONTRACT_VERSION, ErrorCode,
    ExtensionInfoApi, MenuBarItemPositionApi,
};
pub use bridge::{SubscriptionGuard, UiActionBridge};
pub use config::{
    CommandsConfig, ConfigValidationError, LifecycleConfig, RegistryConfig, SDKConfig,
    StorageConfig, UiActionConfig,
};
pub use defect::{InternalDefect, internal_defect};
pub use error::{SDKError, SDKResult};
pub use factory::{
    ComponentId, ComponentKind, ContentFactory, Control, ControlOptions, ControlsFactory,
    GridOptions, LabelOptions, LifecycleTracker, TeardownReport,
};
pub use host::{ActivationContext, DrainReport, ExtensionHost, UnloadReport};
pub use liveness::Liveness;
pub use loader::{ExtensionBundle, ExtensionLoader, ExtensionManifest, LoaderConfig};
pub use registrar::{Registrar, RegistrationRequest};
pub use registry::{HandleArena, NOT_FOUND_SENTINEL, StringRegistry, StringTable};
pub use storage::{MemoryStorageBackend, StorageBackend, StorageError, StorageFacade};
