//! Extension Host
//!
//! Ties the boundary together. The host allocates a handle when an extension
//! loads, hands it an [`ActivationContext`], drains its registrations into the
//! command register, and runs the unload cascade:
//!
//! 1. revoke liveness, so late results are discarded
//! 2. clear the string table slot
//! 3. destroy every live component and control
//! 4. discard undrained registrations
//! 5. drop the extension's commands and release the handle
//!
//! # Example
//!
//! ```rust,no_run
//! use deskext_sdk::{CommandApi, ExtensionHost, SDKConfig};
//! use deskext_core::{ExtensionInfo, PublisherTypeId};
//!
//! fn example() -> deskext_sdk::SDKResult<()> {
//!     let host = ExtensionHost::new(SDKConfig::default())?;
//!     let info = ExtensionInfo {
//!         publisher_type: PublisherTypeId::User,
//!         publisher_name: "acme".into(),
//!         name: "depth".into(),
//!         version: "1.0.0".into(),
//!         short_description: String::new(),
//!         long_description: String::new(),
//!     };
//!     let handle = host.load(info, vec!["Show depth".to_string()].into());
//!     let ctx = host.activate(handle)?;
//!     ctx.commands().register(CommandApi::new("show", 0))?;
//!     host.drain_registrations(handle)?;
//!     host.unload(handle)?;
//!     Ok(())
//! }
//! ```

mod context;

use std::collections::BTreeMap;
use std::sync::{
    Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard,
};

use serde::Serialize;
use tracing::{debug, info, warn};

use deskext_core::{Command, CommandRegister, ExtensionHandle, ExtensionInfo, HandleAllocator};

use crate::api::{ApiError, ExtensionInfoApi};
use crate::config::SDKConfig;
use crate::error::{SDKError, SDKResult};
use crate::factory::{ContentFactory, ControlsFactory, LifecycleTracker, TeardownReport};
use crate::liveness::Liveness;
use crate::loader::ExtensionBundle;
use crate::registrar::{Registrar, RegistrationRequest};
use crate::registry::{StringRegistry, StringTable};
use crate::storage::{MemoryStorageBackend, StorageBackend, StorageFacade};

pub use context::{ActivationContext, CommandRegistrar, ExtensionStrings};

fn lock<V>(mutex: &Mutex<V>) -> MutexGuard<'_, V> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn read<V>(lock: &RwLock<V>) -> RwLockReadGuard<'_, V> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn write<V>(lock: &RwLock<V>) -> RwLockWriteGuard<'_, V> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

/// Host-side state of one loaded extension.
struct LoadedExtension {
    info: ExtensionInfo,
    registrar: Arc<Registrar<RegistrationRequest>>,
    tracker: Arc<LifecycleTracker>,
    liveness: Liveness,
}

/// Result of draining an extension's registrations.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DrainReport {
    pub accepted: Vec<String>,
    /// Command name and the reason it was refused
    pub rejected: Vec<(String, ApiError)>,
}

impl DrainReport {
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

/// Result of unloading an extension.
#[derive(Debug, Clone, Serialize)]
pub struct UnloadReport {
    pub handle: ExtensionHandle,
    pub teardown: TeardownReport,
    pub discarded_requests: usize,
    pub removed_commands: usize,
}

/// Loads, activates and unloads extensions.
pub struct ExtensionHost {
    config: SDKConfig,
    allocator: Mutex<HandleAllocator>,
    strings: Arc<RwLock<StringRegistry>>,
    commands: Mutex<CommandRegister>,
    storage: Arc<dyn StorageBackend>,
    extensions: Mutex<BTreeMap<ExtensionHandle, LoadedExtension>>,
}

impl ExtensionHost {
    /// Create a host backed by in-memory storage
    ///
    /// # Errors
    ///
    /// Returns an error if configuration validation fails
    pub fn new(config: SDKConfig) -> SDKResult<Self> {
        Self::with_storage(config, Arc::new(MemoryStorageBackend::new()))
    }

    /// Create a host with a custom storage backend
    pub fn with_storage(config: SDKConfig, storage: Arc<dyn StorageBackend>) -> SDKResult<Self> {
        config.validate()?;

        Ok(Self {
            strings: Arc::new(RwLock::new(StringRegistry::new(
                config.registry.initial_capacity,
            ))),
            config,
            allocator: Mutex::new(HandleAllocator::new()),
            commands: Mutex::new(CommandRegister::new()),
            storage,
            extensions: Mutex::new(BTreeMap::new()),
        })
    }

    pub fn config(&self) -> &SDKConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────
    // Load / Activate
    // ─────────────────────────────────────────────────────────────────────

    /// Load an extension and assign it a handle.
    pub fn load(&self, info: ExtensionInfo, strings: StringTable) -> ExtensionHandle {
        let handle = lock(&self.allocator).allocate();
        write(&self.strings).set_item(handle, strings);

        let tracker = LifecycleTracker::new(handle)
            .with_unknown_destroy_logging(self.config.lifecycle.log_unknown_destroy);
        info!(
            handle = %handle,
            extension = %info.label(),
            version = %info.version,
            "extension loaded"
        );

        lock(&self.extensions).insert(
            handle,
            LoadedExtension {
                info,
                registrar: Arc::new(Registrar::new()),
                tracker: Arc::new(tracker),
                liveness: Liveness::new(),
            },
        );
        handle
    }

    /// Load a validated manifest and queue the commands it declares.
    pub fn load_bundle(&self, bundle: &ExtensionBundle) -> ExtensionHandle {
        let handle = self.load(bundle.info.clone(), bundle.strings.clone());
        if let Some(extension) = lock(&self.extensions).get(&handle) {
            for command in &bundle.commands {
                extension.registrar.register_command(command.clone());
            }
        }
        handle
    }

    /// Build the services handed to an extension.
    pub fn activate(&self, handle: ExtensionHandle) -> SDKResult<ActivationContext> {
        let extensions = lock(&self.extensions);
        let extension = extensions
            .get(&handle)
            .ok_or_else(|| SDKError::not_found("extension", handle.to_string()))?;
        let liveness = extension.liveness.clone();

        debug!(handle = %handle, "extension activated");
        Ok(ActivationContext {
            handle,
            info: ExtensionInfoApi::from(&extension.info),
            storage: StorageFacade::new(
                self.storage.clone(),
                &extension.info,
                liveness.clone(),
                self.config.storage.max_value_len,
            ),
            content: ContentFactory::new(extension.tracker.clone(), liveness.clone()),
            controls: ControlsFactory::new(
                extension.tracker.clone(),
                liveness.clone(),
                self.config.ui_action.edit_push_policy,
            ),
            commands: CommandRegistrar::new(extension.registrar.clone(), liveness.clone()),
            strings: ExtensionStrings::new(handle, self.strings.clone(), liveness.clone()),
            liveness,
        })
    }

    /// Drain queued registrations into the command register.
    ///
    /// Each request is validated on its own; a refused request does not
    /// affect the others.
    pub fn drain_registrations(&self, handle: ExtensionHandle) -> SDKResult<DrainReport> {
        let requests = {
            let extensions = lock(&self.extensions);
            let extension = extensions
                .get(&handle)
                .ok_or_else(|| SDKError::not_found("extension", handle.to_string()))?;
            extension.registrar.extract_requests()
        };

        let string_count = self
            .config
            .commands
            .strict_display_index
            .then(|| read(&self.strings).table_len(handle));

        let mut report = DrainReport::default();
        let mut commands = lock(&self.commands);
        for request in requests {
            match request {
                RegistrationRequest::Command(api) => match api.to_command(handle, string_count) {
                    Ok(command) => {
                        if commands.insert(command).is_some() {
                            warn!(
                                handle = %handle,
                                command = %api.name,
                                "command redeclared, previous declaration replaced"
                            );
                        }
                        report.accepted.push(api.name);
                    }
                    Err(e) => {
                        warn!(
                            handle = %handle,
                            command = %api.name,
                            error = %e,
                            "command registration refused"
                        );
                        report.rejected.push((api.name, e));
                    }
                },
            }
        }

        debug!(
            handle = %handle,
            accepted = report.accepted.len(),
            rejected = report.rejected.len(),
            "registrations drained"
        );
        Ok(report)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Unload
    // ─────────────────────────────────────────────────────────────────────

    /// Unload an extension and release everything it owns.
    pub fn unload(&self, handle: ExtensionHandle) -> SDKResult<UnloadReport> {
        let extension = lock(&self.extensions)
            .remove(&handle)
            .ok_or_else(|| SDKError::not_found("extension", handle.to_string()))?;

        extension.liveness.revoke();
        write(&self.strings).clear(handle);
        let teardown = extension.tracker.destroy_all();
        let discarded_requests = extension.registrar.discard_pending();
        let removed_commands = lock(&self.commands).remove_extension(handle);
        lock(&self.allocator).release(handle)?;

        if !teardown.is_clean() {
            warn!(handle = %handle, failed = teardown.failed.len(), "teardown incomplete");
        }
        info!(
            handle = %handle,
            extension = %extension.info.label(),
            destroyed = teardown.destroyed,
            "extension unloaded"
        );

        Ok(UnloadReport {
            handle,
            teardown,
            discarded_requests,
            removed_commands,
        })
    }

    /// Unload every loaded extension.
    pub fn unload_all(&self) -> Vec<UnloadReport> {
        let handles: Vec<ExtensionHandle> = lock(&self.extensions).keys().copied().collect();
        handles
            .into_iter()
            .filter_map(|handle| self.unload(handle).ok())
            .collect()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────

    pub fn is_loaded(&self, handle: ExtensionHandle) -> bool {
        lock(&self.extensions).contains_key(&handle)
    }

    pub fn loaded_handles(&self) -> Vec<ExtensionHandle> {
        lock(&self.extensions).keys().copied().collect()
    }

    pub fn info(&self, handle: ExtensionHandle) -> Option<ExtensionInfo> {
        lock(&self.extensions)
            .get(&handle)
            .map(|extension| extension.info.clone())
    }

    /// Resolve an extension string, falling back to the not-found sentinel.
    pub fn lookup_string(&self, handle: ExtensionHandle, index: usize) -> String {
        read(&self.strings)
            .lookup_or_sentinel(handle, index)
            .to_string()
    }

    /// Display caption of a registered command.
    pub fn command_caption(&self, command: &Command) -> String {
        let display = command.default_display_id();
        self.lookup_string(display.handle, display.index as usize)
    }

    pub fn commands_for(&self, handle: ExtensionHandle) -> Vec<Command> {
        lock(&self.commands)
            .for_extension(handle)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Commands placed in a menu, ordered by rank.
    pub fn menu_commands(&self, menu_path: &[String]) -> Vec<Command> {
        lock(&self.commands)
            .in_menu(menu_path)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Live (components, controls) of an extension.
    pub fn live_objects(&self, handle: ExtensionHandle) -> Option<(usize, usize)> {
        lock(&self.extensions).get(&handle).map(|extension| {
            (
                extension.tracker.component_count(),
                extension.tracker.control_count(),
            )
        })
    }

    pub fn pending_registrations(&self, handle: ExtensionHandle) -> usize {
        lock(&self.extensions)
            .get(&handle)
            .map_or(0, |extension| extension.registrar.pending_len())
    }
}

impl std::fmt::Debug for ExtensionHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtensionHost")
            .field("loaded", &self.loaded_handles())
            .field("commands", &lock(&self.commands).len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{CommandApi, ErrorCode};
    use crate::factory::{ControlOptions, LabelOptions};
    use deskext_core::PublisherTypeId;

    fn info(name: &str) -> ExtensionInfo {
        ExtensionInfo {
            publisher_type: PublisherTypeId::Builtin,
            publisher_name: "desk".into(),
            name: name.into(),
            version: "2.0".into(),
            short_description: String::new(),
            long_description: String::new(),
        }
    }

    fn host() -> ExtensionHost {
        ExtensionHost::new(SDKConfig::default()).unwrap()
    }

    #[test]
    fn test_invalid_config_rejected() {
        let err = ExtensionHost::new(SDKConfig::default().with_initial_capacity(0)).unwrap_err();
        assert!(matches!(err, SDKError::Config(_)));
    }

    #[test]
    fn test_drain_isolates_rejections() {
        let host = host();
        let handle = host.load(info("depth"), vec!["Show".to_string()].into());
        let ctx = host.activate(handle).unwrap();

        ctx.commands().register(CommandApi::new("show", 0)).unwrap();
        ctx.commands().register(CommandApi::new("bad.name", 0)).unwrap();
        ctx.commands().register(CommandApi::new("hide", 7)).unwrap();

        let report = host.drain_registrations(handle).unwrap();
        assert_eq!(report.accepted, vec!["show"]);
        assert_eq!(report.rejected.len(), 2);
        assert_eq!(report.rejected[0].1.code, ErrorCode::InvalidCommandName);
        assert_eq!(report.rejected[1].1.code, ErrorCode::InvalidCommandDisplayIndex);

        let commands = host.commands_for(handle);
        assert_eq!(commands.len(), 1);
        assert_eq!(host.command_caption(&commands[0]), "Show");

        // Second drain sees nothing new
        assert!(host.drain_registrations(handle).unwrap().accepted.is_empty());
    }

    #[test]
    fn test_lenient_display_index() {
        let mut config = SDKConfig::default();
        config.commands.strict_display_index = false;
        let host = ExtensionHost::new(config).unwrap();
        let handle = host.load(info("depth"), StringTable::default());
        host.activate(handle)
            .unwrap()
            .commands()
            .register(CommandApi::new("show", 3))
            .unwrap();

        let report = host.drain_registrations(handle).unwrap();
        assert!(report.is_clean());
        let commands = host.commands_for(handle);
        assert_eq!(host.command_caption(&commands[0]), "?");
    }

    #[test]
    fn test_unload_cascade() {
        let host = host();
        let handle = host.load(info("depth"), vec!["Show".to_string()].into());
        let ctx = host.activate(handle).unwrap();

        ctx.commands().register(CommandApi::new("show", 0)).unwrap();
        host.drain_registrations(handle).unwrap();
        ctx.commands().register(CommandApi::new("later", 0)).unwrap();

        let label = ctx.content().create_label(LabelOptions::default()).unwrap();
        let checkbox = ctx
            .controls()
            .create_checkbox(ControlOptions::captioned("Armed"))
            .unwrap();
        assert_eq!(host.live_objects(handle), Some((1, 1)));

        let report = host.unload(handle).unwrap();
        assert_eq!(report.teardown.destroyed, 2);
        assert_eq!(report.discarded_requests, 1);
        assert_eq!(report.removed_commands, 1);

        assert!(!host.is_loaded(handle));
        assert_eq!(host.lookup_string(handle, 0), "?");
        assert!(host.commands_for(handle).is_empty());
        assert!(!ctx.is_alive());
        assert_eq!(checkbox.action().subscriber_count(), 0);
        assert_eq!(
            ctx.commands().register(CommandApi::new("x", 0)).unwrap_err().code,
            ErrorCode::ExtensionUnloaded
        );
        assert_eq!(
            ctx.strings().get(0).unwrap_err().code,
            ErrorCode::ExtensionUnloaded
        );
        assert!(crate::factory::Teardown::is_destroyed(&*label));

        assert!(host.unload(handle).unwrap_err().is_not_found());
    }

    #[test]
    fn test_handle_reused_after_unload() {
        let host = host();
        let a = host.load(info("a"), StringTable::default());
        let b = host.load(info("b"), StringTable::default());
        assert_ne!(a, b);

        host.unload(a).unwrap();
        let c = host.load(info("c"), vec!["fresh".to_string()].into());
        assert_eq!(c, a);
        assert_eq!(host.lookup_string(c, 0), "fresh");
        assert_eq!(host.info(c).unwrap().name, "c");
    }

    #[test]
    fn test_strings_service() {
        let host = host();
        let handle = host.load(info("depth"), StringTable::default());
        let strings = host.activate(handle).unwrap().strings().clone();

        assert!(strings.is_empty());
        strings.set(vec!["Bid".into(), "Ask".into()]).unwrap();
        assert_eq!(strings.get(1).unwrap().as_deref(), Some("Ask"));
        assert_eq!(strings.get(9).unwrap(), None);
        assert_eq!(host.lookup_string(handle, 0), "Bid");
    }

    #[test]
    fn test_storage_shared_backend_is_namespaced() {
        let host = host();
        let a = host.activate(host.load(info("left"), StringTable::default())).unwrap();
        let b = host.activate(host.load(info("right"), StringTable::default())).unwrap();

        tokio_test::block_on(async {
            a.storage().set_item("layout", "wide").await.unwrap();
            assert_eq!(b.storage().get_item("layout").await.unwrap(), None);
            assert_eq!(
                a.storage().get_item("layout").await.unwrap().as_deref(),
                Some("wide")
            );
        });
    }

    #[test]
    fn test_direct_destroy_updates_live_objects() {
        let host = host();
        let handle = host.load(info("blotter"), StringTable::default());
        let ctx = host.activate(handle).unwrap();

        let label = ctx.content().create_label(LabelOptions::default()).unwrap();
        let input = ctx
            .controls()
            .create_number_input(ControlOptions::captioned("Px"))
            .unwrap();
        assert_eq!(host.live_objects(handle), Some((1, 1)));

        crate::factory::Teardown::destroy(&*label).unwrap();
        crate::factory::Teardown::destroy(&*input).unwrap();
        assert_eq!(host.live_objects(handle), Some((0, 0)));

        let report = host.unload(handle).unwrap();
        assert_eq!(report.teardown.total(), 0);
    }

    #[test]
    fn test_controls_sharing_host_action() {
        use crate::factory::{AttachmentPoint, ComponentKind};
        use deskext_core::{UiAction, UiActionCommitTypeId};

        let host = host();
        let handle = host.load(info("ladder"), StringTable::default());
        let ctx = host.activate(handle).unwrap();
        let shared = Arc::new(UiAction::<i64>::new(false));

        let first = ctx
            .controls()
            .create_control_for(ComponentKind::External, shared.clone())
            .unwrap();
        let second = ctx
            .controls()
            .create_control_for(ComponentKind::External, shared.clone())
            .unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        first.set_commit_listener(Some(Arc::new(
            move |value: Option<&i64>, _: UiActionCommitTypeId| {
                sink.lock().unwrap().push(value.copied());
            },
        )));

        first.commit_value(Some(1), "Explicit").unwrap();
        assert!(ctx.controls().destroy_control(second.id()));
        first.commit_value(Some(2), "Explicit").unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![Some(1), Some(2)]);
        assert_eq!(shared.subscriber_count(), 1);
        assert_eq!(host.live_objects(handle), Some((0, 1)));
    }
}
