//! Services handed to an extension when it activates.

use std::sync::{Arc, RwLock};

use deskext_core::ExtensionHandle;

use super::{read, write};
use crate::api::{ApiResult, CommandApi, ExtensionInfoApi};
use crate::factory::{ContentFactory, ControlsFactory};
use crate::liveness::Liveness;
use crate::registrar::{Registrar, RegistrationRequest};
use crate::registry::{StringRegistry, StringTable};
use crate::storage::StorageFacade;

/// Command declarations of one extension.
#[derive(Debug, Clone)]
pub struct CommandRegistrar {
    registrar: Arc<Registrar<RegistrationRequest>>,
    liveness: Liveness,
}

impl CommandRegistrar {
    pub(super) fn new(registrar: Arc<Registrar<RegistrationRequest>>, liveness: Liveness) -> Self {
        Self {
            registrar,
            liveness,
        }
    }

    /// Queue a command. The host validates it when it drains registrations.
    pub fn register(&self, command: CommandApi) -> ApiResult<()> {
        self.liveness.check()?;
        self.registrar.register_command(command);
        Ok(())
    }

    pub fn pending_len(&self) -> usize {
        self.registrar.pending_len()
    }
}

/// String table of one extension.
#[derive(Debug, Clone)]
pub struct ExtensionStrings {
    handle: ExtensionHandle,
    registry: Arc<RwLock<StringRegistry>>,
    liveness: Liveness,
}

impl ExtensionStrings {
    pub(super) fn new(
        handle: ExtensionHandle,
        registry: Arc<RwLock<StringRegistry>>,
        liveness: Liveness,
    ) -> Self {
        Self {
            handle,
            registry,
            liveness,
        }
    }

    /// Replace the whole table.
    pub fn set(&self, strings: Vec<String>) -> ApiResult<()> {
        self.liveness.check()?;
        write(&self.registry).set_item(self.handle, StringTable::new(strings));
        Ok(())
    }

    pub fn get(&self, index: usize) -> ApiResult<Option<String>> {
        self.liveness.check()?;
        Ok(read(&self.registry)
            .lookup(self.handle, index)
            .map(str::to_string))
    }

    pub fn len(&self) -> usize {
        read(&self.registry).table_len(self.handle)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Everything an extension receives at activation.
#[derive(Debug, Clone)]
pub struct ActivationContext {
    pub(super) handle: ExtensionHandle,
    pub(super) info: ExtensionInfoApi,
    pub(super) storage: StorageFacade,
    pub(super) content: ContentFactory,
    pub(super) controls: ControlsFactory,
    pub(super) commands: CommandRegistrar,
    pub(super) strings: ExtensionStrings,
    pub(super) liveness: Liveness,
}

impl ActivationContext {
    pub fn handle(&self) -> ExtensionHandle {
        self.handle
    }

    /// Read-only identity of the extension itself.
    pub fn self_info(&self) -> &ExtensionInfoApi {
        &self.info
    }

    pub fn storage(&self) -> &StorageFacade {
        &self.storage
    }

    pub fn content(&self) -> &ContentFactory {
        &self.content
    }

    pub fn controls(&self) -> &ControlsFactory {
        &self.controls
    }

    pub fn commands(&self) -> &CommandRegistrar {
        &self.commands
    }

    pub fn strings(&self) -> &ExtensionStrings {
        &self.strings
    }

    /// Whether the extension is still loaded.
    pub fn is_alive(&self) -> bool {
        self.liveness.is_alive()
    }
}
