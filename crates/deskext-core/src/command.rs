//! Commands contributed by extensions.
//!
//! A [`Command`] is immutable once constructed. Accepted commands are kept in
//! a [`CommandRegister`] keyed by owning handle and name, from which the host
//! builds its menus.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::handle::ExtensionHandle;
use crate::types::ExtStringId;

/// Where a command appears in the menu bar by default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuBarItemPosition {
    /// Menu names from the top-level menu down to the containing menu
    pub menu_path: Vec<String>,
    /// Ordering within the containing menu (lower sorts first)
    pub rank: f64,
}

/// A command declared by an extension.
///
/// Deserialization goes through [`Command::new`], so a stored command is
/// validated the same way as a freshly declared one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CommandRecord")]
pub struct Command {
    name: String,
    default_display_id: ExtStringId,
    default_menu_bar_item_position: Option<MenuBarItemPosition>,
}

/// Unvalidated wire form of a [`Command`].
#[derive(Deserialize)]
struct CommandRecord {
    name: String,
    default_display_id: ExtStringId,
    default_menu_bar_item_position: Option<MenuBarItemPosition>,
}

impl TryFrom<CommandRecord> for Command {
    type Error = Error;

    fn try_from(record: CommandRecord) -> Result<Self> {
        Command::new(
            record.name,
            record.default_display_id,
            record.default_menu_bar_item_position,
        )
    }
}

impl Command {
    /// Create a command. The name must be non-empty and must not contain `.`,
    /// which separates the extension prefix in qualified names.
    pub fn new(
        name: impl Into<String>,
        default_display_id: ExtStringId,
        default_menu_bar_item_position: Option<MenuBarItemPosition>,
    ) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::invalid_command("command name is empty"));
        }
        if name.contains('.') {
            return Err(Error::invalid_command(format!(
                "command name '{}' contains '.'",
                name
            )));
        }
        if let Some(position) = &default_menu_bar_item_position {
            if !position.rank.is_finite() {
                return Err(Error::invalid_command(format!(
                    "command '{}' has a non-finite menu rank",
                    name
                )));
            }
        }

        Ok(Self {
            name,
            default_display_id,
            default_menu_bar_item_position,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Owning extension
    pub fn extension_handle(&self) -> ExtensionHandle {
        self.default_display_id.handle
    }

    pub fn default_display_id(&self) -> ExtStringId {
        self.default_display_id
    }

    pub fn default_menu_bar_item_position(&self) -> Option<&MenuBarItemPosition> {
        self.default_menu_bar_item_position.as_ref()
    }

    /// `<handle>.<name>`, unique across loaded extensions.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.extension_handle().raw(), self.name)
    }
}

/// Host-side collection of accepted commands.
#[derive(Debug, Default)]
pub struct CommandRegister {
    commands: BTreeMap<(ExtensionHandle, String), Command>,
}

impl CommandRegister {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a command, replacing an earlier declaration with the same name from
    /// the same extension. Returns the replaced command, if any.
    pub fn insert(&mut self, command: Command) -> Option<Command> {
        let key = (command.extension_handle(), command.name.clone());
        self.commands.insert(key, command)
    }

    pub fn get(&self, handle: ExtensionHandle, name: &str) -> Option<&Command> {
        self.commands.get(&(handle, name.to_string()))
    }

    /// Remove every command owned by an extension. Returns how many were removed.
    pub fn remove_extension(&mut self, handle: ExtensionHandle) -> usize {
        let before = self.commands.len();
        self.commands.retain(|(owner, _), _| *owner != handle);
        before - self.commands.len()
    }

    /// Commands owned by an extension, in name order.
    pub fn for_extension(&self, handle: ExtensionHandle) -> Vec<&Command> {
        self.commands
            .iter()
            .filter(|((owner, _), _)| *owner == handle)
            .map(|(_, command)| command)
            .collect()
    }

    /// Commands placed in the given menu, ordered by rank.
    pub fn in_menu(&self, menu_path: &[String]) -> Vec<&Command> {
        let mut commands: Vec<&Command> = self
            .commands
            .values()
            .filter(|c| {
                c.default_menu_bar_item_position()
                    .is_some_and(|p| p.menu_path == menu_path)
            })
            .collect();
        commands.sort_by(|a, b| {
            let rank = |c: &Command| c.default_menu_bar_item_position().map_or(0.0, |p| p.rank);
            rank(a).total_cmp(&rank(b))
        });
        commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
