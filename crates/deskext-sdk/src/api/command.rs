//! API shape of command declarations.

use serde::{Deserialize, Serialize};

use deskext_core::{Command, ExtStringId, ExtensionHandle, MenuBarItemPosition};

use super::error::{ApiError, ApiResult, ErrorCode};

/// Default menu bar placement as extensions declare it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuBarItemPositionApi {
    pub menu_path: Vec<String>,
    pub rank: f64,
}

/// Command registration request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandApi {
    /// Unique within the extension
    pub name: String,
    /// Index into the extension's string table
    pub default_display_index: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_menu_bar_item_position: Option<MenuBarItemPositionApi>,
}

impl CommandApi {
    pub fn new(name: impl Into<String>, default_display_index: u32) -> Self {
        Self {
            name: name.into(),
            default_display_index,
            default_menu_bar_item_position: None,
        }
    }

    pub fn in_menu(mut self, menu_path: Vec<String>, rank: f64) -> Self {
        self.default_menu_bar_item_position = Some(MenuBarItemPositionApi { menu_path, rank });
        self
    }

    /// Translate into a host command owned by `handle`.
    ///
    /// When `string_count` is given, the display index must address an entry
    /// of the extension's string table.
    pub fn to_command(
        &self,
        handle: ExtensionHandle,
        string_count: Option<usize>,
    ) -> ApiResult<Command> {
        if self.name.is_empty() || self.name.contains('.') {
            return Err(ApiError::new(
                ErrorCode::InvalidCommandName,
                format!("invalid command name '{}'", self.name),
            ));
        }

        if let Some(count) = string_count {
            if self.default_display_index as usize >= count {
                return Err(ApiError::new(
                    ErrorCode::InvalidCommandDisplayIndex,
                    format!(
                        "command '{}' display index {} outside string table of {}",
                        self.name, self.default_display_index, count
                    ),
                ));
            }
        }

        let position = match &self.default_menu_bar_item_position {
            Some(position) if !position.rank.is_finite() => {
                return Err(ApiError::new(
                    ErrorCode::InvalidMenuBarItemRank,
                    format!("command '{}' menu rank is not finite", self.name),
                ));
            }
            Some(position) => Some(MenuBarItemPosition {
                menu_path: position.menu_path.clone(),
                rank: position.rank,
            }),
            None => None,
        };

        Command::new(
            self.name.clone(),
            ExtStringId::new(handle, self.default_display_index),
            position,
        )
        .map_err(|e| ApiError::new(ErrorCode::InvalidCommandName, e.to_string()))
    }
}

impl From<&Command> for CommandApi {
    fn from(command: &Command) -> Self {
        Self {
            name: command.name().to_string(),
            default_display_index: command.default_display_id().index,
            default_menu_bar_item_position: command.default_menu_bar_item_position().map(|p| {
                MenuBarItemPositionApi {
                    menu_path: p.menu_path.clone(),
                    rank: p.rank,
                }
            }),
        }
    }
}
