//! Host-internal domain types.
//!
//! These enumerations are the host's own vocabulary. They are free to evolve;
//! extension code never sees them directly, only their API-shaped names.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::handle::ExtensionHandle;

// ─────────────────────────────────────────────────────────────────────────────
// Market Classification
// ─────────────────────────────────────────────────────────────────────────────

/// Trading environment a data source or account belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradingEnvironmentId {
    /// Live trading
    Production,
    /// Live data on a delay
    Delayed,
    /// Paper trading
    Demo,
}

impl TradingEnvironmentId {
    pub const ALL: [Self; 3] = [Self::Production, Self::Delayed, Self::Demo];
}

impl fmt::Display for TradingEnvironmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradingEnvironmentId::Production => write!(f, "production"),
            TradingEnvironmentId::Delayed => write!(f, "delayed"),
            TradingEnvironmentId::Demo => write!(f, "demo"),
        }
    }
}

/// How trustworthy a piece of market data currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrectnessId {
    /// Data is up to date
    Good,
    /// Data may lag but can be relied on
    Usable,
    /// Feed is reconnecting; data may be stale
    Suspect,
    /// Data could not be obtained
    Error,
}

impl CorrectnessId {
    pub const ALL: [Self; 4] = [Self::Good, Self::Usable, Self::Suspect, Self::Error];

    /// Whether data with this correctness may be shown without a warning.
    pub fn is_usable(&self) -> bool {
        matches!(self, CorrectnessId::Good | CorrectnessId::Usable)
    }
}

impl fmt::Display for CorrectnessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorrectnessId::Good => write!(f, "good"),
            CorrectnessId::Usable => write!(f, "usable"),
            CorrectnessId::Suspect => write!(f, "suspect"),
            CorrectnessId::Error => write!(f, "error"),
        }
    }
}

/// Order book side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderSideId {
    Bid,
    Ask,
}

impl OrderSideId {
    pub const ALL: [Self; 2] = [Self::Bid, Self::Ask];

    /// Returns the other side of the book.
    pub fn opposite(&self) -> Self {
        match self {
            OrderSideId::Bid => OrderSideId::Ask,
            OrderSideId::Ask => OrderSideId::Bid,
        }
    }
}

impl fmt::Display for OrderSideId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderSideId::Bid => write!(f, "bid"),
            OrderSideId::Ask => write!(f, "ask"),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Extension Identity
// ─────────────────────────────────────────────────────────────────────────────

/// Who published an extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublisherTypeId {
    /// Ships with the host
    Builtin,
    /// Installed by an individual user
    User,
    /// Distributed by an organisation
    Organisation,
}

impl PublisherTypeId {
    pub const ALL: [Self; 3] = [Self::Builtin, Self::User, Self::Organisation];
}

impl fmt::Display for PublisherTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PublisherTypeId::Builtin => write!(f, "builtin"),
            PublisherTypeId::User => write!(f, "user"),
            PublisherTypeId::Organisation => write!(f, "organisation"),
        }
    }
}

/// Read-only identity of a loaded extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionInfo {
    pub publisher_type: PublisherTypeId,
    pub publisher_name: String,
    pub name: String,
    pub version: String,
    pub short_description: String,
    pub long_description: String,
}

impl ExtensionInfo {
    /// `publisher/name` label used in logs.
    pub fn label(&self) -> String {
        format!("{}/{}", self.publisher_name, self.name)
    }
}

/// Reference to a string in an extension's string table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExtStringId {
    pub handle: ExtensionHandle,
    pub index: u32,
}

impl ExtStringId {
    pub fn new(handle: ExtensionHandle, index: u32) -> Self {
        Self { handle, index }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// UiAction Classification
// ─────────────────────────────────────────────────────────────────────────────

/// How a UiAction value was committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UiActionCommitTypeId {
    /// User confirmed the value (enter key, button press)
    Explicit,
    /// Value was committed as a side effect (focus loss, spin)
    Implicit,
}

impl UiActionCommitTypeId {
    pub const ALL: [Self; 2] = [Self::Explicit, Self::Implicit];
}

impl fmt::Display for UiActionCommitTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UiActionCommitTypeId::Explicit => write!(f, "explicit"),
            UiActionCommitTypeId::Implicit => write!(f, "implicit"),
        }
    }
}

/// Presentation state of a UiAction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UiActionStateId {
    Disabled,
    Readonly,
    /// Required value not supplied
    Missing,
    Invalid,
    Valid,
    Accepted,
    Warning,
    Error,
}

impl UiActionStateId {
    pub const ALL: [Self; 8] = [
        Self::Disabled,
        Self::Readonly,
        Self::Missing,
        Self::Invalid,
        Self::Valid,
        Self::Accepted,
        Self::Warning,
        Self::Error,
    ];

    /// Whether a control in this state accepts user input.
    pub fn is_editable(&self) -> bool {
        !matches!(self, UiActionStateId::Disabled | UiActionStateId::Readonly)
    }
}

impl fmt::Display for UiActionStateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UiActionStateId::Disabled => write!(f, "disabled"),
            UiActionStateId::Readonly => write!(f, "readonly"),
            UiActionStateId::Missing => write!(f, "missing"),
            UiActionStateId::Invalid => write!(f, "invalid"),
            UiActionStateId::Valid => write!(f, "valid"),
            UiActionStateId::Accepted => write!(f, "accepted"),
            UiActionStateId::Warning => write!(f, "warning"),
            UiActionStateId::Error => write!(f, "error"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_tables_follow_declaration_order() {
        for (ordinal, id) in TradingEnvironmentId::ALL.iter().enumerate() {
            assert_eq!(*id as usize, ordinal);
        }
        for (ordinal, id) in CorrectnessId::ALL.iter().enumerate() {
            assert_eq!(*id as usize, ordinal);
        }
        for (ordinal, id) in UiActionStateId::ALL.iter().enumerate() {
            assert_eq!(*id as usize, ordinal);
        }
    }

    #[test]
    fn test_order_side_opposite() {
        assert_eq!(OrderSideId::Bid.opposite(), OrderSideId::Ask);
        assert_eq!(OrderSideId::Ask.opposite(), OrderSideId::Bid);
    }

    #[test]
    fn test_state_editable() {
        assert!(!UiActionStateId::Disabled.is_editable());
        assert!(!UiActionStateId::Readonly.is_editable());
        assert!(UiActionStateId::Missing.is_editable());
        assert!(UiActionStateId::Valid.is_editable());
    }

    #[test]
    fn test_extension_info_label() {
        let info = ExtensionInfo {
            publisher_type: PublisherTypeId::User,
            publisher_name: "acme".into(),
            name: "depth-tools".into(),
            version: "1.0.0".into(),
            short_description: String::new(),
            long_description: String::new(),
        };
        assert_eq!(info.label(), "acme/depth-tools");
        assert_eq!(CorrectnessId::Suspect.to_string(), "suspect");
    }
}
