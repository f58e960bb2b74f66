//! UiAction events, handler types and protocol outcomes.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::types::{UiActionCommitTypeId, UiActionStateId};

/// Identifies one push-event registration on a UiAction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(pub(crate) u64);

impl SubscriptionId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Host-to-subscriber notification.
#[derive(Debug, Clone, PartialEq)]
pub enum PushEvent<T> {
    /// Observed value and whether it is a local edit
    Value { value: Option<T>, edited: bool },
    /// Whether a value must be supplied
    Required(bool),
    /// Presentation state changed
    State(UiActionStateId),
    Caption(String),
    Title(String),
}

/// Handler for push events.
pub type PushHandler<T> = Arc<dyn Fn(&PushEvent<T>) + Send + Sync>;

/// Handler invoked after an accepted commit.
pub type CommitHandler<T> = Arc<dyn Fn(Option<&T>, UiActionCommitTypeId) + Send + Sync>;

/// Observable value state of a UiAction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueState {
    /// No value
    Unset,
    /// Value matches the last authoritative value
    SetClean,
    /// User has edited the value and not yet committed or discarded
    SetEdited,
}

impl fmt::Display for ValueState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueState::Unset => write!(f, "unset"),
            ValueState::SetClean => write!(f, "set_clean"),
            ValueState::SetEdited => write!(f, "set_edited"),
        }
    }
}

/// Result of [`super::UiAction::commit_value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Accepted,
    /// Absent value offered while a value is required; nothing changed
    Rejected,
}

impl CommitOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, CommitOutcome::Accepted)
    }
}

/// Result of [`super::UiAction::push_value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// Value applied and subscribers notified
    Applied,
    /// A local edit is in progress; the value is held until it resolves
    Deferred,
}

/// What a host push does while the user is editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditPushPolicy {
    /// Keep the local edit visible; apply the push once the edit resolves
    #[default]
    PreserveEdit,
    /// Overwrite the local edit with the pushed value
    ApplyImmediately,
}
