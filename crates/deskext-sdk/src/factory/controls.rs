//! Built-in interactive components.
//!
//! Every control is a [`Control<T>`]: an attachment root plus a host
//! [`UiAction`] exposed through a [`UiActionBridge`]. Destroying the control
//! ends the bridge binding, so no push reaches it afterwards.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use deskext_core::ui_action::{CommitHandler, PushHandler};
use deskext_core::{EditPushPolicy, UiAction, ValueState};

use super::component::{
    AttachmentPoint, AttachmentRoot, ComponentKind, Teardown, TeardownError, UiActionCapable,
};
use crate::api::ApiResult;
use crate::bridge::UiActionBridge;
use crate::defect::internal_defect;

pub type ButtonControl = Control<bool>;
pub type CheckboxControl = Control<bool>;
pub type IntegerInputControl = Control<i64>;
pub type NumberInputControl = Control<f64>;
pub type TextInputControl = Control<String>;
pub type DateInputControl = Control<NaiveDate>;

fn read<V>(lock: &RwLock<V>) -> RwLockReadGuard<'_, V> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

/// Options shared by every control kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlOptions<T> {
    #[serde(default)]
    pub caption: String,
    #[serde(default)]
    pub title: String,
    #[serde(default = "Option::default")]
    pub value: Option<T>,
    #[serde(default)]
    pub value_required: bool,
}

impl<T> Default for ControlOptions<T> {
    fn default() -> Self {
        Self {
            caption: String::new(),
            title: String::new(),
            value: None,
            value_required: false,
        }
    }
}

impl<T> ControlOptions<T> {
    pub fn captioned(caption: impl Into<String>) -> Self {
        Self {
            caption: caption.into(),
            ..Self::default()
        }
    }

    pub fn with_value(mut self, value: T) -> Self {
        self.value = Some(value);
        self
    }

    pub fn required(mut self) -> Self {
        self.value_required = true;
        self
    }

    /// Build the host-side action these options describe.
    pub fn into_action(self, policy: EditPushPolicy) -> UiAction<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        let action = UiAction::new(self.value_required)
            .with_caption(self.caption)
            .with_title(self.title)
            .with_push_policy(policy);
        match self.value {
            Some(value) => action.with_value(value),
            None => action,
        }
    }
}

/// Interactive component bound to a UiAction.
pub struct Control<T>
where
    T: Clone + Send + Sync + 'static,
{
    root: AttachmentRoot,
    action: Arc<UiAction<T>>,
    // Write-locked only to unbind, so listeners may read back the control
    bridge: RwLock<UiActionBridge<T>>,
    destroyed: AtomicBool,
}

impl<T> std::fmt::Debug for Control<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Control")
            .field("root", &self.root)
            .field("destroyed", &self.destroyed.load(Ordering::Acquire))
            .finish()
    }
}

impl<T> Control<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(kind: ComponentKind, action: Arc<UiAction<T>>) -> Self {
        Self {
            root: AttachmentRoot::new(kind),
            bridge: RwLock::new(UiActionBridge::bound_to(action.clone())),
            action,
            destroyed: AtomicBool::new(false),
        }
    }

    /// Host-side action; host glue pushes values and forwards user edits here.
    pub fn action(&self) -> &Arc<UiAction<T>> {
        &self.action
    }

    pub fn kind(&self) -> ComponentKind {
        self.root.kind
    }

    pub fn caption(&self) -> String {
        self.action.caption()
    }

    pub fn title(&self) -> String {
        self.action.title()
    }

    // Extension surface, routed through the bridge

    pub fn value(&self) -> ApiResult<Option<T>> {
        read(&self.bridge).value()
    }

    pub fn commit_value(&self, value: Option<T>, commit_type: &str) -> ApiResult<()> {
        read(&self.bridge).commit_value(value, commit_type)
    }

    pub fn set_push_listener(&self, listener: Option<PushHandler<T>>) {
        read(&self.bridge).set_push_listener(listener);
    }

    pub fn set_commit_listener(&self, listener: Option<CommitHandler<T>>) {
        read(&self.bridge).set_commit_listener(listener);
    }

    /// Whether the control still holds its push subscription.
    pub fn is_bound(&self) -> bool {
        read(&self.bridge).is_bound()
    }
}

impl<T> AttachmentPoint for Control<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn root(&self) -> &AttachmentRoot {
        &self.root
    }
}

impl<T> Teardown for Control<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn destroy(&self) -> Result<(), TeardownError> {
        if !self.destroyed.swap(true, Ordering::AcqRel) {
            self.root.release();
            self.bridge
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .unbind();
        }
        Ok(())
    }

    fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::Acquire)
    }
}

impl<T> UiActionCapable for Control<T>
where
    T: Clone + Send + Sync + Serialize + 'static,
{
    fn value_state(&self) -> ApiResult<ValueState> {
        read(&self.bridge).value_state()
    }

    fn edited(&self) -> ApiResult<bool> {
        read(&self.bridge).edited()
    }

    fn value_required(&self) -> ApiResult<bool> {
        read(&self.bridge).value_required()
    }

    fn state_api(&self) -> ApiResult<&'static str> {
        read(&self.bridge).state_api()
    }

    fn value_json(&self) -> ApiResult<serde_json::Value> {
        let value = read(&self.bridge).value()?;
        match serde_json::to_value(value) {
            Ok(json) => Ok(json),
            Err(e) => internal_defect(
                "CTL0001",
                format!("{} value not serializable: {e}", self.root.kind),
            ),
        }
    }
}
