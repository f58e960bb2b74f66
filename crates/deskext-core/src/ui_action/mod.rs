//! Interactive value holders shared between host UI and extensions.
//!
//! A [`UiAction`] carries one value through three states:
//!
//! - `Unset`: no value
//! - `SetClean`: value equals the last authoritative value
//! - `SetEdited`: the user has typed something not yet committed
//!
//! The host pushes authoritative values in with [`UiAction::push_value`]; the
//! user edits with [`UiAction::edit`] and resolves the edit with
//! [`UiAction::commit_value`] or [`UiAction::discard_edit`]. Push subscribers
//! are notified in subscription order, and never while an internal lock is
//! held, so a handler may call back into the action.
//!
//! Commit handlers hang off a subscription: several bindings may share one
//! action, each with its own handler, and `unsubscribe` removes only the
//! handler of the subscription it releases.

mod events;

pub use events::{
    CommitHandler, CommitOutcome, EditPushPolicy, PushEvent, PushHandler, PushOutcome,
    SubscriptionId, ValueState,
};

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::NaiveDate;

use crate::types::{UiActionCommitTypeId, UiActionStateId};

pub type BooleanUiAction = UiAction<bool>;
pub type IntegerUiAction = UiAction<i64>;
pub type NumberUiAction = UiAction<f64>;
pub type StringUiAction = UiAction<String>;
pub type DateUiAction = UiAction<NaiveDate>;

struct ValueSlot<T> {
    value: Option<T>,
    /// Last value pushed by the host or committed
    base_value: Option<T>,
    edited: bool,
    value_required: bool,
    state_id: UiActionStateId,
    caption: String,
    title: String,
    /// Push held back while an edit is in progress
    pending_push: Option<Option<T>>,
    push_policy: EditPushPolicy,
}

/// Interactive value holder.
pub struct UiAction<T> {
    slot: Mutex<ValueSlot<T>>,
    subscribers: Mutex<BTreeMap<SubscriptionId, PushHandler<T>>>,
    commit_handlers: Mutex<BTreeMap<SubscriptionId, CommitHandler<T>>>,
    next_subscription: AtomicU64,
}

fn lock<V>(mutex: &Mutex<V>) -> MutexGuard<'_, V> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<T> UiAction<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create an unset action.
    pub fn new(value_required: bool) -> Self {
        Self {
            slot: Mutex::new(ValueSlot {
                value: None,
                base_value: None,
                edited: false,
                value_required,
                state_id: UiActionStateId::Valid,
                caption: String::new(),
                title: String::new(),
                pending_push: None,
                push_policy: EditPushPolicy::default(),
            }),
            subscribers: Mutex::new(BTreeMap::new()),
            commit_handlers: Mutex::new(BTreeMap::new()),
            next_subscription: AtomicU64::new(1),
        }
    }

    /// Start from an authoritative value.
    pub fn with_value(self, value: T) -> Self {
        {
            let mut slot = lock(&self.slot);
            slot.value = Some(value.clone());
            slot.base_value = Some(value);
        }
        self
    }

    pub fn with_caption(self, caption: impl Into<String>) -> Self {
        lock(&self.slot).caption = caption.into();
        self
    }

    pub fn with_title(self, title: impl Into<String>) -> Self {
        lock(&self.slot).title = title.into();
        self
    }

    pub fn with_push_policy(self, policy: EditPushPolicy) -> Self {
        lock(&self.slot).push_policy = policy;
        self
    }

    // ─────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────

    /// Currently visible value.
    pub fn value(&self) -> Option<T> {
        lock(&self.slot).value.clone()
    }

    pub fn edited(&self) -> bool {
        lock(&self.slot).edited
    }

    pub fn value_required(&self) -> bool {
        lock(&self.slot).value_required
    }

    pub fn state_id(&self) -> UiActionStateId {
        lock(&self.slot).state_id
    }

    pub fn caption(&self) -> String {
        lock(&self.slot).caption.clone()
    }

    pub fn title(&self) -> String {
        lock(&self.slot).title.clone()
    }

    pub fn value_state(&self) -> ValueState {
        let slot = lock(&self.slot);
        if slot.edited {
            ValueState::SetEdited
        } else if slot.value.is_some() {
            ValueState::SetClean
        } else {
            ValueState::Unset
        }
    }

    /// Whether a host push is waiting for the current edit to resolve.
    pub fn has_pending_push(&self) -> bool {
        lock(&self.slot).pending_push.is_some()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Host Side
    // ─────────────────────────────────────────────────────────────────────

    /// Push an authoritative value from the host.
    pub fn push_value(&self, value: Option<T>) -> PushOutcome {
        {
            let mut slot = lock(&self.slot);
            if slot.edited && slot.push_policy == EditPushPolicy::PreserveEdit {
                slot.pending_push = Some(value);
                tracing::debug!("push deferred until local edit resolves");
                return PushOutcome::Deferred;
            }
            slot.value = value.clone();
            slot.base_value = value.clone();
            slot.edited = false;
            slot.pending_push = None;
        }

        self.notify(&PushEvent::Value {
            value,
            edited: false,
        });
        PushOutcome::Applied
    }

    pub fn push_value_required(&self, value_required: bool) {
        {
            let mut slot = lock(&self.slot);
            if slot.value_required == value_required {
                return;
            }
            slot.value_required = value_required;
        }
        self.notify(&PushEvent::Required(value_required));
    }

    pub fn push_state(&self, state_id: UiActionStateId) {
        {
            let mut slot = lock(&self.slot);
            if slot.state_id == state_id {
                return;
            }
            slot.state_id = state_id;
        }
        self.notify(&PushEvent::State(state_id));
    }

    pub fn push_caption(&self, caption: impl Into<String>) {
        let caption = caption.into();
        lock(&self.slot).caption = caption.clone();
        self.notify(&PushEvent::Caption(caption));
    }

    pub fn push_title(&self, title: impl Into<String>) {
        let title = title.into();
        lock(&self.slot).title = title.clone();
        self.notify(&PushEvent::Title(title));
    }

    // ─────────────────────────────────────────────────────────────────────
    // User Side
    // ─────────────────────────────────────────────────────────────────────

    /// Record a user edit. Returns false if the action is not editable.
    ///
    /// Edits are local; push subscribers are not notified.
    pub fn edit(&self, value: Option<T>) -> bool {
        let mut slot = lock(&self.slot);
        if !slot.state_id.is_editable() {
            return false;
        }
        slot.value = value;
        slot.edited = true;
        true
    }

    /// Adopt a value as authoritative.
    ///
    /// An absent value is rejected while a value is required, leaving value
    /// and edited flag untouched. An accepted commit supersedes any push held
    /// during the edit.
    pub fn commit_value(
        &self,
        value: Option<T>,
        commit_type: UiActionCommitTypeId,
    ) -> CommitOutcome {
        {
            let mut slot = lock(&self.slot);
            if value.is_none() && slot.value_required {
                tracing::debug!(%commit_type, "commit rejected: value required");
                return CommitOutcome::Rejected;
            }
            slot.value = value.clone();
            slot.base_value = value.clone();
            slot.edited = false;
            if slot.pending_push.take().is_some() {
                tracing::debug!("pending push superseded by commit");
            }
        }

        let handlers: Vec<CommitHandler<T>> =
            lock(&self.commit_handlers).values().cloned().collect();
        for handler in handlers {
            handler(value.as_ref(), commit_type);
        }
        CommitOutcome::Accepted
    }

    /// Abandon the local edit. The held push is applied if there is one,
    /// otherwise the last authoritative value is restored. Returns false if
    /// there was no edit.
    pub fn discard_edit(&self) -> bool {
        let restored = {
            let mut slot = lock(&self.slot);
            if !slot.edited {
                return false;
            }
            if let Some(pushed) = slot.pending_push.take() {
                slot.base_value = pushed;
            }
            slot.value = slot.base_value.clone();
            slot.edited = false;
            slot.value.clone()
        };

        self.notify(&PushEvent::Value {
            value: restored,
            edited: false,
        });
        true
    }

    // ─────────────────────────────────────────────────────────────────────
    // Subscriptions
    // ─────────────────────────────────────────────────────────────────────

    /// Register a push-event handler.
    pub fn subscribe(&self, handler: PushHandler<T>) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        lock(&self.subscribers).insert(id, handler);
        id
    }

    /// Remove a push-event handler and the commit handler attached to the same
    /// subscription. Returns false if the id was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        lock(&self.commit_handlers).remove(&id);
        lock(&self.subscribers).remove(&id).is_some()
    }

    pub fn subscriber_count(&self) -> usize {
        lock(&self.subscribers).len()
    }

    /// Install or clear the commit handler of a live subscription.
    ///
    /// Returns false, installing nothing, if the subscription is not registered.
    pub fn set_commit_handler(
        &self,
        id: SubscriptionId,
        handler: Option<CommitHandler<T>>,
    ) -> bool {
        if !lock(&self.subscribers).contains_key(&id) {
            return false;
        }
        let mut handlers = lock(&self.commit_handlers);
        match handler {
            Some(handler) => {
                handlers.insert(id, handler);
            }
            None => {
                handlers.remove(&id);
            }
        }
        true
    }

    fn notify(&self, event: &PushEvent<T>) {
        let handlers: Vec<PushHandler<T>> = lock(&self.subscribers).values().cloned().collect();
        for handler in handlers {
            handler(event);
        }
    }
}

impl<T> fmt::Debug for UiAction<T>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slot = lock(&self.slot);
        f.debug_struct("UiAction")
            .field("value", &slot.value)
            .field("edited", &slot.edited)
            .field("value_required", &slot.value_required)
            .field("state_id", &slot.state_id)
            .field("pending_push", &slot.pending_push)
            .finish()
    }
}

/// Convenience for building a shared action.
pub fn shared<T>(action: UiAction<T>) -> Arc<UiAction<T>> {
    Arc::new(action)
}
