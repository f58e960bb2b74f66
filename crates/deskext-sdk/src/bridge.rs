//! UiAction Bridge
//!
//! Exposes a host [`UiAction`] to extension code. A bridge is bound to at most
//! one action at a time; the binding owns exactly one push subscription and
//! the commit handler attached to it, held by a [`SubscriptionGuard`] and
//! released when the guard drops. That
//! covers rebinding, explicit unbinding, component teardown and unwinding
//! out of a failed operation alike.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use deskext_core::ui_action::{CommitHandler, PushHandler};
use deskext_core::{
    CommitOutcome, PushEvent, PushOutcome, SubscriptionId, UiAction, UiActionCommitTypeId,
    ValueState,
};

use crate::api::{ApiError, ApiMapping, ApiResult, ErrorCode};

type ListenerSlot<H> = Arc<Mutex<Option<H>>>;

fn lock<V>(mutex: &Mutex<V>) -> MutexGuard<'_, V> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Owns one subscription on a UiAction for the lifetime of a binding.
pub struct SubscriptionGuard<T>
where
    T: Clone + Send + Sync + 'static,
{
    action: Arc<UiAction<T>>,
    id: SubscriptionId,
}

impl<T> SubscriptionGuard<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn id(&self) -> SubscriptionId {
        self.id
    }
}

impl<T> Drop for SubscriptionGuard<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn drop(&mut self) {
        if !self.action.unsubscribe(self.id) {
            tracing::warn!(subscription = %self.id, "subscription already released");
        }
        tracing::trace!(subscription = %self.id, "binding released");
    }
}

/// Extension-facing wrapper around a UiAction.
pub struct UiActionBridge<T>
where
    T: Clone + Send + Sync + 'static,
{
    binding: Option<SubscriptionGuard<T>>,
    push_listener: ListenerSlot<PushHandler<T>>,
    commit_listener: ListenerSlot<CommitHandler<T>>,
}

impl<T> Default for UiActionBridge<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self {
            binding: None,
            push_listener: Arc::new(Mutex::new(None)),
            commit_listener: Arc::new(Mutex::new(None)),
        }
    }
}

impl<T> UiActionBridge<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create an unbound bridge.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a bridge bound to `action`.
    pub fn bound_to(action: Arc<UiAction<T>>) -> Self {
        let mut bridge = Self::new();
        bridge.bind(action);
        bridge
    }

    /// Bind to an action, releasing any previous binding first.
    pub fn bind(&mut self, action: Arc<UiAction<T>>) {
        self.binding = None;

        let push_listener = self.push_listener.clone();
        let id = action.subscribe(Arc::new(move |event: &PushEvent<T>| {
            let listener = lock(&push_listener).clone();
            if let Some(listener) = listener {
                listener(event);
            }
        }));

        let commit_listener = self.commit_listener.clone();
        action.set_commit_handler(
            id,
            Some(Arc::new(
                move |value: Option<&T>, commit_type: UiActionCommitTypeId| {
                    let listener = lock(&commit_listener).clone();
                    if let Some(listener) = listener {
                        listener(value, commit_type);
                    }
                },
            )),
        );

        self.binding = Some(SubscriptionGuard { action, id });
    }

    /// End the current binding. Returns false if the bridge was not bound.
    pub fn unbind(&mut self) -> bool {
        self.binding.take().is_some()
    }

    pub fn is_bound(&self) -> bool {
        self.binding.is_some()
    }

    /// Subscription held by the current binding.
    pub fn subscription(&self) -> Option<SubscriptionId> {
        self.binding.as_ref().map(SubscriptionGuard::id)
    }

    /// Extension listener for host pushes. Survives rebinding.
    pub fn set_push_listener(&self, listener: Option<PushHandler<T>>) {
        *lock(&self.push_listener) = listener;
    }

    /// Extension listener for accepted commits. Survives rebinding.
    pub fn set_commit_listener(&self, listener: Option<CommitHandler<T>>) {
        *lock(&self.commit_listener) = listener;
    }

    fn action(&self) -> ApiResult<&Arc<UiAction<T>>> {
        self.binding
            .as_ref()
            .map(|binding| &binding.action)
            .ok_or_else(ApiError::component_destroyed)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Extension Surface
    // ─────────────────────────────────────────────────────────────────────

    pub fn value(&self) -> ApiResult<Option<T>> {
        Ok(self.action()?.value())
    }

    pub fn edited(&self) -> ApiResult<bool> {
        Ok(self.action()?.edited())
    }

    pub fn value_required(&self) -> ApiResult<bool> {
        Ok(self.action()?.value_required())
    }

    pub fn value_state(&self) -> ApiResult<ValueState> {
        Ok(self.action()?.value_state())
    }

    /// Presentation state as its API name.
    pub fn state_api(&self) -> ApiResult<&'static str> {
        Ok(self.action()?.state_id().to_api())
    }

    /// Commit a value with an API commit type name.
    ///
    /// Rejected commits report [`ErrorCode::ValueRequired`] and leave the
    /// action untouched.
    pub fn commit_value(&self, value: Option<T>, commit_type: &str) -> ApiResult<()> {
        let commit_type = UiActionCommitTypeId::from_api(commit_type)?;
        match self.action()?.commit_value(value, commit_type) {
            CommitOutcome::Accepted => Ok(()),
            CommitOutcome::Rejected => Err(ApiError::new(
                ErrorCode::ValueRequired,
                "a value is required",
            )),
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Host Surface
    // ─────────────────────────────────────────────────────────────────────

    /// Push a host value through the bound action.
    pub fn push_value(&self, value: Option<T>) -> ApiResult<PushOutcome> {
        Ok(self.action()?.push_value(value))
    }

    /// Forward a user edit from host UI glue.
    pub fn edit(&self, value: Option<T>) -> ApiResult<bool> {
        Ok(self.action()?.edit(value))
    }

    pub fn discard_edit(&self) -> ApiResult<bool> {
        Ok(self.action()?.discard_edit())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deskext_core::ui_action::IntegerUiAction;
    use std::panic::{AssertUnwindSafe, catch_unwind};

    fn action() -> Arc<IntegerUiAction> {
        Arc::new(IntegerUiAction::new(true))
    }

    #[test]
    fn test_bind_holds_one_subscription() {
        let a = action();
        let bridge = UiActionBridge::bound_to(a.clone());
        assert!(bridge.is_bound());
        assert_eq!(a.subscriber_count(), 1);
    }

    #[test]
    fn test_rebind_releases_previous() {
        let a = action();
        let b = action();
        let mut bridge = UiActionBridge::bound_to(a.clone());

        bridge.bind(b.clone());
        assert_eq!(a.subscriber_count(), 0);
        assert_eq!(b.subscriber_count(), 1);
    }

    #[test]
    fn test_unbind_and_drop_release() {
        let a = action();
        let mut bridge = UiActionBridge::bound_to(a.clone());
        assert!(bridge.unbind());
        assert_eq!(a.subscriber_count(), 0);
        assert!(!bridge.unbind());

        let b = action();
        {
            let _bridge = UiActionBridge::bound_to(b.clone());
            assert_eq!(b.subscriber_count(), 1);
        }
        assert_eq!(b.subscriber_count(), 0);
    }

    #[test]
    fn test_release_on_unwind() {
        let a = action();
        let held = a.clone();
        let result = catch_unwind(AssertUnwindSafe(move || {
            let _bridge = UiActionBridge::bound_to(held);
            panic!("extension callback failed");
        }));
        assert!(result.is_err());
        assert_eq!(a.subscriber_count(), 0);
    }

    #[test]
    fn test_push_reaches_listener_until_unbound() {
        let a = action();
        let mut bridge = UiActionBridge::bound_to(a.clone());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        bridge.set_push_listener(Some(Arc::new(move |event: &PushEvent<i64>| {
            if let PushEvent::Value { value, edited } = event {
                sink.lock().unwrap().push((*value, *edited));
            }
        })));

        a.push_value(Some(10));
        bridge.unbind();
        a.push_value(Some(11));

        assert_eq!(*seen.lock().unwrap(), vec![(Some(10), false)]);
    }

    #[test]
    fn test_commit_via_api_names() {
        let a = action();
        let bridge = UiActionBridge::bound_to(a.clone());
        a.push_value(Some(1));
        bridge.edit(Some(2)).unwrap();

        let err = bridge.commit_value(None, "Explicit").unwrap_err();
        assert_eq!(err.code, ErrorCode::ValueRequired);
        assert_eq!(bridge.value().unwrap(), Some(2));
        assert!(bridge.edited().unwrap());

        let err = bridge.commit_value(Some(2), "Eventually").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidUiActionCommitTypeId);

        bridge.commit_value(Some(2), "Implicit").unwrap();
        assert_eq!(bridge.value_state().unwrap(), ValueState::SetClean);
        assert_eq!(bridge.state_api().unwrap(), "Valid");
    }

    #[test]
    fn test_commit_listener_forwarded() {
        let a = action();
        let bridge = UiActionBridge::bound_to(a.clone());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        bridge.set_commit_listener(Some(Arc::new(
            move |value: Option<&i64>, kind: UiActionCommitTypeId| {
                sink.lock().unwrap().push((value.copied(), kind));
            },
        )));

        bridge.commit_value(Some(5), "Explicit").unwrap();
        assert_eq!(
            *seen.lock().unwrap(),
            vec![(Some(5), UiActionCommitTypeId::Explicit)]
        );
    }

    #[test]
    fn test_unbound_reports_destroyed() {
        let bridge: UiActionBridge<i64> = UiActionBridge::new();
        assert_eq!(bridge.value().unwrap_err().code, ErrorCode::ComponentDestroyed);
        assert_eq!(
            bridge.commit_value(Some(1), "Explicit").unwrap_err().code,
            ErrorCode::ComponentDestroyed
        );
    }

    fn commit_sink(bridge: &UiActionBridge<i64>) -> Arc<Mutex<Vec<Option<i64>>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        bridge.set_commit_listener(Some(Arc::new(
            move |value: Option<&i64>, _: UiActionCommitTypeId| {
                sink.lock().unwrap().push(value.copied());
            },
        )));
        seen
    }

    #[test]
    fn test_shared_action_keeps_each_commit_listener() {
        let a = action();
        let first = UiActionBridge::bound_to(a.clone());
        let mut second = UiActionBridge::bound_to(a.clone());
        let first_seen = commit_sink(&first);
        let second_seen = commit_sink(&second);

        first.commit_value(Some(1), "Explicit").unwrap();
        second.unbind();
        first.commit_value(Some(2), "Explicit").unwrap();

        assert_eq!(*first_seen.lock().unwrap(), vec![Some(1), Some(2)]);
        assert_eq!(*second_seen.lock().unwrap(), vec![Some(1)]);
        assert_eq!(a.subscriber_count(), 1);
    }
}
