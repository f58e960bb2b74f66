//! Lifecycle Tracker
//!
//! Owns every component and control created for one extension. Each object
//! lives in exactly one owning collection until it is destroyed, whether
//! through the tracker or through its own `destroy`; bulk teardown empties the
//! collections and keeps going past individual failures.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use deskext_core::ExtensionHandle;

use super::component::{
    AttachmentPoint, ComponentId, ContentComponent, ControlComponent, ReleaseHook, TeardownError,
};
use crate::defect::internal_defect;

fn lock<V>(mutex: &Mutex<V>) -> MutexGuard<'_, V> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Outcome of a bulk teardown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeardownReport {
    pub destroyed: usize,
    pub failed: Vec<(ComponentId, String)>,
}

impl TeardownReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    /// Number of objects swept, failed or not.
    pub fn total(&self) -> usize {
        self.destroyed + self.failed.len()
    }

    pub fn merge(mut self, other: TeardownReport) -> Self {
        self.destroyed += other.destroyed;
        self.failed.extend(other.failed);
        self
    }
}

/// Run one teardown, turning a panic into a [`TeardownError`].
fn guarded_destroy(
    id: ComponentId,
    destroy: impl FnOnce() -> Result<(), TeardownError>,
) -> Result<(), TeardownError> {
    match catch_unwind(AssertUnwindSafe(destroy)) {
        Ok(result) => result,
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "teardown panicked".to_string());
            Err(TeardownError::new(id, message))
        }
    }
}

type Collection<C> = Arc<Mutex<Vec<Arc<C>>>>;

/// Hook that drops a component from `owner` when it destroys itself.
fn release_from<C>(handle: ExtensionHandle, owner: Weak<Mutex<Vec<Arc<C>>>>) -> ReleaseHook
where
    C: AttachmentPoint + Send + Sync + ?Sized + 'static,
{
    Box::new(move |id| {
        let Some(collection) = owner.upgrade() else {
            return;
        };
        let removed = {
            let mut items = lock(&collection);
            items
                .iter()
                .position(|c| c.id() == id)
                .map(|index| items.remove(index))
        };
        if removed.is_some() {
            debug!(
                handle = %handle,
                component = %id,
                "component released by its own teardown"
            );
        }
    })
}

/// Tracks the live components and controls of one extension.
pub struct LifecycleTracker {
    handle: ExtensionHandle,
    components: Collection<dyn ContentComponent>,
    controls: Collection<dyn ControlComponent>,
    log_unknown_destroy: bool,
}

impl LifecycleTracker {
    pub fn new(handle: ExtensionHandle) -> Self {
        Self {
            handle,
            components: Arc::new(Mutex::new(Vec::new())),
            controls: Arc::new(Mutex::new(Vec::new())),
            log_unknown_destroy: false,
        }
    }

    /// Log destroy requests for ids the tracker does not hold.
    pub fn with_unknown_destroy_logging(mut self, enabled: bool) -> Self {
        self.log_unknown_destroy = enabled;
        self
    }

    pub fn handle(&self) -> ExtensionHandle {
        self.handle
    }

    fn assert_untracked(&self, id: ComponentId) {
        let in_components = lock(&self.components).iter().any(|c| c.id() == id);
        let in_controls = lock(&self.controls).iter().any(|c| c.id() == id);
        if in_components || in_controls {
            internal_defect(
                "LCT0001",
                format!("component {id} already tracked for extension {}", self.handle),
            );
        }
    }

    /// Add a content component to the owning collection.
    pub fn track_component(&self, component: Arc<dyn ContentComponent>) {
        let id = component.id();
        self.assert_untracked(id);
        component
            .root()
            .attach_owner(release_from(self.handle, Arc::downgrade(&self.components)));
        lock(&self.components).push(component);
        debug!(handle = %self.handle, component = %id, "component tracked");
    }

    /// Add a control to the owning collection.
    pub fn track_control(&self, control: Arc<dyn ControlComponent>) {
        let id = control.id();
        self.assert_untracked(id);
        control
            .root()
            .attach_owner(release_from(self.handle, Arc::downgrade(&self.controls)));
        lock(&self.controls).push(control);
        debug!(handle = %self.handle, control = %id, "control tracked");
    }

    pub fn contains(&self, id: ComponentId) -> bool {
        lock(&self.components).iter().any(|c| c.id() == id)
            || lock(&self.controls).iter().any(|c| c.id() == id)
    }

    pub fn component_count(&self) -> usize {
        lock(&self.components).len()
    }

    pub fn control_count(&self) -> usize {
        lock(&self.controls).len()
    }

    pub fn is_empty(&self) -> bool {
        self.component_count() == 0 && self.control_count() == 0
    }

    /// Remove and tear down one object.
    ///
    /// Returns `Ok(false)` when the id is unknown or already destroyed. The
    /// object is removed even if its teardown fails.
    pub fn destroy_component(&self, id: ComponentId) -> Result<bool, TeardownError> {
        let component = {
            let mut components = lock(&self.components);
            components
                .iter()
                .position(|c| c.id() == id)
                .map(|index| components.remove(index))
        };
        if let Some(component) = component {
            guarded_destroy(id, || component.destroy())?;
            debug!(handle = %self.handle, component = %id, "component destroyed");
            return Ok(true);
        }

        let control = {
            let mut controls = lock(&self.controls);
            controls
                .iter()
                .position(|c| c.id() == id)
                .map(|index| controls.remove(index))
        };
        if let Some(control) = control {
            guarded_destroy(id, || control.destroy())?;
            debug!(handle = %self.handle, control = %id, "control destroyed");
            return Ok(true);
        }

        if self.log_unknown_destroy {
            debug!(
                handle = %self.handle,
                component = %id,
                "destroy of untracked component ignored"
            );
        }
        Ok(false)
    }

    /// Destroy every content component and empty the collection.
    pub fn destroy_all_components(&self) -> TeardownReport {
        let drained = std::mem::take(&mut *lock(&self.components));
        let mut report = TeardownReport::default();
        for component in drained {
            let id = component.id();
            self.record(&mut report, id, guarded_destroy(id, || component.destroy()));
        }
        report
    }

    /// Destroy every control and empty the collection.
    pub fn destroy_all_controls(&self) -> TeardownReport {
        let drained = std::mem::take(&mut *lock(&self.controls));
        let mut report = TeardownReport::default();
        for control in drained {
            let id = control.id();
            self.record(&mut report, id, guarded_destroy(id, || control.destroy()));
        }
        report
    }

    /// Destroy everything this tracker owns.
    pub fn destroy_all(&self) -> TeardownReport {
        let report = self
            .destroy_all_controls()
            .merge(self.destroy_all_components());
        debug!(
            handle = %self.handle,
            destroyed = report.destroyed,
            failed = report.failed.len(),
            "tracker emptied"
        );
        report
    }

    fn record(
        &self,
        report: &mut TeardownReport,
        id: ComponentId,
        result: Result<(), TeardownError>,
    ) {
        match result {
            Ok(()) => report.destroyed += 1,
            Err(e) => {
                warn!(
                    handle = %self.handle,
                    component = %id,
                    error = %e.message,
                    "teardown failed"
                );
                report.failed.push((id, e.message));
            }
        }
    }
}

impl std::fmt::Debug for LifecycleTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleTracker")
            .field("handle", &self.handle)
            .field("components", &self.component_count())
            .field("controls", &self.control_count())
            .finish()
    }
}
