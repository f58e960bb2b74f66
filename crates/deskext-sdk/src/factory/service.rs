//! Factories handed to an extension at activation.
//!
//! Each `create_*` builds the object, appends it to the extension's
//! [`LifecycleTracker`] and returns it. Creation fails with
//! `ExtensionUnloaded` once the owning extension is gone.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::warn;

use deskext_core::{EditPushPolicy, UiAction};

use super::component::{ComponentId, ComponentKind};
use super::content::{GridContent, GridOptions, LabelContent, LabelOptions};
use super::controls::{
    ButtonControl, CheckboxControl, Control, ControlOptions, DateInputControl,
    IntegerInputControl, NumberInputControl, TextInputControl,
};
use super::tracker::LifecycleTracker;
use crate::api::ApiResult;
use crate::liveness::Liveness;

fn destroy_tracked(tracker: &LifecycleTracker, liveness: &Liveness, id: ComponentId) -> bool {
    if !liveness.is_alive() {
        // Unload already swept the tracker
        return false;
    }
    match tracker.destroy_component(id) {
        Ok(found) => found,
        Err(e) => {
            warn!(
                handle = %tracker.handle(),
                component = %id,
                error = %e.message,
                "teardown failed"
            );
            true
        }
    }
}

/// Creates display-only content.
#[derive(Debug, Clone)]
pub struct ContentFactory {
    tracker: Arc<LifecycleTracker>,
    liveness: Liveness,
}

impl ContentFactory {
    pub fn new(tracker: Arc<LifecycleTracker>, liveness: Liveness) -> Self {
        Self { tracker, liveness }
    }

    pub fn create_label(&self, options: LabelOptions) -> ApiResult<Arc<LabelContent>> {
        self.liveness.check()?;
        let label = Arc::new(LabelContent::new(options));
        self.tracker.track_component(label.clone());
        Ok(label)
    }

    pub fn create_grid(&self, options: GridOptions) -> ApiResult<Arc<GridContent>> {
        self.liveness.check()?;
        let grid = Arc::new(GridContent::new(options));
        self.tracker.track_component(grid.clone());
        Ok(grid)
    }

    /// Destroy one component. Unknown or already destroyed ids are ignored.
    pub fn destroy_component(&self, id: ComponentId) -> bool {
        destroy_tracked(&self.tracker, &self.liveness, id)
    }

    pub fn destroy_all_components(&self) -> super::TeardownReport {
        self.tracker.destroy_all_components()
    }
}

/// Creates interactive controls.
#[derive(Debug, Clone)]
pub struct ControlsFactory {
    tracker: Arc<LifecycleTracker>,
    liveness: Liveness,
    push_policy: EditPushPolicy,
}

impl ControlsFactory {
    pub fn new(
        tracker: Arc<LifecycleTracker>,
        liveness: Liveness,
        push_policy: EditPushPolicy,
    ) -> Self {
        Self {
            tracker,
            liveness,
            push_policy,
        }
    }

    /// Wrap an existing host action in a tracked control.
    pub fn create_control_for<T>(
        &self,
        kind: ComponentKind,
        action: Arc<UiAction<T>>,
    ) -> ApiResult<Arc<Control<T>>>
    where
        T: Clone + Send + Sync + Serialize + 'static,
    {
        self.liveness.check()?;
        let control = Arc::new(Control::new(kind, action));
        self.tracker.track_control(control.clone());
        Ok(control)
    }

    fn create<T>(
        &self,
        kind: ComponentKind,
        options: ControlOptions<T>,
    ) -> ApiResult<Arc<Control<T>>>
    where
        T: Clone + Send + Sync + Serialize + 'static,
    {
        let action = Arc::new(options.into_action(self.push_policy));
        self.create_control_for(kind, action)
    }

    pub fn create_button(&self, options: ControlOptions<bool>) -> ApiResult<Arc<ButtonControl>> {
        self.create(ComponentKind::Button, options)
    }

    pub fn create_checkbox(
        &self,
        options: ControlOptions<bool>,
    ) -> ApiResult<Arc<CheckboxControl>> {
        self.create(ComponentKind::Checkbox, options)
    }

    pub fn create_integer_input(
        &self,
        options: ControlOptions<i64>,
    ) -> ApiResult<Arc<IntegerInputControl>> {
        self.create(ComponentKind::IntegerInput, options)
    }

    pub fn create_number_input(
        &self,
        options: ControlOptions<f64>,
    ) -> ApiResult<Arc<NumberInputControl>> {
        self.create(ComponentKind::NumberInput, options)
    }

    pub fn create_text_input(
        &self,
        options: ControlOptions<String>,
    ) -> ApiResult<Arc<TextInputControl>> {
        self.create(ComponentKind::TextInput, options)
    }

    pub fn create_date_input(
        &self,
        options: ControlOptions<NaiveDate>,
    ) -> ApiResult<Arc<DateInputControl>> {
        self.create(ComponentKind::DateInput, options)
    }

    /// Destroy one control. Unknown or already destroyed ids are ignored.
    pub fn destroy_control(&self, id: ComponentId) -> bool {
        destroy_tracked(&self.tracker, &self.liveness, id)
    }

    pub fn destroy_all_controls(&self) -> super::TeardownReport {
        self.tracker.destroy_all_controls()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ErrorCode;
    use crate::factory::component::{AttachmentPoint, Teardown, UiActionCapable};
    use deskext_core::{ExtensionHandle, PushOutcome};

    fn factories(policy: EditPushPolicy) -> (ContentFactory, ControlsFactory, Liveness) {
        let tracker = Arc::new(LifecycleTracker::new(ExtensionHandle::new(0)));
        let liveness = Liveness::new();
        (
            ContentFactory::new(tracker.clone(), liveness.clone()),
            ControlsFactory::new(tracker, liveness.clone(), policy),
            liveness,
        )
    }

    #[test]
    fn test_create_and_destroy_content() {
        let (content, _, _) = factories(EditPushPolicy::default());
        let label = content
            .create_label(LabelOptions {
                caption: "Watchlist".into(),
            })
            .unwrap();
        assert!(content.destroy_component(label.id()));
        assert!(label.is_destroyed());
        assert!(!content.destroy_component(label.id()));
    }

    #[test]
    fn test_controls_use_configured_policy() {
        let (_, controls, _) = factories(EditPushPolicy::ApplyImmediately);
        let input = controls
            .create_integer_input(ControlOptions::captioned("Qty").with_value(100))
            .unwrap();
        input.action().edit(Some(150));
        assert_eq!(input.action().push_value(Some(200)), PushOutcome::Applied);
        assert_eq!(input.value().unwrap(), Some(200));
        assert!(!input.edited().unwrap());
    }

    #[test]
    fn test_create_after_unload_fails() {
        let (content, controls, liveness) = factories(EditPushPolicy::default());
        let date = controls
            .create_date_input(ControlOptions::captioned("Expiry"))
            .unwrap();
        liveness.revoke();

        let err = content.create_grid(GridOptions::default()).unwrap_err();
        assert_eq!(err.code, ErrorCode::ExtensionUnloaded);
        let err = controls
            .create_text_input(ControlOptions::default())
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ExtensionUnloaded);
        assert!(!controls.destroy_control(date.id()));
    }
}
