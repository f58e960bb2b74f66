//! Component/Control Factory & Lifecycle Tracker
//!
//! Creates UI objects on behalf of an extension and tracks them so the host
//! can tear everything down when the extension unloads.

pub mod component;
pub mod content;
pub mod controls;
mod service;
mod tracker;

pub use component::{
    AttachmentPoint, AttachmentRoot, ComponentId, ComponentKind, ContentComponent,
    ControlComponent, Teardown, TeardownError, UiActionCapable,
};
pub use content::{GridContent, GridOptions, LabelContent, LabelOptions};
pub use controls::{
    ButtonControl, CheckboxControl, Control, ControlOptions, DateInputControl,
    IntegerInputControl, NumberInputControl, TextInputControl,
};
pub use service::{ContentFactory, ControlsFactory};
pub use tracker::{LifecycleTracker, TeardownReport};
