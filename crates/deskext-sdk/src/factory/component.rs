//! Capability contracts of factory-created objects.
//!
//! Capabilities are small independent traits. A content component is anything
//! with an attachment root that can be torn down; a control additionally
//! carries a UiAction. Implementors get the composite traits for free.

use std::fmt;
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use deskext_core::ValueState;

use crate::api::ApiResult;

/// Identity of one created component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentId(Uuid);

impl ComponentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ComponentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of a created component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    Label,
    Grid,
    Button,
    Checkbox,
    IntegerInput,
    NumberInput,
    TextInput,
    DateInput,
    /// Supplied by host glue rather than a built-in factory method
    External,
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComponentKind::Label => write!(f, "label"),
            ComponentKind::Grid => write!(f, "grid"),
            ComponentKind::Button => write!(f, "button"),
            ComponentKind::Checkbox => write!(f, "checkbox"),
            ComponentKind::IntegerInput => write!(f, "integer_input"),
            ComponentKind::NumberInput => write!(f, "number_input"),
            ComponentKind::TextInput => write!(f, "text_input"),
            ComponentKind::DateInput => write!(f, "date_input"),
            ComponentKind::External => write!(f, "external"),
        }
    }
}

/// Detaches a component from the collection that owns it.
pub(crate) type ReleaseHook = Box<dyn FnOnce(ComponentId) + Send>;

/// The renderable root host glue attaches to its layout.
///
/// The root also carries the link back to the owning tracker, so a component
/// destroyed through its own [`Teardown::destroy`] leaves its collection the
/// same way as one destroyed through the factory.
pub struct AttachmentRoot {
    pub id: ComponentId,
    pub kind: ComponentKind,
    owner: Mutex<Option<ReleaseHook>>,
}

impl AttachmentRoot {
    pub fn new(kind: ComponentKind) -> Self {
        Self {
            id: ComponentId::new(),
            kind,
            owner: Mutex::new(None),
        }
    }

    pub(crate) fn attach_owner(&self, hook: ReleaseHook) {
        *self.owner.lock().unwrap_or_else(PoisonError::into_inner) = Some(hook);
    }

    /// Leave the owning collection. Runs at most once; later calls and calls
    /// on an untracked root do nothing.
    pub fn release(&self) {
        let hook = self
            .owner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(hook) = hook {
            hook(self.id);
        }
    }

    pub fn is_owned(&self) -> bool {
        self.owner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

impl fmt::Debug for AttachmentRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttachmentRoot")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("owned", &self.is_owned())
            .finish()
    }
}

/// Failure while tearing a component down.
#[derive(Debug, Clone, Error)]
#[error("teardown of {component} failed: {message}")]
pub struct TeardownError {
    pub component: ComponentId,
    pub message: String,
}

impl TeardownError {
    pub fn new(component: ComponentId, message: impl Into<String>) -> Self {
        Self {
            component,
            message: message.into(),
        }
    }
}

/// Has a renderable root.
pub trait AttachmentPoint {
    fn root(&self) -> &AttachmentRoot;

    fn id(&self) -> ComponentId {
        self.root().id
    }
}

/// Can be torn down. Tearing down twice must be harmless.
///
/// Implementations call [`AttachmentRoot::release`] so that a direct
/// `destroy` also removes the component from its tracker.
pub trait Teardown {
    fn destroy(&self) -> Result<(), TeardownError>;

    fn is_destroyed(&self) -> bool;
}

/// Carries an interactive value.
pub trait UiActionCapable {
    fn value_state(&self) -> ApiResult<ValueState>;

    fn edited(&self) -> ApiResult<bool>;

    fn value_required(&self) -> ApiResult<bool>;

    /// Presentation state as its API name.
    fn state_api(&self) -> ApiResult<&'static str>;

    /// Current value in wire form.
    fn value_json(&self) -> ApiResult<serde_json::Value>;
}

/// Display-only component.
pub trait ContentComponent: AttachmentPoint + Teardown + Send + Sync {}

impl<C> ContentComponent for C where C: AttachmentPoint + Teardown + Send + Sync {}

/// Interactive component.
pub trait ControlComponent: AttachmentPoint + Teardown + UiActionCapable + Send + Sync {}

impl<C> ControlComponent for C where C: AttachmentPoint + Teardown + UiActionCapable + Send + Sync {}
