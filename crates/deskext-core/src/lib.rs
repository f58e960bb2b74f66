//! deskext-core - Host-internal domain for the extension boundary
//!
//! This crate holds the host's own vocabulary, which the SDK translates for
//! extension code:
//!
//! - **handle**: Extension handles and their allocation
//! - **types**: Internal enumerations and identity objects
//! - **command**: Extension-declared commands and the host command register
//! - **ui_action**: Interactive value holders with push/commit protocol

pub mod command;
pub mod error;
pub mod handle;
pub mod types;
pub mod ui_action;

// Re-export commonly used types
pub use command::{Command, CommandRegister, MenuBarItemPosition};
pub use error::{Error, Result};
pub use handle::{ExtensionHandle, HandleAllocator};
pub use types::{
    CorrectnessId, ExtStringId, ExtensionInfo, OrderSideId, PublisherTypeId,
    TradingEnvironmentId, UiActionCommitTypeId, UiActionStateId,
};
pub use ui_action::{
    CommitOutcome, EditPushPolicy, PushEvent, PushOutcome, SubscriptionId, UiAction, ValueState,
};
