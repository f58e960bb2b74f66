//! Internal defect signal.
//!
//! A defect means the host is out of sync with its own type definitions, for
//! example a raw discriminant with no variant behind it, or a component found
//! in two owning collections. Defects are never reported to extensions as
//! errors; they are logged and then abort the current operation with a panic.

use std::fmt;

use thiserror::Error;

/// Payload of an internal defect.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("internal defect {code}: {detail}")]
pub struct InternalDefect {
    /// Stable code identifying the failing site
    pub code: &'static str,
    pub detail: String,
}

/// Log and raise an internal defect.
#[track_caller]
pub fn internal_defect(code: &'static str, detail: impl fmt::Display) -> ! {
    let defect = InternalDefect {
        code,
        detail: detail.to_string(),
    };
    tracing::error!(code, detail = %defect.detail, "internal defect");
    panic!("{defect}")
}
