//! Extension handles and their allocation.
//!
//! A handle is the small integer the host assigns to an extension instance when
//! it starts. Handles index per-extension resource tables, so they are kept
//! dense: released handles are reused (lowest first) before fresh ones are
//! minted.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Opaque handle identifying a loaded extension instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtensionHandle(u32);

impl ExtensionHandle {
    /// Wrap a raw handle value.
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Raw handle value.
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Handle as an arena index.
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ExtensionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u32> for ExtensionHandle {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

/// Hands out extension handles.
///
/// A handle is never handed out twice while it is live. It only becomes
/// available again after [`HandleAllocator::release`].
#[derive(Debug, Default)]
pub struct HandleAllocator {
    next: u32,
    released: BTreeSet<u32>,
    live: BTreeSet<u32>,
}

impl HandleAllocator {
    /// Create an allocator whose first handle is 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a handle for a starting extension instance.
    pub fn allocate(&mut self) -> ExtensionHandle {
        let raw = match self.released.pop_first() {
            Some(raw) => raw,
            None => {
                let raw = self.next;
                self.next += 1;
                raw
            }
        };
        self.live.insert(raw);
        tracing::debug!(handle = raw, "allocated extension handle");
        ExtensionHandle(raw)
    }

    /// Release a handle once its instance has fully unloaded.
    pub fn release(&mut self, handle: ExtensionHandle) -> Result<()> {
        if !self.live.remove(&handle.0) {
            return Err(Error::UnknownHandle(handle));
        }
        self.released.insert(handle.0);
        tracing::debug!(handle = handle.0, "released extension handle");
        Ok(())
    }

    /// Whether the handle currently belongs to a loaded instance.
    pub fn is_live(&self, handle: ExtensionHandle) -> bool {
        self.live.contains(&handle.0)
    }

    /// Number of live handles.
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Live handles in ascending order.
    pub fn live_handles(&self) -> impl Iterator<Item = ExtensionHandle> + '_ {
        self.live.iter().copied().map(ExtensionHandle)
    }
}
