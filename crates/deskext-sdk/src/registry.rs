//! Resource/Handle Registry
//!
//! Per-extension resources live in a [`HandleArena`]: a dense vector indexed
//! by extension handle. Slots are never missing, only empty, so a stale
//! handle from an extension racing its own unload reads an empty value
//! instead of faulting.

use std::fmt;

use serde::{Deserialize, Serialize};

use deskext_core::ExtensionHandle;

/// Returned by [`StringRegistry::lookup_or_sentinel`] for a missing entry.
pub const NOT_FOUND_SENTINEL: &str = "?";

/// Arena of per-extension values indexed by handle.
#[derive(Debug, Clone)]
pub struct HandleArena<T> {
    slots: Vec<T>,
}

impl<T: Default> HandleArena<T> {
    /// Create an arena with `capacity` empty slots.
    pub fn with_capacity(capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, T::default);
        Self { slots }
    }

    /// Number of addressable slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Write a slot, growing the arena to at least twice the handle when the
    /// handle is beyond the current capacity.
    pub fn set(&mut self, handle: ExtensionHandle, value: T) {
        let index = handle.index();
        if index >= self.slots.len() {
            let grown = (index * 2).max(index + 1);
            tracing::debug!(from = self.slots.len(), to = grown, "growing handle arena");
            self.slots.resize_with(grown, T::default);
        }
        self.slots[index] = value;
    }

    /// Read a slot. `None` only when the handle is beyond capacity.
    pub fn get(&self, handle: ExtensionHandle) -> Option<&T> {
        self.slots.get(handle.index())
    }

    /// Replace a slot with its empty value.
    pub fn reset(&mut self, handle: ExtensionHandle) {
        if let Some(slot) = self.slots.get_mut(handle.index()) {
            *slot = T::default();
        }
    }
}

impl<T: Default> Default for HandleArena<T> {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

/// Ordered, immutable sequence of strings owned by one extension.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StringTable {
    strings: Vec<String>,
}

impl StringTable {
    pub fn new(strings: Vec<String>) -> Self {
        Self { strings }
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.strings.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.strings.iter().map(String::as_str)
    }
}

impl From<Vec<String>> for StringTable {
    fn from(strings: Vec<String>) -> Self {
        Self::new(strings)
    }
}

impl<'a> From<&[&'a str]> for StringTable {
    fn from(strings: &[&'a str]) -> Self {
        Self::new(strings.iter().map(|s| s.to_string()).collect())
    }
}

/// Localized string tables of all loaded extensions.
#[derive(Default)]
pub struct StringRegistry {
    tables: HandleArena<StringTable>,
}

impl StringRegistry {
    pub fn new(initial_capacity: usize) -> Self {
        Self {
            tables: HandleArena::with_capacity(initial_capacity),
        }
    }

    /// Replace an extension's table.
    pub fn set_item(&mut self, handle: ExtensionHandle, table: StringTable) {
        self.tables.set(handle, table);
    }

    /// Empty an extension's table.
    pub fn clear(&mut self, handle: ExtensionHandle) {
        self.tables.reset(handle);
    }

    /// Look up a string. Never fails on unknown handles or indexes.
    pub fn lookup(&self, handle: ExtensionHandle, index: usize) -> Option<&str> {
        self.tables.get(handle).and_then(|table| table.get(index))
    }

    /// Look up a string, falling back to [`NOT_FOUND_SENTINEL`].
    pub fn lookup_or_sentinel(&self, handle: ExtensionHandle, index: usize) -> &str {
        self.lookup(handle, index).unwrap_or(NOT_FOUND_SENTINEL)
    }

    /// Number of strings an extension has registered.
    pub fn table_len(&self, handle: ExtensionHandle) -> usize {
        self.tables.get(handle).map_or(0, StringTable::len)
    }

    pub fn capacity(&self) -> usize {
        self.tables.capacity()
    }
}

impl fmt::Debug for StringRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StringRegistry")
            .field("capacity", &self.tables.capacity())
            .finish()
    }
}
