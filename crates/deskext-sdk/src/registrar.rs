//! Extension Registrar
//!
//! Contributions an extension declares while it boots are queued here and
//! drained by the host in one batch, before menus and commands are built.

use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

use crate::api::CommandApi;

/// A contribution declared by an extension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RegistrationRequest {
    Command(CommandApi),
}

/// FIFO queue of pending registration requests.
#[derive(Debug)]
pub struct Registrar<R> {
    pending: Mutex<Vec<R>>,
}

impl<R> Default for Registrar<R> {
    fn default() -> Self {
        Self {
            pending: Mutex::new(Vec::new()),
        }
    }
}

impl<R> Registrar<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a request.
    pub fn register(&self, request: R) {
        self.pending().push(request);
    }

    /// Take every request queued since the last extraction, in order.
    pub fn extract_requests(&self) -> Vec<R> {
        std::mem::take(&mut *self.pending())
    }

    /// Drop undrained requests. Returns how many were dropped.
    pub fn discard_pending(&self) -> usize {
        let dropped = self.extract_requests().len();
        if dropped > 0 {
            tracing::debug!(dropped, "discarded pending registrations");
        }
        dropped
    }

    pub fn pending_len(&self) -> usize {
        self.pending().len()
    }

    fn pending(&self) -> MutexGuard<'_, Vec<R>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Registrar<RegistrationRequest> {
    /// Queue a command declaration.
    pub fn register_command(&self, command: CommandApi) {
        self.register(RegistrationRequest::Command(command));
    }
}
