//! Liveness of a loaded extension.
//!
//! Deferred work started on behalf of an extension may finish after the
//! extension has unloaded. Every service handed to an extension carries a
//! clone of its [`Liveness`] token and checks it before applying a result.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::api::{ApiError, ApiResult};

/// Shared flag cleared when an extension unloads.
#[derive(Debug, Clone)]
pub struct Liveness {
    alive: Arc<AtomicBool>,
}

impl Liveness {
    pub fn new() -> Self {
        Self {
            alive: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    /// Mark the owner torn down. Every clone observes it.
    pub fn revoke(&self) {
        self.alive.store(false, Ordering::Release);
    }

    /// `Err(ExtensionUnloaded)` once revoked.
    pub fn check(&self) -> ApiResult<()> {
        if self.is_alive() {
            Ok(())
        } else {
            Err(ApiError::extension_unloaded())
        }
    }
}

impl Default for Liveness {
    fn default() -> Self {
        Self::new()
    }
}
