//! # Inbound Ports
//!
//! The API the verification job exposes to its host: the periodic tick, the
//! response entry point, and the cross-thread release handle.

use crate::domain::ProofResponse;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cross-thread teardown intent.
///
/// Any thread may call [`release`](ReleaseHandle::release); it only sets a
/// flag and returns. The worker that owns the job observes the flag at the
/// top of its next tick and performs the actual teardown there, so job-owned
/// state is never touched from a foreign thread.
#[derive(Clone, Debug, Default)]
pub struct ReleaseHandle(Arc<AtomicBool>);

impl ReleaseHandle {
    /// Create a fresh, unreleased handle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request teardown. Safe from any thread; returns immediately.
    pub fn release(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Has teardown been requested?
    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Proof verification job - inbound port.
#[async_trait]
pub trait ProofVerification: Send {
    /// One scheduler pass: scan unverified transactions, issue proof
    /// requests, detect reorganizations. Invoked on a fixed cadence by the
    /// hosting worker. Never fails; all errors are logged and absorbed.
    async fn tick(&mut self);

    /// Handle a completed proof request delivered by the transport. Invoked
    /// on the same worker as `tick`. Never fails.
    async fn on_proof_response(&mut self, response: ProofResponse);

    /// `true` iff no proof requests are outstanding.
    fn is_up_to_date(&self) -> bool;

    /// Has the job been torn down? Once `true`, `tick` is a no-op and
    /// responses are ignored.
    fn is_released(&self) -> bool;

    /// Handle for requesting teardown from another thread.
    fn release_handle(&self) -> ReleaseHandle;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_handle_starts_unreleased() {
        let handle = ReleaseHandle::new();
        assert!(!handle.is_requested());
    }

    #[test]
    fn test_release_handle_clones_share_state() {
        let handle = ReleaseHandle::new();
        let clone = handle.clone();
        clone.release();
        assert!(handle.is_requested());
    }
}
