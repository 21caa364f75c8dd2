//! Propagation gate
//!
//! A per-container flag deciding whether wrapped mutations publish. Callers
//! close it for a scope with [`PropagationGate::suspend`]; the guard releases
//! its suspension when dropped, whether the scope returns, fails, unwinds or
//! (for async callers) is cancelled.
//!
//! The gate counts open suspensions and is open only at depth zero, so
//! leaving an inner scope never reopens it while an outer scope is active.
//! Suspensions from concurrent replays may overlap in any order.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Whether wrapped mutations are currently broadcast.
#[derive(Debug, Default)]
pub struct PropagationGate {
    depth: AtomicUsize,
}

impl PropagationGate {
    /// Create an open gate.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether mutations currently publish.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.depth.load(Ordering::SeqCst) == 0
    }

    /// Close the gate until the returned guard is dropped.
    #[must_use = "the gate reopens as soon as the guard is dropped"]
    pub fn suspend(&self) -> SuspendGuard<'_> {
        let prior = self.depth.fetch_add(1, Ordering::SeqCst) == 0;
        SuspendGuard { gate: self, prior }
    }

    /// Run `action` with the gate closed.
    pub fn with_suspended<R>(&self, action: impl FnOnce() -> R) -> R {
        let _guard = self.suspend();
        action()
    }
}

/// Scope of a gate suspension.
#[derive(Debug)]
pub struct SuspendGuard<'a> {
    gate: &'a PropagationGate,
    prior: bool,
}

impl SuspendGuard<'_> {
    /// Whether the gate was open when this suspension began.
    #[must_use]
    pub fn prior(&self) -> bool {
        self.prior
    }
}

impl Drop for SuspendGuard<'_> {
    fn drop(&mut self) {
        self.gate.depth.fetch_sub(1, Ordering::SeqCst);
    }
}
