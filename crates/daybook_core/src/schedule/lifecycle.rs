//! Host-lifetime guard for asynchronous dispatch work.
//!
//! # Responsibility
//! - Let the dispatcher signal "async work in flight" to the embedding
//!   host, which may otherwise tear the process down the moment the
//!   firing callback returns.
//!
//! # Invariants
//! - A token is released exactly once, on every exit path: explicitly via
//!   `release()`, or by `Drop` when the holding future is cancelled or
//!   unwinds.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Seam to the embedding host's keep-alive mechanism.
pub trait DispatchLifecycle: Send + Sync {
    /// Must be called before starting async work from a firing callback.
    fn begin_async_work(&self) -> CompletionToken;
}

/// Guard holding the host alive until released or dropped.
pub struct CompletionToken {
    on_release: Option<Box<dyn FnOnce() + Send>>,
}

impl CompletionToken {
    /// Token invoking `on_release` exactly once when released or dropped.
    pub fn new(on_release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            on_release: Some(Box::new(on_release)),
        }
    }

    /// Token with no release side effect.
    pub fn noop() -> Self {
        Self { on_release: None }
    }

    /// Explicitly releases the token.
    pub fn release(mut self) {
        self.fire();
    }

    fn fire(&mut self) {
        if let Some(on_release) = self.on_release.take() {
            on_release();
        }
    }
}

impl Drop for CompletionToken {
    fn drop(&mut self) {
        self.fire();
    }
}

impl std::fmt::Debug for CompletionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionToken")
            .field("released", &self.on_release.is_none())
            .finish()
    }
}

/// Lifecycle for hosts whose dispatch context outlives the work anyway.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnmanagedLifecycle;

impl DispatchLifecycle for UnmanagedLifecycle {
    fn begin_async_work(&self) -> CompletionToken {
        CompletionToken::noop()
    }
}

/// Lifecycle tracking outstanding tokens with a shared counter.
///
/// Embedders gate process teardown on `outstanding() == 0`; tests assert
/// the begin/release balance.
#[derive(Debug, Default)]
pub struct CountingLifecycle {
    outstanding: Arc<AtomicUsize>,
    begun: AtomicUsize,
}

impl CountingLifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tokens currently held.
    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::SeqCst)
    }

    /// Tokens ever handed out.
    pub fn total_begun(&self) -> usize {
        self.begun.load(Ordering::SeqCst)
    }
}

impl DispatchLifecycle for CountingLifecycle {
    fn begin_async_work(&self) -> CompletionToken {
        self.begun.fetch_add(1, Ordering::SeqCst);
        self.outstanding.fetch_add(1, Ordering::SeqCst);
        let outstanding = Arc::clone(&self.outstanding);
        CompletionToken::new(move || {
            outstanding.fetch_sub(1, Ordering::SeqCst);
        })
    }
}
