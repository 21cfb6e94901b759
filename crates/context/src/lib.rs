//! A `Context`/`Handle` pair for cooperative shutdown.
//!
//! Replaces the volatile global flag a `poll()`-based event loop would
//! consult as its predicate with an awaitable future usable directly as one
//! arm of a `tokio::select!`. Backed by [`tokio_util::sync::CancellationToken`].

use tokio_util::sync::CancellationToken;

/// Observes cancellation. Cheap to clone; every clone observes the same cancellation.
#[derive(Debug, Clone)]
pub struct Context {
    token: CancellationToken,
}

/// Triggers cancellation. Cheap to clone; `cancel` is idempotent across every clone.
#[derive(Debug, Clone)]
pub struct Handle {
    token: CancellationToken,
}

impl Context {
    /// Creates a fresh, uncancelled context and its cancellation handle.
    pub fn new() -> (Self, Handle) {
        let token = CancellationToken::new();
        (Self { token: token.clone() }, Handle { token })
    }

    /// Resolves once [`Handle::cancel`] has been called on any clone of the paired handle.
    pub async fn done(&self) {
        self.token.cancelled().await
    }

    /// Returns `true` if cancellation has already been requested.
    pub fn is_done(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Derives a child context that is cancelled either when this one is, or independently.
    pub fn with_handle(&self) -> (Self, Handle) {
        let token = self.token.child_token();
        (Self { token: token.clone() }, Handle { token })
    }
}

impl Handle {
    /// Requests cancellation. Safe to call more than once, from any clone, from any thread.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Returns `true` if cancellation has already been requested.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn done_resolves_after_cancel() {
        let (ctx, handle) = Context::new();
        assert!(!ctx.is_done());

        handle.cancel();
        ctx.done().await;
        assert!(ctx.is_done());
    }

    #[tokio::test]
    async fn cancel_is_idempotent_and_observed_by_every_clone() {
        let (ctx, handle) = Context::new();
        let other_handle = handle.clone();
        let other_ctx = ctx.clone();

        handle.cancel();
        other_handle.cancel();

        other_ctx.done().await;
        assert!(ctx.is_done());
        assert!(other_ctx.is_done());
    }

    #[tokio::test]
    async fn child_context_cancels_independently() {
        let (parent, parent_handle) = Context::new();
        let (child, child_handle) = parent.with_handle();

        child_handle.cancel();
        child.done().await;
        assert!(!parent.is_done());

        parent_handle.cancel();
        parent.done().await;
    }
}
