//! Per-request context passed down to providers.

use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Cancellable context for a single chat request.
///
/// Cancelling the token aborts the in-flight provider call; the service
/// then reports `ChatError::Cancelled` and does not charge quota.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Unique identifier for this request, used in log events.
    pub request_id: Uuid,
    /// Cancellation token for this request.
    pub cancellation: CancellationToken,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::with_cancellation(CancellationToken::new())
    }

    /// Build a context that is cancelled together with `token`.
    pub fn with_cancellation(cancellation: CancellationToken) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            cancellation,
        }
    }

    /// Derive a context for a sub-call: same request id, child token.
    pub fn child(&self) -> Self {
        Self {
            request_id: self.request_id,
            cancellation: self.cancellation.child_token(),
        }
    }

    pub fn cancel(&self) {
        self.cancellation.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}
