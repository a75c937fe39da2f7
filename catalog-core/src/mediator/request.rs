use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::Result;

/// A typed message routed by the [`Dispatcher`](super::Dispatcher).
///
/// Commands and queries both implement this; `Response` is what the single
/// registered handler hands back to the caller.
pub trait Request: Send + 'static {
    type Response: Send + 'static;
}

/// Handles exactly one request type.
#[async_trait]
pub trait RequestHandler<R: Request>: Send + Sync {
    async fn handle(
        &self,
        request: R,
        cancel: &CancellationToken,
    ) -> Result<R::Response>;
}
