//! Helpers for observing a request's cancellation token at suspension points.

use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::error::{CatalogError, Result};

/// Drive `fut` to completion unless `cancel` fires first.
pub async fn cancellable<F>(
    cancel: &CancellationToken,
    operation: &str,
    fut: F,
) -> Result<F::Output>
where
    F: Future,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(CatalogError::cancelled(operation)),
        output = fut => Ok(output),
    }
}

/// Fail fast when the token has already fired.
pub fn ensure_active(cancel: &CancellationToken, operation: &str) -> Result<()> {
    if cancel.is_cancelled() {
        return Err(CatalogError::cancelled(operation));
    }
    Ok(())
}
