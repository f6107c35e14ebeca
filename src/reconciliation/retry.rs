//! Bounded retry for store calls.

use std::future::Future;

use tokio::time::sleep;
use tracing::warn;

use crate::config::RetryPolicy;
use crate::error::{EngineError, EngineResult};
use crate::store::StoreError;

/// Runs a store call under the retry policy.
///
/// Transient errors are retried with linear backoff until
/// `policy.max_attempts` calls have been made. Non-transient errors are
/// returned after the first attempt.
///
/// # Errors
///
/// - [`EngineError::TransientIo`] once the attempts are exhausted
/// - [`EngineError::NotFound`] or [`EngineError::StoreRejected`] for
///   non-transient store errors
pub async fn with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    operation: &str,
    mut call: F,
) -> EngineResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, StoreError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match call().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() && attempt < max_attempts => {
                let delay = policy.backoff_after(attempt);
                warn!(
                    operation,
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "Store call failed, retrying"
                );
                sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(into_engine_error(operation, attempt, err)),
        }
    }
}

fn into_engine_error(operation: &str, attempts: u32, err: StoreError) -> EngineError {
    match err {
        StoreError::Unavailable(message) => EngineError::TransientIo {
            operation: operation.to_string(),
            attempts,
            message,
        },
        StoreError::NotFound { entity, id } => EngineError::NotFound { entity, id },
        StoreError::Rejected(message) => EngineError::StoreRejected {
            operation: operation.to_string(),
            message,
        },
    }
}
