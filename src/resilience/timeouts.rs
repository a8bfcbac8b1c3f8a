//! Timeout enforcement for collaborator calls.
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - Timeout errors are distinct from other errors
//! - Dropping the future abandons the call; collaborators are read-only

use std::future::Future;
use std::time::{Duration, Instant};

use crate::observability::metrics;

/// Outcome of a bounded collaborator call that did not succeed.
#[derive(Debug)]
pub enum CallError<E> {
    /// The deadline passed before the collaborator answered.
    TimedOut(Duration),
    /// The collaborator answered with an error.
    Failed(E),
}

/// Transport-level timeout for a collaborator HTTP client.
///
/// Always longer than the gate deadline, so a hung collaborator surfaces
/// as [`CallError::TimedOut`] rather than a transport error.
pub fn transport_backstop(deadline: Duration) -> Duration {
    deadline.saturating_mul(2)
}

/// Run `fut` with a deadline, recording latency for `collaborator`.
pub async fn call_with_timeout<T, E, F>(
    collaborator: &'static str,
    limit: Duration,
    fut: F,
) -> Result<T, CallError<E>>
where
    F: Future<Output = Result<T, E>>,
{
    let start = Instant::now();
    let result = tokio::time::timeout(limit, fut).await;
    metrics::record_collaborator_call(collaborator, start);

    match result {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => {
            metrics::record_collaborator_error(collaborator, "failed");
            Err(CallError::Failed(e))
        }
        Err(_) => {
            metrics::record_collaborator_error(collaborator, "timeout");
            Err(CallError::TimedOut(limit))
        }
    }
}
