//! Bounded waits
//!
//! Every suspension point polls the surface with a sleep between probes and
//! gives up after a deadline.

use crate::domain::{Result, SurfaceError};
use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, Instant};

/// Polls `probe` until it yields a value or `timeout` elapses
///
/// Transient surface errors count as "not yet" and keep the wait going; any
/// other error ends it immediately.
///
/// # Errors
///
/// Returns [`SurfaceError::Timeout`] naming `what` when the deadline passes.
pub async fn wait_until<T, F, Fut>(
    what: &str,
    timeout: Duration,
    poll: Duration,
    mut probe: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>>>,
{
    let deadline = Instant::now() + timeout;

    loop {
        match probe().await {
            Ok(Some(value)) => return Ok(value),
            Ok(None) => {}
            Err(e) if e.is_transient() => {
                tracing::trace!(what = what, error = %e, "Transient error while waiting");
            }
            Err(e) => return Err(e),
        }

        if Instant::now() >= deadline {
            return Err(SurfaceError::Timeout(format!(
                "{what} after {}s",
                timeout.as_secs_f32()
            ))
            .into());
        }

        sleep(poll).await;
    }
}

/// Polls `probe` until it reports `true`
pub async fn wait_for<F, Fut>(what: &str, timeout: Duration, poll: Duration, mut probe: F) -> Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    wait_until(what, timeout, poll, move || {
        let fut = probe();
        async move { fut.await.map(|done| done.then_some(())) }
    })
    .await
}
