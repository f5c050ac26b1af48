//! `wait_for_service`: polls Discovery with backoff before giving up with
//! `RpcNoProvider`.

use std::time::{Duration, Instant};

use crate::error::RpcError;

const INITIAL_BACKOFF: Duration = Duration::from_millis(20);
const MAX_BACKOFF: Duration = Duration::from_millis(500);

/// Polls `probe` (typically a closure checking `Discovery::agents()` or
/// `Discovery::functions()` for a match) with exponential backoff until it
/// returns `true` or `timeout` elapses.
pub async fn wait_for_service<F>(mut probe: F, timeout: Duration) -> Result<(), RpcError>
where
    F: FnMut() -> bool,
{
    if probe() {
        return Ok(());
    }
    let deadline = Instant::now() + timeout;
    let mut backoff = INITIAL_BACKOFF;
    loop {
        if Instant::now() >= deadline {
            return Err(RpcError::RpcNoProvider);
        }
        tokio::time::sleep(backoff.min(deadline.saturating_duration_since(Instant::now()))).await;
        if probe() {
            return Ok(());
        }
        backoff = (backoff * 2).min(MAX_BACKOFF);
    }
}
