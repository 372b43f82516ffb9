//! Bounded waiting for UI conditions
//!
//! Every query a page object makes is a poll with a deadline. A condition
//! either becomes observable before the timeout or the wait resolves to a
//! definite "no" (or a [`DriverError::Timeout`] for hard waits).

use std::future::Future;
use std::time::{Duration, Instant};

use tokio::time::sleep;

use crate::error::{DriverError, DriverResult};

/// Default timeout for wait operations (30 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default poll interval for checking conditions (100ms).
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitConfig {
    /// Maximum time to wait for the condition.
    pub timeout: Duration,

    /// How often to check if the condition is satisfied.
    pub poll_interval: Duration,
}

impl WaitConfig {
    pub fn new(timeout: Duration, poll_interval: Duration) -> Self {
        Self { timeout, poll_interval }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::new(timeout, DEFAULT_POLL_INTERVAL)
    }
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT, DEFAULT_POLL_INTERVAL)
    }
}

/// Polls `condition` until it reports true or the timeout elapses.
///
/// Returns `Ok(true)` once satisfied, `Ok(false)` on timeout. Driver errors
/// abort the wait immediately.
pub async fn poll_until<F, Fut>(condition: F, config: WaitConfig) -> DriverResult<bool>
where
    F: Fn() -> Fut,
    Fut: Future<Output = DriverResult<bool>>,
{
    let start = Instant::now();

    loop {
        if condition().await? {
            return Ok(true);
        }

        if start.elapsed() >= config.timeout {
            return Ok(false);
        }

        sleep(config.poll_interval).await;
    }
}

/// Like [`poll_until`], but a timeout is a failure.
pub async fn wait_for<F, Fut>(condition: F, config: WaitConfig, description: &str) -> DriverResult<()>
where
    F: Fn() -> Fut,
    Fut: Future<Output = DriverResult<bool>>,
{
    if poll_until(condition, config).await? {
        Ok(())
    } else {
        Err(DriverError::Timeout {
            condition: description.to_string(),
            timeout: config.timeout,
        })
    }
}

/// Retries `action` until it succeeds, treating errors as transient.
///
/// Used for known-flaky interactions such as an element that exists but is
/// not yet interactable. The last error is returned once the deadline passes.
pub async fn retry_until<T, F, Fut>(action: F, config: WaitConfig) -> DriverResult<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = DriverResult<T>>,
{
    let start = Instant::now();

    loop {
        match action().await {
            Ok(value) => return Ok(value),
            Err(DriverError::SessionLost(reason)) => return Err(DriverError::SessionLost(reason)),
            Err(e) if start.elapsed() >= config.timeout => return Err(e),
            Err(_) => {}
        }

        sleep(config.poll_interval).await;
    }
}
