//! Fire-and-forget status pushes with exponential backoff.

use super::{FeedError, OrderFeed};
use crate::model::OrderId;
use crate::pipeline::StatusAdvance;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Retry configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum attempts, the first one included.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Initial delay between attempts in milliseconds.
    #[serde(default = "default_initial_delay")]
    pub initial_delay_ms: u64,

    /// Maximum delay between attempts in milliseconds.
    #[serde(default = "default_max_delay")]
    pub max_delay_ms: u64,

    /// Exponential backoff multiplier.
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
}

fn default_max_attempts() -> u32 {
    5
}

fn default_initial_delay() -> u64 {
    200
}

fn default_max_delay() -> u64 {
    5_000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay_ms: default_initial_delay(),
            max_delay_ms: default_max_delay(),
            backoff_multiplier: default_backoff_multiplier(),
        }
    }
}

impl RetryConfig {
    /// Delay before attempt `attempt + 1`, where `attempt` starts at 1.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(32) as i32;
        let millis = self.initial_delay_ms as f64 * self.backoff_multiplier.max(1.0).powi(exponent);
        Duration::from_millis(millis.min(self.max_delay_ms as f64) as u64)
    }
}

/// Pushes one status change to the feed, retrying transient failures.
///
/// A conflict ends the push at once: someone else already moved the order.
pub async fn advance_with_retry(
    feed: &dyn OrderFeed,
    retry: &RetryConfig,
    order_id: &OrderId,
    advance: StatusAdvance,
) -> Result<(), FeedError> {
    let mut attempt = 1;
    loop {
        match feed.advance_status(order_id, advance.from, advance.to).await {
            Ok(()) => {
                debug!(order = %order_id, from = %advance.from, to = %advance.to, attempt, "Status pushed");
                return Ok(());
            }
            Err(FeedError::Transient(reason)) if attempt < retry.max_attempts => {
                let delay = retry.delay_after(attempt);
                warn!(order = %order_id, attempt, ?delay, "Status push failed, retrying: {}", reason);
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Spawns [`advance_with_retry`] on its own task. The caller never waits for it, and the
/// pipeline state that caused the push is not rolled back when it fails.
pub fn spawn_status_push(
    feed: Arc<dyn OrderFeed>,
    retry: RetryConfig,
    order_id: OrderId,
    advance: StatusAdvance,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        match advance_with_retry(feed.as_ref(), &retry, &order_id, advance).await {
            Ok(()) => {}
            Err(FeedError::Conflict(reason)) => {
                debug!(order = %order_id, "Status push superseded: {}", reason);
            }
            Err(e) => {
                warn!(order = %order_id, to = %advance.to, "Status push abandoned: {}", e);
            }
        }
    })
}
