use crate::feed::RetryConfig;
use crate::urgency::UrgencyConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct KitchenConfig {
    #[serde(default)]
    pub actor: ActorConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub urgency: UrgencyConfig,
}

/// Kitchen actor configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ActorConfig {
    /// Mailbox capacity of the actor.
    #[serde(default = "default_mailbox_size")]
    pub mailbox_size: usize,
}

impl Default for ActorConfig {
    fn default() -> Self {
        Self {
            mailbox_size: default_mailbox_size(),
        }
    }
}

fn default_mailbox_size() -> usize {
    64
}

/// Sync fan-out configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SyncConfig {
    /// Deltas buffered per venue before a slow subscriber lags.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
        }
    }
}

fn default_channel_capacity() -> usize {
    256
}

/// Order feed polling configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FeedConfig {
    /// Poll interval in milliseconds.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval(),
        }
    }
}

impl FeedConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

fn default_poll_interval() -> u64 {
    2_000
}
