//! Notification delivery for threshold-breach alerts.
//!
//! Alerts travel as JSON payloads over a single named pub-sub topic. The
//! dispatcher consumes each payload, persists it, fans it out to the
//! channels configured for its severity tier, and records a per-channel
//! outcome list on the persisted record when the batch completes.

pub mod channels;
pub mod dispatcher;
pub mod error;
pub mod routing;
pub mod topic;

#[cfg(test)]
mod tests;

use async_trait::async_trait;
use error::Result;
use serde::{Deserialize, Serialize};
use shopmon_common::types::Alert;

/// A notification delivery channel that sends an alert to an external
/// service (chat webhook, paging webhook) or logs a delivery intent
/// (email, SMS stubs).
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Delivers the alert through this channel.
    ///
    /// # Errors
    ///
    /// Returns an error if delivery fails; failures are recorded per
    /// channel by the dispatcher and never block the other channels.
    async fn send(&self, alert: &Alert) -> Result<()>;

    /// Returns the channel type name (e.g., `"chat"`, `"pager"`).
    fn channel_name(&self) -> &str;
}

/// Outcome of one channel send, collected into the completion record so
/// partial failures stay auditable instead of merging into one log line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelSendResult {
    pub channel: String,
    /// `"success"` or `"failed"`.
    pub status: String,
    pub error: Option<String>,
}

impl ChannelSendResult {
    pub fn success(channel: &str) -> Self {
        Self {
            channel: channel.to_string(),
            status: "success".to_string(),
            error: None,
        }
    }

    pub fn failed(channel: &str, error: String) -> Self {
        Self {
            channel: channel.to_string(),
            status: "failed".to_string(),
            error: Some(error),
        }
    }
}
