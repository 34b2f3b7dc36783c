//! The single named topic carrying JSON-serialized alert payloads from the
//! monitor jobs to the dispatcher.
//!
//! Delivery semantics are at-least-once from the consumer's perspective:
//! nothing on this path deduplicates a replayed payload, so a redelivered
//! message reaches the dispatcher like any other.

use crate::error::Result;
use shopmon_common::types::Alert;
use tokio::sync::mpsc;

/// Topic name, kept on the payload path for log correlation.
pub const ALERT_TOPIC: &str = "system-alerts";

/// Creates the alert topic, returning the publisher half handed to the
/// monitor jobs and the subscriber half consumed by the dispatcher loop.
pub fn alert_topic() -> (AlertPublisher, AlertSubscriber) {
    let (tx, rx) = mpsc::unbounded_channel();
    (AlertPublisher { tx }, AlertSubscriber { rx })
}

#[derive(Clone)]
pub struct AlertPublisher {
    tx: mpsc::UnboundedSender<String>,
}

impl AlertPublisher {
    /// Serializes the alert and publishes it to the topic.
    pub fn publish(&self, alert: &Alert) -> Result<()> {
        let payload = serde_json::to_string(alert)?;
        self.tx
            .send(payload)
            .map_err(|_| crate::error::NotifyError::Other("alert topic closed".to_string()))?;
        tracing::debug!(
            topic = ALERT_TOPIC,
            alert_id = %alert.id,
            severity = %alert.severity,
            "Alert published"
        );
        Ok(())
    }
}

pub struct AlertSubscriber {
    rx: mpsc::UnboundedReceiver<String>,
}

impl AlertSubscriber {
    /// Yields the next raw payload, or `None` once every publisher is
    /// dropped and the topic has drained.
    pub async fn recv(&mut self) -> Option<String> {
        self.rx.recv().await
    }
}
