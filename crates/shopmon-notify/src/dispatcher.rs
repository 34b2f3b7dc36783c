use crate::error::Result;
use crate::routing::TierRouting;
use crate::{ChannelSendResult, NotificationChannel};
use shopmon_common::types::{Alert, Severity};
use shopmon_storage::DocumentStore;
use std::sync::Arc;

/// Consumes alert payloads from the topic, persists them, fans them out
/// to the channels for their severity tier, and records the per-channel
/// outcomes on the persisted record.
pub struct AlertDispatcher {
    routing: TierRouting,
    store: Arc<dyn DocumentStore>,
}

impl AlertDispatcher {
    pub fn new(routing: TierRouting, store: Arc<dyn DocumentStore>) -> Self {
        Self { routing, store }
    }

    /// Handles one raw topic payload. A malformed payload is an error for
    /// the subscriber loop to log; the message is dropped, there is no
    /// dead-letter handling.
    pub async fn handle_payload(&self, payload: &str) -> Result<Vec<ChannelSendResult>> {
        let alert: Alert = serde_json::from_str(payload)?;
        self.dispatch(&alert).await
    }

    /// Persists the alert and delivers it. Each consumed payload appends
    /// its own `system_alerts` row, so a redelivered message creates a
    /// duplicate record and duplicate notifications.
    pub async fn dispatch(&self, alert: &Alert) -> Result<Vec<ChannelSendResult>> {
        let record = self.store.insert_alert(alert)?;
        tracing::info!(
            alert_id = %alert.id,
            record_id = %record.id,
            category = %alert.category,
            severity = %alert.severity,
            "Alert received"
        );

        let channels = self.routing.channels_for(alert.severity);
        let mut results = Vec::new();
        let mut concurrent: Vec<Arc<dyn NotificationChannel>> = Vec::new();

        // The page for a critical alert goes out synchronously, ahead of
        // the rest of the batch.
        for channel in channels {
            if alert.severity == Severity::Critical && channel.channel_name() == "pager" {
                results.push(send_one(channel.as_ref(), alert).await);
            } else {
                concurrent.push(channel.clone());
            }
        }

        let mut handles = Vec::new();
        for channel in concurrent {
            let name = channel.channel_name().to_string();
            let alert = alert.clone();
            handles.push((
                name,
                tokio::spawn(async move { send_one(channel.as_ref(), &alert).await }),
            ));
        }
        for (name, handle) in handles {
            match handle.await {
                Ok(result) => results.push(result),
                Err(e) => {
                    tracing::error!(channel = %name, error = %e, "Channel send task panicked");
                    results.push(ChannelSendResult::failed(&name, e.to_string()));
                }
            }
        }

        let results_json = serde_json::to_string(&results)?;
        let updated = self.store.mark_alert_processed(&alert.id, &results_json)?;
        tracing::info!(
            alert_id = %alert.id,
            channels = results.len(),
            failed = results.iter().filter(|r| r.status == "failed").count(),
            records = updated,
            "Alert processed"
        );

        Ok(results)
    }
}

async fn send_one(channel: &dyn NotificationChannel, alert: &Alert) -> ChannelSendResult {
    match channel.send(alert).await {
        Ok(()) => ChannelSendResult::success(channel.channel_name()),
        Err(e) => {
            tracing::error!(
                channel = channel.channel_name(),
                alert_id = %alert.id,
                error = %e,
                "Notification send failed"
            );
            ChannelSendResult::failed(channel.channel_name(), e.to_string())
        }
    }
}
