use crate::error::{NotifyError, Result};
use crate::NotificationChannel;
use async_trait::async_trait;
use serde_json::Value;
use shopmon_common::types::Alert;

/// Paging webhook channel. Routed only for critical alerts, and dispatched
/// synchronously ahead of the other channels.
pub struct PagerWebhookChannel {
    client: reqwest::Client,
    webhook_url: String,
    routing_key: String,
}

impl PagerWebhookChannel {
    pub fn new(webhook_url: &str, routing_key: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            webhook_url: webhook_url.to_string(),
            routing_key: routing_key.to_string(),
        }
    }

    pub(crate) fn format_body(&self, alert: &Alert) -> Value {
        serde_json::json!({
            "routing_key": self.routing_key,
            "event_action": "trigger",
            "payload": {
                "summary": alert.message,
                "source": "shopmon",
                "severity": alert.severity.to_string(),
                "custom_details": alert.data,
            },
        })
    }
}

#[async_trait]
impl NotificationChannel for PagerWebhookChannel {
    async fn send(&self, alert: &Alert) -> Result<()> {
        let body = self.format_body(alert);
        let resp = self
            .client
            .post(&self.webhook_url)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(NotifyError::Api {
                service: "pager".to_string(),
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!(alert_id = %alert.id, "Page triggered");
        Ok(())
    }

    fn channel_name(&self) -> &str {
        "pager"
    }
}
