use crate::error::{NotifyError, Result};
use crate::NotificationChannel;
use async_trait::async_trait;
use serde_json::Value;
use shopmon_common::types::{Alert, Severity};

/// Chat webhook channel posting a formatted message with a color-coded
/// attachment.
pub struct ChatWebhookChannel {
    client: reqwest::Client,
    webhook_url: String,
}

impl ChatWebhookChannel {
    pub fn new(webhook_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            webhook_url: webhook_url.to_string(),
        }
    }

    fn attachment_color(severity: Severity) -> &'static str {
        match severity {
            Severity::Critical => "danger",
            Severity::Warning => "warning",
            Severity::Info => "good",
        }
    }

    pub(crate) fn format_body(alert: &Alert) -> Value {
        serde_json::json!({
            "text": format!("[{}] {}: {}", alert.severity, alert.category, alert.message),
            "attachments": [{
                "color": Self::attachment_color(alert.severity),
                "fields": [
                    { "title": "Category", "value": alert.category, "short": true },
                    { "title": "Severity", "value": alert.severity.to_string(), "short": true },
                    { "title": "Time", "value": alert.timestamp.to_rfc3339(), "short": true },
                    {
                        "title": "Details",
                        "value": serde_json::to_string_pretty(&alert.data)
                            .unwrap_or_else(|_| alert.data.to_string()),
                        "short": false
                    },
                ],
            }],
        })
    }
}

#[async_trait]
impl NotificationChannel for ChatWebhookChannel {
    async fn send(&self, alert: &Alert) -> Result<()> {
        let body = Self::format_body(alert);
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
                service: "chat".to_string(),
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!(alert_id = %alert.id, "Chat notification sent");
        Ok(())
    }

    fn channel_name(&self) -> &str {
        "chat"
    }
}
