use crate::error::Result;
use crate::NotificationChannel;
use async_trait::async_trait;
use shopmon_common::types::Alert;

/// Email channel. Delivery is an explicit stub: the send logs the intent
/// with the recipient list and returns success. Whether real delivery was
/// deferred intentionally is unresolved upstream, so the intent is kept
/// observable without inventing transport behavior.
pub struct EmailChannel {
    recipients: Vec<String>,
}

impl EmailChannel {
    pub fn new(recipients: Vec<String>) -> Self {
        Self { recipients }
    }

    fn format_subject(alert: &Alert) -> String {
        format!("[shopmon][{}] {}", alert.severity, alert.category)
    }
}

#[async_trait]
impl NotificationChannel for EmailChannel {
    async fn send(&self, alert: &Alert) -> Result<()> {
        tracing::info!(
            recipients = ?self.recipients,
            subject = %Self::format_subject(alert),
            message = %alert.message,
            "Email delivery not implemented, would send"
        );
        Ok(())
    }

    fn channel_name(&self) -> &str {
        "email"
    }
}
