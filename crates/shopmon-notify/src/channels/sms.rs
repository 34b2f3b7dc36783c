use crate::error::Result;
use crate::NotificationChannel;
use async_trait::async_trait;
use shopmon_common::types::Alert;

/// SMS channel. Delivery is an explicit stub: the send logs the intent per
/// phone number and returns success.
pub struct SmsChannel {
    phone_numbers: Vec<String>,
}

impl SmsChannel {
    pub fn new(phone_numbers: Vec<String>) -> Self {
        Self { phone_numbers }
    }

    pub(crate) fn format_message(alert: &Alert) -> String {
        format!(
            "[shopmon][{severity}] {category}: {message}",
            severity = alert.severity,
            category = alert.category,
            message = alert.message,
        )
    }
}

#[async_trait]
impl NotificationChannel for SmsChannel {
    async fn send(&self, alert: &Alert) -> Result<()> {
        let message = Self::format_message(alert);
        for phone in &self.phone_numbers {
            tracing::info!(
                phone = %phone,
                message = %message,
                "SMS delivery not implemented, would send"
            );
        }
        Ok(())
    }

    fn channel_name(&self) -> &str {
        "sms"
    }
}
