use crate::channels::chat::ChatWebhookChannel;
use crate::channels::email::EmailChannel;
use crate::channels::pager::PagerWebhookChannel;
use crate::channels::sms::SmsChannel;
use crate::NotificationChannel;
use serde::{Deserialize, Serialize};
use shopmon_common::types::Severity;
use std::collections::HashMap;
use std::sync::Arc;

/// Static channel configuration for one severity tier.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TierConfig {
    #[serde(default)]
    pub emails: Vec<String>,
    #[serde(default)]
    pub chat_webhook_url: Option<String>,
    #[serde(default)]
    pub sms_numbers: Vec<String>,
    #[serde(default)]
    pub pager_webhook_url: Option<String>,
    #[serde(default)]
    pub pager_routing_key: Option<String>,
}

/// Per-tier channel lists, injected as external configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChannelsConfig {
    #[serde(default)]
    pub critical: TierConfig,
    #[serde(default)]
    pub warning: TierConfig,
    #[serde(default)]
    pub info: TierConfig,
}

/// Maps each severity tier to its own disjoint channel set. Tiers do not
/// cascade: an alert is delivered to exactly the channels configured for
/// its tier.
pub struct TierRouting {
    tiers: HashMap<Severity, Vec<Arc<dyn NotificationChannel>>>,
}

impl TierRouting {
    pub fn new() -> Self {
        Self {
            tiers: HashMap::new(),
        }
    }

    /// Builds the channel instances for all three tiers from static
    /// configuration. The paging webhook is only ever instantiated for
    /// the critical tier.
    pub fn from_config(config: &ChannelsConfig) -> Self {
        let mut routing = Self::new();
        routing.set_tier(Severity::Critical, build_tier(&config.critical, true));
        routing.set_tier(Severity::Warning, build_tier(&config.warning, false));
        routing.set_tier(Severity::Info, build_tier(&config.info, false));
        routing
    }

    pub fn set_tier(&mut self, severity: Severity, channels: Vec<Arc<dyn NotificationChannel>>) {
        self.tiers.insert(severity, channels);
    }

    pub fn channels_for(&self, severity: Severity) -> &[Arc<dyn NotificationChannel>] {
        self.tiers.get(&severity).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl Default for TierRouting {
    fn default() -> Self {
        Self::new()
    }
}

fn build_tier(config: &TierConfig, allow_pager: bool) -> Vec<Arc<dyn NotificationChannel>> {
    let mut channels: Vec<Arc<dyn NotificationChannel>> = Vec::new();

    if let Some(url) = &config.chat_webhook_url {
        channels.push(Arc::new(ChatWebhookChannel::new(url)));
    }
    match (&config.pager_webhook_url, &config.pager_routing_key) {
        (Some(url), Some(key)) if allow_pager => {
            channels.push(Arc::new(PagerWebhookChannel::new(url, key)));
        }
        (Some(_), _) if !allow_pager => {
            tracing::warn!("Paging webhook configured outside the critical tier, ignoring");
        }
        (Some(_), None) => {
            tracing::warn!("Paging webhook configured without a routing key, ignoring");
        }
        _ => {}
    }
    if !config.emails.is_empty() {
        channels.push(Arc::new(EmailChannel::new(config.emails.clone())));
    }
    if !config.sms_numbers.is_empty() {
        channels.push(Arc::new(SmsChannel::new(config.sms_numbers.clone())));
    }

    channels
}
