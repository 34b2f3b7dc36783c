use serde::{Deserialize, Serialize};
use shopmon_alert::thresholds::ThresholdTable;
use shopmon_notify::routing::ChannelsConfig;

/// Monitor configuration loaded from TOML.
///
/// Everything here is plain data handed to the components at
/// construction; nothing reads configuration globally at runtime.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonitorConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub thresholds: ThresholdTable,
    #[serde(default)]
    pub channels: ChannelsConfig,
    #[serde(default)]
    pub retention: RetentionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetentionConfig {
    #[serde(default = "default_alert_retention_days")]
    pub alert_retention_days: u32,
    #[serde(default = "default_metrics_retention_days")]
    pub metrics_retention_days: u32,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            alert_retention_days: default_alert_retention_days(),
            metrics_retention_days: default_metrics_retention_days(),
        }
    }
}

fn default_db_path() -> String {
    "data/shopmon.db".to_string()
}

fn default_alert_retention_days() -> u32 {
    30
}

fn default_metrics_retention_days() -> u32 {
    7
}

impl MonitorConfig {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_static_threshold_table() {
        let config: MonitorConfig = toml::from_str("").unwrap();
        assert_eq!(config.database.path, "data/shopmon.db");
        assert_eq!(config.thresholds.payment_processing_pct, 2.0);
        assert_eq!(config.thresholds.order_creation_pct, 5.0);
        assert_eq!(config.thresholds.inventory_management_pct, 1.0);
        assert_eq!(config.thresholds.order_fulfillment_pct, 3.0);
        assert_eq!(config.thresholds.default_latency_ms, 1000.0);
        assert_eq!(config.retention.alert_retention_days, 30);
        assert!(config.channels.critical.chat_webhook_url.is_none());
    }

    #[test]
    fn parses_thresholds_and_channel_tiers() {
        let toml_str = r#"
            [database]
            path = "/var/lib/shopmon/shopmon.db"

            [thresholds]
            payment_processing_pct = 1.5

            [thresholds.latency_ms]
            "checkout.page_load" = 2000.0

            [channels.critical]
            chat_webhook_url = "https://hooks.example.com/critical"
            pager_webhook_url = "https://events.example.com/v2/enqueue"
            pager_routing_key = "rk-123"
            emails = ["oncall@example.com"]

            [channels.warning]
            chat_webhook_url = "https://hooks.example.com/warning"
        "#;
        let config: MonitorConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.database.path, "/var/lib/shopmon/shopmon.db");
        assert_eq!(config.thresholds.payment_processing_pct, 1.5);
        // Untouched fields keep their defaults.
        assert_eq!(config.thresholds.order_creation_pct, 5.0);
        assert_eq!(
            config.thresholds.latency_ms.get("checkout.page_load"),
            Some(&2000.0)
        );
        assert_eq!(
            config.channels.critical.pager_routing_key.as_deref(),
            Some("rk-123")
        );
        assert_eq!(config.channels.warning.emails.len(), 0);
        assert!(config.channels.info.chat_webhook_url.is_none());
    }
}
