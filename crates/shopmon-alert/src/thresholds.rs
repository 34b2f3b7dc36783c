use serde::{Deserialize, Serialize};
use shopmon_common::types::Category;
use std::collections::HashMap;

/// Static threshold table, injected into the evaluator at construction.
///
/// Error-rate thresholds are percentages per monitored category; latency
/// thresholds are milliseconds per metric name, with a default substituted
/// for metrics that have no entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdTable {
    #[serde(default = "default_order_creation_pct")]
    pub order_creation_pct: f64,
    #[serde(default = "default_payment_processing_pct")]
    pub payment_processing_pct: f64,
    #[serde(default = "default_inventory_management_pct")]
    pub inventory_management_pct: f64,
    #[serde(default = "default_order_fulfillment_pct")]
    pub order_fulfillment_pct: f64,

    /// Per-metric latency thresholds in milliseconds.
    #[serde(default)]
    pub latency_ms: HashMap<String, f64>,
    #[serde(default = "default_latency_ms")]
    pub default_latency_ms: f64,
}

impl Default for ThresholdTable {
    fn default() -> Self {
        Self {
            order_creation_pct: default_order_creation_pct(),
            payment_processing_pct: default_payment_processing_pct(),
            inventory_management_pct: default_inventory_management_pct(),
            order_fulfillment_pct: default_order_fulfillment_pct(),
            latency_ms: HashMap::new(),
            default_latency_ms: default_latency_ms(),
        }
    }
}

impl ThresholdTable {
    /// Error-rate threshold (percent) for a category.
    pub fn error_rate_threshold(&self, category: Category) -> f64 {
        match category {
            Category::OrderCreation => self.order_creation_pct,
            Category::PaymentProcessing => self.payment_processing_pct,
            Category::InventoryManagement => self.inventory_management_pct,
            Category::OrderFulfillment => self.order_fulfillment_pct,
        }
    }

    /// Latency threshold (ms) for a metric name, falling back to the
    /// default when the metric is not configured.
    pub fn latency_threshold(&self, metric: &str) -> f64 {
        self.latency_ms
            .get(metric)
            .copied()
            .unwrap_or(self.default_latency_ms)
    }
}

fn default_order_creation_pct() -> f64 {
    5.0
}

fn default_payment_processing_pct() -> f64 {
    2.0
}

fn default_inventory_management_pct() -> f64 {
    1.0
}

fn default_order_fulfillment_pct() -> f64 {
    3.0
}

fn default_latency_ms() -> f64 {
    1000.0
}
