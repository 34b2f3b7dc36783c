//! Document store for the storefront collections consumed and produced by
//! the monitoring pipeline.
//!
//! The default implementation ([`engine::SqliteDocumentStore`]) keeps all
//! seven collections in a single SQLite database with WAL mode. The
//! pipeline reads `orders`, `payments`, `inventory_updates`,
//! `performance_metrics`, and `system_logs`, and writes
//! `aggregated_metrics` and `system_alerts`.

pub mod engine;
pub mod error;


use chrono::{DateTime, Utc};
use error::Result;
use shopmon_common::types::{
    AggregatedMetrics, Alert, Category, LogEntry, MetricSample, Severity,
};

/// An order document. Created at checkout by the storefront; `updated_at`
/// and `fulfillment_status` move as the order progresses.
#[derive(Debug, Clone)]
pub struct OrderDoc {
    pub id: String,
    pub status: String,
    pub fulfillment_status: Option<String>,
    pub total_cents: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A payment attempt document. `status` is `succeeded` or `failed`;
/// failures may carry an `error_type` from the payment provider.
#[derive(Debug, Clone)]
pub struct PaymentDoc {
    pub id: String,
    pub order_id: String,
    pub status: String,
    pub error_type: Option<String>,
    pub amount_cents: i64,
    pub created_at: DateTime<Utc>,
}

/// One inventory adjustment written by the back-office or fulfillment.
#[derive(Debug, Clone)]
pub struct InventoryUpdateDoc {
    pub id: String,
    pub product_id: String,
    pub quantity_delta: i64,
    pub created_at: DateTime<Utc>,
}

/// A persisted alert row in `system_alerts`.
///
/// One row is appended per delivered pub-sub message; `alert_id` is the ID
/// carried in the payload. Redelivery therefore appends a second row for
/// the same `alert_id`, matching at-least-once delivery; a regression test
/// pins the duplication rather than fixing it.
#[derive(Debug, Clone)]
pub struct AlertRecord {
    pub id: String,
    pub alert_id: String,
    pub timestamp: DateTime<Utc>,
    pub category: String,
    pub severity: Severity,
    pub message: String,
    pub data: serde_json::Value,
    pub processed: bool,
    /// JSON list of per-channel send outcomes, set when processing
    /// completes.
    pub dispatch_results: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Persistence backend for the monitoring pipeline.
///
/// Implementations must be safe to share across tasks (`Send + Sync`):
/// the two scheduled monitor jobs and the dispatcher loop all hold the
/// same store.
pub trait DocumentStore: Send + Sync {
    // ---- reads used by the collector (window is [from, to]) ----

    /// Orders created in the window (order-creation denominator).
    fn count_orders_created(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Result<u64>;

    /// Orders whose fulfillment status moved in the window
    /// (order-fulfillment denominator).
    fn count_fulfillment_updates(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Result<u64>;

    /// Payment attempts in the window.
    fn count_payments(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Result<u64>;

    /// Failed payment attempts in the window.
    fn count_failed_payments(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Result<u64>;

    /// Up to `limit` failure reasons from the window, oldest first.
    /// Missing or empty `error_type` values come back as `"unknown"`.
    fn sample_payment_errors(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<String>>;

    /// Inventory adjustments in the window (inventory-management
    /// denominator).
    fn count_inventory_updates(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Result<u64>;

    /// `system_logs` entries for the category at level `error` or above.
    fn count_error_logs(
        &self,
        category: Category,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<u64>;

    /// Raw performance samples in the window.
    fn query_metric_samples(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<MetricSample>>;

    // ---- writes performed by the pipeline ----

    /// Appends one write-once snapshot to `aggregated_metrics`.
    fn write_aggregated_metrics(&self, snapshot: &AggregatedMetrics) -> Result<()>;

    /// Appends a `system_alerts` row for a consumed alert payload, with
    /// `processed = false`. Intentionally not keyed on `alert.id`; see
    /// [`AlertRecord`].
    fn insert_alert(&self, alert: &Alert) -> Result<AlertRecord>;

    /// Flips `processed = true` and records the per-channel dispatch
    /// results on every row carrying `alert_id`. Returns the number of
    /// rows updated.
    fn mark_alert_processed(&self, alert_id: &str, dispatch_results: &str) -> Result<usize>;

    // ---- maintenance and back-office queries ----

    /// Persisted alerts in the window, newest first.
    fn query_alert_history(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<AlertRecord>>;

    /// All rows for one alert ID, oldest first.
    fn query_alerts_by_alert_id(&self, alert_id: &str) -> Result<Vec<AlertRecord>>;

    /// Snapshots in the window, oldest first.
    fn query_aggregated_metrics(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<AggregatedMetrics>>;

    /// Removes `system_alerts` rows older than `retention_days`. Returns
    /// the number removed.
    fn cleanup_alerts(&self, retention_days: u32) -> Result<usize>;

    /// Removes `aggregated_metrics` rows older than `retention_days`.
    fn cleanup_aggregated_metrics(&self, retention_days: u32) -> Result<usize>;

    // ---- writer helpers used by the storefront and by tests ----

    fn insert_order(&self, order: &OrderDoc) -> Result<()>;

    /// Moves an order's fulfillment status, bumping `updated_at`.
    fn set_order_fulfillment(
        &self,
        order_id: &str,
        fulfillment_status: &str,
        at: DateTime<Utc>,
    ) -> Result<()>;

    fn insert_payment(&self, payment: &PaymentDoc) -> Result<()>;

    fn insert_inventory_update(&self, update: &InventoryUpdateDoc) -> Result<()>;

    fn insert_log_entry(&self, entry: &LogEntry) -> Result<()>;

    fn insert_metric_sample(&self, sample: &MetricSample) -> Result<()>;
}
