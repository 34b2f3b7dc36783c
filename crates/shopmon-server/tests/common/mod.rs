use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shopmon_common::types::{
    AggregatedMetrics, Alert, Category, LogEntry, MetricSample,
};
use shopmon_notify::error::{NotifyError, Result as NotifyResult};
use shopmon_notify::NotificationChannel;
use shopmon_storage::error::{Result as StorageResult, StorageError};
use shopmon_storage::{
    AlertRecord, DocumentStore, InventoryUpdateDoc, OrderDoc, PaymentDoc,
};
use std::sync::{Arc, Mutex};

/// Test channel recording every alert ID it is asked to deliver.
pub struct RecordingChannel {
    name: String,
    fail: bool,
    pub sends: Arc<Mutex<Vec<String>>>,
}

impl RecordingChannel {
    pub fn new(name: &str, fail: bool) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            fail,
            sends: Arc::new(Mutex::new(Vec::new())),
        })
    }
}

#[async_trait]
impl NotificationChannel for RecordingChannel {
    async fn send(&self, alert: &Alert) -> NotifyResult<()> {
        self.sends.lock().unwrap().push(alert.id.clone());
        if self.fail {
            return Err(NotifyError::Other("simulated outage".to_string()));
        }
        Ok(())
    }

    fn channel_name(&self) -> &str {
        &self.name
    }
}

/// Store stub where every operation fails, for exercising the
/// swallow-and-abort policy on collection failures.
pub struct FailingStore;

fn offline<T>() -> StorageResult<T> {
    Err(StorageError::Other("store offline".to_string()))
}

impl DocumentStore for FailingStore {
    fn count_orders_created(&self, _: DateTime<Utc>, _: DateTime<Utc>) -> StorageResult<u64> {
        offline()
    }

    fn count_fulfillment_updates(&self, _: DateTime<Utc>, _: DateTime<Utc>) -> StorageResult<u64> {
        offline()
    }

    fn count_payments(&self, _: DateTime<Utc>, _: DateTime<Utc>) -> StorageResult<u64> {
        offline()
    }

    fn count_failed_payments(&self, _: DateTime<Utc>, _: DateTime<Utc>) -> StorageResult<u64> {
        offline()
    }

    fn sample_payment_errors(
        &self,
        _: DateTime<Utc>,
        _: DateTime<Utc>,
        _: usize,
    ) -> StorageResult<Vec<String>> {
        offline()
    }

    fn count_inventory_updates(&self, _: DateTime<Utc>, _: DateTime<Utc>) -> StorageResult<u64> {
        offline()
    }

    fn count_error_logs(
        &self,
        _: Category,
        _: DateTime<Utc>,
        _: DateTime<Utc>,
    ) -> StorageResult<u64> {
        offline()
    }

    fn query_metric_samples(
        &self,
        _: DateTime<Utc>,
        _: DateTime<Utc>,
    ) -> StorageResult<Vec<MetricSample>> {
        offline()
    }

    fn write_aggregated_metrics(&self, _: &AggregatedMetrics) -> StorageResult<()> {
        offline()
    }

    fn insert_alert(&self, _: &Alert) -> StorageResult<AlertRecord> {
        offline()
    }

    fn mark_alert_processed(&self, _: &str, _: &str) -> StorageResult<usize> {
        offline()
    }

    fn query_alert_history(
        &self,
        _: DateTime<Utc>,
        _: DateTime<Utc>,
        _: usize,
    ) -> StorageResult<Vec<AlertRecord>> {
        offline()
    }

    fn query_alerts_by_alert_id(&self, _: &str) -> StorageResult<Vec<AlertRecord>> {
        offline()
    }

    fn query_aggregated_metrics(
        &self,
        _: DateTime<Utc>,
        _: DateTime<Utc>,
    ) -> StorageResult<Vec<AggregatedMetrics>> {
        offline()
    }

    fn cleanup_alerts(&self, _: u32) -> StorageResult<usize> {
        offline()
    }

    fn cleanup_aggregated_metrics(&self, _: u32) -> StorageResult<usize> {
        offline()
    }

    fn insert_order(&self, _: &OrderDoc) -> StorageResult<()> {
        offline()
    }

    fn set_order_fulfillment(
        &self,
        _: &str,
        _: &str,
        _: DateTime<Utc>,
    ) -> StorageResult<()> {
        offline()
    }

    fn insert_payment(&self, _: &PaymentDoc) -> StorageResult<()> {
        offline()
    }

    fn insert_inventory_update(&self, _: &InventoryUpdateDoc) -> StorageResult<()> {
        offline()
    }

    fn insert_log_entry(&self, _: &LogEntry) -> StorageResult<()> {
        offline()
    }

    fn insert_metric_sample(&self, _: &MetricSample) -> StorageResult<()> {
        offline()
    }
}
