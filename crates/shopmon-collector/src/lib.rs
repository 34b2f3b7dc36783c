//! Metric collection for the order-monitoring pipeline.
//!
//! On each scheduled run the collector reads the trailing five-minute
//! window from the document store and reduces it to per-category
//! count/rate objects and per-metric latency averages. The window length
//! is fixed; the only input to a run is the current wall-clock time.


use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use shopmon_common::types::{
    AggregatedMetrics, Category, CategoryStats, MetricAverage, MetricStats,
};
use shopmon_storage::DocumentStore;
use std::collections::HashMap;
use std::sync::Arc;

/// Fixed trailing window per scheduled run.
pub const WINDOW_SECS: i64 = 300;

/// Aggregation timeframe label stored on every snapshot.
pub const TIMEFRAME: &str = "5min";

/// How many failure reasons to attach to a payment-processing alert.
const PAYMENT_ERROR_SAMPLE_LIMIT: usize = 5;

/// Windowed error rate in percent.
///
/// Zero total operations with nonzero errors reads as 100%: an error with
/// no baseline volume must still surface downstream.
///
/// # Examples
///
/// ```
/// use shopmon_collector::error_rate;
///
/// assert_eq!(error_rate(100, 3), 3.0);
/// assert_eq!(error_rate(0, 2), 100.0);
/// assert_eq!(error_rate(0, 0), 0.0);
/// ```
pub fn error_rate(total_operations: u64, error_count: u64) -> f64 {
    if total_operations > 0 {
        error_count as f64 / total_operations as f64 * 100.0
    } else if error_count > 0 {
        100.0
    } else {
        0.0
    }
}

pub struct MetricCollector {
    store: Arc<dyn DocumentStore>,
}

impl MetricCollector {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// The `[from, to]` window ending at `now`.
    pub fn window(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        (now - Duration::seconds(WINDOW_SECS), now)
    }

    /// Computes counts and error rates for all four categories, one query
    /// set per category fired concurrently. Any store failure propagates
    /// out; the scheduled job logs it and abandons the run without
    /// alerting.
    pub async fn collect_category_stats(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<CategoryStats>> {
        let (from, to) = Self::window(now);

        let mut handles = Vec::new();
        for category in Category::ALL {
            let store = self.store.clone();
            handles.push(tokio::spawn(async move {
                collect_category(store.as_ref(), category, from, to)
            }));
        }

        let mut stats = Vec::new();
        for handle in handles {
            stats.push(handle.await??);
        }
        Ok(stats)
    }

    /// Reads the raw performance samples for the window and folds them
    /// into per-name statistics. Returns the per-metric averages for
    /// threshold evaluation together with the write-once snapshot destined
    /// for `aggregated_metrics`.
    pub async fn collect_performance(
        &self,
        now: DateTime<Utc>,
    ) -> Result<(Vec<MetricAverage>, AggregatedMetrics)> {
        let (from, to) = Self::window(now);
        let samples = self.store.query_metric_samples(from, to)?;

        let mut metrics: HashMap<String, MetricStats> = HashMap::new();
        for sample in &samples {
            let entry = metrics
                .entry(sample.name.clone())
                .or_insert_with(|| MetricStats {
                    sum: 0.0,
                    count: 0,
                    min: f64::INFINITY,
                    max: f64::NEG_INFINITY,
                    average: 0.0,
                });
            entry.sum += sample.value;
            entry.count += 1;
            entry.min = entry.min.min(sample.value);
            entry.max = entry.max.max(sample.value);
        }
        for stats in metrics.values_mut() {
            stats.average = stats.sum / stats.count as f64;
        }

        let averages = metrics
            .iter()
            .map(|(name, stats)| MetricAverage {
                name: name.clone(),
                average: stats.average,
                count: stats.count,
            })
            .collect();

        let snapshot = AggregatedMetrics {
            id: shopmon_common::id::next_id(),
            timestamp: now,
            timeframe: TIMEFRAME.to_string(),
            metrics,
        };

        Ok((averages, snapshot))
    }
}

fn collect_category(
    store: &dyn DocumentStore,
    category: Category,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Result<CategoryStats> {
    let (total_operations, error_count, sample_errors) = match category {
        Category::OrderCreation => (
            store.count_orders_created(from, to)?,
            store.count_error_logs(category, from, to)?,
            Vec::new(),
        ),
        Category::PaymentProcessing => {
            let total = store.count_payments(from, to)?;
            let errors = store.count_failed_payments(from, to)?;
            let samples = if errors > 0 {
                store.sample_payment_errors(from, to, PAYMENT_ERROR_SAMPLE_LIMIT)?
            } else {
                Vec::new()
            };
            (total, errors, samples)
        }
        Category::InventoryManagement => (
            store.count_inventory_updates(from, to)?,
            store.count_error_logs(category, from, to)?,
            Vec::new(),
        ),
        Category::OrderFulfillment => (
            store.count_fulfillment_updates(from, to)?,
            store.count_error_logs(category, from, to)?,
            Vec::new(),
        ),
    };

    Ok(CategoryStats {
        category,
        total_operations,
        error_count,
        error_rate: error_rate(total_operations, error_count),
        sample_errors,
    })
}
