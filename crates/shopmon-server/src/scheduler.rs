use anyhow::Result;
use chrono::Utc;
use shopmon_alert::ThresholdEvaluator;
use shopmon_collector::MetricCollector;
use shopmon_notify::topic::AlertPublisher;
use shopmon_storage::DocumentStore;
use std::sync::Arc;
use tokio::time::{interval, Duration};

/// Fixed schedule for both monitor jobs. The interval takes no
/// parameters; overlapping ticks are not skipped.
pub const TICK_SECS: u64 = 300;

/// Scheduled job computing per-category error rates and publishing
/// threshold breaches to the alert topic.
pub struct ErrorRateMonitor {
    collector: Arc<MetricCollector>,
    evaluator: Arc<ThresholdEvaluator>,
    publisher: AlertPublisher,
    tick: Duration,
}

impl ErrorRateMonitor {
    pub fn new(
        collector: Arc<MetricCollector>,
        evaluator: Arc<ThresholdEvaluator>,
        publisher: AlertPublisher,
        tick: Duration,
    ) -> Self {
        Self {
            collector,
            evaluator,
            publisher,
            tick,
        }
    }

    pub async fn run(&self) {
        tracing::info!(tick_secs = self.tick.as_secs(), "Error-rate monitor started");
        let mut tick = interval(self.tick);
        loop {
            tick.tick().await;
            // A failed cycle is logged and dropped; there is no retry and
            // no escalation, the next tick starts fresh.
            if let Err(e) = self.run_cycle().await {
                tracing::error!(error = %e, "Error-rate cycle failed");
            }
        }
    }

    pub async fn run_cycle(&self) -> Result<()> {
        let now = Utc::now();
        let stats = self.collector.collect_category_stats(now).await?;

        for category_stats in &stats {
            tracing::debug!(
                category = %category_stats.category,
                total = category_stats.total_operations,
                errors = category_stats.error_count,
                rate = category_stats.error_rate,
                "Category window collected"
            );
            if let Some(alert) = self.evaluator.evaluate_category(category_stats) {
                tracing::warn!(
                    category = %alert.category,
                    severity = %alert.severity,
                    "Error-rate threshold breached"
                );
                self.publisher.publish(&alert)?;
            }
        }
        Ok(())
    }
}

/// Scheduled job aggregating performance samples, persisting the
/// five-minute snapshot, and publishing latency breaches.
pub struct PerformanceMonitor {
    collector: Arc<MetricCollector>,
    evaluator: Arc<ThresholdEvaluator>,
    publisher: AlertPublisher,
    store: Arc<dyn DocumentStore>,
    tick: Duration,
}

impl PerformanceMonitor {
    pub fn new(
        collector: Arc<MetricCollector>,
        evaluator: Arc<ThresholdEvaluator>,
        publisher: AlertPublisher,
        store: Arc<dyn DocumentStore>,
        tick: Duration,
    ) -> Self {
        Self {
            collector,
            evaluator,
            publisher,
            store,
            tick,
        }
    }

    pub async fn run(&self) {
        tracing::info!(tick_secs = self.tick.as_secs(), "Performance monitor started");
        let mut tick = interval(self.tick);
        loop {
            tick.tick().await;
            if let Err(e) = self.run_cycle().await {
                tracing::error!(error = %e, "Performance cycle failed");
            }
        }
    }

    pub async fn run_cycle(&self) -> Result<()> {
        let now = Utc::now();
        let (averages, snapshot) = self.collector.collect_performance(now).await?;

        self.store.write_aggregated_metrics(&snapshot)?;
        tracing::debug!(metrics = snapshot.metrics.len(), "Aggregated metrics written");

        for average in &averages {
            if let Some(alert) = self.evaluator.evaluate_metric(average) {
                tracing::warn!(
                    metric = %average.name,
                    severity = %alert.severity,
                    "Latency threshold breached"
                );
                self.publisher.publish(&alert)?;
            }
        }
        Ok(())
    }
}

/// Hourly retention sweep over the two collections this pipeline writes.
pub struct RetentionSweeper {
    store: Arc<dyn DocumentStore>,
    alert_retention_days: u32,
    metrics_retention_days: u32,
}

impl RetentionSweeper {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        alert_retention_days: u32,
        metrics_retention_days: u32,
    ) -> Self {
        Self {
            store,
            alert_retention_days,
            metrics_retention_days,
        }
    }

    pub async fn run(&self) {
        let mut tick = interval(Duration::from_secs(3600));
        loop {
            tick.tick().await;
            match self.store.cleanup_alerts(self.alert_retention_days) {
                Ok(removed) if removed > 0 => {
                    tracing::info!(removed, "Cleaned up expired alerts")
                }
                Err(e) => tracing::error!(error = %e, "Alert cleanup failed"),
                _ => {}
            }
            match self
                .store
                .cleanup_aggregated_metrics(self.metrics_retention_days)
            {
                Ok(removed) if removed > 0 => {
                    tracing::info!(removed, "Cleaned up expired metric snapshots")
                }
                Err(e) => tracing::error!(error = %e, "Metric snapshot cleanup failed"),
                _ => {}
            }
        }
    }
}
