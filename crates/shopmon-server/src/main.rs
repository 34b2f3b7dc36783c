use anyhow::Result;
use shopmon_alert::ThresholdEvaluator;
use shopmon_collector::MetricCollector;
use shopmon_notify::dispatcher::AlertDispatcher;
use shopmon_notify::routing::TierRouting;
use shopmon_notify::topic::alert_topic;
use shopmon_storage::engine::SqliteDocumentStore;
use shopmon_storage::DocumentStore;
use std::path::Path;
use std::sync::Arc;
use tokio::signal;
use tokio::time::Duration;
use tracing_subscriber::EnvFilter;

use shopmon_server::config::MonitorConfig;
use shopmon_server::scheduler::{
    ErrorRateMonitor, PerformanceMonitor, RetentionSweeper, TICK_SECS,
};

#[tokio::main]
async fn main() -> Result<()> {
    shopmon_common::id::init(1, 1);

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("shopmon=info".parse()?))
        .init();

    let args: Vec<String> = std::env::args().collect();
    let config_path = args
        .get(1)
        .map(|s| s.as_str())
        .unwrap_or("config/monitor.toml");
    let config = match MonitorConfig::load(config_path) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(
                path = %config_path,
                error = %e,
                "Config not loaded, falling back to defaults"
            );
            MonitorConfig::default()
        }
    };

    tracing::info!(
        db = %config.database.path,
        tick_secs = TICK_SECS,
        "shopmon-monitor starting"
    );

    // Build components with their configuration injected up front.
    let store: Arc<dyn DocumentStore> =
        Arc::new(SqliteDocumentStore::new(Path::new(&config.database.path))?);
    let collector = Arc::new(MetricCollector::new(store.clone()));
    let evaluator = Arc::new(ThresholdEvaluator::new(config.thresholds.clone()));
    let routing = TierRouting::from_config(&config.channels);
    let dispatcher = Arc::new(AlertDispatcher::new(routing, store.clone()));

    let (publisher, mut subscriber) = alert_topic();

    // Dispatcher loop: drains the topic for as long as a publisher lives.
    let dispatcher_handle = tokio::spawn(async move {
        while let Some(payload) = subscriber.recv().await {
            if let Err(e) = dispatcher.handle_payload(&payload).await {
                tracing::error!(error = %e, "Alert dispatch failed");
            }
        }
    });

    // The two monitor jobs tick independently; no coordination between
    // them beyond the shared store and topic.
    let error_rate_job = ErrorRateMonitor::new(
        collector.clone(),
        evaluator.clone(),
        publisher.clone(),
        Duration::from_secs(TICK_SECS),
    );
    let error_rate_handle = tokio::spawn(async move {
        error_rate_job.run().await;
    });

    let performance_job = PerformanceMonitor::new(
        collector,
        evaluator,
        publisher,
        store.clone(),
        Duration::from_secs(TICK_SECS),
    );
    let performance_handle = tokio::spawn(async move {
        performance_job.run().await;
    });

    let sweeper = RetentionSweeper::new(
        store,
        config.retention.alert_retention_days,
        config.retention.metrics_retention_days,
    );
    let cleanup_handle = tokio::spawn(async move {
        sweeper.run().await;
    });

    tracing::info!("Monitor started");

    signal::ctrl_c().await?;
    tracing::info!("Shutting down gracefully");

    error_rate_handle.abort();
    performance_handle.abort();
    cleanup_handle.abort();
    dispatcher_handle.abort();
    tracing::info!("Monitor stopped");

    Ok(())
}
