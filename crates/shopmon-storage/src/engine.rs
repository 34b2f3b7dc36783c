use crate::error::{Result, StorageError};
use crate::{AlertRecord, DocumentStore, InventoryUpdateDoc, OrderDoc, PaymentDoc};
use chrono::{DateTime, Duration, Utc};
use rusqlite::Connection;
use shopmon_common::types::{
    AggregatedMetrics, Alert, Category, LogEntry, MetricSample, Severity,
};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS system_logs (
    id TEXT PRIMARY KEY,
    timestamp INTEGER NOT NULL,
    category TEXT NOT NULL,
    level TEXT NOT NULL,
    message TEXT NOT NULL,
    data TEXT NOT NULL DEFAULT '{}'
);
CREATE INDEX IF NOT EXISTS idx_logs_category_level_time
    ON system_logs(category, level, timestamp);

CREATE TABLE IF NOT EXISTS orders (
    id TEXT PRIMARY KEY,
    status TEXT NOT NULL,
    fulfillment_status TEXT,
    total_cents INTEGER NOT NULL DEFAULT 0,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_orders_created ON orders(created_at);
CREATE INDEX IF NOT EXISTS idx_orders_updated ON orders(updated_at);

CREATE TABLE IF NOT EXISTS payments (
    id TEXT PRIMARY KEY,
    order_id TEXT NOT NULL,
    status TEXT NOT NULL,
    error_type TEXT,
    amount_cents INTEGER NOT NULL DEFAULT 0,
    created_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_payments_created ON payments(created_at);
CREATE INDEX IF NOT EXISTS idx_payments_status ON payments(status, created_at);

CREATE TABLE IF NOT EXISTS inventory_updates (
    id TEXT PRIMARY KEY,
    product_id TEXT NOT NULL,
    quantity_delta INTEGER NOT NULL,
    created_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_inventory_created ON inventory_updates(created_at);

CREATE TABLE IF NOT EXISTS performance_metrics (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    value REAL NOT NULL,
    timestamp INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_perf_name_time ON performance_metrics(name, timestamp);

CREATE TABLE IF NOT EXISTS aggregated_metrics (
    id TEXT PRIMARY KEY,
    timestamp INTEGER NOT NULL,
    timeframe TEXT NOT NULL,
    metrics TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_agg_time ON aggregated_metrics(timestamp);

CREATE TABLE IF NOT EXISTS system_alerts (
    id TEXT PRIMARY KEY,
    alert_id TEXT NOT NULL,
    timestamp INTEGER NOT NULL,
    category TEXT NOT NULL,
    severity TEXT NOT NULL,
    message TEXT NOT NULL,
    data TEXT NOT NULL DEFAULT '{}',
    processed INTEGER NOT NULL DEFAULT 0,
    dispatch_results TEXT,
    created_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_system_alerts_alert_id ON system_alerts(alert_id);
CREATE INDEX IF NOT EXISTS idx_system_alerts_time ON system_alerts(timestamp);
";

pub struct SqliteDocumentStore {
    conn: Mutex<Connection>,
}

impl SqliteDocumentStore {
    pub fn new(path: &Path) -> Result<Self> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .map_err(|e| StorageError::Other(format!("create data dir: {e}")))?;
        }
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;
        tracing::info!(path = %path.display(), "Document store opened");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// In-memory store for tests.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Lock the connection, recovering from a poisoned Mutex if necessary.
    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn count_in_window(
        &self,
        sql: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<u64> {
        let conn = self.lock();
        let mut stmt = conn.prepare_cached(sql)?;
        let count: i64 = stmt.query_row(
            rusqlite::params![from.timestamp_millis(), to.timestamp_millis()],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}

fn row_to_alert_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<AlertRecord> {
    let ts_ms: i64 = row.get(2)?;
    let created_ms: i64 = row.get(9)?;
    let severity_str: String = row.get(4)?;
    let data_str: String = row.get(6)?;
    let processed: i64 = row.get(7)?;
    Ok(AlertRecord {
        id: row.get(0)?,
        alert_id: row.get(1)?,
        timestamp: DateTime::from_timestamp_millis(ts_ms).unwrap_or_default(),
        category: row.get(3)?,
        severity: severity_str.parse().unwrap_or(Severity::Info),
        message: row.get(5)?,
        data: serde_json::from_str(&data_str).unwrap_or_default(),
        processed: processed != 0,
        dispatch_results: row.get(8)?,
        created_at: DateTime::from_timestamp_millis(created_ms).unwrap_or_default(),
    })
}

impl DocumentStore for SqliteDocumentStore {
    fn count_orders_created(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Result<u64> {
        self.count_in_window(
            "SELECT COUNT(*) FROM orders WHERE created_at >= ?1 AND created_at <= ?2",
            from,
            to,
        )
    }

    fn count_fulfillment_updates(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Result<u64> {
        self.count_in_window(
            "SELECT COUNT(*) FROM orders
             WHERE updated_at >= ?1 AND updated_at <= ?2
               AND fulfillment_status IS NOT NULL",
            from,
            to,
        )
    }

    fn count_payments(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Result<u64> {
        self.count_in_window(
            "SELECT COUNT(*) FROM payments WHERE created_at >= ?1 AND created_at <= ?2",
            from,
            to,
        )
    }

    fn count_failed_payments(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Result<u64> {
        self.count_in_window(
            "SELECT COUNT(*) FROM payments
             WHERE created_at >= ?1 AND created_at <= ?2 AND status = 'failed'",
            from,
            to,
        )
    }

    fn sample_payment_errors(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<String>> {
        let conn = self.lock();
        let mut stmt = conn.prepare_cached(
            "SELECT error_type FROM payments
             WHERE created_at >= ?1 AND created_at <= ?2 AND status = 'failed'
             ORDER BY created_at ASC LIMIT ?3",
        )?;
        let rows = stmt.query_map(
            rusqlite::params![
                from.timestamp_millis(),
                to.timestamp_millis(),
                limit as i64
            ],
            |row| row.get::<_, Option<String>>(0),
        )?;
        let mut errors = Vec::new();
        for row in rows {
            let error_type = row?;
            // Missing error details on a failure are not an error themselves.
            errors.push(match error_type {
                Some(e) if !e.is_empty() => e,
                _ => "unknown".to_string(),
            });
        }
        Ok(errors)
    }

    fn count_inventory_updates(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Result<u64> {
        self.count_in_window(
            "SELECT COUNT(*) FROM inventory_updates WHERE created_at >= ?1 AND created_at <= ?2",
            from,
            to,
        )
    }

    fn count_error_logs(
        &self,
        category: Category,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<u64> {
        let conn = self.lock();
        let mut stmt = conn.prepare_cached(
            "SELECT COUNT(*) FROM system_logs
             WHERE category = ?1 AND timestamp >= ?2 AND timestamp <= ?3
               AND level IN ('error', 'critical')",
        )?;
        let count: i64 = stmt.query_row(
            rusqlite::params![
                category.to_string(),
                from.timestamp_millis(),
                to.timestamp_millis()
            ],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn query_metric_samples(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<MetricSample>> {
        let conn = self.lock();
        let mut stmt = conn.prepare_cached(
            "SELECT id, name, value, timestamp FROM performance_metrics
             WHERE timestamp >= ?1 AND timestamp <= ?2
             ORDER BY timestamp ASC",
        )?;
        let rows = stmt.query_map(
            rusqlite::params![from.timestamp_millis(), to.timestamp_millis()],
            |row| {
                let ts_ms: i64 = row.get(3)?;
                Ok(MetricSample {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    value: row.get(2)?,
                    timestamp: DateTime::from_timestamp_millis(ts_ms).unwrap_or_default(),
                })
            },
        )?;
        let mut samples = Vec::new();
        for row in rows {
            samples.push(row?);
        }
        Ok(samples)
    }

    fn write_aggregated_metrics(&self, snapshot: &AggregatedMetrics) -> Result<()> {
        let metrics_json = serde_json::to_string(&snapshot.metrics)?;
        let conn = self.lock();
        let mut stmt = conn.prepare_cached(
            "INSERT INTO aggregated_metrics (id, timestamp, timeframe, metrics)
             VALUES (?1, ?2, ?3, ?4)",
        )?;
        stmt.execute(rusqlite::params![
            &snapshot.id,
            snapshot.timestamp.timestamp_millis(),
            &snapshot.timeframe,
            metrics_json,
        ])?;
        Ok(())
    }

    fn insert_alert(&self, alert: &Alert) -> Result<AlertRecord> {
        let now = Utc::now();
        let record = AlertRecord {
            id: shopmon_common::id::next_id(),
            alert_id: alert.id.clone(),
            timestamp: alert.timestamp,
            category: alert.category.clone(),
            severity: alert.severity,
            message: alert.message.clone(),
            data: alert.data.clone(),
            processed: false,
            dispatch_results: None,
            created_at: now,
        };
        let data_json = serde_json::to_string(&record.data)?;
        let conn = self.lock();
        let mut stmt = conn.prepare_cached(
            "INSERT INTO system_alerts
             (id, alert_id, timestamp, category, severity, message, data, processed, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0, ?8)",
        )?;
        stmt.execute(rusqlite::params![
            &record.id,
            &record.alert_id,
            record.timestamp.timestamp_millis(),
            &record.category,
            record.severity.to_string(),
            &record.message,
            data_json,
            record.created_at.timestamp_millis(),
        ])?;
        Ok(record)
    }

    fn mark_alert_processed(&self, alert_id: &str, dispatch_results: &str) -> Result<usize> {
        let conn = self.lock();
        let mut stmt = conn.prepare_cached(
            "UPDATE system_alerts SET processed = 1, dispatch_results = ?2
             WHERE alert_id = ?1",
        )?;
        let updated = stmt.execute(rusqlite::params![alert_id, dispatch_results])?;
        Ok(updated)
    }

    fn query_alert_history(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<AlertRecord>> {
        let conn = self.lock();
        let mut stmt = conn.prepare_cached(
            "SELECT id, alert_id, timestamp, category, severity, message, data,
                    processed, dispatch_results, created_at
             FROM system_alerts
             WHERE timestamp >= ?1 AND timestamp <= ?2
             ORDER BY timestamp DESC LIMIT ?3",
        )?;
        let rows = stmt.query_map(
            rusqlite::params![
                from.timestamp_millis(),
                to.timestamp_millis(),
                limit as i64
            ],
            row_to_alert_record,
        )?;
        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    fn query_alerts_by_alert_id(&self, alert_id: &str) -> Result<Vec<AlertRecord>> {
        let conn = self.lock();
        let mut stmt = conn.prepare_cached(
            "SELECT id, alert_id, timestamp, category, severity, message, data,
                    processed, dispatch_results, created_at
             FROM system_alerts
             WHERE alert_id = ?1
             ORDER BY created_at ASC",
        )?;
        let rows = stmt.query_map(rusqlite::params![alert_id], row_to_alert_record)?;
        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    fn query_aggregated_metrics(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<AggregatedMetrics>> {
        let conn = self.lock();
        let mut stmt = conn.prepare_cached(
            "SELECT id, timestamp, timeframe, metrics FROM aggregated_metrics
             WHERE timestamp >= ?1 AND timestamp <= ?2
             ORDER BY timestamp ASC",
        )?;
        let rows = stmt.query_map(
            rusqlite::params![from.timestamp_millis(), to.timestamp_millis()],
            |row| {
                let ts_ms: i64 = row.get(1)?;
                let metrics_str: String = row.get(3)?;
                Ok((
                    row.get::<_, String>(0)?,
                    ts_ms,
                    row.get::<_, String>(2)?,
                    metrics_str,
                ))
            },
        )?;
        let mut snapshots = Vec::new();
        for row in rows {
            let (id, ts_ms, timeframe, metrics_str) = row?;
            snapshots.push(AggregatedMetrics {
                id,
                timestamp: DateTime::from_timestamp_millis(ts_ms).unwrap_or_default(),
                timeframe,
                metrics: serde_json::from_str(&metrics_str)?,
            });
        }
        Ok(snapshots)
    }

    fn cleanup_alerts(&self, retention_days: u32) -> Result<usize> {
        let cutoff = Utc::now() - Duration::days(retention_days as i64);
        let conn = self.lock();
        let removed = conn.execute(
            "DELETE FROM system_alerts WHERE timestamp < ?1",
            rusqlite::params![cutoff.timestamp_millis()],
        )?;
        Ok(removed)
    }

    fn cleanup_aggregated_metrics(&self, retention_days: u32) -> Result<usize> {
        let cutoff = Utc::now() - Duration::days(retention_days as i64);
        let conn = self.lock();
        let removed = conn.execute(
            "DELETE FROM aggregated_metrics WHERE timestamp < ?1",
            rusqlite::params![cutoff.timestamp_millis()],
        )?;
        Ok(removed)
    }

    fn insert_order(&self, order: &OrderDoc) -> Result<()> {
        let conn = self.lock();
        let mut stmt = conn.prepare_cached(
            "INSERT INTO orders (id, status, fulfillment_status, total_cents, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )?;
        stmt.execute(rusqlite::params![
            &order.id,
            &order.status,
            order.fulfillment_status.as_deref(),
            order.total_cents,
            order.created_at.timestamp_millis(),
            order.updated_at.timestamp_millis(),
        ])?;
        Ok(())
    }

    fn set_order_fulfillment(
        &self,
        order_id: &str,
        fulfillment_status: &str,
        at: DateTime<Utc>,
    ) -> Result<()> {
        let conn = self.lock();
        let mut stmt = conn.prepare_cached(
            "UPDATE orders SET fulfillment_status = ?2, updated_at = ?3 WHERE id = ?1",
        )?;
        stmt.execute(rusqlite::params![
            order_id,
            fulfillment_status,
            at.timestamp_millis()
        ])?;
        Ok(())
    }

    fn insert_payment(&self, payment: &PaymentDoc) -> Result<()> {
        let conn = self.lock();
        let mut stmt = conn.prepare_cached(
            "INSERT INTO payments (id, order_id, status, error_type, amount_cents, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )?;
        stmt.execute(rusqlite::params![
            &payment.id,
            &payment.order_id,
            &payment.status,
            payment.error_type.as_deref(),
            payment.amount_cents,
            payment.created_at.timestamp_millis(),
        ])?;
        Ok(())
    }

    fn insert_inventory_update(&self, update: &InventoryUpdateDoc) -> Result<()> {
        let conn = self.lock();
        let mut stmt = conn.prepare_cached(
            "INSERT INTO inventory_updates (id, product_id, quantity_delta, created_at)
             VALUES (?1, ?2, ?3, ?4)",
        )?;
        stmt.execute(rusqlite::params![
            &update.id,
            &update.product_id,
            update.quantity_delta,
            update.created_at.timestamp_millis(),
        ])?;
        Ok(())
    }

    fn insert_log_entry(&self, entry: &LogEntry) -> Result<()> {
        let data_json = serde_json::to_string(&entry.data)?;
        let conn = self.lock();
        let mut stmt = conn.prepare_cached(
            "INSERT INTO system_logs (id, timestamp, category, level, message, data)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )?;
        stmt.execute(rusqlite::params![
            &entry.id,
            entry.timestamp.timestamp_millis(),
            entry.category.to_string(),
            entry.level.to_string(),
            &entry.message,
            data_json,
        ])?;
        Ok(())
    }

    fn insert_metric_sample(&self, sample: &MetricSample) -> Result<()> {
        let conn = self.lock();
        let mut stmt = conn.prepare_cached(
            "INSERT INTO performance_metrics (id, name, value, timestamp)
             VALUES (?1, ?2, ?3, ?4)",
        )?;
        stmt.execute(rusqlite::params![
            &sample.id,
            &sample.name,
            sample.value,
            sample.timestamp.timestamp_millis(),
        ])?;
        Ok(())
    }
}
