use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// One of the four monitored order-lifecycle stages.
///
/// # Examples
///
/// ```
/// use shopmon_common::types::Category;
///
/// let cat: Category = "payment-processing".parse().unwrap();
/// assert_eq!(cat, Category::PaymentProcessing);
/// assert_eq!(cat.to_string(), "payment-processing");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    OrderCreation,
    PaymentProcessing,
    InventoryManagement,
    OrderFulfillment,
}

impl Category {
    /// All monitored categories, in evaluation order.
    pub const ALL: [Category; 4] = [
        Category::OrderCreation,
        Category::PaymentProcessing,
        Category::InventoryManagement,
        Category::OrderFulfillment,
    ];
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::OrderCreation => write!(f, "order-creation"),
            Category::PaymentProcessing => write!(f, "payment-processing"),
            Category::InventoryManagement => write!(f, "inventory-management"),
            Category::OrderFulfillment => write!(f, "order-fulfillment"),
        }
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "order-creation" => Ok(Category::OrderCreation),
            "payment-processing" => Ok(Category::PaymentProcessing),
            "inventory-management" => Ok(Category::InventoryManagement),
            "order-fulfillment" => Ok(Category::OrderFulfillment),
            _ => Err(format!("unknown category: {s}")),
        }
    }
}

/// Log entry level, ordered from lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warning => write!(f, "warning"),
            LogLevel::Error => write!(f, "error"),
            LogLevel::Critical => write!(f, "critical"),
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warning" => Ok(LogLevel::Warning),
            "error" => Ok(LogLevel::Error),
            "critical" => Ok(LogLevel::Critical),
            _ => Err(format!("unknown log level: {s}")),
        }
    }
}

/// Alert severity tier, ordered from lowest to highest.
///
/// # Examples
///
/// ```
/// use shopmon_common::types::Severity;
///
/// let sev: Severity = "warning".parse().unwrap();
/// assert_eq!(sev, Severity::Warning);
/// assert!(Severity::Critical > Severity::Info);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "info" => Ok(Severity::Info),
            "warning" => Ok(Severity::Warning),
            "critical" => Ok(Severity::Critical),
            _ => Err(format!("unknown severity: {s}")),
        }
    }
}

/// An error log document written by any storefront subsystem.
/// Immutable once written; the pipeline only counts them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub category: Category,
    pub level: LogLevel,
    pub message: String,
    pub data: Value,
}

/// One performance observation, e.g. a checkout page load time in ms.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricSample {
    pub id: String,
    pub name: String,
    pub value: f64,
    pub timestamp: DateTime<Utc>,
}

/// A threshold-breach alert.
///
/// `id` is generated at creation time and travels inside the pub-sub
/// payload; the dispatcher uses it as the document key when marking the
/// persisted record processed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    /// Category wire name (`order-creation`, ...) or `performance` for
    /// latency alerts.
    pub category: String,
    pub severity: Severity,
    pub message: String,
    /// Breach context: error_rate/threshold/counts/sample errors for
    /// category alerts, metric/average/threshold/sample_count for
    /// performance alerts.
    pub data: Value,
}

/// Aggregate statistics for one metric name over the window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricStats {
    pub sum: f64,
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub average: f64,
}

/// Write-once snapshot of all performance metrics for one scheduled run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatedMetrics {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    /// Always `"5min"`; the window length is fixed.
    pub timeframe: String,
    pub metrics: HashMap<String, MetricStats>,
}

/// Per-category counts and error rate computed by the collector for one
/// trailing window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryStats {
    pub category: Category,
    pub total_operations: u64,
    pub error_count: u64,
    /// Percent. 100.0 when `total_operations == 0` but errors were seen.
    pub error_rate: f64,
    /// Sampled failure reasons (payment-processing only).
    pub sample_errors: Vec<String>,
}

/// Windowed average for one performance metric.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricAverage {
    pub name: String,
    pub average: f64,
    pub count: u64,
}
