//! Threshold evaluation for collected order-lifecycle metrics.
//!
//! The evaluator compares each collected metric against its static
//! threshold and classifies severity with a fixed multiplier rule. There
//! is no hysteresis and no suppression window: a metric sitting at its
//! threshold re-alerts on every scheduled run.

pub mod thresholds;

#[cfg(test)]
mod tests;

use chrono::Utc;
use shopmon_common::types::{Alert, CategoryStats, MetricAverage, Severity};
use thresholds::ThresholdTable;

/// Category name used for latency alerts, which are not tied to one of the
/// four order-lifecycle stages.
pub const PERFORMANCE_CATEGORY: &str = "performance";

/// Severity as a pure function of the observed value and its threshold:
/// at or above twice the threshold is critical, at or above the threshold
/// is a warning, anything below is info.
///
/// # Examples
///
/// ```
/// use shopmon_alert::classify;
/// use shopmon_common::types::Severity;
///
/// assert_eq!(classify(6.0, 2.0), Severity::Critical);
/// assert_eq!(classify(3.0, 2.0), Severity::Warning);
/// assert_eq!(classify(1.9, 2.0), Severity::Info);
/// ```
pub fn classify(value: f64, threshold: f64) -> Severity {
    if value >= 2.0 * threshold {
        Severity::Critical
    } else if value >= threshold {
        Severity::Warning
    } else {
        Severity::Info
    }
}

pub struct ThresholdEvaluator {
    thresholds: ThresholdTable,
}

impl ThresholdEvaluator {
    pub fn new(thresholds: ThresholdTable) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &ThresholdTable {
        &self.thresholds
    }

    /// Evaluates one category's windowed error rate. Returns an alert only
    /// for warning or critical breaches; info-level error rates are never
    /// surfaced.
    ///
    /// When a category saw errors but zero total operations, the rate is
    /// already 100 and the threshold is forced to 0, so any error without
    /// baseline volume alerts.
    pub fn evaluate_category(&self, stats: &CategoryStats) -> Option<Alert> {
        let threshold = if stats.total_operations == 0 && stats.error_count > 0 {
            0.0
        } else {
            self.thresholds.error_rate_threshold(stats.category)
        };

        let severity = classify(stats.error_rate, threshold);
        if severity < Severity::Warning {
            return None;
        }

        Some(Alert {
            id: shopmon_common::id::next_id(),
            timestamp: Utc::now(),
            category: stats.category.to_string(),
            severity,
            message: format!(
                "{} error rate {:.1}% at or above threshold {:.1}% ({} errors / {} operations)",
                stats.category,
                stats.error_rate,
                threshold,
                stats.error_count,
                stats.total_operations,
            ),
            data: serde_json::json!({
                "error_rate": stats.error_rate,
                "threshold": threshold,
                "total_operations": stats.total_operations,
                "error_count": stats.error_count,
                "sample_errors": stats.sample_errors,
            }),
        })
    }

    /// Evaluates one performance metric's windowed average against its
    /// configured latency threshold (or the 1000 ms default). The info
    /// classification exists only transiently here; no info alert is ever
    /// dispatched.
    pub fn evaluate_metric(&self, average: &MetricAverage) -> Option<Alert> {
        let threshold = self.thresholds.latency_threshold(&average.name);

        let severity = classify(average.average, threshold);
        if severity < Severity::Warning {
            return None;
        }

        Some(Alert {
            id: shopmon_common::id::next_id(),
            timestamp: Utc::now(),
            category: PERFORMANCE_CATEGORY.to_string(),
            severity,
            message: format!(
                "{} averaged {:.0}ms over {} samples, threshold {:.0}ms",
                average.name, average.average, average.count, threshold,
            ),
            data: serde_json::json!({
                "metric": average.name,
                "average": average.average,
                "threshold": threshold,
                "sample_count": average.count,
            }),
        })
    }
}
