use crate::thresholds::ThresholdTable;
use crate::{classify, ThresholdEvaluator, PERFORMANCE_CATEGORY};
use shopmon_common::types::{Category, CategoryStats, MetricAverage, Severity};

fn stats(category: Category, total: u64, errors: u64) -> CategoryStats {
    let error_rate = if total > 0 {
        errors as f64 / total as f64 * 100.0
    } else if errors > 0 {
        100.0
    } else {
        0.0
    };
    CategoryStats {
        category,
        total_operations: total,
        error_count: errors,
        error_rate,
        sample_errors: Vec::new(),
    }
}

#[test]
fn classify_multiplier_rule() {
    // threshold <= value < 2x threshold -> warning
    assert_eq!(classify(2.0, 2.0), Severity::Warning);
    assert_eq!(classify(3.9, 2.0), Severity::Warning);
    // value >= 2x threshold -> critical
    assert_eq!(classify(4.0, 2.0), Severity::Critical);
    assert_eq!(classify(50.0, 2.0), Severity::Critical);
    // below threshold -> info
    assert_eq!(classify(0.0, 2.0), Severity::Info);
    assert_eq!(classify(1.99, 2.0), Severity::Info);
}

#[test]
fn payment_warning_at_three_percent() {
    let evaluator = ThresholdEvaluator::new(ThresholdTable::default());

    let alert = evaluator
        .evaluate_category(&stats(Category::PaymentProcessing, 100, 3))
        .expect("3% > 2% threshold should alert");
    assert_eq!(alert.category, "payment-processing");
    assert_eq!(alert.severity, Severity::Warning);
    assert!((alert.data["error_rate"].as_f64().unwrap() - 3.0).abs() < 1e-9);
    assert_eq!(alert.data["threshold"], 2.0);
    assert_eq!(alert.data["total_operations"], 100);
    assert_eq!(alert.data["error_count"], 3);
    assert!(!alert.id.is_empty());
}

#[test]
fn payment_critical_at_six_percent() {
    let evaluator = ThresholdEvaluator::new(ThresholdTable::default());

    let alert = evaluator
        .evaluate_category(&stats(Category::PaymentProcessing, 100, 6))
        .expect("6% >= 2x 2% threshold should alert");
    assert_eq!(alert.severity, Severity::Critical);
}

#[test]
fn below_threshold_emits_nothing() {
    let evaluator = ThresholdEvaluator::new(ThresholdTable::default());

    // 1% < 2% payment threshold: info-level breaches are never surfaced.
    assert!(evaluator
        .evaluate_category(&stats(Category::PaymentProcessing, 100, 1))
        .is_none());
    // 4% < 5% order-creation threshold.
    assert!(evaluator
        .evaluate_category(&stats(Category::OrderCreation, 100, 4))
        .is_none());
}

#[test]
fn empty_window_emits_nothing() {
    let evaluator = ThresholdEvaluator::new(ThresholdTable::default());

    for category in Category::ALL {
        assert!(evaluator.evaluate_category(&stats(category, 0, 0)).is_none());
    }
}

#[test]
fn errors_without_volume_always_alert() {
    // Zero denominator with nonzero errors reads as a 100% rate with a
    // zero threshold. Whether alerting with no baseline volume is
    // intentional is an open question upstream; the behavior is pinned
    // here as observed rather than fixed.
    let evaluator = ThresholdEvaluator::new(ThresholdTable::default());

    let alert = evaluator
        .evaluate_category(&stats(Category::InventoryManagement, 0, 2))
        .expect("errors with zero operations must alert");
    assert_eq!(alert.severity, Severity::Critical);
    assert_eq!(alert.data["error_rate"], 100.0);
    assert_eq!(alert.data["threshold"], 0.0);
}

#[test]
fn per_category_thresholds_apply() {
    let evaluator = ThresholdEvaluator::new(ThresholdTable::default());

    // 4% breaches fulfillment (3%) but not order creation (5%).
    assert!(evaluator
        .evaluate_category(&stats(Category::OrderFulfillment, 100, 4))
        .is_some());
    assert!(evaluator
        .evaluate_category(&stats(Category::OrderCreation, 100, 4))
        .is_none());
    // 1% is exactly the inventory threshold.
    let alert = evaluator
        .evaluate_category(&stats(Category::InventoryManagement, 100, 1))
        .unwrap();
    assert_eq!(alert.severity, Severity::Warning);
}

#[test]
fn latency_uses_configured_threshold() {
    let mut table = ThresholdTable::default();
    table
        .latency_ms
        .insert("checkout.page_load".to_string(), 2000.0);
    let evaluator = ThresholdEvaluator::new(table);

    let alert = evaluator
        .evaluate_metric(&MetricAverage {
            name: "checkout.page_load".to_string(),
            average: 2500.0,
            count: 12,
        })
        .expect("2500ms >= 2000ms threshold");
    assert_eq!(alert.category, PERFORMANCE_CATEGORY);
    assert_eq!(alert.severity, Severity::Warning);
    assert_eq!(alert.data["metric"], "checkout.page_load");
    assert_eq!(alert.data["threshold"], 2000.0);
    assert_eq!(alert.data["sample_count"], 12);

    // Below threshold the transient info classification is dropped.
    assert!(evaluator
        .evaluate_metric(&MetricAverage {
            name: "checkout.page_load".to_string(),
            average: 1500.0,
            count: 4,
        })
        .is_none());
}

#[test]
fn latency_defaults_to_1000ms_when_unconfigured() {
    let evaluator = ThresholdEvaluator::new(ThresholdTable::default());

    let alert = evaluator
        .evaluate_metric(&MetricAverage {
            name: "product.page_load".to_string(),
            average: 2100.0,
            count: 7,
        })
        .expect("2100ms >= 2x 1000ms default");
    assert_eq!(alert.severity, Severity::Critical);
    assert_eq!(alert.data["threshold"], 1000.0);
}
