use crate::channels::chat::ChatWebhookChannel;
use crate::channels::pager::PagerWebhookChannel;
use crate::channels::sms::SmsChannel;
use crate::dispatcher::AlertDispatcher;
use crate::error::{NotifyError, Result};
use crate::routing::{ChannelsConfig, TierConfig, TierRouting};
use crate::topic::alert_topic;
use crate::NotificationChannel;
use async_trait::async_trait;
use chrono::Utc;
use shopmon_common::types::{Alert, Severity};
use shopmon_storage::engine::SqliteDocumentStore;
use shopmon_storage::DocumentStore;
use std::sync::{Arc, Mutex};

fn alert(severity: Severity) -> Alert {
    shopmon_common::id::init(1, 1);
    Alert {
        id: shopmon_common::id::next_id(),
        timestamp: Utc::now(),
        category: "payment-processing".to_string(),
        severity,
        message: "payment-processing error rate 6.0% at or above threshold 2.0%".to_string(),
        data: serde_json::json!({
            "error_rate": 6.0,
            "threshold": 2.0,
            "total_operations": 100,
            "error_count": 6,
            "sample_errors": ["card_declined"],
        }),
    }
}

// ── payload formats ──

#[test]
fn chat_body_has_color_coded_attachment() {
    let body = ChatWebhookChannel::format_body(&alert(Severity::Critical));
    assert_eq!(body["attachments"][0]["color"], "danger");
    let text = body["text"].as_str().unwrap();
    assert!(text.contains("[critical]"));
    assert!(text.contains("payment-processing"));
    let fields = body["attachments"][0]["fields"].as_array().unwrap();
    assert_eq!(fields[0]["title"], "Category");
    assert_eq!(fields[0]["value"], "payment-processing");

    let warning = ChatWebhookChannel::format_body(&alert(Severity::Warning));
    assert_eq!(warning["attachments"][0]["color"], "warning");
    let info = ChatWebhookChannel::format_body(&alert(Severity::Info));
    assert_eq!(info["attachments"][0]["color"], "good");
}

#[test]
fn pager_body_carries_routing_key_and_trigger() {
    let channel = PagerWebhookChannel::new("https://events.example.com/v2/enqueue", "rk-123");
    let body = channel.format_body(&alert(Severity::Critical));
    assert_eq!(body["routing_key"], "rk-123");
    assert_eq!(body["event_action"], "trigger");
    assert_eq!(body["payload"]["source"], "shopmon");
    assert_eq!(body["payload"]["severity"], "critical");
    assert_eq!(body["payload"]["custom_details"]["error_count"], 6);
}

#[test]
fn sms_message_is_compact() {
    let msg = SmsChannel::format_message(&alert(Severity::Warning));
    assert!(msg.starts_with("[shopmon][warning] payment-processing:"));
}

// ── routing ──

#[test]
fn tiers_are_disjoint_and_pager_is_critical_only() {
    let config = ChannelsConfig {
        critical: TierConfig {
            emails: vec!["oncall@example.com".to_string()],
            chat_webhook_url: Some("https://hooks.example.com/critical".to_string()),
            sms_numbers: vec!["+15550100".to_string()],
            pager_webhook_url: Some("https://events.example.com/v2/enqueue".to_string()),
            pager_routing_key: Some("rk-123".to_string()),
        },
        warning: TierConfig {
            chat_webhook_url: Some("https://hooks.example.com/warning".to_string()),
            // Misconfigured pager on a non-critical tier is ignored.
            pager_webhook_url: Some("https://events.example.com/v2/enqueue".to_string()),
            pager_routing_key: Some("rk-123".to_string()),
            ..Default::default()
        },
        info: TierConfig::default(),
    };

    let routing = TierRouting::from_config(&config);

    let critical: Vec<&str> = routing
        .channels_for(Severity::Critical)
        .iter()
        .map(|c| c.channel_name())
        .collect();
    assert_eq!(critical, vec!["chat", "pager", "email", "sms"]);

    let warning: Vec<&str> = routing
        .channels_for(Severity::Warning)
        .iter()
        .map(|c| c.channel_name())
        .collect();
    assert_eq!(warning, vec!["chat"]);

    assert!(routing.channels_for(Severity::Info).is_empty());
}

// ── dispatcher ──

struct RecordingChannel {
    name: String,
    fail: bool,
    sends: Arc<Mutex<Vec<String>>>,
}

impl RecordingChannel {
    fn new(name: &str, fail: bool) -> (Arc<Self>, Arc<Mutex<Vec<String>>>) {
        let sends = Arc::new(Mutex::new(Vec::new()));
        (
            Arc::new(Self {
                name: name.to_string(),
                fail,
                sends: sends.clone(),
            }),
            sends,
        )
    }
}

#[async_trait]
impl NotificationChannel for RecordingChannel {
    async fn send(&self, alert: &Alert) -> Result<()> {
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

fn dispatcher_with(
    channels: Vec<Arc<dyn NotificationChannel>>,
    severity: Severity,
) -> (AlertDispatcher, Arc<SqliteDocumentStore>) {
    let store = Arc::new(SqliteDocumentStore::in_memory().unwrap());
    let mut routing = TierRouting::new();
    routing.set_tier(severity, channels);
    (AlertDispatcher::new(routing, store.clone()), store)
}

#[tokio::test]
async fn critical_alert_pages_exactly_once() {
    let (pager, pager_sends) = RecordingChannel::new("pager", false);
    let (chat, chat_sends) = RecordingChannel::new("chat", false);
    let (dispatcher, store) = dispatcher_with(
        vec![pager as Arc<dyn NotificationChannel>, chat],
        Severity::Critical,
    );

    let alert = alert(Severity::Critical);
    let results = dispatcher.dispatch(&alert).await.unwrap();

    assert_eq!(pager_sends.lock().unwrap().len(), 1);
    assert_eq!(chat_sends.lock().unwrap().len(), 1);
    // The page is dispatched synchronously ahead of the batch.
    assert_eq!(results[0].channel, "pager");
    assert!(results.iter().all(|r| r.status == "success"));

    let rows = store.query_alerts_by_alert_id(&alert.id).unwrap();
    assert_eq!(rows.len(), 1);
    assert!(rows[0].processed);
}

#[tokio::test]
async fn one_failing_channel_does_not_block_the_others() {
    let (chat, chat_sends) = RecordingChannel::new("chat", true);
    let (email, email_sends) = RecordingChannel::new("email", false);
    let (sms, sms_sends) = RecordingChannel::new("sms", false);
    let (dispatcher, store) = dispatcher_with(
        vec![chat as Arc<dyn NotificationChannel>, email, sms],
        Severity::Warning,
    );

    let alert = alert(Severity::Warning);
    let results = dispatcher.dispatch(&alert).await.unwrap();

    assert_eq!(chat_sends.lock().unwrap().len(), 1);
    assert_eq!(email_sends.lock().unwrap().len(), 1);
    assert_eq!(sms_sends.lock().unwrap().len(), 1);

    let failed: Vec<&str> = results
        .iter()
        .filter(|r| r.status == "failed")
        .map(|r| r.channel.as_str())
        .collect();
    assert_eq!(failed, vec!["chat"]);
    let chat_result = results.iter().find(|r| r.channel == "chat").unwrap();
    assert!(chat_result.error.as_deref().unwrap().contains("simulated outage"));

    // The per-channel outcomes land on the completion record.
    let rows = store.query_alerts_by_alert_id(&alert.id).unwrap();
    assert!(rows[0].processed);
    let stored = rows[0].dispatch_results.as_deref().unwrap();
    assert!(stored.contains("\"chat\""));
    assert!(stored.contains("failed"));
}

#[tokio::test]
async fn unrouted_severity_still_marks_processed() {
    let (dispatcher, store) = dispatcher_with(Vec::new(), Severity::Critical);

    let alert = alert(Severity::Info);
    let results = dispatcher.dispatch(&alert).await.unwrap();
    assert!(results.is_empty());

    let rows = store.query_alerts_by_alert_id(&alert.id).unwrap();
    assert!(rows[0].processed);
    assert_eq!(rows[0].dispatch_results.as_deref(), Some("[]"));
}

#[tokio::test]
async fn replayed_payload_creates_duplicate_records_and_sends() {
    // At-least-once redelivery is not deduplicated anywhere on this path.
    // This pins the gap; fixing it must change this test deliberately.
    let (chat, chat_sends) = RecordingChannel::new("chat", false);
    let (dispatcher, store) =
        dispatcher_with(vec![chat as Arc<dyn NotificationChannel>], Severity::Warning);

    let alert = alert(Severity::Warning);
    let payload = serde_json::to_string(&alert).unwrap();

    dispatcher.handle_payload(&payload).await.unwrap();
    dispatcher.handle_payload(&payload).await.unwrap();

    assert_eq!(chat_sends.lock().unwrap().len(), 2);
    let rows = store.query_alerts_by_alert_id(&alert.id).unwrap();
    assert_eq!(rows.len(), 2);
}

#[tokio::test]
async fn malformed_payload_is_an_error() {
    let (dispatcher, store) = dispatcher_with(Vec::new(), Severity::Warning);

    let result = dispatcher.handle_payload("{not json").await;
    assert!(result.is_err());
    let history = store
        .query_alert_history(
            Utc::now() - chrono::Duration::hours(1),
            Utc::now() + chrono::Duration::seconds(1),
            10,
        )
        .unwrap();
    assert!(history.is_empty());
}

// ── topic ──

#[tokio::test]
async fn topic_round_trips_alert_payloads() {
    let (publisher, mut subscriber) = alert_topic();

    let alert = alert(Severity::Warning);
    publisher.publish(&alert).unwrap();

    let payload = subscriber.recv().await.unwrap();
    let decoded: Alert = serde_json::from_str(&payload).unwrap();
    assert_eq!(decoded.id, alert.id);
    assert_eq!(decoded.severity, Severity::Warning);

    drop(publisher);
    assert!(subscriber.recv().await.is_none());
}
