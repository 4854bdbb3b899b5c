use lake_catalog_core::contract::{
    decode_notification_body, outcome_notification, DecodeError, PARTITION_ADD_FAILURE,
    PARTITION_REFRESH_SUBJECT,
};
use lake_catalog_core::queue::{queue_records, QueueEventError, QueueRecord};
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info};

use crate::adapters::publisher::NotificationPublisher;
use crate::relay::relay_notification;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EscalationSummary {
    pub relayed: usize,
    pub failed: usize,
}

#[derive(Debug, thiserror::Error)]
enum EscalationError {
    #[error(transparent)]
    Record(#[from] QueueEventError),
    #[error("invalid record body: {0}")]
    Body(#[from] DecodeError),
}

/// Reports every dead-lettered notification as a partition failure.
///
/// A record that cannot be decoded is logged and counted; its siblings are
/// still escalated.
pub fn handle_dead_letter_event(
    event: &Value,
    topic_arn: &str,
    publisher: &impl NotificationPublisher,
) -> Result<EscalationSummary, QueueEventError> {
    let records = queue_records(event)?;
    info!(records = records.len(), "escalating dead-lettered notifications");

    let mut summary = EscalationSummary::default();
    for (index, raw_record) in records.iter().enumerate() {
        match escalate_record(raw_record, topic_arn, publisher) {
            Ok(()) => summary.relayed += 1,
            Err(error) => {
                error!(index, %error, "dead-lettered record could not be escalated");
                summary.failed += 1;
            }
        }
    }

    Ok(summary)
}

fn escalate_record(
    raw_record: &Value,
    topic_arn: &str,
    publisher: &impl NotificationPublisher,
) -> Result<(), EscalationError> {
    let record = QueueRecord::from_value(raw_record)?;
    let body = decode_notification_body(&record.body)?;
    let message = outcome_notification(&body, PARTITION_ADD_FAILURE);

    relay_notification(
        publisher,
        topic_arn,
        PARTITION_REFRESH_SUBJECT,
        &message,
        record.aws_region.as_deref(),
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::test_helpers::CapturingPublisher;

    const TOPIC: &str = "arn:aws:sns:eu-west-1:111122223333:dih-replies";

    fn body(feed: &str) -> String {
        json!({
            "notify_type": "dih_file_create_success",
            "feed": feed,
            "partition_value_list": ["2021-09-13"],
            "partition_key": ["dw_bus_dt"],
            "partition_prefix": "s3://lake/x"
        })
        .to_string()
    }

    #[test]
    fn relays_failure_for_each_record() {
        let publisher = CapturingPublisher::new();
        let event = json!({
            "Records": [
                {"body": body("a#one"), "awsRegion": "eu-west-1"},
                {"body": body("a#two"), "awsRegion": "eu-west-2"}
            ]
        });

        let summary =
            handle_dead_letter_event(&event, TOPIC, &publisher).expect("event is well formed");

        assert_eq!(summary, EscalationSummary { relayed: 2, failed: 0 });
        let messages = publisher.messages();
        assert_eq!(messages[0]["feed"], "a#one");
        assert_eq!(messages[1]["feed"], "a#two");
        assert!(messages
            .iter()
            .all(|message| message["notify_type"] == "dih_glue_add_ptn_failure"));
        let regions: Vec<_> = publisher
            .requests()
            .into_iter()
            .map(|request| request.region)
            .collect();
        assert_eq!(
            regions,
            vec![Some("eu-west-1".to_string()), Some("eu-west-2".to_string())]
        );
    }

    #[test]
    fn malformed_record_does_not_block_siblings() {
        let publisher = CapturingPublisher::new();
        let event = json!({
            "Records": [
                {"body": body("a#one")},
                {"body": "{not json"},
                {"body": 17},
                {"body": body("a#four")}
            ]
        });

        let summary =
            handle_dead_letter_event(&event, TOPIC, &publisher).expect("event is well formed");

        assert_eq!(summary, EscalationSummary { relayed: 2, failed: 2 });
        let feeds: Vec<_> = publisher
            .messages()
            .into_iter()
            .map(|message| message["feed"].clone())
            .collect();
        assert_eq!(feeds, vec![json!("a#one"), json!("a#four")]);
    }

    #[test]
    fn unwraps_envelope_before_marking_failure() {
        let publisher = CapturingPublisher::new();
        let envelope = json!({"Type": "Notification", "Message": body("a#one")}).to_string();
        let event = json!({"Records": [{"body": envelope}]});

        handle_dead_letter_event(&event, TOPIC, &publisher).expect("event is well formed");

        let message = &publisher.messages()[0];
        assert_eq!(message["notify_type"], "dih_glue_add_ptn_failure");
        assert!(message.get("Message").is_none());
    }

    #[test]
    fn publish_failures_are_swallowed() {
        let publisher = CapturingPublisher::failing();
        let event = json!({"Records": [{"body": body("a#one")}]});

        let summary =
            handle_dead_letter_event(&event, TOPIC, &publisher).expect("event is well formed");
        assert_eq!(summary.failed, 0);
        assert_eq!(publisher.requests().len(), 1);
    }
}
