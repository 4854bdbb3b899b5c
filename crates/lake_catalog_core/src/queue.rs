use serde_json::Value;

const QUEUE_EVENT_SOURCE: &str = "aws:sqs";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueueEventError {
    #[error("queue event must include Records array")]
    MissingRecords,
    #[error("queue record body must be a string")]
    MissingBody,
}

/// One delivered queue message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueRecord {
    pub message_id: Option<String>,
    pub body: String,
    pub aws_region: Option<String>,
}

impl QueueRecord {
    pub fn from_value(record: &Value) -> Result<Self, QueueEventError> {
        let body = record
            .get("body")
            .and_then(Value::as_str)
            .ok_or(QueueEventError::MissingBody)?;

        Ok(Self {
            message_id: optional_string(record, "messageId"),
            body: body.to_string(),
            aws_region: optional_string(record, "awsRegion"),
        })
    }
}

/// Raw records of a queue-triggered invocation, in delivery order.
///
/// Records are decoded one at a time by callers so a single malformed record
/// can be handled without discarding its siblings.
pub fn queue_records(event: &Value) -> Result<&[Value], QueueEventError> {
    event
        .get("Records")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .ok_or(QueueEventError::MissingRecords)
}

pub fn is_queue_event(event: &Value) -> bool {
    queue_records(event)
        .map(|records| {
            !records.is_empty()
                && records.iter().all(|record| {
                    record
                        .get("eventSource")
                        .and_then(Value::as_str)
                        .map(|source| source == QUEUE_EVENT_SOURCE)
                        .unwrap_or(false)
                })
        })
        .unwrap_or(false)
}

fn optional_string(record: &Value, field: &str) -> Option<String> {
    record
        .get(field)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn detects_queue_event_shape() {
        let event = json!({
            "Records": [
                {"eventSource": "aws:sqs", "body": "{}"}
            ]
        });
        assert!(is_queue_event(&event));
    }

    #[test]
    fn rejects_non_queue_records() {
        let event = json!({
            "Records": [
                {"eventSource": "aws:s3", "body": "{}"}
            ]
        });
        assert!(!is_queue_event(&event));
        assert!(!is_queue_event(&json!({"Records": []})));
    }

    #[test]
    fn requires_records_array() {
        let error = queue_records(&json!({"records": []})).expect_err("missing Records");
        assert_eq!(error, QueueEventError::MissingRecords);
    }

    #[test]
    fn decodes_record_fields() {
        let record = QueueRecord::from_value(&json!({
            "messageId": "m-1",
            "body": "{\"a\":1}",
            "awsRegion": "eu-west-1"
        }))
        .expect("record should decode");

        assert_eq!(record.message_id.as_deref(), Some("m-1"));
        assert_eq!(record.body, "{\"a\":1}");
        assert_eq!(record.aws_region.as_deref(), Some("eu-west-1"));
    }

    #[test]
    fn rejects_record_without_body_string() {
        let error = QueueRecord::from_value(&json!({"body": 42})).expect_err("non-string body");
        assert!(error
            .to_string()
            .contains("queue record body must be a string"));
    }
}
