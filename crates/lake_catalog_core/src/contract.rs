use std::fmt;

use serde_json::{Map, Value};

use crate::validation::{IssueCollector, ValidationError};

/// `notify_type` announcing that a partition's files have landed.
pub const FILE_CREATE_SUCCESS: &str = "dih_file_create_success";
/// `notify_type` reported back once the catalog partition is in place.
pub const PARTITION_ADD_SUCCESS: &str = "dih_glue_add_ptn_success";
/// `notify_type` reported back once redelivery gave up on a notification.
pub const PARTITION_ADD_FAILURE: &str = "dih_glue_add_ptn_failure";
pub const PARTITION_REFRESH_SUBJECT: &str = "DIH Glue Catalog Partition Refresh message";

const ENVELOPE_TYPE: &str = "Notification";
const FEED_DELIMITER: char = '#';

/// A notification message as a JSON object.
///
/// Kept untyped so fields outside the partition contract travel through to
/// the outcome notification unchanged.
pub type NotificationBody = Map<String, Value>;

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("record body is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("notification envelope must carry a string Message")]
    EnvelopeMessage,
    #[error("notification body must be a JSON object")]
    NotAnObject,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("feed `{feed}` must have the form <database>#<table>")]
pub struct FeedError {
    pub feed: String,
}

/// Catalog table addressed by a feed identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FeedRef {
    pub database: String,
    pub table: String,
}

impl FeedRef {
    pub fn parse(feed: &str) -> Result<Self, FeedError> {
        let invalid = || FeedError {
            feed: feed.to_string(),
        };

        let mut parts = feed.split(FEED_DELIMITER);
        let (Some(database), Some(table), None) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid());
        };

        if database.is_empty() || table.is_empty() {
            return Err(invalid());
        }

        Ok(Self {
            database: database.to_string(),
            table: table.to_string(),
        })
    }
}

impl fmt::Display for FeedRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.database, self.table)
    }
}

/// Typed view of a file-create notification, validated once at the boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionNotification {
    pub feed: FeedRef,
    pub partition_key: Vec<String>,
    pub partition_value_list: Vec<String>,
    pub partition_prefix: String,
}

impl PartitionNotification {
    pub fn from_body(body: &NotificationBody) -> Result<Self, ValidationError> {
        let mut issues = IssueCollector::default();

        let feed = issues
            .required_string(body, "feed")
            .and_then(|feed| match FeedRef::parse(&feed) {
                Ok(value) => Some(value),
                Err(error) => {
                    issues.push("feed", error.to_string());
                    None
                }
            });
        let partition_value_list = issues.required_string_list(body, "partition_value_list");
        let partition_key = issues.required_string_list(body, "partition_key");
        let partition_prefix = issues.required_string(body, "partition_prefix");

        if let (Some(keys), Some(values)) = (&partition_key, &partition_value_list) {
            if keys.len() != values.len() {
                issues.push(
                    "partition_key",
                    format!(
                        "has {} entries but partition_value_list has {}",
                        keys.len(),
                        values.len()
                    ),
                );
            }
        }

        issues.finish()?;

        match (feed, partition_key, partition_value_list, partition_prefix) {
            (Some(feed), Some(partition_key), Some(partition_value_list), Some(partition_prefix)) => {
                Ok(Self {
                    feed,
                    partition_key,
                    partition_value_list,
                    partition_prefix,
                })
            }
            _ => Err(ValidationError::single(
                "body",
                "partition notification is incomplete",
            )),
        }
    }
}

/// Parses a queue record body, unwrapping a pub/sub envelope when present.
///
/// Bodies arrive either as the notification itself (direct enqueue) or as
/// `{"Type": "Notification", "Message": "<json>"}` from a topic subscription.
pub fn decode_notification_body(raw: &str) -> Result<NotificationBody, DecodeError> {
    let mut value: Value = serde_json::from_str(raw)?;

    if value.get("Type").and_then(Value::as_str) == Some(ENVELOPE_TYPE) {
        let message = value
            .get("Message")
            .and_then(Value::as_str)
            .ok_or(DecodeError::EnvelopeMessage)?;
        value = serde_json::from_str(message)?;
    }

    match value {
        Value::Object(object) => Ok(object),
        _ => Err(DecodeError::NotAnObject),
    }
}

pub fn notify_type(body: &NotificationBody) -> Option<&str> {
    body.get("notify_type").and_then(Value::as_str)
}

pub fn is_file_create_success(body: &NotificationBody) -> bool {
    notify_type(body) == Some(FILE_CREATE_SUCCESS)
}

/// Copy of `body` with only `notify_type` replaced.
pub fn outcome_notification(body: &NotificationBody, notify_type: &str) -> NotificationBody {
    let mut outcome = body.clone();
    outcome.insert(
        "notify_type".to_string(),
        Value::String(notify_type.to_string()),
    );
    outcome
}
