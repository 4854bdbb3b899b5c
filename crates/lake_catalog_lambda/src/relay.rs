//! Best-effort outcome notifications back to the ingestion hub.

use lake_catalog_core::attributes::message_attributes;
use lake_catalog_core::contract::NotificationBody;
use tracing::{error, info};

use crate::adapters::publisher::{NotificationPublisher, PublishRequest};

/// Publishes `message` to `topic_arn` with one string attribute per field.
///
/// Never fails: delivery problems are logged and swallowed so a lost
/// notification cannot cause an already-committed catalog change to be
/// reprocessed.
pub fn relay_notification(
    publisher: &impl NotificationPublisher,
    topic_arn: &str,
    subject: &str,
    message: &NotificationBody,
    region: Option<&str>,
) {
    let body = match serde_json::to_string(message) {
        Ok(value) => value,
        Err(error) => {
            error!(topic_arn, %error, "failed to serialize notification");
            return;
        }
    };

    let request = PublishRequest {
        topic_arn: topic_arn.to_string(),
        subject: subject.to_string(),
        message: body,
        attributes: message_attributes(message),
        region: region.map(str::to_string),
    };

    info!(
        topic_arn,
        subject,
        region = region.unwrap_or("default"),
        message = %request.message,
        "publishing notification"
    );

    if let Err(error) = publisher.publish(&request) {
        error!(topic_arn, %error, "notification publish failed");
    }
}
