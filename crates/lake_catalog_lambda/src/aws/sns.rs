use std::collections::HashMap;

use aws_sdk_sns::config::Region;
use aws_sdk_sns::error::DisplayErrorContext;
use aws_sdk_sns::types::MessageAttributeValue;

use super::block_on;
use crate::adapters::publisher::{NotificationPublisher, PublishRequest};

const STRING_DATA_TYPE: &str = "String";

/// Publishes through a client bound to the request's region.
pub struct SnsPublisher {
    sdk_config: aws_config::SdkConfig,
}

impl SnsPublisher {
    pub fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self {
            sdk_config: sdk_config.clone(),
        }
    }

    fn client_for(&self, region: Option<&str>) -> aws_sdk_sns::Client {
        let mut builder = aws_sdk_sns::config::Builder::from(&self.sdk_config);
        if let Some(region) = region {
            builder = builder.region(Region::new(region.to_string()));
        }
        aws_sdk_sns::Client::from_conf(builder.build())
    }
}

impl NotificationPublisher for SnsPublisher {
    fn publish(&self, request: &PublishRequest) -> Result<(), String> {
        let mut attributes = HashMap::with_capacity(request.attributes.len());
        for (name, value) in &request.attributes {
            let attribute = MessageAttributeValue::builder()
                .data_type(STRING_DATA_TYPE)
                .string_value(value)
                .build()
                .map_err(|error| format!("invalid message attribute `{name}`: {error}"))?;
            attributes.insert(name.clone(), attribute);
        }

        let client = self.client_for(request.region.as_deref());
        let topic_arn = request.topic_arn.clone();
        let subject = request.subject.clone();
        let message = request.message.clone();

        block_on(async move {
            client
                .publish()
                .target_arn(topic_arn)
                .subject(subject)
                .message(message)
                .set_message_attributes(Some(attributes))
                .send()
                .await
                .map(|_| ())
                .map_err(|error| {
                    format!("failed to publish notification: {}", DisplayErrorContext(&error))
                })
        })
    }
}
