//! Contract for stack-lifecycle (custom resource) invocations.
//!
//! The orchestrator sends a lifecycle event carrying a presigned
//! `ResponseURL`; the handler answers by uploading a [`CustomResourceResponse`]
//! to that URL instead of returning a value.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::validation::ValidationError;

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct CustomResourceEvent {
    /// Kept verbatim; unknown or absent values must still be answered.
    #[serde(default)]
    pub request_type: Option<String>,
    #[serde(rename = "ResponseURL")]
    pub response_url: String,
    pub stack_id: String,
    pub request_id: String,
    pub logical_resource_id: String,
    #[serde(default)]
    pub physical_resource_id: Option<String>,
    #[serde(default)]
    pub resource_properties: Value,
}

impl CustomResourceEvent {
    /// The `Input` resource property, given either as an object or as a JSON
    /// encoded string.
    pub fn input(&self) -> Result<Value, ValidationError> {
        match self.resource_properties.get("Input") {
            None | Some(Value::Null) => Err(ValidationError::single(
                "ResourceProperties.Input",
                "is required",
            )),
            Some(Value::Object(_)) => Ok(self.resource_properties["Input"].clone()),
            Some(Value::String(text)) => serde_json::from_str(text).map_err(|error| {
                ValidationError::single(
                    "ResourceProperties.Input",
                    format!("is not valid JSON: {error}"),
                )
            }),
            Some(_) => Err(ValidationError::single(
                "ResourceProperties.Input",
                "must be a JSON object",
            )),
        }
    }
}

/// Lifecycle invocations are recognised by the stack identifier they carry.
pub fn is_lifecycle_event(event: &Value) -> bool {
    event.get("StackId").is_some()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ResponseStatus {
    #[serde(rename = "SUCCESS")]
    Success,
    #[serde(rename = "FAILED")]
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CustomResourceResponse {
    pub status: ResponseStatus,
    pub reason: String,
    pub physical_resource_id: String,
    pub stack_id: String,
    pub request_id: String,
    pub logical_resource_id: String,
    pub no_echo: bool,
    pub data: Value,
}

impl CustomResourceResponse {
    /// Answer for `event`.
    ///
    /// `reason` defaults to a pointer at the invocation's log stream, and the
    /// physical id is kept stable across updates when the event carries one.
    pub fn for_event(
        event: &CustomResourceEvent,
        status: ResponseStatus,
        data: Value,
        log_stream_name: &str,
        reason: Option<String>,
    ) -> Self {
        Self {
            status,
            reason: reason.unwrap_or_else(|| log_stream_reason(log_stream_name)),
            physical_resource_id: event
                .physical_resource_id
                .clone()
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| log_stream_name.to_string()),
            stack_id: event.stack_id.clone(),
            request_id: event.request_id.clone(),
            logical_resource_id: event.logical_resource_id.clone(),
            no_echo: false,
            data,
        }
    }
}

pub fn log_stream_reason(log_stream_name: &str) -> String {
    format!("See the details in CloudWatch Log Stream: {log_stream_name}")
}
