use lake_catalog_core::custom_resource::CustomResourceResponse;
use reqwest::header::CONTENT_TYPE;

use super::block_on;
use crate::adapters::response_sender::ResponseSender;

/// Uploads lifecycle responses to the presigned URL from the event.
#[derive(Debug, Clone, Default)]
pub struct HttpResponseSender {
    client: reqwest::Client,
}

impl HttpResponseSender {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ResponseSender for HttpResponseSender {
    fn send_response(
        &self,
        response_url: &str,
        response: &CustomResourceResponse,
    ) -> Result<(), String> {
        let body = serde_json::to_string(response)
            .map_err(|error| format!("failed to serialize lifecycle response: {error}"))?;
        let client = self.client.clone();
        let url = response_url.to_string();

        let status = block_on(async move {
            // The presigned URL is signed without a content type.
            client
                .put(url)
                .header(CONTENT_TYPE, "")
                .body(body)
                .send()
                .await
                .map(|reply| reply.status())
                .map_err(|error| format!("failed to upload lifecycle response: {error}"))
        })?;

        if status.is_success() {
            tracing::info!(%status, "lifecycle response delivered");
            Ok(())
        } else {
            Err(format!("lifecycle response rejected with status {status}"))
        }
    }
}
