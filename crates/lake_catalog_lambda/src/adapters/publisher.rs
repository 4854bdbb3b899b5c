use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishRequest {
    pub topic_arn: String,
    pub subject: String,
    pub message: String,
    pub attributes: BTreeMap<String, String>,
    /// Region of the originating record; `None` uses the process default.
    pub region: Option<String>,
}

pub trait NotificationPublisher {
    fn publish(&self, request: &PublishRequest) -> Result<(), String>;
}
