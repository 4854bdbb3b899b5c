//! Environment configuration, resolved once per process.

use tracing::warn;

use crate::observability::LogFormat;

pub const SNS_TOPIC_ARN_VAR: &str = "SNS_TOPIC_ARN";
pub const GLUE_ENDPOINT_DNS_VAR: &str = "GLUE_ENDPOINT_DNS";
pub const LOG_FORMAT_VAR: &str = "LOG_FORMAT";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be configured")]
    Missing(&'static str),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub sns_topic_arn: Option<String>,
    pub glue_endpoint_dns: Option<String>,
    pub log_format: LogFormat,
}

impl RuntimeConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let log_format = match read(LOG_FORMAT_VAR).map(|value| value.parse::<LogFormat>()) {
            Some(Ok(format)) => format,
            Some(Err(error)) => {
                warn!(%error, "falling back to JSON logs");
                LogFormat::default()
            }
            None => LogFormat::default(),
        };

        Self {
            sns_topic_arn: read(SNS_TOPIC_ARN_VAR),
            glue_endpoint_dns: read(GLUE_ENDPOINT_DNS_VAR),
            log_format,
        }
    }

    pub fn topic_arn(&self) -> Result<&str, ConfigError> {
        self.sns_topic_arn
            .as_deref()
            .ok_or(ConfigError::Missing(SNS_TOPIC_ARN_VAR))
    }

    /// Endpoint URL for a VPC-attached catalog endpoint, if one is configured.
    pub fn glue_endpoint_url(&self) -> Option<String> {
        self.glue_endpoint_dns.as_deref().map(|dns| {
            if dns.starts_with("https://") || dns.starts_with("http://") {
                dns.to_string()
            } else {
                format!("https://{dns}")
            }
        })
    }
}
