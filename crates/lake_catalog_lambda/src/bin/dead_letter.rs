use lake_catalog_lambda::aws::sns::SnsPublisher;
use lake_catalog_lambda::config::RuntimeConfig;
use lake_catalog_lambda::handlers::dead_letter::{handle_dead_letter_event, EscalationSummary};
use lake_catalog_lambda::observability::init_logging;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;

struct RuntimeDependencies {
    topic_arn: String,
    publisher: SnsPublisher,
}

async fn handle_request(
    event: LambdaEvent<Value>,
    deps: &RuntimeDependencies,
) -> Result<EscalationSummary, Error> {
    let summary = handle_dead_letter_event(&event.payload, &deps.topic_arn, &deps.publisher)?;
    tracing::info!(
        request_id = %event.context.request_id,
        relayed = summary.relayed,
        failed = summary.failed,
        "dead-letter escalation finished"
    );
    Ok(summary)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let config = RuntimeConfig::from_env();
    init_logging(config.log_format);

    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let deps = RuntimeDependencies {
        topic_arn: config.topic_arn()?.to_string(),
        publisher: SnsPublisher::new(&aws_config),
    };
    let deps = &deps;

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| async move {
        handle_request(event, deps).await
    }))
    .await
}
