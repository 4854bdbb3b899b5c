use lake_catalog_lambda::aws::glue::GlueCatalog;
use lake_catalog_lambda::aws::sns::SnsPublisher;
use lake_catalog_lambda::config::RuntimeConfig;
use lake_catalog_lambda::handlers::partition::handle_partition_event;
use lake_catalog_lambda::observability::init_logging;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::{json, Value};

struct RuntimeDependencies {
    topic_arn: String,
    catalog: GlueCatalog,
    publisher: SnsPublisher,
}

async fn handle_request(
    event: LambdaEvent<Value>,
    deps: &RuntimeDependencies,
) -> Result<Value, Error> {
    tracing::info!(request_id = %event.context.request_id, "partition registration invoked");

    let outcomes =
        handle_partition_event(&event.payload, &deps.topic_arn, &deps.catalog, &deps.publisher)?;
    Ok(json!({ "status": "ok", "records": outcomes }))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let config = RuntimeConfig::from_env();
    init_logging(config.log_format);

    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let deps = RuntimeDependencies {
        topic_arn: config.topic_arn()?.to_string(),
        catalog: GlueCatalog::new(&aws_config, config.glue_endpoint_url()),
        publisher: SnsPublisher::new(&aws_config),
    };
    let deps = &deps;

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| async move {
        handle_request(event, deps).await
    }))
    .await
}
