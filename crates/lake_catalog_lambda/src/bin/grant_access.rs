use lake_catalog_lambda::aws::http_response::HttpResponseSender;
use lake_catalog_lambda::aws::lake_formation::LakeFormationAccess;
use lake_catalog_lambda::config::RuntimeConfig;
use lake_catalog_lambda::handlers::grants::{handle_grant_event, InvocationContext};
use lake_catalog_lambda::observability::init_logging;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;

struct RuntimeDependencies {
    access: LakeFormationAccess,
    sender: HttpResponseSender,
}

async fn handle_request(
    event: LambdaEvent<Value>,
    deps: &RuntimeDependencies,
) -> Result<Value, Error> {
    let context = InvocationContext {
        log_stream_name: event.context.env_config.log_stream.clone(),
    };
    tracing::info!(request_id = %event.context.request_id, "catalog grant invoked");

    let reply = handle_grant_event(event.payload, &context, &deps.access, &deps.sender)?;
    Ok(reply)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let config = RuntimeConfig::from_env();
    init_logging(config.log_format);

    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let deps = RuntimeDependencies {
        access: LakeFormationAccess::new(&aws_config),
        sender: HttpResponseSender::new(),
    };
    let deps = &deps;

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| async move {
        handle_request(event, deps).await
    }))
    .await
}
