use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::{json, Value};
use taskdef_resource_core::contract::CustomResourceEvent;
use taskdef_resource_lambda::adapters::callback::HttpResponseSender;
use taskdef_resource_lambda::adapters::ecs::EcsTaskDefinitionRegistry;
use taskdef_resource_lambda::handlers::custom_resource::handle_custom_resource_event;
use taskdef_resource_lambda::logging::init_tracing;

async fn handle_request(event: LambdaEvent<Value>) -> Result<Value, Error> {
    // Without the response URL and identifiers there is nobody to report to.
    let event: CustomResourceEvent = serde_json::from_value(event.payload)
        .map_err(|error| Error::from(format!("invalid custom resource event: {error}")))?;

    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let registry = EcsTaskDefinitionRegistry::new(aws_sdk_ecs::Client::new(&aws_config));
    let sender = HttpResponseSender::new(reqwest::Client::new());

    let report = handle_custom_resource_event(&event, &registry, &sender);
    Ok(json!({
        "status": report.status,
        "physical_resource_id": report.physical_resource_id,
    }))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_tracing();
    lambda_runtime::run(service_fn(handle_request)).await
}
