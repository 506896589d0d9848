use aws_sdk_ecs::error::DisplayErrorContext;
use taskdef_resource_core::descriptor::TaskDefinitionDescriptor;

use crate::adapters::ecs_mapping::register_task_definition_input;
use crate::adapters::registry::TaskDefinitionRegistry;

pub struct EcsTaskDefinitionRegistry {
    ecs_client: aws_sdk_ecs::Client,
}

impl EcsTaskDefinitionRegistry {
    pub fn new(ecs_client: aws_sdk_ecs::Client) -> Self {
        Self { ecs_client }
    }
}

impl TaskDefinitionRegistry for EcsTaskDefinitionRegistry {
    fn register_task_definition(
        &self,
        descriptor: &TaskDefinitionDescriptor,
    ) -> Result<Option<String>, String> {
        let input = register_task_definition_input(descriptor)?;
        let client = self.ecs_client.clone();

        let output = tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                input
                    .send_with(&client)
                    .await
                    .map_err(|error| DisplayErrorContext(&error).to_string())
            })
        })?;

        Ok(output
            .task_definition()
            .and_then(|task_definition| task_definition.task_definition_arn())
            .map(str::to_string))
    }

    fn deregister_task_definition(&self, task_definition_arn: &str) -> Result<(), String> {
        let task_definition = task_definition_arn.to_string();
        let client = self.ecs_client.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .deregister_task_definition()
                    .task_definition(task_definition)
                    .send()
                    .await
                    .map(|_| ())
                    .map_err(|error| DisplayErrorContext(&error).to_string())
            })
        })
    }
}
