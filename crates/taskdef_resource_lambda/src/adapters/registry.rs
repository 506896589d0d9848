use taskdef_resource_core::descriptor::TaskDefinitionDescriptor;

pub trait TaskDefinitionRegistry {
    /// Registers a new revision and returns its task definition ARN, or
    /// `None` when the service accepted the call without returning one.
    fn register_task_definition(
        &self,
        descriptor: &TaskDefinitionDescriptor,
    ) -> Result<Option<String>, String>;

    fn deregister_task_definition(&self, task_definition_arn: &str) -> Result<(), String>;
}
