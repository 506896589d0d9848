//! Typed view of a coerced `RegisterTaskDefinition` property bag.
//!
//! Field names follow the ECS API exactly. Enumerated values (network mode,
//! protocols, log drivers, ...) stay strings here and are validated by the
//! API itself. Every `RegisterTaskDefinition` input field is modelled; names
//! the API does not define are rejected so a typo in a template fails loudly
//! instead of being dropped.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TaskDefinitionDescriptor {
    pub family: String,
    pub task_role_arn: Option<String>,
    pub execution_role_arn: Option<String>,
    pub network_mode: Option<String>,
    #[serde(default)]
    pub container_definitions: Vec<ContainerDefinition>,
    pub volumes: Option<Vec<Volume>>,
    pub placement_constraints: Option<Vec<PlacementConstraint>>,
    pub requires_compatibilities: Option<Vec<String>>,
    pub cpu: Option<String>,
    pub memory: Option<String>,
    pub tags: Option<Vec<Tag>>,
    pub pid_mode: Option<String>,
    pub ipc_mode: Option<String>,
    pub runtime_platform: Option<RuntimePlatform>,
    pub proxy_configuration: Option<ProxyConfiguration>,
    pub inference_accelerators: Option<Vec<InferenceAccelerator>>,
    pub ephemeral_storage: Option<EphemeralStorage>,
    pub enable_fault_injection: Option<bool>,
}

impl TaskDefinitionDescriptor {
    pub fn from_properties(properties: Map<String, Value>) -> Result<Self> {
        Ok(serde_json::from_value(Value::Object(properties))?)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ContainerDefinition {
    pub name: Option<String>,
    pub image: Option<String>,
    pub repository_credentials: Option<RepositoryCredentials>,
    pub cpu: Option<i32>,
    pub memory: Option<i32>,
    pub memory_reservation: Option<i32>,
    pub links: Option<Vec<String>>,
    pub port_mappings: Option<Vec<PortMapping>>,
    pub essential: Option<bool>,
    pub restart_policy: Option<ContainerRestartPolicy>,
    pub entry_point: Option<Vec<String>>,
    pub command: Option<Vec<String>>,
    pub environment: Option<Vec<KeyValuePair>>,
    pub environment_files: Option<Vec<EnvironmentFile>>,
    pub mount_points: Option<Vec<MountPoint>>,
    pub volumes_from: Option<Vec<VolumeFrom>>,
    pub linux_parameters: Option<LinuxParameters>,
    pub secrets: Option<Vec<Secret>>,
    pub depends_on: Option<Vec<ContainerDependency>>,
    pub start_timeout: Option<i32>,
    pub stop_timeout: Option<i32>,
    pub version_consistency: Option<String>,
    pub hostname: Option<String>,
    pub user: Option<String>,
    pub working_directory: Option<String>,
    pub disable_networking: Option<bool>,
    pub privileged: Option<bool>,
    pub readonly_root_filesystem: Option<bool>,
    pub dns_servers: Option<Vec<String>>,
    pub dns_search_domains: Option<Vec<String>>,
    pub extra_hosts: Option<Vec<HostEntry>>,
    pub docker_security_options: Option<Vec<String>>,
    pub interactive: Option<bool>,
    pub pseudo_terminal: Option<bool>,
    pub docker_labels: Option<HashMap<String, String>>,
    pub ulimits: Option<Vec<Ulimit>>,
    pub log_configuration: Option<LogConfiguration>,
    pub health_check: Option<HealthCheck>,
    pub system_controls: Option<Vec<SystemControl>>,
    pub resource_requirements: Option<Vec<ResourceRequirement>>,
    pub firelens_configuration: Option<FirelensConfiguration>,
    pub credential_specs: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PortMapping {
    pub container_port: Option<i32>,
    pub host_port: Option<i32>,
    pub protocol: Option<String>,
    pub name: Option<String>,
    pub app_protocol: Option<String>,
    pub container_port_range: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct KeyValuePair {
    pub name: Option<String>,
    pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MountPoint {
    pub source_volume: Option<String>,
    pub container_path: Option<String>,
    pub read_only: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct VolumeFrom {
    pub source_container: Option<String>,
    pub read_only: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LinuxParameters {
    pub capabilities: Option<KernelCapabilities>,
    pub devices: Option<Vec<Device>>,
    pub init_process_enabled: Option<bool>,
    pub shared_memory_size: Option<i32>,
    pub tmpfs: Option<Vec<Tmpfs>>,
    pub max_swap: Option<i32>,
    pub swappiness: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct KernelCapabilities {
    pub add: Option<Vec<String>>,
    pub drop: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Device {
    pub host_path: String,
    pub container_path: Option<String>,
    pub permissions: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Tmpfs {
    pub container_path: String,
    pub size: i32,
    pub mount_options: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Secret {
    pub name: String,
    pub value_from: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ContainerDependency {
    pub container_name: String,
    pub condition: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Ulimit {
    pub name: String,
    pub soft_limit: i32,
    pub hard_limit: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LogConfiguration {
    pub log_driver: String,
    pub options: Option<HashMap<String, String>>,
    pub secret_options: Option<Vec<Secret>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct HealthCheck {
    pub command: Vec<String>,
    pub interval: Option<i32>,
    pub timeout: Option<i32>,
    pub retries: Option<i32>,
    pub start_period: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RepositoryCredentials {
    pub credentials_parameter: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ContainerRestartPolicy {
    pub enabled: bool,
    pub ignored_exit_codes: Option<Vec<i32>>,
    pub restart_attempt_period: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EnvironmentFile {
    pub value: String,
    #[serde(rename = "type")]
    pub file_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct HostEntry {
    pub hostname: String,
    pub ip_address: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SystemControl {
    pub namespace: Option<String>,
    pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ResourceRequirement {
    pub value: String,
    #[serde(rename = "type")]
    pub resource_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FirelensConfiguration {
    #[serde(rename = "type")]
    pub router_type: String,
    pub options: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Volume {
    pub name: Option<String>,
    pub host: Option<HostVolumeProperties>,
    pub docker_volume_configuration: Option<DockerVolumeConfiguration>,
    pub efs_volume_configuration: Option<EfsVolumeConfiguration>,
    pub fsx_windows_file_server_volume_configuration:
        Option<FsxWindowsFileServerVolumeConfiguration>,
    pub configured_at_launch: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct HostVolumeProperties {
    pub source_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DockerVolumeConfiguration {
    pub scope: Option<String>,
    pub autoprovision: Option<bool>,
    pub driver: Option<String>,
    pub driver_opts: Option<HashMap<String, String>>,
    pub labels: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EfsVolumeConfiguration {
    pub file_system_id: String,
    pub root_directory: Option<String>,
    pub transit_encryption: Option<String>,
    pub transit_encryption_port: Option<i32>,
    pub authorization_config: Option<EfsAuthorizationConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EfsAuthorizationConfig {
    pub access_point_id: Option<String>,
    pub iam: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FsxWindowsFileServerVolumeConfiguration {
    pub file_system_id: String,
    pub root_directory: String,
    pub authorization_config: FsxWindowsFileServerAuthorizationConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FsxWindowsFileServerAuthorizationConfig {
    pub credentials_parameter: String,
    pub domain: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PlacementConstraint {
    #[serde(rename = "type")]
    pub constraint_type: Option<String>,
    pub expression: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Tag {
    pub key: Option<String>,
    pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RuntimePlatform {
    pub cpu_architecture: Option<String>,
    pub operating_system_family: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProxyConfiguration {
    #[serde(rename = "type")]
    pub proxy_type: Option<String>,
    pub container_name: String,
    pub properties: Option<Vec<KeyValuePair>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct InferenceAccelerator {
    pub device_name: String,
    pub device_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EphemeralStorage {
    #[serde(rename = "sizeInGiB")]
    pub size_in_gib: i32,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::coercion::coerce_properties;
    use crate::error::HandlerError;

    fn descriptor_from(value: Value) -> Result<TaskDefinitionDescriptor> {
        let Value::Object(mut properties) = value else {
            panic!("fixture must be an object");
        };
        coerce_properties(&mut properties)?;
        TaskDefinitionDescriptor::from_properties(properties)
    }

    #[test]
    fn builds_descriptor_with_efs_volume() {
        let descriptor = descriptor_from(json!({
            "family": "app",
            "networkMode": "awsvpc",
            "requiresCompatibilities": ["FARGATE"],
            "cpu": "256",
            "memory": "512",
            "containerDefinitions": [{
                "name": "web",
                "image": "nginx:1.25",
                "cpu": "256",
                "essential": "true",
                "portMappings": [{"containerPort": "80", "protocol": "tcp"}],
                "mountPoints": [{"sourceVolume": "shared", "containerPath": "/data", "readOnly": "false"}]
            }],
            "volumes": [{
                "name": "shared",
                "efsVolumeConfiguration": {
                    "fileSystemId": "fs-12345678",
                    "transitEncryption": "ENABLED",
                    "transitEncryptionPort": "2999",
                    "authorizationConfig": {"accessPointId": "fsap-1", "iam": "ENABLED"}
                }
            }]
        }))
        .expect("descriptor should build");

        assert_eq!(descriptor.family, "app");
        assert_eq!(descriptor.cpu.as_deref(), Some("256"));

        let container = &descriptor.container_definitions[0];
        assert_eq!(container.cpu, Some(256));
        assert_eq!(container.essential, Some(true));
        assert_eq!(
            container.port_mappings.as_ref().map(|ports| ports[0].container_port),
            Some(Some(80))
        );

        let volumes = descriptor.volumes.expect("volumes should be present");
        let efs = volumes[0]
            .efs_volume_configuration
            .as_ref()
            .expect("efs configuration should be present");
        assert_eq!(efs.file_system_id, "fs-12345678");
        assert_eq!(efs.transit_encryption_port, Some(2999));
    }

    #[test]
    fn accepts_every_register_task_definition_section() {
        let descriptor = descriptor_from(json!({
            "family": "full",
            "proxyConfiguration": {
                "type": "APPMESH",
                "containerName": "envoy",
                "properties": [{"name": "ProxyIngressPort", "value": "15000"}]
            },
            "inferenceAccelerators": [{"deviceName": "device1", "deviceType": "eia2.medium"}],
            "ephemeralStorage": {"sizeInGiB": "40"},
            "enableFaultInjection": "false",
            "containerDefinitions": [{
                "name": "app",
                "repositoryCredentials": {"credentialsParameter": "arn:aws:secretsmanager:eu-west-1:1:secret:reg"},
                "resourceRequirements": [{"type": "GPU", "value": "1"}],
                "environmentFiles": [{"type": "s3", "value": "arn:aws:s3:::bucket/app.env"}],
                "firelensConfiguration": {"type": "fluentbit", "options": {"enable-ecs-log-metadata": "true"}},
                "systemControls": [{"namespace": "net.core.somaxconn", "value": "1024"}],
                "extraHosts": [{"hostname": "db.local", "ipAddress": "10.0.0.5"}],
                "restartPolicy": {"enabled": "true", "ignoredExitCodes": ["0"]},
                "versionConsistency": "disabled",
                "credentialSpecs": ["credentialspecdomainless:arn:aws:s3:::bucket/spec.json"],
                "portMappings": [{"containerPortRange": "8000-8010", "protocol": "tcp"}],
                "logConfiguration": {
                    "logDriver": "awsfirelens",
                    "secretOptions": [{"name": "apikey", "valueFrom": "arn:aws:ssm:eu-west-1:1:parameter/key"}]
                },
                "linuxParameters": {
                    "devices": [{"hostPath": "/dev/fuse", "containerPath": "/dev/fuse", "permissions": ["read", "write"]}]
                }
            }],
            "volumes": [{
                "name": "winshare",
                "configuredAtLaunch": "false",
                "fsxWindowsFileServerVolumeConfiguration": {
                    "fileSystemId": "fs-0abc",
                    "rootDirectory": "\\share",
                    "authorizationConfig": {"credentialsParameter": "arn:aws:secretsmanager:eu-west-1:1:secret:ad", "domain": "corp.example.com"}
                }
            }]
        }))
        .expect("every ECS field should be accepted");

        assert_eq!(descriptor.ephemeral_storage.map(|storage| storage.size_in_gib), Some(40));
        assert_eq!(descriptor.enable_fault_injection, Some(false));
        assert_eq!(
            descriptor.proxy_configuration.map(|proxy| proxy.container_name).as_deref(),
            Some("envoy")
        );

        let container = &descriptor.container_definitions[0];
        let restart = container.restart_policy.as_ref().expect("restart policy should be present");
        assert!(restart.enabled);
        assert_eq!(restart.ignored_exit_codes, Some(vec![0]));
        let devices = container
            .linux_parameters
            .as_ref()
            .and_then(|parameters| parameters.devices.as_ref())
            .expect("devices should be present");
        assert_eq!(devices[0].host_path, "/dev/fuse");

        let volumes = descriptor.volumes.expect("volumes should be present");
        let volume = &volumes[0];
        assert_eq!(volume.configured_at_launch, Some(false));
        assert_eq!(
            volume
                .fsx_windows_file_server_volume_configuration
                .as_ref()
                .map(|fsx| fsx.authorization_config.domain.as_str()),
            Some("corp.example.com")
        );
    }

    #[test]
    fn placement_constraint_uses_type_key() {
        let descriptor = descriptor_from(json!({
            "family": "app",
            "placementConstraints": [{"type": "memberOf", "expression": "attribute:ecs.az in [eu-west-1a]"}]
        }))
        .expect("descriptor should build");

        let constraints = descriptor
            .placement_constraints
            .expect("constraints should be present");
        assert_eq!(constraints[0].constraint_type.as_deref(), Some("memberOf"));
    }

    #[test]
    fn rejects_names_outside_the_ecs_api() {
        let error = descriptor_from(json!({
            "family": "app",
            "containerDefinitions": [{"name": "web", "imagee": "nginx"}]
        }))
        .expect_err("unknown field should fail");

        assert!(matches!(error, HandlerError::InvalidProperties(_)));
        assert!(error.to_string().contains("imagee"));
    }

    #[test]
    fn requires_family() {
        let error = descriptor_from(json!({"containerDefinitions": []}))
            .expect_err("missing family should fail");
        assert!(error.to_string().contains("family"));
    }
}
