//! Conversion from the typed descriptor into ECS SDK request types.

use aws_sdk_ecs::operation::register_task_definition::builders::RegisterTaskDefinitionInputBuilder;
use aws_sdk_ecs::operation::register_task_definition::RegisterTaskDefinitionInput;
use aws_sdk_ecs::types::{
    ApplicationProtocol, Compatibility, ContainerCondition, ContainerDefinition,
    ContainerDependency, ContainerRestartPolicy, CpuArchitecture, Device, DeviceCgroupPermission,
    DockerVolumeConfiguration, EfsAuthorizationConfig, EfsAuthorizationConfigIam,
    EfsTransitEncryption, EfsVolumeConfiguration, EnvironmentFile, EnvironmentFileType,
    EphemeralStorage, FSxWindowsFileServerAuthorizationConfig,
    FSxWindowsFileServerVolumeConfiguration, FirelensConfiguration, FirelensConfigurationType,
    HealthCheck, HostEntry, HostVolumeProperties, InferenceAccelerator, IpcMode,
    KernelCapabilities, KeyValuePair, LinuxParameters, LogConfiguration, LogDriver, MountPoint,
    NetworkMode, OsFamily, PidMode, PortMapping, ProxyConfiguration, ProxyConfigurationType,
    RepositoryCredentials, ResourceRequirement, ResourceType, RuntimePlatform, Scope, Secret,
    SystemControl, Tag, TaskDefinitionPlacementConstraint, TaskDefinitionPlacementConstraintType,
    Tmpfs, TransportProtocol, Ulimit, UlimitName, VersionConsistency, Volume, VolumeFrom,
};
use taskdef_resource_core::descriptor::{self, TaskDefinitionDescriptor};

pub fn register_task_definition_input(
    descriptor: &TaskDefinitionDescriptor,
) -> Result<RegisterTaskDefinitionInputBuilder, String> {
    let container_definitions = descriptor
        .container_definitions
        .iter()
        .map(container_definition)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(RegisterTaskDefinitionInput::builder()
        .set_family(Some(descriptor.family.clone()))
        .set_task_role_arn(descriptor.task_role_arn.clone())
        .set_execution_role_arn(descriptor.execution_role_arn.clone())
        .set_network_mode(
            descriptor
                .network_mode
                .as_deref()
                .map(NetworkMode::from),
        )
        .set_container_definitions(Some(container_definitions))
        .set_volumes(try_map_list(&descriptor.volumes, volume)?)
        .set_placement_constraints(map_list(
            &descriptor.placement_constraints,
            placement_constraint,
        ))
        .set_requires_compatibilities(map_list(&descriptor.requires_compatibilities, |value| {
            Compatibility::from(value.as_str())
        }))
        .set_cpu(descriptor.cpu.clone())
        .set_memory(descriptor.memory.clone())
        .set_tags(map_list(&descriptor.tags, tag))
        .set_pid_mode(descriptor.pid_mode.as_deref().map(PidMode::from))
        .set_ipc_mode(descriptor.ipc_mode.as_deref().map(IpcMode::from))
        .set_runtime_platform(descriptor.runtime_platform.as_ref().map(runtime_platform))
        .set_proxy_configuration(
            descriptor
                .proxy_configuration
                .as_ref()
                .map(proxy_configuration)
                .transpose()?,
        )
        .set_inference_accelerators(try_map_list(
            &descriptor.inference_accelerators,
            inference_accelerator,
        )?)
        .set_ephemeral_storage(
            descriptor
                .ephemeral_storage
                .as_ref()
                .map(ephemeral_storage)
                .transpose()?,
        )
        .set_enable_fault_injection(descriptor.enable_fault_injection))
}

fn map_list<T, U>(items: &Option<Vec<T>>, convert: impl Fn(&T) -> U) -> Option<Vec<U>> {
    items
        .as_ref()
        .map(|items| items.iter().map(&convert).collect())
}

fn try_map_list<T, U>(
    items: &Option<Vec<T>>,
    convert: impl Fn(&T) -> Result<U, String>,
) -> Result<Option<Vec<U>>, String> {
    items
        .as_ref()
        .map(|items| items.iter().map(&convert).collect::<Result<Vec<_>, _>>())
        .transpose()
}

pub fn container_definition(
    container: &descriptor::ContainerDefinition,
) -> Result<ContainerDefinition, String> {
    Ok(ContainerDefinition::builder()
        .set_name(container.name.clone())
        .set_image(container.image.clone())
        .set_repository_credentials(
            container
                .repository_credentials
                .as_ref()
                .map(repository_credentials)
                .transpose()?,
        )
        .set_cpu(container.cpu)
        .set_memory(container.memory)
        .set_memory_reservation(container.memory_reservation)
        .set_links(container.links.clone())
        .set_port_mappings(map_list(&container.port_mappings, port_mapping))
        .set_essential(container.essential)
        .set_restart_policy(
            container
                .restart_policy
                .as_ref()
                .map(restart_policy)
                .transpose()?,
        )
        .set_entry_point(container.entry_point.clone())
        .set_command(container.command.clone())
        .set_environment(map_list(&container.environment, key_value_pair))
        .set_environment_files(try_map_list(&container.environment_files, environment_file)?)
        .set_mount_points(map_list(&container.mount_points, mount_point))
        .set_volumes_from(map_list(&container.volumes_from, volume_from))
        .set_linux_parameters(
            container
                .linux_parameters
                .as_ref()
                .map(linux_parameters)
                .transpose()?,
        )
        .set_secrets(try_map_list(&container.secrets, secret)?)
        .set_depends_on(try_map_list(&container.depends_on, container_dependency)?)
        .set_start_timeout(container.start_timeout)
        .set_stop_timeout(container.stop_timeout)
        .set_version_consistency(
            container
                .version_consistency
                .as_deref()
                .map(VersionConsistency::from),
        )
        .set_hostname(container.hostname.clone())
        .set_user(container.user.clone())
        .set_working_directory(container.working_directory.clone())
        .set_disable_networking(container.disable_networking)
        .set_privileged(container.privileged)
        .set_readonly_root_filesystem(container.readonly_root_filesystem)
        .set_dns_servers(container.dns_servers.clone())
        .set_dns_search_domains(container.dns_search_domains.clone())
        .set_extra_hosts(try_map_list(&container.extra_hosts, host_entry)?)
        .set_docker_security_options(container.docker_security_options.clone())
        .set_interactive(container.interactive)
        .set_pseudo_terminal(container.pseudo_terminal)
        .set_docker_labels(container.docker_labels.clone())
        .set_ulimits(try_map_list(&container.ulimits, ulimit)?)
        .set_log_configuration(
            container
                .log_configuration
                .as_ref()
                .map(log_configuration)
                .transpose()?,
        )
        .set_health_check(container.health_check.as_ref().map(health_check).transpose()?)
        .set_system_controls(map_list(&container.system_controls, system_control))
        .set_resource_requirements(try_map_list(
            &container.resource_requirements,
            resource_requirement,
        )?)
        .set_firelens_configuration(
            container
                .firelens_configuration
                .as_ref()
                .map(firelens_configuration)
                .transpose()?,
        )
        .set_credential_specs(container.credential_specs.clone())
        .build())
}

fn repository_credentials(
    credentials: &descriptor::RepositoryCredentials,
) -> Result<RepositoryCredentials, String> {
    RepositoryCredentials::builder()
        .credentials_parameter(credentials.credentials_parameter.clone())
        .build()
        .map_err(|error| format!("invalid repository credentials: {error}"))
}

fn restart_policy(
    policy: &descriptor::ContainerRestartPolicy,
) -> Result<ContainerRestartPolicy, String> {
    ContainerRestartPolicy::builder()
        .enabled(policy.enabled)
        .set_ignored_exit_codes(policy.ignored_exit_codes.clone())
        .set_restart_attempt_period(policy.restart_attempt_period)
        .build()
        .map_err(|error| format!("invalid restart policy: {error}"))
}

fn environment_file(file: &descriptor::EnvironmentFile) -> Result<EnvironmentFile, String> {
    EnvironmentFile::builder()
        .value(file.value.clone())
        .r#type(EnvironmentFileType::from(file.file_type.as_str()))
        .build()
        .map_err(|error| format!("invalid environment file: {error}"))
}

fn host_entry(entry: &descriptor::HostEntry) -> Result<HostEntry, String> {
    HostEntry::builder()
        .hostname(entry.hostname.clone())
        .ip_address(entry.ip_address.clone())
        .build()
        .map_err(|error| format!("invalid extra host: {error}"))
}

fn system_control(control: &descriptor::SystemControl) -> SystemControl {
    SystemControl::builder()
        .set_namespace(control.namespace.clone())
        .set_value(control.value.clone())
        .build()
}

fn resource_requirement(
    requirement: &descriptor::ResourceRequirement,
) -> Result<ResourceRequirement, String> {
    ResourceRequirement::builder()
        .value(requirement.value.clone())
        .r#type(ResourceType::from(requirement.resource_type.as_str()))
        .build()
        .map_err(|error| format!("invalid resource requirement: {error}"))
}

fn firelens_configuration(
    config: &descriptor::FirelensConfiguration,
) -> Result<FirelensConfiguration, String> {
    FirelensConfiguration::builder()
        .r#type(FirelensConfigurationType::from(config.router_type.as_str()))
        .set_options(config.options.clone())
        .build()
        .map_err(|error| format!("invalid firelens configuration: {error}"))
}

fn device(device: &descriptor::Device) -> Result<Device, String> {
    Device::builder()
        .host_path(device.host_path.clone())
        .set_container_path(device.container_path.clone())
        .set_permissions(map_list(&device.permissions, |permission| {
            DeviceCgroupPermission::from(permission.as_str())
        }))
        .build()
        .map_err(|error| format!("invalid device: {error}"))
}

fn port_mapping(mapping: &descriptor::PortMapping) -> PortMapping {
    PortMapping::builder()
        .set_container_port(mapping.container_port)
        .set_host_port(mapping.host_port)
        .set_protocol(mapping.protocol.as_deref().map(TransportProtocol::from))
        .set_name(mapping.name.clone())
        .set_app_protocol(mapping.app_protocol.as_deref().map(ApplicationProtocol::from))
        .set_container_port_range(mapping.container_port_range.clone())
        .build()
}

fn key_value_pair(pair: &descriptor::KeyValuePair) -> KeyValuePair {
    KeyValuePair::builder()
        .set_name(pair.name.clone())
        .set_value(pair.value.clone())
        .build()
}

fn mount_point(mount: &descriptor::MountPoint) -> MountPoint {
    MountPoint::builder()
        .set_source_volume(mount.source_volume.clone())
        .set_container_path(mount.container_path.clone())
        .set_read_only(mount.read_only)
        .build()
}

fn volume_from(source: &descriptor::VolumeFrom) -> VolumeFrom {
    VolumeFrom::builder()
        .set_source_container(source.source_container.clone())
        .set_read_only(source.read_only)
        .build()
}

fn linux_parameters(parameters: &descriptor::LinuxParameters) -> Result<LinuxParameters, String> {
    let capabilities = parameters.capabilities.as_ref().map(|capabilities| {
        KernelCapabilities::builder()
            .set_add(capabilities.add.clone())
            .set_drop(capabilities.drop.clone())
            .build()
    });

    Ok(LinuxParameters::builder()
        .set_capabilities(capabilities)
        .set_devices(try_map_list(&parameters.devices, device)?)
        .set_init_process_enabled(parameters.init_process_enabled)
        .set_shared_memory_size(parameters.shared_memory_size)
        .set_tmpfs(try_map_list(&parameters.tmpfs, tmpfs)?)
        .set_max_swap(parameters.max_swap)
        .set_swappiness(parameters.swappiness)
        .build())
}

fn tmpfs(mount: &descriptor::Tmpfs) -> Result<Tmpfs, String> {
    Tmpfs::builder()
        .container_path(mount.container_path.clone())
        .size(mount.size)
        .set_mount_options(mount.mount_options.clone())
        .build()
        .map_err(|error| format!("invalid tmpfs mount: {error}"))
}

fn secret(secret: &descriptor::Secret) -> Result<Secret, String> {
    Secret::builder()
        .name(secret.name.clone())
        .value_from(secret.value_from.clone())
        .build()
        .map_err(|error| format!("invalid secret: {error}"))
}

fn container_dependency(
    dependency: &descriptor::ContainerDependency,
) -> Result<ContainerDependency, String> {
    ContainerDependency::builder()
        .container_name(dependency.container_name.clone())
        .condition(ContainerCondition::from(dependency.condition.as_str()))
        .build()
        .map_err(|error| format!("invalid container dependency: {error}"))
}

fn ulimit(limit: &descriptor::Ulimit) -> Result<Ulimit, String> {
    Ulimit::builder()
        .name(UlimitName::from(limit.name.as_str()))
        .soft_limit(limit.soft_limit)
        .hard_limit(limit.hard_limit)
        .build()
        .map_err(|error| format!("invalid ulimit: {error}"))
}

fn log_configuration(config: &descriptor::LogConfiguration) -> Result<LogConfiguration, String> {
    LogConfiguration::builder()
        .log_driver(LogDriver::from(config.log_driver.as_str()))
        .set_options(config.options.clone())
        .set_secret_options(try_map_list(&config.secret_options, secret)?)
        .build()
        .map_err(|error| format!("invalid log configuration: {error}"))
}

fn health_check(check: &descriptor::HealthCheck) -> Result<HealthCheck, String> {
    HealthCheck::builder()
        .set_command(Some(check.command.clone()))
        .set_interval(check.interval)
        .set_timeout(check.timeout)
        .set_retries(check.retries)
        .set_start_period(check.start_period)
        .build()
        .map_err(|error| format!("invalid health check: {error}"))
}

fn volume(volume: &descriptor::Volume) -> Result<Volume, String> {
    let host = volume.host.as_ref().map(|host| {
        HostVolumeProperties::builder()
            .set_source_path(host.source_path.clone())
            .build()
    });
    let docker = volume
        .docker_volume_configuration
        .as_ref()
        .map(docker_volume_configuration);
    let efs = volume
        .efs_volume_configuration
        .as_ref()
        .map(efs_volume_configuration)
        .transpose()?;
    let fsx = volume
        .fsx_windows_file_server_volume_configuration
        .as_ref()
        .map(fsx_windows_file_server_volume_configuration)
        .transpose()?;

    Ok(Volume::builder()
        .set_name(volume.name.clone())
        .set_host(host)
        .set_docker_volume_configuration(docker)
        .set_efs_volume_configuration(efs)
        .set_fsx_windows_file_server_volume_configuration(fsx)
        .set_configured_at_launch(volume.configured_at_launch)
        .build())
}

fn docker_volume_configuration(
    config: &descriptor::DockerVolumeConfiguration,
) -> DockerVolumeConfiguration {
    DockerVolumeConfiguration::builder()
        .set_scope(config.scope.as_deref().map(Scope::from))
        .set_autoprovision(config.autoprovision)
        .set_driver(config.driver.clone())
        .set_driver_opts(config.driver_opts.clone())
        .set_labels(config.labels.clone())
        .build()
}

fn efs_volume_configuration(
    config: &descriptor::EfsVolumeConfiguration,
) -> Result<EfsVolumeConfiguration, String> {
    let authorization = config.authorization_config.as_ref().map(|authorization| {
        EfsAuthorizationConfig::builder()
            .set_access_point_id(authorization.access_point_id.clone())
            .set_iam(
                authorization
                    .iam
                    .as_deref()
                    .map(EfsAuthorizationConfigIam::from),
            )
            .build()
    });

    EfsVolumeConfiguration::builder()
        .file_system_id(config.file_system_id.clone())
        .set_root_directory(config.root_directory.clone())
        .set_transit_encryption(
            config
                .transit_encryption
                .as_deref()
                .map(EfsTransitEncryption::from),
        )
        .set_transit_encryption_port(config.transit_encryption_port)
        .set_authorization_config(authorization)
        .build()
        .map_err(|error| format!("invalid EFS volume configuration: {error}"))
}

fn fsx_windows_file_server_volume_configuration(
    config: &descriptor::FsxWindowsFileServerVolumeConfiguration,
) -> Result<FSxWindowsFileServerVolumeConfiguration, String> {
    let authorization = FSxWindowsFileServerAuthorizationConfig::builder()
        .credentials_parameter(config.authorization_config.credentials_parameter.clone())
        .domain(config.authorization_config.domain.clone())
        .build()
        .map_err(|error| format!("invalid FSx authorization config: {error}"))?;

    FSxWindowsFileServerVolumeConfiguration::builder()
        .file_system_id(config.file_system_id.clone())
        .root_directory(config.root_directory.clone())
        .authorization_config(authorization)
        .build()
        .map_err(|error| format!("invalid FSx volume configuration: {error}"))
}

fn placement_constraint(
    constraint: &descriptor::PlacementConstraint,
) -> TaskDefinitionPlacementConstraint {
    TaskDefinitionPlacementConstraint::builder()
        .set_type(
            constraint
                .constraint_type
                .as_deref()
                .map(TaskDefinitionPlacementConstraintType::from),
        )
        .set_expression(constraint.expression.clone())
        .build()
}

fn tag(tag: &descriptor::Tag) -> Tag {
    Tag::builder()
        .set_key(tag.key.clone())
        .set_value(tag.value.clone())
        .build()
}

fn runtime_platform(platform: &descriptor::RuntimePlatform) -> RuntimePlatform {
    RuntimePlatform::builder()
        .set_cpu_architecture(
            platform
                .cpu_architecture
                .as_deref()
                .map(CpuArchitecture::from),
        )
        .set_operating_system_family(
            platform
                .operating_system_family
                .as_deref()
                .map(OsFamily::from),
        )
        .build()
}

fn proxy_configuration(
    proxy: &descriptor::ProxyConfiguration,
) -> Result<ProxyConfiguration, String> {
    ProxyConfiguration::builder()
        .set_type(proxy.proxy_type.as_deref().map(ProxyConfigurationType::from))
        .container_name(proxy.container_name.clone())
        .set_properties(map_list(&proxy.properties, key_value_pair))
        .build()
        .map_err(|error| format!("invalid proxy configuration: {error}"))
}

fn inference_accelerator(
    accelerator: &descriptor::InferenceAccelerator,
) -> Result<InferenceAccelerator, String> {
    InferenceAccelerator::builder()
        .device_name(accelerator.device_name.clone())
        .device_type(accelerator.device_type.clone())
        .build()
        .map_err(|error| format!("invalid inference accelerator: {error}"))
}

fn ephemeral_storage(storage: &descriptor::EphemeralStorage) -> Result<EphemeralStorage, String> {
    Ok(EphemeralStorage::builder()
        .size_in_gib(storage.size_in_gib)
        .build())
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use taskdef_resource_core::coercion::coerce_properties;

    use super::*;

    fn descriptor(value: serde_json::Value) -> TaskDefinitionDescriptor {
        let serde_json::Value::Object(mut properties) = value else {
            panic!("fixture must be an object");
        };
        coerce_properties(&mut properties).expect("coercion should succeed");
        TaskDefinitionDescriptor::from_properties(properties).expect("descriptor should build")
    }

    #[test]
    fn maps_family_and_container_fields() {
        let input = register_task_definition_input(&descriptor(json!({
            "family": "web",
            "networkMode": "awsvpc",
            "containerDefinitions": [{
                "name": "nginx",
                "image": "nginx:1.25",
                "memory": "512",
                "essential": "true",
                "portMappings": [{"containerPort": "8080", "protocol": "tcp"}],
                "healthCheck": {"command": ["CMD-SHELL", "curl -f localhost"], "interval": "15"}
            }]
        })))
        .expect("input should map");

        assert_eq!(input.get_family().as_deref(), Some("web"));
        assert_eq!(input.get_network_mode(), &Some(NetworkMode::Awsvpc));

        let containers = input
            .get_container_definitions()
            .as_ref()
            .expect("containers should be set");
        let container = &containers[0];
        assert_eq!(container.name(), Some("nginx"));
        assert_eq!(container.memory(), Some(512));
        assert_eq!(container.essential(), Some(true));
        assert_eq!(container.port_mappings()[0].container_port(), Some(8080));
        assert_eq!(
            container.health_check().and_then(|check| check.interval()),
            Some(15)
        );
    }

    #[test]
    fn maps_efs_volume_with_authorization() {
        let input = register_task_definition_input(&descriptor(json!({
            "family": "shared",
            "volumes": [{
                "name": "data",
                "efsVolumeConfiguration": {
                    "fileSystemId": "fs-12345678",
                    "transitEncryption": "ENABLED",
                    "transitEncryptionPort": "2049",
                    "authorizationConfig": {"accessPointId": "fsap-1", "iam": "ENABLED"}
                }
            }]
        })))
        .expect("input should map");

        let volumes = input.get_volumes().as_ref().expect("volumes should be set");
        let efs = volumes[0]
            .efs_volume_configuration()
            .expect("efs configuration should be set");
        assert_eq!(efs.file_system_id(), "fs-12345678");
        assert_eq!(efs.transit_encryption_port(), Some(2049));
        assert_eq!(
            efs.authorization_config()
                .and_then(|config| config.access_point_id()),
            Some("fsap-1")
        );
    }

    #[test]
    fn maps_task_level_and_container_extensions() {
        let input = register_task_definition_input(&descriptor(json!({
            "family": "extended",
            "ephemeralStorage": {"sizeInGiB": "64"},
            "inferenceAccelerators": [{"deviceName": "device1", "deviceType": "eia2.medium"}],
            "proxyConfiguration": {"type": "APPMESH", "containerName": "envoy"},
            "containerDefinitions": [{
                "name": "app",
                "repositoryCredentials": {"credentialsParameter": "arn:aws:secretsmanager:eu-west-1:1:secret:reg"},
                "resourceRequirements": [{"type": "GPU", "value": "1"}],
                "extraHosts": [{"hostname": "db.local", "ipAddress": "10.0.0.5"}],
                "systemControls": [{"namespace": "net.core.somaxconn", "value": "1024"}],
                "linuxParameters": {"devices": [{"hostPath": "/dev/fuse", "permissions": ["read"]}]}
            }],
            "volumes": [{
                "name": "winshare",
                "fsxWindowsFileServerVolumeConfiguration": {
                    "fileSystemId": "fs-0abc",
                    "rootDirectory": "share",
                    "authorizationConfig": {"credentialsParameter": "arn:aws:secretsmanager:eu-west-1:1:secret:ad", "domain": "corp.example.com"}
                }
            }]
        })))
        .expect("input should map");

        assert_eq!(
            input.get_ephemeral_storage().as_ref().map(|storage| storage.size_in_gib()),
            Some(64)
        );
        assert_eq!(input.get_inference_accelerators().as_ref().map(Vec::len), Some(1));
        assert_eq!(
            input
                .get_proxy_configuration()
                .as_ref()
                .map(|proxy| proxy.container_name()),
            Some("envoy")
        );

        let containers = input
            .get_container_definitions()
            .as_ref()
            .expect("containers should be set");
        let container = &containers[0];
        assert_eq!(container.resource_requirements()[0].value(), "1");
        assert_eq!(container.extra_hosts()[0].ip_address(), "10.0.0.5");
        assert_eq!(container.system_controls()[0].value(), Some("1024"));
        assert_eq!(
            container
                .linux_parameters()
                .map(|parameters| parameters.devices()[0].host_path()),
            Some("/dev/fuse")
        );

        let volumes = input.get_volumes().as_ref().expect("volumes should be set");
        assert_eq!(
            volumes[0]
                .fsx_windows_file_server_volume_configuration()
                .map(|fsx| fsx.root_directory()),
            Some("share")
        );
    }

    #[test]
    fn optional_lists_stay_unset() {
        let input = register_task_definition_input(&descriptor(json!({"family": "bare"})))
            .expect("input should map");

        assert!(input.get_volumes().is_none());
        assert!(input.get_tags().is_none());
        assert_eq!(
            input.get_container_definitions().as_ref().map(Vec::len),
            Some(0)
        );
    }
}
