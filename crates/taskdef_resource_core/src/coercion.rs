//! Restores native JSON types on a CloudFormation property bag.
//!
//! CloudFormation hands every custom resource property over as a string. The
//! ECS API expects integers and booleans for a known set of fields, so those
//! fields are declared once in [`TASK_DEFINITION_SCHEMA`] and converted by a
//! single generic walker. Paths use `.` between object keys and a `[]` suffix
//! on keys whose value is an array. A rule ending on an array converts each
//! element.

use serde_json::{Map, Value};

use crate::error::{HandlerError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Integer,
    /// Case-insensitive `"true"` is `true`, any other string is `false`.
    Boolean,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    pub path: &'static str,
    pub kind: FieldKind,
}

const fn integer(path: &'static str) -> FieldRule {
    FieldRule {
        path,
        kind: FieldKind::Integer,
    }
}

const fn boolean(path: &'static str) -> FieldRule {
    FieldRule {
        path,
        kind: FieldKind::Boolean,
    }
}

// Top-level `cpu` and `memory` are strings in RegisterTaskDefinition.
pub const TASK_DEFINITION_SCHEMA: &[FieldRule] = &[
    integer("containerDefinitions[].cpu"),
    integer("containerDefinitions[].memory"),
    integer("containerDefinitions[].memoryReservation"),
    integer("containerDefinitions[].startTimeout"),
    integer("containerDefinitions[].stopTimeout"),
    boolean("containerDefinitions[].restartPolicy.enabled"),
    integer("containerDefinitions[].restartPolicy.ignoredExitCodes[]"),
    integer("containerDefinitions[].restartPolicy.restartAttemptPeriod"),
    boolean("containerDefinitions[].disableNetworking"),
    boolean("containerDefinitions[].essential"),
    boolean("containerDefinitions[].interactive"),
    boolean("containerDefinitions[].privileged"),
    boolean("containerDefinitions[].pseudoTerminal"),
    boolean("containerDefinitions[].readonlyRootFilesystem"),
    integer("containerDefinitions[].healthCheck.interval"),
    integer("containerDefinitions[].healthCheck.retries"),
    integer("containerDefinitions[].healthCheck.startPeriod"),
    integer("containerDefinitions[].healthCheck.timeout"),
    boolean("containerDefinitions[].linuxParameters.initProcessEnabled"),
    integer("containerDefinitions[].linuxParameters.maxSwap"),
    integer("containerDefinitions[].linuxParameters.sharedMemorySize"),
    integer("containerDefinitions[].linuxParameters.swappiness"),
    integer("containerDefinitions[].linuxParameters.tmpfs[].size"),
    boolean("containerDefinitions[].mountPoints[].readOnly"),
    integer("containerDefinitions[].portMappings[].containerPort"),
    integer("containerDefinitions[].portMappings[].hostPort"),
    integer("containerDefinitions[].ulimits[].hardLimit"),
    integer("containerDefinitions[].ulimits[].softLimit"),
    boolean("containerDefinitions[].volumesFrom[].readOnly"),
    boolean("volumes[].dockerVolumeConfiguration.autoprovision"),
    integer("volumes[].efsVolumeConfiguration.transitEncryptionPort"),
    boolean("volumes[].configuredAtLaunch"),
    integer("ephemeralStorage.sizeInGiB"),
    boolean("enableFaultInjection"),
];

/// Applies [`TASK_DEFINITION_SCHEMA`] in place.
pub fn coerce_properties(properties: &mut Map<String, Value>) -> Result<()> {
    coerce_with_schema(properties, TASK_DEFINITION_SCHEMA)
}

pub fn coerce_with_schema(properties: &mut Map<String, Value>, schema: &[FieldRule]) -> Result<()> {
    for rule in schema {
        let segments: Vec<&str> = rule.path.split('.').collect();
        coerce_path(properties, &segments, rule)?;
    }
    Ok(())
}

fn coerce_path(object: &mut Map<String, Value>, segments: &[&str], rule: &FieldRule) -> Result<()> {
    let Some((segment, rest)) = segments.split_first() else {
        return Ok(());
    };
    let (key, is_array) = match segment.strip_suffix("[]") {
        Some(key) => (key, true),
        None => (*segment, false),
    };
    let Some(value) = object.get_mut(key) else {
        return Ok(());
    };

    if rest.is_empty() {
        if !is_array {
            return coerce_value(value, rule);
        }
        if let Value::Array(items) = value {
            for item in items {
                coerce_value(item, rule)?;
            }
        }
        return Ok(());
    }

    match value {
        Value::Array(items) if is_array => {
            for item in items {
                if let Value::Object(child) = item {
                    coerce_path(child, rest, rule)?;
                }
            }
        }
        Value::Object(child) if !is_array => coerce_path(child, rest, rule)?,
        _ => {}
    }
    Ok(())
}

fn coerce_value(value: &mut Value, rule: &FieldRule) -> Result<()> {
    let Value::String(text) = value else {
        return Ok(());
    };

    *value = match rule.kind {
        FieldKind::Integer => {
            let parsed = text
                .trim()
                .parse::<i64>()
                .map_err(|_| HandlerError::InvalidInteger {
                    path: rule.path,
                    value: text.clone(),
                })?;
            Value::from(parsed)
        }
        FieldKind::Boolean => Value::Bool(text.eq_ignore_ascii_case("true")),
    };
    Ok(())
}
