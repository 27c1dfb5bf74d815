//! Task definition renderer
//!
//! One renderer covers every stage: the template is merged with the stage's
//! `EnvironmentConfig`, serialized, and only then are the literal
//! placeholders substituted.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::domain::entities::{EnvironmentConfig, ResourceValue};
use crate::error::{StagehandError, StagehandResult};

pub const ENVIRONMENT_PLACEHOLDER: &str = "__ENVIRONMENT__";
pub const IMAGE_PLACEHOLDER: &str = "__IMAGE__";
pub const GIT_HASH_PLACEHOLDER: &str = "__GIT_HASH__";

const SOURCE: &str = "task definition template";
const RESOURCE_FIELDS: [&str; 2] = ["cpu", "memory"];
const CONTAINER_RESOURCE_FIELDS: [&str; 3] = ["cpu", "memory", "memoryReservation"];

/// JSON type used for `cpu` / `memory` fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceFieldType {
    #[default]
    String,
    Int,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RenderOptions {
    pub resource_field_type: ResourceFieldType,
    /// Prefix secret references with `ssm_prefix`
    pub expand_secrets: bool,
    pub ssm_prefix: String,
}

/// Values substituted for the literal placeholders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholders {
    pub environment: String,
    pub image: String,
    pub git_hash: String,
}

impl Placeholders {
    /// The image is `<repository>:<git_hash>`, or the bare hash when the
    /// stage declares no repository.
    pub fn new(environment: &str, git_hash: &str, image_repository: Option<&str>) -> Self {
        let image = match image_repository {
            Some(repo) if !repo.is_empty() => format!("{}:{}", repo, git_hash),
            _ => git_hash.to_string(),
        };
        Self {
            environment: environment.to_string(),
            image,
            git_hash: git_hash.to_string(),
        }
    }

    pub fn apply(&self, rendered: &str) -> String {
        rendered
            .replace(ENVIRONMENT_PLACEHOLDER, &self.environment)
            .replace(IMAGE_PLACEHOLDER, &self.image)
            .replace(GIT_HASH_PLACEHOLDER, &self.git_hash)
    }
}

/// Render a task definition to pretty JSON.
pub fn render_task_definition(
    template: &Value,
    env: &EnvironmentConfig,
    options: &RenderOptions,
    placeholders: &Placeholders,
) -> StagehandResult<String> {
    let mut document = template.clone();
    let root = document
        .as_object_mut()
        .ok_or_else(|| StagehandError::parse(SOURCE, None, "top level must be a JSON object"))?;

    for field in RESOURCE_FIELDS {
        let configured = match field {
            "cpu" => env.cpu.clone(),
            _ => env.memory.clone(),
        };
        let value = match configured {
            Some(value) => Some(value),
            None => root.get(field).map(|v| resource_from_json(field, v)).transpose()?,
        };
        if let Some(value) = value {
            root.insert(
                field.to_string(),
                resource_to_json(field, &value, options.resource_field_type)?,
            );
        }
    }

    let containers = root
        .get_mut("containerDefinitions")
        .and_then(Value::as_array_mut)
        .ok_or_else(|| StagehandError::parse(SOURCE, None, "missing containerDefinitions array"))?;

    for (index, container) in containers.iter_mut().enumerate() {
        let container = container.as_object_mut().ok_or_else(|| {
            StagehandError::parse(
                SOURCE,
                None,
                format!("containerDefinitions[{}] is not an object", index),
            )
        })?;
        render_container(container, env, options)?;
    }

    let mut tags = pairs_from_json(root.get("tags"), "key", "value");
    tags.extend(env.tags.iter().map(|(k, v)| (k.clone(), v.clone())));
    if !tags.is_empty() {
        root.insert("tags".to_string(), pairs_to_json(&tags, "key", "value"));
    }

    let rendered = serde_json::to_string_pretty(&document)?;
    Ok(placeholders.apply(&rendered))
}

fn render_container(
    container: &mut Map<String, Value>,
    env: &EnvironmentConfig,
    options: &RenderOptions,
) -> StagehandResult<()> {
    for field in CONTAINER_RESOURCE_FIELDS {
        if let Some(existing) = container.get(field) {
            let value = resource_from_json(field, existing)?;
            container.insert(
                field.to_string(),
                resource_to_json(field, &value, options.resource_field_type)?,
            );
        }
    }

    let mut environment = pairs_from_json(container.get("environment"), "name", "value");
    environment.extend(env.environment.iter().map(|(k, v)| (k.clone(), v.to_string())));
    container.insert(
        "environment".to_string(),
        pairs_to_json(&environment, "name", "value"),
    );

    let mut secrets = pairs_from_json(container.get("secrets"), "name", "valueFrom");
    secrets.extend(
        env.secrets
            .iter()
            .map(|(name, reference)| (name.clone(), secret_reference(reference, options))),
    );
    container.insert(
        "secrets".to_string(),
        pairs_to_json(&secrets, "name", "valueFrom"),
    );
    Ok(())
}

/// Full `valueFrom` for a secret reference.
pub fn secret_reference(reference: &str, options: &RenderOptions) -> String {
    if !options.expand_secrets || options.ssm_prefix.is_empty() {
        return reference.to_string();
    }
    format!(
        "{}/{}",
        options.ssm_prefix.trim_end_matches('/'),
        reference.trim_start_matches('/')
    )
}

fn resource_from_json(field: &str, value: &Value) -> StagehandResult<ResourceValue> {
    match value {
        Value::Number(n) => n.as_u64().map(ResourceValue::Int).ok_or_else(|| {
            StagehandError::parse(SOURCE, None, format!("{} must be a whole number, got {}", field, n))
        }),
        Value::String(s) => Ok(ResourceValue::Text(s.clone())),
        other => Err(StagehandError::parse(
            SOURCE,
            None,
            format!("{} must be a number or string, got {}", field, other),
        )),
    }
}

fn resource_to_json(
    field: &str,
    value: &ResourceValue,
    field_type: ResourceFieldType,
) -> StagehandResult<Value> {
    match field_type {
        ResourceFieldType::String => Ok(Value::String(value.to_string())),
        ResourceFieldType::Int => value.as_u64().map(Value::from).ok_or_else(|| {
            StagehandError::parse(
                SOURCE,
                None,
                format!("{} '{}' is not numeric but integer resources were requested", field, value),
            )
        }),
    }
}

/// Read `[{<key>: .., <value>: ..}]` into a sorted map; malformed entries are skipped.
fn pairs_from_json(value: Option<&Value>, key: &str, val: &str) -> BTreeMap<String, String> {
    let mut pairs = BTreeMap::new();
    let Some(entries) = value.and_then(Value::as_array) else {
        return pairs;
    };
    for entry in entries {
        let Some(name) = entry.get(key).and_then(Value::as_str) else {
            continue;
        };
        let value = match entry.get(val) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };
        pairs.insert(name.to_string(), value);
    }
    pairs
}

fn pairs_to_json(pairs: &BTreeMap<String, String>, key: &str, val: &str) -> Value {
    Value::Array(
        pairs
            .iter()
            .map(|(k, v)| {
                let mut entry = Map::new();
                entry.insert(key.to_string(), json!(k));
                entry.insert(val.to_string(), json!(v));
                Value::Object(entry)
            })
            .collect(),
    )
}
