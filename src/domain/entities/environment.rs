//! Per-stage environment configuration
//!
//! One YAML document per stage feeds the task definition renderer. A
//! document is loaded fresh for every render and never merged with another
//! stage's document.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Plain scalar from YAML, rendered as a string in the task definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Int(i) => write!(f, "{}", i),
            Scalar::Float(x) => write!(f, "{}", x),
            Scalar::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

/// CPU or memory sizing; templates and stage files use both forms
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResourceValue {
    Int(u64),
    Text(String),
}

impl ResourceValue {
    /// Numeric value, if the text form holds one
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            ResourceValue::Int(n) => Some(*n),
            ResourceValue::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl fmt::Display for ResourceValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceValue::Int(n) => write!(f, "{}", n),
            ResourceValue::Text(s) => f.write_str(s),
        }
    }
}

/// Stage document: `<environments_dir>/<stage>.yml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnvironmentConfig {
    /// Plaintext variables
    #[serde(default)]
    pub environment: BTreeMap<String, Scalar>,

    /// Secret name → reference inside the parameter store
    #[serde(default)]
    pub secrets: BTreeMap<String, String>,

    #[serde(default)]
    pub cpu: Option<ResourceValue>,

    #[serde(default)]
    pub memory: Option<ResourceValue>,

    /// Image repository; the git hash is appended as the tag
    #[serde(default)]
    pub image: Option<String>,

    /// Resource tags for the task definition
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}
