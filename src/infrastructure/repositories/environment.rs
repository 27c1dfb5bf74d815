//! YAML Environment Repository
//!
//! Reads `<dir>/<stage>.yml` (or `.yaml`) fresh on every call.

use std::fs;
use std::path::PathBuf;

use crate::domain::entities::EnvironmentConfig;
use crate::domain::ports::EnvironmentRepository;
use crate::error::{StagehandError, StagehandResult};

pub struct YamlEnvironmentRepository {
    dir: PathBuf,
}

impl YamlEnvironmentRepository {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn candidates(&self, stage: &str) -> [PathBuf; 2] {
        [
            self.dir.join(format!("{}.yml", stage)),
            self.dir.join(format!("{}.yaml", stage)),
        ]
    }
}

impl EnvironmentRepository for YamlEnvironmentRepository {
    fn load(&self, stage: &str) -> StagehandResult<EnvironmentConfig> {
        let [primary, alternate] = self.candidates(stage);
        let path = if primary.exists() || !alternate.exists() {
            primary
        } else {
            alternate
        };

        let content = fs::read_to_string(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => StagehandError::ConfigNotFound { path: path.clone() },
            _ => StagehandError::Io(e),
        })?;

        if content.trim().is_empty() {
            return Ok(EnvironmentConfig::default());
        }

        serde_yaml_ng::from_str(&content).map_err(|e| {
            StagehandError::parse(
                path.display().to_string(),
                e.location().map(|l| l.line()),
                e.to_string(),
            )
        })
    }
}
