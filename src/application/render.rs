//! Render Use Case
//!
//! Loads the task definition template and the stage's environment document,
//! then renders them into a registrable task definition.

use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::ports::EnvironmentRepository;
use crate::domain::services::{render_task_definition, Placeholders, RenderOptions};
use crate::error::{StagehandError, StagehandResult};

pub struct RenderUseCase<E: EnvironmentRepository> {
    template: PathBuf,
    environments: E,
}

impl<E: EnvironmentRepository> RenderUseCase<E> {
    pub fn new(template: impl Into<PathBuf>, environments: E) -> Self {
        Self {
            template: template.into(),
            environments,
        }
    }

    /// Render for `environment` at `git_hash`.
    pub fn render(
        &self,
        environment: &str,
        git_hash: &str,
        options: &RenderOptions,
    ) -> StagehandResult<String> {
        let template = load_template(&self.template)?;
        let config = self.environments.load(environment)?;
        let placeholders = Placeholders::new(environment, git_hash, config.image.as_deref());
        render_task_definition(&template, &config, options, &placeholders)
    }
}

fn load_template(path: &Path) -> StagehandResult<serde_json::Value> {
    let content = fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => StagehandError::ConfigNotFound {
            path: path.to_path_buf(),
        },
        _ => StagehandError::Io(e),
    })?;
    serde_json::from_str(&content).map_err(|e| {
        StagehandError::parse(path.display().to_string(), Some(e.line()), e.to_string())
    })
}
