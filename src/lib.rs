//! Stagehand - release manager for multi-stage EC2 fleets
//!
//! Stagehand keeps a host inventory built from instance tags, ships
//! timestamped releases to every host of a stage, switches the `current`
//! pointer atomically, and renders ECS task definitions from a JSON
//! template plus per-environment YAML.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod presentation;

// Re-exports for convenience
pub use application::{
    CancellationToken, DeployOptions, DeployPipeline, DeployReport, HostRegistry, ReleaseManager,
    RenderUseCase, RestartMode,
};
pub use config::Config;
pub use domain::entities::{DeployTarget, EnvironmentConfig, HostRecord, HostSet};
pub use domain::services::{render_task_definition, RenderOptions, ResourceFieldType};
pub use domain::value_objects::{PipelineStage, ReleaseId};
pub use error::{StagehandError, StagehandResult};
