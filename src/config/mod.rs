//! Configuration module for Stagehand
//!
//! Resolution order:
//! 1. CLI flags (highest priority)
//! 2. Environment variables (STAGEHAND_*)
//! 3. `--config <path>` or `./stagehand.toml`
//! 4. Built-in defaults (lowest priority)

mod loader;
mod types;

pub use loader::{
    load_or_default, with_env_overrides, with_overrides_from, ConfigWarning, DEFAULT_CONFIG_FILE,
};
pub use types::{
    AwsConfig, Config, HostsConfig, MigrationsConfig, PathsConfig, ProjectConfig, ReleaseConfig,
    RemoteConfig, RenderConfig, ServicesConfig, SshConfig, Stage, StageConfig,
};
