//! Configuration type definitions

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::entities::{ReleaseLayout, SharedLink};
use crate::domain::services::{RenderOptions, ResourceFieldType};
use crate::error::{StagehandError, StagehandResult};

use super::loader::{self, ConfigWarning};

/// Project identity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Value of the `Project` tag on instances
    #[serde(default = "default_project_name")]
    pub name: String,

    /// Git remote cloned into the cached copy
    #[serde(default)]
    pub repository: String,

    /// Branch that stage branches are fast-forwarded from
    #[serde(default = "default_main_branch")]
    pub main_branch: String,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: default_project_name(),
            repository: String::new(),
            main_branch: default_main_branch(),
        }
    }
}

fn default_project_name() -> String {
    "app".to_string()
}

fn default_main_branch() -> String {
    "master".to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AwsConfig {
    #[serde(default)]
    pub region: Option<String>,

    /// Named profile passed to the aws CLI
    #[serde(default)]
    pub profile: Option<String>,
}

/// How hosts are reached
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SshConfig {
    #[serde(default = "default_ssh_user")]
    pub user: String,

    /// Private key; `~` is expanded
    #[serde(default)]
    pub key_file: Option<String>,

    #[serde(default = "default_true")]
    pub forward_agent: bool,

    #[serde(default)]
    pub port: Option<u16>,
}

impl Default for SshConfig {
    fn default() -> Self {
        Self {
            user: default_ssh_user(),
            key_file: None,
            forward_agent: true,
            port: None,
        }
    }
}

fn default_ssh_user() -> String {
    "deploy".to_string()
}

/// Remote filesystem layout
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Defaults to `/var/apps/<project>`
    #[serde(default)]
    pub app_root: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseConfig {
    /// Releases kept by prune
    #[serde(default = "default_keep")]
    pub keep: usize,

    /// Sub-paths linked from the cached copy instead of copied
    #[serde(default)]
    pub shared_links: Vec<String>,

    /// Run inside the new release with `./env` exported
    #[serde(default = "default_build_command")]
    pub build_command: String,

    /// Local env file uploaded by `env push`; `{stage}` is substituted
    #[serde(default = "default_env_file")]
    pub env_file: String,

    /// Local directory mirrored into `<cached copy>/secrets` by `env push`;
    /// empty disables the upload
    #[serde(default = "default_secrets_dir")]
    pub secrets_dir: String,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self {
            keep: default_keep(),
            shared_links: Vec::new(),
            build_command: default_build_command(),
            env_file: default_env_file(),
            secrets_dir: default_secrets_dir(),
        }
    }
}

fn default_keep() -> usize {
    5
}

fn default_build_command() -> String {
    "yarn run build".to_string()
}

fn default_env_file() -> String {
    "secrets/env-{stage}".to_string()
}

fn default_secrets_dir() -> String {
    "secrets".to_string()
}

/// Migration commands; an unset step is skipped
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MigrationsConfig {
    /// Relative to `current`
    #[serde(default)]
    pub working_dir: String,

    #[serde(default)]
    pub schema: Option<String>,

    #[serde(default)]
    pub data: Option<String>,
}

/// Process manager and web server on app hosts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServicesConfig {
    #[serde(default = "default_process_manager")]
    pub process_manager: String,

    /// Relative to the app root
    #[serde(default = "default_process_config")]
    pub process_config: String,

    /// System service name; no web server is managed when unset
    #[serde(default)]
    pub web_server: Option<String>,

    /// Signalled with HUP on graceful restart
    #[serde(default = "default_web_server_pid")]
    pub web_server_pid: String,

    #[serde(default = "default_true")]
    pub sudo: bool,

    /// Local virtual host file installed by `vhost push`, uploaded verbatim
    #[serde(default = "default_vhost_file")]
    pub vhost_file: PathBuf,

    /// Web server config root holding `sites-available` and `sites-enabled`
    #[serde(default = "default_vhost_dir")]
    pub vhost_dir: String,
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            process_manager: default_process_manager(),
            process_config: default_process_config(),
            web_server: Some("nginx".to_string()),
            web_server_pid: default_web_server_pid(),
            sudo: true,
            vhost_file: default_vhost_file(),
            vhost_dir: default_vhost_dir(),
        }
    }
}

fn default_process_manager() -> String {
    "/usr/local/bin/pm2".to_string()
}

fn default_process_config() -> String {
    "./current/deploy/config/pm2.json".to_string()
}

fn default_web_server_pid() -> String {
    "/var/run/nginx.pid".to_string()
}

fn default_vhost_file() -> PathBuf {
    PathBuf::from("deploy/config/nginx.conf")
}

fn default_vhost_dir() -> String {
    "/etc/nginx".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    600
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostsConfig {
    #[serde(default = "default_hosts_file")]
    pub file: PathBuf,
}

impl Default for HostsConfig {
    fn default() -> Self {
        Self {
            file: default_hosts_file(),
        }
    }
}

fn default_hosts_file() -> PathBuf {
    PathBuf::from("deploy/hosts.txt")
}

/// Task definition rendering
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    #[serde(default = "default_template")]
    pub template: PathBuf,

    /// Holds `<stage>.yml`
    #[serde(default = "default_environments_dir")]
    pub environments_dir: PathBuf,

    #[serde(default)]
    pub ssm_prefix: String,

    #[serde(default)]
    pub integer_resources: bool,

    #[serde(default = "default_true")]
    pub expand_secrets: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            template: default_template(),
            environments_dir: default_environments_dir(),
            ssm_prefix: String::new(),
            integer_resources: false,
            expand_secrets: true,
        }
    }
}

fn default_template() -> PathBuf {
    PathBuf::from("deploy/task-definition.json")
}

fn default_environments_dir() -> PathBuf {
    PathBuf::from("deploy/environments")
}

/// One deployable stage
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageConfig {
    /// Branch deployed; defaults to the stage name
    #[serde(default)]
    pub branch: Option<String>,

    /// Ask before mutating hosts of this stage
    #[serde(default)]
    pub confirm: bool,

    #[serde(default)]
    pub site_root: Option<String>,
}

/// Resolved stage with its name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    pub name: String,
    pub branch: String,
    pub confirm: bool,
    pub site_root: Option<String>,
}

fn default_stages() -> BTreeMap<String, StageConfig> {
    let mut stages = BTreeMap::new();
    stages.insert(
        "production".to_string(),
        StageConfig {
            branch: Some("production".to_string()),
            confirm: true,
            site_root: None,
        },
    );
    stages.insert(
        "staging".to_string(),
        StageConfig {
            branch: Some("staging".to_string()),
            confirm: false,
            site_root: None,
        },
    );
    stages
}

/// Main configuration structure
///
/// Loaded once per run and passed down explicitly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub project: ProjectConfig,

    #[serde(default)]
    pub aws: AwsConfig,

    #[serde(default)]
    pub ssh: SshConfig,

    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub release: ReleaseConfig,

    #[serde(default)]
    pub migrations: MigrationsConfig,

    #[serde(default)]
    pub services: ServicesConfig,

    #[serde(default)]
    pub remote: RemoteConfig,

    #[serde(default)]
    pub hosts: HostsConfig,

    #[serde(default)]
    pub render: RenderConfig,

    #[serde(default = "default_stages")]
    pub stages: BTreeMap<String, StageConfig>,

    /// Directory relative paths are resolved against
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            project: ProjectConfig::default(),
            aws: AwsConfig::default(),
            ssh: SshConfig::default(),
            paths: PathsConfig::default(),
            release: ReleaseConfig::default(),
            migrations: MigrationsConfig::default(),
            services: ServicesConfig::default(),
            remote: RemoteConfig::default(),
            hosts: HostsConfig::default(),
            render: RenderConfig::default(),
            stages: default_stages(),
            base_dir: PathBuf::from("."),
        }
    }
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> StagehandResult<Self> {
        Ok(Self::load_with_warnings(path)?.0)
    }

    /// Load configuration and return non-fatal warnings (unknown keys).
    pub fn load_with_warnings(path: &Path) -> StagehandResult<(Self, Vec<ConfigWarning>)> {
        loader::load_with_warnings(path)
    }

    /// Resolve a configured path against the config file's directory
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    pub fn app_root(&self) -> String {
        match &self.paths.app_root {
            Some(root) if !root.is_empty() => root.clone(),
            _ => format!("/var/apps/{}", self.project.name),
        }
    }

    pub fn layout(&self) -> ReleaseLayout {
        ReleaseLayout::new(self.app_root())
    }

    pub fn shared_links(&self) -> Vec<SharedLink> {
        self.release
            .shared_links
            .iter()
            .map(|p| SharedLink::new(p))
            .collect()
    }

    pub fn hosts_file(&self) -> PathBuf {
        self.resolve(&self.hosts.file)
    }

    pub fn template_file(&self) -> PathBuf {
        self.resolve(&self.render.template)
    }

    pub fn environments_dir(&self) -> PathBuf {
        self.resolve(&self.render.environments_dir)
    }

    /// Local env file uploaded for `stage`
    pub fn env_file(&self, stage: &str) -> PathBuf {
        self.resolve(Path::new(&self.release.env_file.replace("{stage}", stage)))
    }

    /// Local secrets directory, unless disabled
    pub fn secrets_dir(&self) -> Option<PathBuf> {
        let dir = self.release.secrets_dir.trim();
        if dir.is_empty() {
            None
        } else {
            Some(self.resolve(Path::new(dir)))
        }
    }

    /// Where the secrets directory lands on hosts
    pub fn remote_secrets_dir(&self) -> String {
        format!("{}/secrets", self.layout().cached_copy())
    }

    pub fn vhost_file(&self) -> PathBuf {
        self.resolve(&self.services.vhost_file)
    }

    pub fn remote_timeout(&self) -> Duration {
        Duration::from_secs(self.remote.timeout_secs)
    }

    /// SSH key with `~` expanded
    pub fn ssh_key_file(&self) -> Option<PathBuf> {
        self.ssh.key_file.as_deref().map(expand_tilde)
    }

    pub fn render_options(&self, integer_resources: bool) -> RenderOptions {
        RenderOptions {
            resource_field_type: if integer_resources || self.render.integer_resources {
                ResourceFieldType::Int
            } else {
                ResourceFieldType::String
            },
            expand_secrets: self.render.expand_secrets,
            ssm_prefix: self.render.ssm_prefix.clone(),
        }
    }

    /// Look up a declared stage
    pub fn stage(&self, name: &str) -> StagehandResult<Stage> {
        let stage = self
            .stages
            .get(name)
            .ok_or_else(|| StagehandError::UnknownStage {
                stage: name.to_string(),
                known: self.stages.keys().cloned().collect::<Vec<_>>().join(", "),
            })?;
        Ok(Stage {
            name: name.to_string(),
            branch: stage.branch.clone().unwrap_or_else(|| name.to_string()),
            confirm: stage.confirm,
            site_root: stage.site_root.clone(),
        })
    }
}

pub(crate) fn expand_tilde(path: &str) -> PathBuf {
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}
