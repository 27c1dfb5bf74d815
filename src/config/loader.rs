//! Configuration loading

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{StagehandError, StagehandResult};

use super::types::Config;

/// File looked up in the working directory when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "stagehand.toml";

/// Non-fatal configuration warning surfaced to CLI users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub key: String,
    pub file: PathBuf,
    pub line: Option<usize>,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown config key '{}' in {}", self.key, self.file.display())?;
        if let Some(line) = self.line {
            write!(f, ":{}", line)?;
        }
        if let Some(suggestion) = &self.suggestion {
            write!(f, " (did you mean '{}'?)", suggestion)?;
        }
        Ok(())
    }
}

/// Load configuration and collect non-fatal warnings (e.g. unknown keys).
pub fn load_with_warnings(path: &Path) -> StagehandResult<(Config, Vec<ConfigWarning>)> {
    let content = fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => StagehandError::ConfigNotFound {
            path: path.to_path_buf(),
        },
        _ => StagehandError::Io(e),
    })?;

    let mut unknown_paths: Vec<String> = Vec::new();
    let deserializer = toml::de::Deserializer::new(&content);

    let mut config: Config = serde_ignored::deserialize(deserializer, |p| {
        unknown_paths.push(p.to_string());
    })
    .map_err(|e| StagehandError::InvalidConfig {
        file: path.to_path_buf(),
        message: e.to_string(),
    })?;

    config.base_dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    let warnings = unknown_paths
        .into_iter()
        .map(|path_str| {
            let key = path_str
                .split('.')
                .next_back()
                .unwrap_or(path_str.as_str())
                .to_string();
            ConfigWarning {
                key: key.clone(),
                file: path.to_path_buf(),
                line: find_line_number(&content, &key),
                suggestion: suggest_key(&key),
            }
        })
        .collect();

    Ok((config, warnings))
}

/// Load the explicit config, else `stagehand.toml` in `cwd`, else defaults.
///
/// An explicit path that does not exist is an error; a missing default
/// file is not.
pub fn load_or_default(
    explicit: Option<&Path>,
    cwd: &Path,
) -> StagehandResult<(Config, Vec<ConfigWarning>)> {
    let (config, warnings) = match explicit {
        Some(path) => load_with_warnings(path)?,
        None => {
            let candidate = cwd.join(DEFAULT_CONFIG_FILE);
            if candidate.exists() {
                load_with_warnings(&candidate)?
            } else {
                let config = Config {
                    base_dir: cwd.to_path_buf(),
                    ..Config::default()
                };
                (config, Vec::new())
            }
        }
    };
    Ok((with_env_overrides(config), warnings))
}

/// Apply environment variable overrides (STAGEHAND_* prefix)
pub fn with_env_overrides(config: Config) -> Config {
    with_overrides_from(config, |key| std::env::var(key).ok())
}

/// Apply overrides from an arbitrary lookup; unparseable values are ignored
pub fn with_overrides_from(mut config: Config, lookup: impl Fn(&str) -> Option<String>) -> Config {
    // STAGEHAND_SSH_USER
    if let Some(user) = lookup("STAGEHAND_SSH_USER").filter(|v| !v.is_empty()) {
        config.ssh.user = user;
    }

    // STAGEHAND_REMOTE_TIMEOUT (seconds)
    if let Some(timeout) = lookup("STAGEHAND_REMOTE_TIMEOUT") {
        match timeout.trim().parse() {
            Ok(secs) => config.remote.timeout_secs = secs,
            Err(_) => tracing::warn!(value = %timeout, "ignoring invalid STAGEHAND_REMOTE_TIMEOUT"),
        }
    }

    // STAGEHAND_KEEP_RELEASES
    if let Some(keep) = lookup("STAGEHAND_KEEP_RELEASES") {
        match keep.trim().parse() {
            Ok(keep) => config.release.keep = keep,
            Err(_) => tracing::warn!(value = %keep, "ignoring invalid STAGEHAND_KEEP_RELEASES"),
        }
    }

    // STAGEHAND_HOSTS_FILE
    if let Some(file) = lookup("STAGEHAND_HOSTS_FILE").filter(|v| !v.is_empty()) {
        config.hosts.file = PathBuf::from(file);
    }

    // STAGEHAND_AWS_REGION
    if let Some(region) = lookup("STAGEHAND_AWS_REGION").filter(|v| !v.is_empty()) {
        config.aws.region = Some(region);
    }

    config
}

fn find_line_number(content: &str, needle: &str) -> Option<usize> {
    for (i, line) in content.lines().enumerate() {
        if line.contains(needle) {
            return Some(i + 1);
        }
    }
    None
}

fn suggest_key(unknown: &str) -> Option<String> {
    const CANDIDATES: &[&str] = &[
        "project",
        "name",
        "repository",
        "main_branch",
        "aws",
        "region",
        "profile",
        "ssh",
        "user",
        "key_file",
        "forward_agent",
        "port",
        "paths",
        "app_root",
        "release",
        "keep",
        "shared_links",
        "build_command",
        "env_file",
        "secrets_dir",
        "migrations",
        "working_dir",
        "schema",
        "data",
        "services",
        "process_manager",
        "process_config",
        "web_server",
        "web_server_pid",
        "sudo",
        "vhost_file",
        "vhost_dir",
        "remote",
        "timeout_secs",
        "hosts",
        "file",
        "render",
        "template",
        "environments_dir",
        "ssm_prefix",
        "integer_resources",
        "expand_secrets",
        "stages",
        "branch",
        "confirm",
        "site_root",
    ];

    let mut best: Option<(&str, usize)> = None;
    for candidate in CANDIDATES {
        let dist = levenshtein(unknown, candidate);
        best = match best {
            None => Some((candidate, dist)),
            Some((_, best_dist)) if dist < best_dist => Some((candidate, dist)),
            Some(current) => Some(current),
        };
    }

    match best {
        Some((candidate, dist)) if dist <= 2 => Some(candidate.to_string()),
        _ => None,
    }
}

fn levenshtein(a: &str, b: &str) -> usize {
    if a == b {
        return 0;
    }

    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    let mut prev: Vec<usize> = (0..=b_bytes.len()).collect();
    let mut curr = vec![0usize; b_bytes.len() + 1];

    for (i, &ac) in a_bytes.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &bc) in b_bytes.iter().enumerate() {
            let cost = if ac == bc { 0 } else { 1 };
            curr[j + 1] =
                std::cmp::min(std::cmp::min(prev[j + 1] + 1, curr[j] + 1), prev[j] + cost);
        }
        prev.clone_from_slice(&curr);
    }

    prev[b_bytes.len()]
}
