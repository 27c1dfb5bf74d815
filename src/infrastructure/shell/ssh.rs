//! SSH shell
//!
//! Delegates transport to the system `ssh` binary. Authentication comes from
//! the configured key or the agent; `BatchMode` keeps a missing credential
//! from hanging the run on a password prompt.

use std::path::PathBuf;
use std::process::Command;
use std::time::Duration;

use crate::config::Config;
use crate::domain::ports::{CommandOutput, RemoteCommand, RemoteShell, ShellConnector, ShellResult};

use super::process::run_with_timeout;

/// Connection settings shared by every host of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshSettings {
    pub user: String,
    pub key_file: Option<PathBuf>,
    pub forward_agent: bool,
    pub port: Option<u16>,
    pub timeout: Option<Duration>,
}

impl SshSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            user: config.ssh.user.clone(),
            key_file: config.ssh_key_file(),
            forward_agent: config.ssh.forward_agent,
            port: config.ssh.port,
            timeout: Some(config.remote_timeout()),
        }
    }
}

pub struct SshShell {
    host: String,
    settings: SshSettings,
}

impl SshShell {
    pub fn new(host: impl Into<String>, settings: SshSettings) -> Self {
        Self {
            host: host.into(),
            settings,
        }
    }

    fn destination(&self) -> String {
        if self.settings.user.is_empty() {
            self.host.clone()
        } else {
            format!("{}@{}", self.settings.user, self.host)
        }
    }

    /// Arguments passed to `ssh`, ending with the remote line
    pub fn args(&self, line: &str) -> Vec<String> {
        let mut args = vec![
            "-o".to_string(),
            "BatchMode=yes".to_string(),
            "-o".to_string(),
            "StrictHostKeyChecking=accept-new".to_string(),
        ];
        if let Some(key) = &self.settings.key_file {
            args.push("-i".to_string());
            args.push(key.to_string_lossy().into_owned());
        }
        if self.settings.forward_agent {
            args.push("-A".to_string());
        }
        if let Some(port) = self.settings.port {
            args.push("-p".to_string());
            args.push(port.to_string());
        }
        args.push(self.destination());
        args.push("--".to_string());
        args.push(line.to_string());
        args
    }
}

impl RemoteShell for SshShell {
    fn target(&self) -> &str {
        &self.host
    }

    fn run(&self, command: &RemoteCommand) -> ShellResult<CommandOutput> {
        let line = command.render();
        tracing::debug!(host = %self.host, command = %line, "ssh");
        let mut cmd = Command::new("ssh");
        cmd.args(self.args(&line));
        run_with_timeout(
            cmd,
            &line,
            command.stdin(),
            self.settings.timeout,
            command.is_warn_only(),
        )
    }
}

pub struct SshConnector {
    settings: SshSettings,
}

impl SshConnector {
    pub fn new(settings: SshSettings) -> Self {
        Self { settings }
    }
}

impl ShellConnector for SshConnector {
    fn connect(&self, host: &str) -> Box<dyn RemoteShell> {
        Box::new(SshShell::new(host, self.settings.clone()))
    }
}
