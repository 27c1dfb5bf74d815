//! Local shell
//!
//! Runs commands with `sh -c` on this machine. Used for hosts that are the
//! local machine and by tests that exercise real filesystem effects.

use std::process::Command;
use std::time::Duration;

use crate::domain::ports::{CommandOutput, RemoteCommand, RemoteShell, ShellConnector, ShellResult};

use super::process::run_with_timeout;

pub struct LocalShell {
    target: String,
    timeout: Option<Duration>,
}

impl LocalShell {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl RemoteShell for LocalShell {
    fn target(&self) -> &str {
        &self.target
    }

    fn run(&self, command: &RemoteCommand) -> ShellResult<CommandOutput> {
        let line = command.render();
        tracing::debug!(target_host = %self.target, command = %line, "local");
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(&line);
        run_with_timeout(
            cmd,
            &line,
            command.stdin(),
            self.timeout,
            command.is_warn_only(),
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct LocalConnector {
    timeout: Option<Duration>,
}

impl LocalConnector {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }
}

impl ShellConnector for LocalConnector {
    fn connect(&self, host: &str) -> Box<dyn RemoteShell> {
        let shell = LocalShell::new(host);
        Box::new(match self.timeout {
            Some(t) => shell.with_timeout(t),
            None => shell,
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn runs_in_dir_with_env_file() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("env"), "GREETING=hello\n").unwrap();

        let shell = LocalShell::new("localhost");
        let out = shell
            .run(
                &RemoteCommand::new("echo $GREETING")
                    .in_dir(dir.path().to_string_lossy())
                    .with_env_file("./env"),
            )
            .unwrap();
        assert_eq!(out.stdout.trim(), "hello");
    }

    #[test]
    fn upload_replaces_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("shared/env");
        let path_str = path.to_string_lossy().to_string();

        let shell = LocalShell::new("localhost");
        shell.upload(&path_str, b"A=1\n").unwrap();
        shell.upload(&path_str, b"A=2\n").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "A=2\n");
        assert!(!dir.path().join("shared/env.tmp").exists());
    }

    #[test]
    fn connector_uses_host_as_target() {
        let shell = LocalConnector::default().connect("app-1");
        assert_eq!(shell.target(), "app-1");
    }
}
