//! RemoteShell port - run shell commands on one host
//!
//! The release manager and service controls only ever talk to a host through
//! this trait. Implementations: `SshShell` (remote), `LocalShell` (this
//! machine, used for local targets and tests).

use std::time::Duration;

/// Errors from running a single command
#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    #[error("exit {status}: {command}")]
    Failed {
        command: String,
        status: i32,
        stderr: String,
    },

    #[error("timed out after {}s: {command}", .after.as_secs())]
    Timeout { command: String, after: Duration },

    #[error("failed to start '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

pub type ShellResult<T> = Result<T, ShellError>;

/// Captured output of a finished command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub status: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == 0
    }
}

/// A shell line plus the context it runs in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteCommand {
    script: String,
    cwd: Option<String>,
    env_file: Option<String>,
    stdin: Option<Vec<u8>>,
    warn_only: bool,
}

impl RemoteCommand {
    pub fn new(script: impl Into<String>) -> Self {
        Self {
            script: script.into(),
            cwd: None,
            env_file: None,
            stdin: None,
            warn_only: false,
        }
    }

    /// Run inside `dir` (`cd` first)
    pub fn in_dir(mut self, dir: impl Into<String>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Export every `KEY=value` line of `file` before running
    pub fn with_env_file(mut self, file: impl Into<String>) -> Self {
        self.env_file = Some(file.into());
        self
    }

    /// Feed `input` to the command's stdin
    pub fn with_stdin(mut self, input: impl Into<Vec<u8>>) -> Self {
        self.stdin = Some(input.into());
        self
    }

    /// A non-zero exit is reported in the output instead of as an error
    pub fn warn_only(mut self) -> Self {
        self.warn_only = true;
        self
    }

    pub fn script(&self) -> &str {
        &self.script
    }

    pub fn stdin(&self) -> Option<&[u8]> {
        self.stdin.as_deref()
    }

    pub fn is_warn_only(&self) -> bool {
        self.warn_only
    }

    /// The full line handed to `sh`
    pub fn render(&self) -> String {
        let mut parts = Vec::new();
        if let Some(dir) = &self.cwd {
            parts.push(format!("cd {}", shell_quote(dir)));
        }
        if let Some(file) = &self.env_file {
            parts.push(format!("export $(cat {} | xargs)", shell_quote(file)));
        }
        parts.push(self.script.clone());
        parts.join(" && ")
    }
}

/// Quote a string for safe use as a single shell word
pub fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "'\\''"))
}

/// Runs commands on one host
pub trait RemoteShell: Send + Sync {
    /// Host address, used in errors and events
    fn target(&self) -> &str;

    /// Run a command to completion.
    ///
    /// Returns `ShellError::Failed` on a non-zero exit unless the command is
    /// `warn_only`.
    fn run(&self, command: &RemoteCommand) -> ShellResult<CommandOutput>;

    /// Write `content` to `path` on the host, replacing it atomically.
    fn upload(&self, path: &str, content: &[u8]) -> ShellResult<()> {
        let quoted = shell_quote(path);
        let tmp = shell_quote(&format!("{}.tmp", path));
        let parent = match path.rsplit_once('/') {
            Some((parent, _)) if !parent.is_empty() => parent,
            _ => ".",
        };
        let script = format!(
            "mkdir -p {} && cat > {} && mv -f {} {}",
            shell_quote(parent),
            tmp,
            tmp,
            quoted
        );
        self.run(&RemoteCommand::new(script).with_stdin(content.to_vec()))?;
        Ok(())
    }
}

/// Opens a shell for a host address
pub trait ShellConnector: Send + Sync {
    fn connect(&self, host: &str) -> Box<dyn RemoteShell>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_plain_script() {
        assert_eq!(RemoteCommand::new("uname -s").render(), "uname -s");
    }

    #[test]
    fn render_with_dir_and_env_file() {
        let cmd = RemoteCommand::new("yarn run build")
            .in_dir("/var/apps/galaxy/releases/20240501120000")
            .with_env_file("./env");
        assert_eq!(
            cmd.render(),
            "cd '/var/apps/galaxy/releases/20240501120000' && export $(cat './env' | xargs) && yarn run build"
        );
    }

    #[test]
    fn quote_escapes_single_quotes() {
        assert_eq!(shell_quote("it's"), "'it'\\''s'");
    }

    #[test]
    fn command_output_success() {
        assert!(CommandOutput::default().success());
        assert!(!CommandOutput {
            status: 1,
            ..Default::default()
        }
        .success());
    }
}
