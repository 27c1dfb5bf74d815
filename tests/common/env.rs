//! Test environment for isolated Stagehand runs.
//!
//! Provides `TestEnv` - a temp project directory with a `stagehand.toml`,
//! plus helpers to run the CLI inside it.

use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

use super::fixtures::BASIC_CONFIG;

/// Result of running a Stagehand CLI command
#[derive(Debug)]
pub struct TestResult {
    pub success: bool,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl TestResult {
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Combine stdout and stderr
    pub fn combined_output(&self) -> String {
        format!("{}\n{}", self.stdout, self.stderr)
    }
}

/// Isolated project directory with its own HOME.
pub struct TestEnv {
    pub project_root: TempDir,
    pub home_dir: TempDir,
    bin: PathBuf,
}

impl TestEnv {
    /// Empty project (no config file)
    pub fn empty() -> Self {
        Self {
            project_root: tempfile::tempdir().expect("Failed to create project dir"),
            home_dir: tempfile::tempdir().expect("Failed to create home dir"),
            bin: PathBuf::from(env!("CARGO_BIN_EXE_stagehand")),
        }
    }

    /// Project with `BASIC_CONFIG` as `stagehand.toml`
    pub fn new() -> Self {
        Self::with_config(BASIC_CONFIG)
    }

    pub fn with_config(config: &str) -> Self {
        let env = Self::empty();
        env.write_file("stagehand.toml", config);
        env
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.project_root.path().join(relative)
    }

    pub fn write_file(&self, relative: &str, content: &str) {
        let full_path = self.path(relative);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create directories");
        }
        std::fs::write(&full_path, content).expect("Failed to write file");
    }

    pub fn read_file(&self, relative: &str) -> String {
        std::fs::read_to_string(self.path(relative))
            .unwrap_or_else(|e| panic!("Failed to read {}: {}", relative, e))
    }

    /// Run the CLI from the project root
    pub fn run(&self, args: &[&str]) -> TestResult {
        self.run_with_env(args, &[])
    }

    pub fn run_with_env(&self, args: &[&str], env_vars: &[(&str, &str)]) -> TestResult {
        self.run_from_with_env(self.project_root.path(), args, env_vars)
    }

    pub fn run_from_with_env(
        &self,
        cwd: &Path,
        args: &[&str],
        env_vars: &[(&str, &str)],
    ) -> TestResult {
        let mut cmd = Command::new(&self.bin);
        cmd.current_dir(cwd)
            .args(args)
            .stdin(Stdio::null())
            .env("HOME", self.home_dir.path())
            .env_remove("RUST_LOG");
        for key in [
            "STAGEHAND_SSH_USER",
            "STAGEHAND_REMOTE_TIMEOUT",
            "STAGEHAND_KEEP_RELEASES",
            "STAGEHAND_HOSTS_FILE",
            "STAGEHAND_AWS_REGION",
        ] {
            cmd.env_remove(key);
        }
        for (key, value) in env_vars {
            cmd.env(key, value);
        }

        let output = cmd.output().expect("Failed to execute stagehand");
        output_to_result(output)
    }
}

fn output_to_result(output: Output) -> TestResult {
    TestResult {
        success: output.status.success(),
        exit_code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    }
}
