//! Environment Push Use Case
//!
//! Uploads the stage's env file to `shared/env` and mirrors the local secrets
//! directory into the cached copy, where `materialize` links it into each
//! release.

use crate::domain::entities::SecretFile;
use crate::domain::ports::RemoteShell;
use crate::error::{StagehandError, StagehandResult};

pub struct EnvironmentPush<'a> {
    shell: &'a dyn RemoteShell,
}

impl<'a> EnvironmentPush<'a> {
    pub fn new(shell: &'a dyn RemoteShell) -> Self {
        Self { shell }
    }

    fn upload(&self, path: &str, content: &[u8]) -> StagehandResult<()> {
        self.shell
            .upload(path, content)
            .map_err(|e| StagehandError::from_shell(self.shell.target(), e))
    }

    pub fn push_env(&self, remote: &str, content: &[u8]) -> StagehandResult<()> {
        self.upload(remote, content)?;
        tracing::info!(host = %self.shell.target(), path = %remote, bytes = content.len(), "env pushed");
        Ok(())
    }

    /// Upload each file below `remote_dir`, keeping its relative path.
    /// Files already on the host that are not in `files` are left alone.
    pub fn push_secrets(&self, remote_dir: &str, files: &[SecretFile]) -> StagehandResult<usize> {
        for file in files {
            self.upload(&file.remote_path(remote_dir), &file.content)?;
        }
        tracing::info!(
            host = %self.shell.target(),
            dir = %remote_dir,
            files = files.len(),
            "secrets pushed"
        );
        Ok(files.len())
    }
}
