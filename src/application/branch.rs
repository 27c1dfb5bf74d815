//! Stage Branch Promotion
//!
//! Moves a stage branch to the tip of a source branch (normally `master`)
//! and pushes it, so the hosts fetch what was just merged. Runs git in the
//! local checkout through a [`RemoteShell`] pointed at this machine.

use crate::domain::ports::{shell_quote, RemoteCommand, RemoteShell};
use crate::error::{StagehandError, StagehandResult};

/// How the stage branch catches up with the source branch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergeMode {
    /// `git merge --ff-only`; refuses diverged history
    #[default]
    FastForward,
    /// `git reset --hard` and a forced push
    Hard,
}

pub struct BranchPromotion<'a> {
    git: &'a dyn RemoteShell,
    checkout: String,
}

impl<'a> BranchPromotion<'a> {
    /// `checkout` is the working tree git runs in.
    pub fn new(git: &'a dyn RemoteShell, checkout: impl Into<String>) -> Self {
        Self {
            git,
            checkout: checkout.into(),
        }
    }

    fn run(&self, script: String) -> StagehandResult<String> {
        self.git
            .run(&RemoteCommand::new(script).in_dir(self.checkout.clone()))
            .map(|out| out.stdout)
            .map_err(|e| StagehandError::from_shell(self.git.target(), e))
    }

    /// Point `stage_branch` at `source` and push it.
    ///
    /// The checkout must be on `source` with a clean working tree. It is
    /// left on `source` afterwards, also when a step fails.
    pub fn promote(&self, source: &str, stage_branch: &str, mode: MergeMode) -> StagehandResult<()> {
        let current = self.run("git symbolic-ref --short HEAD".to_string())?;
        let current = current.trim();
        if current != source {
            return Err(StagehandError::BranchNotReady {
                branch: stage_branch.to_string(),
                reason: format!("on branch {}; should be on branch {}", current, source),
            });
        }
        if !self.run("git status --porcelain".to_string())?.trim().is_empty() {
            return Err(StagehandError::BranchNotReady {
                branch: stage_branch.to_string(),
                reason: "working directory is not clean".to_string(),
            });
        }

        self.run(format!("git checkout {}", shell_quote(stage_branch)))?;
        let moved = self.move_and_push(source, mode);
        let back = self.run(format!("git checkout {}", shell_quote(source)));
        moved?;
        back?;

        tracing::info!(from = %source, branch = %stage_branch, ?mode, "stage branch updated");
        Ok(())
    }

    fn move_and_push(&self, source: &str, mode: MergeMode) -> StagehandResult<()> {
        let source = shell_quote(source);
        match mode {
            MergeMode::FastForward => {
                self.run(format!("git merge --ff-only {}", source))?;
                self.run("git push".to_string())?;
            }
            MergeMode::Hard => {
                self.run(format!("git reset --hard {}", source))?;
                self.run("git push -f".to_string())?;
            }
        }
        Ok(())
    }
}
