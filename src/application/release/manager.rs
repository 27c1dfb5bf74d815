//! Release Manager
//!
//! Every operation is a handful of shell lines sent through one host's
//! `RemoteShell`. Nothing here keeps state between calls; the host's
//! filesystem is the state.

use chrono::{DateTime, Utc};

use crate::domain::ports::{shell_quote, RemoteCommand, RemoteShell};
use crate::domain::services::plan_retention;
use crate::domain::value_objects::ReleaseId;
use crate::error::{StagehandError, StagehandResult};

use super::options::ReleaseSettings;
use super::result::{MigrationReport, PruneReport};

pub struct ReleaseManager<'a> {
    shell: &'a dyn RemoteShell,
    settings: &'a ReleaseSettings,
}

impl<'a> ReleaseManager<'a> {
    pub fn new(shell: &'a dyn RemoteShell, settings: &'a ReleaseSettings) -> Self {
        Self { shell, settings }
    }

    pub fn host(&self) -> &str {
        self.shell.target()
    }

    fn run(&self, command: RemoteCommand) -> StagehandResult<String> {
        self.shell
            .run(&command)
            .map(|out| out.stdout)
            .map_err(|e| StagehandError::from_shell(self.host(), e))
    }

    /// Exit status only; a non-zero exit is an answer, not an error.
    fn check(&self, script: String) -> StagehandResult<bool> {
        self.shell
            .run(&RemoteCommand::new(script).warn_only())
            .map(|out| out.success())
            .map_err(|e| StagehandError::from_shell(self.host(), e))
    }

    /// Create the directory layout. Idempotent.
    pub fn prepare_host(&self) -> StagehandResult<()> {
        let dirs: Vec<String> = self
            .settings
            .layout
            .directories()
            .iter()
            .map(|d| shell_quote(d))
            .collect();
        self.run(RemoteCommand::new(format!("mkdir -p {}", dirs.join(" "))))?;
        Ok(())
    }

    /// Bring the cached copy to the tip of `origin/<branch>`, cloning first
    /// if it is not a checkout yet.
    pub fn fetch(&self, branch: &str) -> StagehandResult<()> {
        let cached = self.settings.layout.cached_copy();
        self.run(RemoteCommand::new(format!(
            "if [ ! -d {git} ]; then git clone {repo} {dir}; fi",
            git = shell_quote(&format!("{}/.git", cached)),
            repo = shell_quote(&self.settings.repository),
            dir = shell_quote(&cached),
        )))?;
        let branch = shell_quote(branch);
        self.run(
            RemoteCommand::new(format!(
                "git checkout {b} && git fetch origin && git reset --hard origin/{b}",
                b = branch
            ))
            .in_dir(cached),
        )?;
        Ok(())
    }

    /// Claim the id for a release created at `now` by creating its
    /// directory.
    ///
    /// `mkdir` without `-p` either creates the directory or fails, so of two
    /// deployers racing within the same second only one gets the id. The
    /// other fails with `ReleaseCollision`.
    pub fn create_release(&self, now: DateTime<Utc>) -> StagehandResult<ReleaseId> {
        let id = ReleaseId::from_datetime(now);
        let path = shell_quote(&self.settings.layout.release(&id));
        if self.check(format!("mkdir {}", path))? {
            return Ok(id);
        }
        if self.check(format!("test -e {}", path))? {
            return Err(StagehandError::ReleaseCollision {
                release: id,
                host: self.host().to_string(),
            });
        }
        // Not a collision (releases/ missing, permissions): report mkdir's own error.
        self.run(RemoteCommand::new(format!("mkdir {}", path)))?;
        Ok(id)
    }

    /// Copy the cached checkout into the release and link the shared paths.
    pub fn materialize(&self, id: &ReleaseId) -> StagehandResult<()> {
        let layout = &self.settings.layout;
        let cached = layout.cached_copy();
        let release = layout.release(id);

        let mut rsync = format!(
            "rsync -a {}/ {}/ --exclude {}",
            shell_quote(&cached),
            shell_quote(&release),
            shell_quote("/.git*")
        );
        for link in &self.settings.shared_links {
            rsync.push_str(&format!(" --exclude {}", shell_quote(&link.exclude_pattern())));
        }
        self.run(RemoteCommand::new(rsync))?;

        for link in &self.settings.shared_links {
            let source = format!("{}{}", cached, link.path());
            let parent = format!("{}{}", release, link.parent());
            self.run(RemoteCommand::new(format!(
                "mkdir -p {src} {parent} && ln -sfn {src} {parent}/",
                src = shell_quote(&source),
                parent = shell_quote(&parent),
            )))?;
        }
        Ok(())
    }

    /// Copy the shared env file into the release root.
    pub fn copy_environment(&self, id: &ReleaseId) -> StagehandResult<()> {
        let layout = &self.settings.layout;
        self.run(RemoteCommand::new(format!(
            "cp {} {}",
            shell_quote(&layout.shared_env()),
            shell_quote(&format!("{}/env", layout.release(id)))
        )))?;
        Ok(())
    }

    /// Run the build command inside the release with `./env` exported.
    pub fn build_apps(&self, id: &ReleaseId) -> StagehandResult<()> {
        self.run(
            RemoteCommand::new(self.settings.build_command.clone())
                .in_dir(self.settings.layout.release(id))
                .with_env_file("./env"),
        )?;
        Ok(())
    }

    /// Point `current` at the release.
    ///
    /// The new link is built beside `current` and renamed over it, so readers
    /// see either the old or the new target. Running it twice is harmless.
    pub fn promote(&self, id: &ReleaseId) -> StagehandResult<()> {
        let layout = &self.settings.layout;
        let tmp = format!("{}.tmp-{}", layout.current(), id);
        self.run(RemoteCommand::new(format!(
            "ln -sfn {release} {tmp} && mv -Tf {tmp} {current}",
            release = shell_quote(&layout.release(id)),
            tmp = shell_quote(&tmp),
            current = shell_quote(&layout.current()),
        )))?;
        Ok(())
    }

    /// Promote a release that already exists on the host.
    pub fn promote_existing(&self, id: &ReleaseId) -> StagehandResult<()> {
        let path = self.settings.layout.release(id);
        if !self.check(format!("test -d {}", shell_quote(&path)))? {
            return Err(StagehandError::ReleaseNotFound {
                release: id.clone(),
                host: self.host().to_string(),
            });
        }
        self.promote(id)
    }

    /// Schema step, then data step, in `<current>/<working_dir>`.
    pub fn run_migrations(&self) -> StagehandResult<MigrationReport> {
        let migrations = &self.settings.migrations;
        let current = self.settings.layout.current();
        let dir = match migrations.working_dir.trim_matches('/') {
            "" => current.clone(),
            sub => format!("{}/{}", current, sub),
        };
        let env_file = format!("{}/env", current);

        let mut report = MigrationReport::default();
        if let Some(schema) = migrations.schema.as_deref().filter(|s| !s.trim().is_empty()) {
            self.run(
                RemoteCommand::new(schema)
                    .in_dir(dir.clone())
                    .with_env_file(env_file.clone()),
            )?;
            report.schema = true;
        }
        if let Some(data) = migrations.data.as_deref().filter(|s| !s.trim().is_empty()) {
            self.run(RemoteCommand::new(data).in_dir(dir).with_env_file(env_file))?;
            report.data = true;
        }
        Ok(report)
    }

    /// Release the `current` link points at, if any.
    pub fn current_release(&self) -> StagehandResult<Option<ReleaseId>> {
        let out = self
            .shell
            .run(
                &RemoteCommand::new(format!(
                    "readlink {}",
                    shell_quote(&self.settings.layout.current())
                ))
                .warn_only(),
            )
            .map_err(|e| StagehandError::from_shell(self.host(), e))?;
        if !out.success() {
            return Ok(None);
        }
        let target = out.stdout.trim().trim_end_matches('/');
        let name = target.rsplit('/').next().unwrap_or(target);
        Ok(ReleaseId::parse(name))
    }

    /// Raw entries of the releases directory
    fn release_entries(&self) -> StagehandResult<Vec<String>> {
        let out = self.run(RemoteCommand::new(format!(
            "ls -1 {}",
            shell_quote(&self.settings.layout.releases())
        )))?;
        Ok(out
            .split_whitespace()
            .map(str::to_string)
            .collect())
    }

    /// Releases on the host, oldest first. Entries that are not release ids
    /// are ignored.
    pub fn list_releases(&self) -> StagehandResult<Vec<ReleaseId>> {
        let mut releases: Vec<ReleaseId> = self
            .release_entries()?
            .iter()
            .filter_map(|name| ReleaseId::parse(name))
            .collect();
        releases.sort();
        Ok(releases)
    }

    /// Delete all but the newest `keep` releases.
    ///
    /// The live release is never deleted. A failed deletion is logged and
    /// reported; it does not fail the prune.
    pub fn prune(&self, keep: usize) -> StagehandResult<PruneReport> {
        let entries = self.release_entries()?;
        let current = self.current_release()?;
        let plan = plan_retention(&entries, keep, current.as_ref());

        if let Some(protected) = &plan.protected {
            tracing::info!(host = %self.host(), release = %protected, "keeping live release outside retention window");
        }

        let mut report = PruneReport {
            kept: plan.keep,
            protected: plan.protected,
            ..Default::default()
        };
        for id in plan.remove {
            let path = self.settings.layout.release(&id);
            match self.run(RemoteCommand::new(format!("rm -rf {}", shell_quote(&path)))) {
                Ok(_) => report.removed.push(id),
                Err(e) => {
                    tracing::warn!(host = %self.host(), release = %id, error = %e, "failed to remove release");
                    report.failed.push((id, e.to_string()));
                }
            }
        }
        Ok(report)
    }
}
