//! Application Service Lifecycle
//!
//! Controls the process manager and the web server on app hosts. Web server
//! steps tolerate an already-stopped or missing service; the process manager
//! is what has to succeed.

use crate::config::Config;
use crate::domain::ports::{shell_quote, CommandOutput, RemoteCommand, RemoteShell};
use crate::error::{StagehandError, StagehandResult};

use super::release::RestartMode;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceSettings {
    pub app_root: String,
    pub process_manager: String,
    pub process_config: String,
    pub web_server: Option<String>,
    pub web_server_pid: String,
    pub sudo: bool,
}

impl ServiceSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            app_root: config.app_root(),
            process_manager: config.services.process_manager.clone(),
            process_config: config.services.process_config.clone(),
            web_server: config
                .services
                .web_server
                .clone()
                .filter(|w| !w.trim().is_empty()),
            web_server_pid: config.services.web_server_pid.clone(),
            sudo: config.services.sudo,
        }
    }
}

/// Where the web server's virtual host for the project lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualHost {
    pub available: String,
    pub enabled: String,
}

impl VirtualHost {
    pub fn from_config(config: &Config) -> Self {
        let dir = config.services.vhost_dir.trim_end_matches('/');
        Self {
            available: format!("{}/sites-available/{}", dir, config.project.name),
            enabled: format!("{}/sites-enabled/{}", dir, config.project.name),
        }
    }

    /// Upload location before the root-owned install
    fn staging(&self) -> String {
        let name = self.available.rsplit('/').next().unwrap_or("site");
        format!("/tmp/stagehand-vhost-{}", name)
    }
}

/// Lifecycle actions exposed by `app <action>`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceAction {
    Status,
    Start,
    Stop,
    Restart,
    ForceRestart,
}

pub struct AppServices<'a> {
    shell: &'a dyn RemoteShell,
    settings: &'a ServiceSettings,
}

impl<'a> AppServices<'a> {
    pub fn new(shell: &'a dyn RemoteShell, settings: &'a ServiceSettings) -> Self {
        Self { shell, settings }
    }

    fn sudo(&self, script: String) -> String {
        if self.settings.sudo {
            format!("sudo -n {}", script)
        } else {
            script
        }
    }

    fn service(&self, verb: &str) -> Option<String> {
        self.settings
            .web_server
            .as_ref()
            .map(|name| self.sudo(format!("service {} {}", shell_quote(name), verb)))
    }

    fn process_manager(&self, verb: &str) -> RemoteCommand {
        RemoteCommand::new(format!(
            "{} {} {}",
            self.settings.process_manager,
            verb,
            shell_quote(&self.settings.process_config)
        ))
        .in_dir(self.settings.app_root.clone())
    }

    fn run(&self, command: RemoteCommand) -> StagehandResult<CommandOutput> {
        self.shell
            .run(&command)
            .map_err(|e| StagehandError::from_shell(self.shell.target(), e))
    }

    pub fn status(&self) -> StagehandResult<String> {
        Ok(self.run(self.process_manager("status"))?.stdout)
    }

    pub fn stop(&self) -> StagehandResult<()> {
        if let Some(stop) = self.service("stop") {
            self.run(RemoteCommand::new(format!("{} || echo 'Error stopping.'", stop)))?;
        }
        self.run(self.process_manager("delete"))?;
        Ok(())
    }

    /// Start both services; failures are reported but tolerated.
    pub fn start(&self) -> StagehandResult<()> {
        if let Some(start) = self.service("start") {
            self.warn_on_failure(self.run(RemoteCommand::new(start).warn_only())?);
        }
        self.warn_on_failure(self.run(self.process_manager("startOrRestart").warn_only())?);
        Ok(())
    }

    pub fn force_restart(&self) -> StagehandResult<()> {
        if let (Some(restart), Some(start)) = (self.service("restart"), self.service("start")) {
            self.run(RemoteCommand::new(format!("{} || {}", restart, start)))?;
        }
        self.run(self.process_manager("startOrRestart"))?;
        Ok(())
    }

    /// HUP the web server and reload the process manager without dropping
    /// connections.
    pub fn graceful_restart(&self) -> StagehandResult<()> {
        if let Some(start) = self.service("start") {
            let hup = self.sudo(format!(
                "kill -HUP $(cat {})",
                shell_quote(&self.settings.web_server_pid)
            ));
            self.run(RemoteCommand::new(format!("{} || {}", hup, start)))?;
        }
        self.run(self.process_manager("startOrReload"))?;
        Ok(())
    }

    pub fn restart(&self, mode: RestartMode) -> StagehandResult<()> {
        match mode {
            RestartMode::Graceful => self.graceful_restart(),
            RestartMode::Full => {
                self.stop()?;
                self.start()
            }
        }
    }

    /// Install `content` as the project's virtual host, enable it, and
    /// reload the web server. A failed reload is reported, not fatal.
    pub fn install_virtual_host(&self, vhost: &VirtualHost, content: &[u8]) -> StagehandResult<()> {
        let Some(reload) = self.service("reload") else {
            return Err(StagehandError::InvalidConfig {
                file: "services.web_server".into(),
                message: "no web server configured to install a virtual host into".to_string(),
            });
        };

        let staging = vhost.staging();
        self.shell
            .upload(&staging, content)
            .map_err(|e| StagehandError::from_shell(self.shell.target(), e))?;
        self.run(RemoteCommand::new(self.sudo(format!(
            "install -m 644 {} {}",
            shell_quote(&staging),
            shell_quote(&vhost.available)
        ))))?;
        self.run(RemoteCommand::new(format!("rm -f {}", shell_quote(&staging))))?;
        self.run(RemoteCommand::new(self.sudo(format!(
            "ln -sfn {} {}",
            shell_quote(&vhost.available),
            shell_quote(&vhost.enabled)
        ))))?;
        self.run(RemoteCommand::new(format!("{} || echo 'Error reloading.'", reload)))?;
        tracing::info!(host = %self.shell.target(), path = %vhost.available, "virtual host installed");
        Ok(())
    }

    /// Run an `app` command; only `Status` produces output.
    pub fn apply(&self, action: ServiceAction) -> StagehandResult<Option<String>> {
        match action {
            ServiceAction::Status => self.status().map(Some),
            ServiceAction::Start => self.start().map(|_| None),
            ServiceAction::Stop => self.stop().map(|_| None),
            ServiceAction::Restart => self.graceful_restart().map(|_| None),
            ServiceAction::ForceRestart => self.force_restart().map(|_| None),
        }
    }

    fn warn_on_failure(&self, output: CommandOutput) {
        if !output.success() {
            tracing::warn!(
                host = %self.shell.target(),
                status = output.status,
                stderr = %output.stderr.trim(),
                "service command failed"
            );
        }
    }
}
