//! Use Case Factory
//!
//! Creates use cases with infrastructure dependencies wired up.
//! This is the dependency injection point for the application.

use std::sync::Arc;

use crate::application::{
    DeployPipeline, HostRegistry, ReleaseSettings, RenderUseCase, ServiceSettings,
};
use crate::config::Config;
use crate::domain::ports::{DeployEventSink, ShellConnector};
use crate::infrastructure::{
    AwsCliInventory, JsonEventSink, LogEventSink, LocalShell, SshConnector, SshSettings,
    TextHostRepository, YamlEnvironmentRepository,
};

/// Type alias for the registry backed by the hosts file and the AWS CLI
pub type ConcreteHostRegistry = HostRegistry<TextHostRepository, AwsCliInventory>;

/// Type alias for the renderer backed by YAML environment files
pub type ConcreteRenderUseCase = RenderUseCase<YamlEnvironmentRepository>;

pub fn create_host_registry(config: &Config) -> ConcreteHostRegistry {
    HostRegistry::new(
        TextHostRepository::new(config.hosts_file()),
        AwsCliInventory::from_config(config),
        config.project.name.clone(),
    )
}

pub fn create_render_use_case(config: &Config) -> ConcreteRenderUseCase {
    RenderUseCase::new(
        config.template_file(),
        YamlEnvironmentRepository::new(config.environments_dir()),
    )
}

pub fn create_connector(config: &Config) -> SshConnector {
    SshConnector::new(SshSettings::from_config(config))
}

/// Shell for commands that run on this machine (git on the local checkout)
pub fn create_local_shell(config: &Config) -> LocalShell {
    LocalShell::new("localhost").with_timeout(config.remote_timeout())
}

/// NDJSON on stdout for `--json`, `tracing` lines otherwise
pub fn create_event_sink(json: bool) -> Arc<dyn DeployEventSink> {
    if json {
        Arc::new(JsonEventSink::stdout())
    } else {
        Arc::new(LogEventSink)
    }
}

/// Deploy pipeline over `connector`, reporting to `events`.
pub fn create_deploy_pipeline<'a>(
    config: &Config,
    connector: &'a dyn ShellConnector,
    events: Arc<dyn DeployEventSink>,
) -> DeployPipeline<'a> {
    DeployPipeline::new(
        connector,
        ReleaseSettings::from_config(config),
        ServiceSettings::from_config(config),
    )
    .with_events(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn registry_reads_hosts_file_relative_to_config() {
        let config = Config {
            base_dir: PathBuf::from("/srv/galaxy"),
            ..Config::default()
        };
        let registry = create_host_registry(&config);
        // empty inventory when the file is missing
        assert!(registry.load().unwrap().is_empty());
    }
}
