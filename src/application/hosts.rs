//! Host Registry Use Case
//!
//! Refreshes the inventory from the provider, persists it, and compares the
//! persisted file against live state.

use std::collections::BTreeMap;

use similar::TextDiff;

use crate::domain::entities::{DeployTarget, HostRecord, HostSet};
use crate::domain::ports::{HostFileError, HostRepository, InventoryProvider};
use crate::domain::services::format_host_table;
use crate::error::{StagehandError, StagehandResult};

/// Persisted vs live inventory
#[derive(Debug, Clone, PartialEq)]
pub struct HostDiff {
    pub persisted: HostSet,
    pub refreshed: HostSet,
    /// Unified diff of the two rendered tables; empty when unchanged
    pub unified: String,
}

impl HostDiff {
    pub fn is_unchanged(&self) -> bool {
        self.persisted == self.refreshed
    }
}

/// Unified line diff of two rendered host tables
pub fn diff_host_tables(persisted: &HostSet, refreshed: &HostSet) -> String {
    if persisted == refreshed {
        return String::new();
    }
    let old = format_host_table(persisted);
    let new = format_host_table(refreshed);
    TextDiff::from_lines(&old, &new)
        .unified_diff()
        .context_radius(2)
        .header("hosts (persisted)", "hosts (provider)")
        .to_string()
}

pub struct HostRegistry<R, P>
where
    R: HostRepository,
    P: InventoryProvider,
{
    repository: R,
    provider: P,
    project: String,
}

impl<R, P> HostRegistry<R, P>
where
    R: HostRepository,
    P: InventoryProvider,
{
    pub fn new(repository: R, provider: P, project: impl Into<String>) -> Self {
        Self {
            repository,
            provider,
            project: project.into(),
        }
    }

    /// Live inventory: running instances of the project, one record per role.
    pub fn refresh(&self) -> StagehandResult<HostSet> {
        let instances = self.provider.instances(&self.project)?;
        let hosts = HostSet::from_instances(&instances, &self.project);
        tracing::info!(
            project = %self.project,
            instances = instances.len(),
            records = hosts.len(),
            "inventory refreshed"
        );
        Ok(hosts)
    }

    pub fn load(&self) -> StagehandResult<HostSet> {
        Ok(self.repository.load()?)
    }

    pub fn persist(&self, hosts: &HostSet) -> StagehandResult<()> {
        self.repository.persist(hosts)?;
        Ok(())
    }

    /// Refresh and, unless `dry_run`, replace the persisted file.
    ///
    /// A persisted file that no longer parses is compared as empty and
    /// overwritten, since the inventory is rebuilt from the provider anyway.
    pub fn refresh_and_persist(&self, dry_run: bool) -> StagehandResult<HostDiff> {
        let (persisted, malformed) = match self.repository.load() {
            Ok(hosts) => (hosts, false),
            Err(HostFileError::Malformed {
                path,
                line,
                message,
            }) => {
                tracing::warn!(
                    file = %path.display(),
                    line,
                    reason = %message,
                    "hosts file is malformed; replacing it with the provider inventory"
                );
                (HostSet::new(), true)
            }
            Err(err) => return Err(err.into()),
        };
        let diff = self.compare(persisted)?;
        if !dry_run && (malformed || !diff.is_unchanged()) {
            self.persist(&diff.refreshed)?;
        }
        Ok(diff)
    }

    pub fn diff(&self) -> StagehandResult<HostDiff> {
        let persisted = self.load()?;
        self.compare(persisted)
    }

    fn compare(&self, persisted: HostSet) -> StagehandResult<HostDiff> {
        let refreshed = self.refresh()?;
        let unified = diff_host_tables(&persisted, &refreshed);
        Ok(HostDiff {
            persisted,
            refreshed,
            unified,
        })
    }

    pub fn select(&self, stage: Option<&str>, role: Option<&str>) -> StagehandResult<Vec<HostRecord>> {
        Ok(self.load()?.select(stage, role))
    }

    /// Role name to host addresses for one stage.
    pub fn roles(&self, stage: &str) -> StagehandResult<BTreeMap<String, Vec<String>>> {
        Ok(self.load()?.roles(stage))
    }

    /// Machines to act on for a stage.
    ///
    /// `host` narrows the selection to one address; an address that is not
    /// in the stage's inventory is rejected rather than contacted blindly.
    pub fn targets(
        &self,
        stage: &str,
        role: Option<&str>,
        host: Option<&str>,
    ) -> StagehandResult<Vec<DeployTarget>> {
        let hosts = self.load()?;
        let unreachable = hosts.unreachable(stage);
        if !unreachable.is_empty() {
            tracing::warn!(
                stage = %stage,
                instances = %unreachable.join(", "),
                "skipping instances with no public address"
            );
        }
        let mut targets = hosts.targets(stage, role);
        if let Some(host) = host {
            targets.retain(|t| t.host == host || t.instance_id == host);
            if targets.is_empty() {
                return Err(StagehandError::parse(
                    "host selection",
                    None,
                    format!("{} is not a {} host", host, stage),
                ));
            }
        }
        Ok(targets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::InventoryInstance;
    use std::collections::BTreeMap;
    use std::path::PathBuf;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryRepository {
        stored: Mutex<Option<HostSet>>,
        /// Loads fail as a corrupt file until the next persist
        corrupt: Mutex<bool>,
    }

    impl MemoryRepository {
        fn corrupt() -> Self {
            Self {
                stored: Mutex::new(None),
                corrupt: Mutex::new(true),
            }
        }
    }

    impl HostRepository for MemoryRepository {
        fn load(&self) -> Result<HostSet, HostFileError> {
            if *self.corrupt.lock().unwrap() {
                return Err(HostFileError::Malformed {
                    path: PathBuf::from("deploy/hosts.txt"),
                    line: 3,
                    message: "expected 4 or 5 columns, found 2".to_string(),
                });
            }
            Ok(self.stored.lock().unwrap().clone().unwrap_or_default())
        }

        fn persist(&self, hosts: &HostSet) -> Result<(), HostFileError> {
            *self.stored.lock().unwrap() = Some(hosts.clone());
            *self.corrupt.lock().unwrap() = false;
            Ok(())
        }
    }

    struct FixedProvider(StagehandResult<Vec<InventoryInstance>>);

    impl InventoryProvider for FixedProvider {
        fn instances(&self, _project: &str) -> StagehandResult<Vec<InventoryInstance>> {
            match &self.0 {
                Ok(list) => Ok(list.clone()),
                Err(_) => Err(StagehandError::ProviderUnavailable {
                    message: "throttled".to_string(),
                }),
            }
        }
    }

    fn instance(id: &str, stage: &str, role: &str, state: &str) -> InventoryInstance {
        let mut tags = BTreeMap::new();
        tags.insert("Project".to_string(), "galaxy".to_string());
        tags.insert("Stage".to_string(), stage.to_string());
        tags.insert("Role".to_string(), role.to_string());
        InventoryInstance {
            instance_id: id.to_string(),
            state: state.to_string(),
            public_dns: format!("{}.example.com", id),
            tags,
        }
    }

    fn registry(
        instances: Vec<InventoryInstance>,
    ) -> HostRegistry<MemoryRepository, FixedProvider> {
        HostRegistry::new(
            MemoryRepository::default(),
            FixedProvider(Ok(instances)),
            "galaxy",
        )
    }

    #[test]
    fn refresh_expands_roles_and_drops_stopped() {
        let reg = registry(vec![
            instance("i-1", "staging", "app-worker", "running"),
            instance("i-2", "staging", "app", "stopped"),
        ]);
        let hosts = reg.refresh().unwrap();
        assert_eq!(hosts.len(), 2);
        assert!(hosts.iter().all(|r| r.instance_id == "i-1"));
    }

    #[test]
    fn refresh_failure_is_provider_unavailable() {
        let reg = HostRegistry::new(
            MemoryRepository::default(),
            FixedProvider(Err(StagehandError::ProviderUnavailable {
                message: String::new(),
            })),
            "galaxy",
        );
        assert!(matches!(
            reg.refresh().unwrap_err(),
            StagehandError::ProviderUnavailable { .. }
        ));
    }

    #[test]
    fn dry_run_does_not_persist() {
        let reg = registry(vec![instance("i-1", "staging", "app", "running")]);
        let diff = reg.refresh_and_persist(true).unwrap();
        assert!(!diff.is_unchanged());
        assert!(diff.unified.contains("+i-1"));
        assert!(reg.load().unwrap().is_empty());
    }

    #[test]
    fn refresh_persists_and_then_is_unchanged() {
        let reg = registry(vec![instance("i-1", "staging", "app", "running")]);
        reg.refresh_and_persist(false).unwrap();
        assert_eq!(reg.load().unwrap().len(), 1);

        let diff = reg.diff().unwrap();
        assert!(diff.is_unchanged());
        assert!(diff.unified.is_empty());
    }

    #[test]
    fn refresh_replaces_malformed_file() {
        let reg = HostRegistry::new(
            MemoryRepository::corrupt(),
            FixedProvider(Ok(vec![instance("i-1", "staging", "app", "running")])),
            "galaxy",
        );
        assert!(reg.load().is_err());
        assert!(reg.diff().is_err());

        let diff = reg.refresh_and_persist(false).unwrap();
        assert!(diff.persisted.is_empty());
        assert_eq!(reg.load().unwrap().len(), 1);
    }

    #[test]
    fn refresh_replaces_malformed_file_even_when_provider_is_empty() {
        let reg = HostRegistry::new(MemoryRepository::corrupt(), FixedProvider(Ok(Vec::new())), "galaxy");
        reg.refresh_and_persist(false).unwrap();
        assert!(reg.load().unwrap().is_empty());
    }

    #[test]
    fn dry_run_leaves_malformed_file_alone() {
        let reg = HostRegistry::new(
            MemoryRepository::corrupt(),
            FixedProvider(Ok(vec![instance("i-1", "staging", "app", "running")])),
            "galaxy",
        );
        reg.refresh_and_persist(true).unwrap();
        assert!(reg.load().is_err());
    }

    #[test]
    fn targets_filter_by_host() {
        let reg = registry(vec![
            instance("i-1", "staging", "app", "running"),
            instance("i-2", "staging", "worker", "running"),
        ]);
        reg.refresh_and_persist(false).unwrap();

        let all = reg.targets("staging", None, None).unwrap();
        assert_eq!(all.len(), 2);

        let one = reg.targets("staging", None, Some("i-2.example.com")).unwrap();
        assert_eq!(one.len(), 1);
        assert!(one[0].has_role("worker"));

        assert!(reg.targets("staging", None, Some("elsewhere")).is_err());
    }

    #[test]
    fn select_filters_persisted_records() {
        let reg = registry(vec![
            instance("i-1", "staging", "app-worker", "running"),
            instance("i-2", "production", "app", "running"),
        ]);
        reg.refresh_and_persist(false).unwrap();

        assert_eq!(reg.select(Some("staging"), None).unwrap().len(), 2);
        assert_eq!(reg.select(None, Some("app")).unwrap().len(), 2);
        assert_eq!(reg.select(Some("production"), Some("worker")).unwrap().len(), 0);
    }
}
