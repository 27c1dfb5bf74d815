//! Host inventory entities
//!
//! The registry is a derived view of the cloud provider's live state. It is
//! rebuilt wholesale on refresh and never patched record by record.

use std::collections::{BTreeMap, HashSet};

use crate::domain::value_objects::split_roles;

/// One (instance, role) pair from the inventory
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HostRecord {
    pub instance_id: String,
    pub stage: String,
    pub role: String,
    /// Address used to reach the host over SSH
    pub host: String,
    /// Value of the instance's `Name` tag (may be empty)
    pub name: String,
}

impl HostRecord {
    pub fn new(
        instance_id: impl Into<String>,
        stage: impl Into<String>,
        role: impl Into<String>,
        host: impl Into<String>,
    ) -> Self {
        Self {
            instance_id: instance_id.into(),
            stage: stage.into(),
            role: role.into(),
            host: host.into(),
            name: String::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    fn key(&self) -> (&str, &str) {
        (&self.instance_id, &self.role)
    }
}

/// A machine as reported by the inventory provider, before role expansion
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InventoryInstance {
    pub instance_id: String,
    /// Provider state name (`running`, `stopped`, ...)
    pub state: String,
    pub public_dns: String,
    pub tags: BTreeMap<String, String>,
}

impl InventoryInstance {
    pub fn tag(&self, key: &str) -> &str {
        self.tags.get(key).map(String::as_str).unwrap_or("")
    }

    pub fn is_running(&self) -> bool {
        self.state == "running"
    }
}

/// A deployable machine: one address with every role it serves
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployTarget {
    pub host: String,
    pub instance_id: String,
    pub stage: String,
    pub roles: Vec<String>,
}

impl DeployTarget {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

/// Ordered set of host records, unique on `(instance_id, role)`
#[derive(Debug, Clone, Default)]
pub struct HostSet {
    records: Vec<HostRecord>,
}

impl HostSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the registry from provider state.
    ///
    /// Keeps running instances tagged with `project` and expands each
    /// instance's role tag into one record per role.
    pub fn from_instances(instances: &[InventoryInstance], project: &str) -> Self {
        let mut set = HostSet::new();
        for instance in instances {
            if instance.tag("Project") != project || !instance.is_running() {
                continue;
            }
            for role in split_roles(instance.tag("Role")) {
                set.insert(
                    HostRecord::new(
                        instance.instance_id.clone(),
                        instance.tag("Stage"),
                        role,
                        instance.public_dns.clone(),
                    )
                    .with_name(instance.tag("Name")),
                );
            }
        }
        set
    }

    /// Insert a record, replacing any existing record with the same
    /// `(instance_id, role)` in place.
    pub fn insert(&mut self, record: HostRecord) {
        if let Some(existing) = self.records.iter_mut().find(|r| r.key() == record.key()) {
            *existing = record;
        } else {
            self.records.push(record);
        }
    }

    /// Records matching the optional filters, in insertion order.
    pub fn select(&self, stage: Option<&str>, role: Option<&str>) -> Vec<HostRecord> {
        self.records
            .iter()
            .filter(|r| stage.map_or(true, |s| r.stage == s))
            .filter(|r| role.map_or(true, |ro| r.role == ro))
            .cloned()
            .collect()
    }

    /// Role name → host addresses for a stage, in insertion order.
    pub fn roles(&self, stage: &str) -> BTreeMap<String, Vec<String>> {
        let mut roles: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for record in self.records.iter().filter(|r| r.stage == stage) {
            let hosts = roles.entry(record.role.clone()).or_default();
            if !hosts.contains(&record.host) {
                hosts.push(record.host.clone());
            }
        }
        roles
    }

    /// Distinct machines for a stage (optionally restricted to a role),
    /// each carrying all of its roles within the stage. Records without an
    /// address cannot be reached and are left out.
    pub fn targets(&self, stage: &str, role: Option<&str>) -> Vec<DeployTarget> {
        let mut targets: Vec<DeployTarget> = Vec::new();
        for record in self
            .records
            .iter()
            .filter(|r| r.stage == stage && !r.host.is_empty())
        {
            match targets.iter_mut().find(|t| t.host == record.host) {
                Some(target) => {
                    if !target.has_role(&record.role) {
                        target.roles.push(record.role.clone());
                    }
                }
                None => targets.push(DeployTarget {
                    host: record.host.clone(),
                    instance_id: record.instance_id.clone(),
                    stage: record.stage.clone(),
                    roles: vec![record.role.clone()],
                }),
            }
        }
        if let Some(role) = role {
            targets.retain(|t| t.has_role(role));
        }
        targets
    }

    /// Instances of a stage that have no address to deploy to.
    pub fn unreachable(&self, stage: &str) -> Vec<&str> {
        let mut ids: Vec<&str> = Vec::new();
        for record in self.records.iter().filter(|r| r.stage == stage && r.host.is_empty()) {
            if !ids.contains(&record.instance_id.as_str()) {
                ids.push(&record.instance_id);
            }
        }
        ids
    }

    pub fn records(&self) -> &[HostRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HostRecord> {
        self.records.iter()
    }
}

/// Set equality: order-insensitive over all fields.
impl PartialEq for HostSet {
    fn eq(&self, other: &Self) -> bool {
        let ours: HashSet<&HostRecord> = self.records.iter().collect();
        let theirs: HashSet<&HostRecord> = other.records.iter().collect();
        ours == theirs
    }
}

impl Eq for HostSet {}

impl FromIterator<HostRecord> for HostSet {
    fn from_iter<T: IntoIterator<Item = HostRecord>>(iter: T) -> Self {
        let mut set = HostSet::new();
        for record in iter {
            set.insert(record);
        }
        set
    }
}

impl IntoIterator for HostSet {
    type Item = HostRecord;
    type IntoIter = std::vec::IntoIter<HostRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}
