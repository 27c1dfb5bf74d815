//! Pipeline Stage Value Object

use std::fmt;

/// Steps of a deploy, in execution order.
///
/// Each variant names the state a host is in once the step finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PipelineStage {
    /// Cached copy updated from the remote repository
    Fetching,
    /// Release directory materialized (not yet live)
    Released,
    /// Build step succeeded inside the release
    Built,
    /// `current` points at the release
    Promoted,
    /// Schema and data migrations applied
    Migrated,
    /// Services restarted on the new release
    Restarted,
    /// Old releases removed
    Pruned,
}

impl PipelineStage {
    pub const ALL: [PipelineStage; 7] = [
        PipelineStage::Fetching,
        PipelineStage::Released,
        PipelineStage::Built,
        PipelineStage::Promoted,
        PipelineStage::Migrated,
        PipelineStage::Restarted,
        PipelineStage::Pruned,
    ];

    /// Short verb used in logs and JSON events
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Fetching => "fetch",
            PipelineStage::Released => "release",
            PipelineStage::Built => "build",
            PipelineStage::Promoted => "promote",
            PipelineStage::Migrated => "migrate",
            PipelineStage::Restarted => "restart",
            PipelineStage::Pruned => "prune",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_is_in_execution_order() {
        let mut sorted = PipelineStage::ALL;
        sorted.sort();
        assert_eq!(sorted, PipelineStage::ALL);
        assert_eq!(PipelineStage::ALL[0], PipelineStage::Fetching);
        assert_eq!(PipelineStage::ALL[6], PipelineStage::Pruned);
    }

    #[test]
    fn display_uses_verbs() {
        assert_eq!(PipelineStage::Built.to_string(), "build");
        assert_eq!(PipelineStage::Migrated.to_string(), "migrate");
    }
}
