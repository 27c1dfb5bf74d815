//! Release retention
//!
//! Decides which release directories survive a prune. Pure: the release
//! manager lists and deletes, this module only sorts and splits.

use crate::domain::value_objects::ReleaseId;

/// Outcome of applying a retention window to a release listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetentionPlan {
    /// Newest releases inside the window, oldest first
    pub keep: Vec<ReleaseId>,
    /// Releases outside the window, oldest first
    pub remove: Vec<ReleaseId>,
    /// Release outside the window that `current` still points at
    pub protected: Option<ReleaseId>,
    /// Directory entries that are not releases
    pub ignored: Vec<String>,
}

/// Keep the `keep` most recent releases.
///
/// Names sort lexicographically; `ReleaseId` is fixed-width so that is also
/// creation order. The live release is never scheduled for removal.
pub fn plan_retention<S: AsRef<str>>(
    names: &[S],
    keep: usize,
    current: Option<&ReleaseId>,
) -> RetentionPlan {
    let mut plan = RetentionPlan::default();
    let mut releases: Vec<ReleaseId> = Vec::new();
    for name in names {
        let name = name.as_ref().trim();
        if name.is_empty() {
            continue;
        }
        match ReleaseId::parse(name) {
            Some(id) => releases.push(id),
            None => plan.ignored.push(name.to_string()),
        }
    }
    releases.sort();
    releases.dedup();

    let split = releases.len().saturating_sub(keep);
    plan.keep = releases.split_off(split);
    for id in releases {
        if Some(&id) == current {
            plan.protected = Some(id);
        } else {
            plan.remove.push(id);
        }
    }
    plan
}
