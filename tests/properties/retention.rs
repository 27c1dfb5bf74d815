//! Property tests for release retention.

use proptest::prelude::*;

use stagehand::domain::services::plan_retention;
use stagehand::ReleaseId;

fn release_name() -> impl Strategy<Value = String> {
    (2015u32..2030, 1u32..13, 1u32..29, 0u32..24, 0u32..60, 0u32..60).prop_map(
        |(y, mo, d, h, mi, s)| format!("{:04}{:02}{:02}{:02}{:02}{:02}", y, mo, d, h, mi, s),
    )
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: keep + remove + protected partitions the distinct releases,
    /// and everything kept is newer than everything removed.
    #[test]
    fn property_retention_partitions_releases(
        names in proptest::collection::vec(release_name(), 0..20),
        keep in 0usize..8,
        current_index in proptest::option::of(0usize..20),
    ) {
        let mut distinct: Vec<ReleaseId> = names.iter().filter_map(|n| ReleaseId::parse(n)).collect();
        distinct.sort();
        distinct.dedup();

        let current = current_index.and_then(|i| distinct.get(i).cloned());
        let plan = plan_retention(&names, keep, current.as_ref());

        prop_assert_eq!(plan.keep.len(), keep.min(distinct.len()));
        let protected = usize::from(plan.protected.is_some());
        prop_assert_eq!(plan.keep.len() + plan.remove.len() + protected, distinct.len());

        if let (Some(oldest_kept), Some(newest_removed)) = (plan.keep.first(), plan.remove.last()) {
            prop_assert!(newest_removed < oldest_kept);
        }
        if let Some(current) = &current {
            prop_assert!(!plan.remove.contains(current));
        }
    }

    /// PROPERTY: names that are not release ids are never scheduled for removal.
    #[test]
    fn property_foreign_entries_are_ignored(
        names in proptest::collection::vec(release_name(), 0..6),
        foreign in proptest::collection::vec("[a-z]{1,8}", 0..4),
    ) {
        let mut all = names.clone();
        all.extend(foreign.iter().cloned());
        let plan = plan_retention(&all, 0, None);
        prop_assert_eq!(plan.ignored.len(), foreign.len());
        for entry in &foreign {
            prop_assert!(!plan.remove.iter().any(|id| id.as_str() == entry));
        }
    }
}
