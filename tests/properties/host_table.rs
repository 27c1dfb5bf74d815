//! Property tests for the hosts file format.

use proptest::prelude::*;

use stagehand::domain::services::{format_host_table, parse_host_table};
use stagehand::{HostRecord, HostSet};

fn token() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[a-z0-9][a-z0-9.]{0,11}").unwrap()
}

/// Possibly empty, as when an instance lacks a tag or a public address
fn optional_token() -> impl Strategy<Value = String> {
    prop_oneof![Just(String::new()), token()]
}

/// Name tags are free text
fn name() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just("-".to_string()),
        proptest::string::string_regex("[a-z0-9%-][a-z0-9 %\t-]{0,15}").unwrap(),
    ]
}

fn role() -> impl Strategy<Value = String> {
    proptest::sample::select(vec!["app", "worker", "web", "db", "cron"]).prop_map(str::to_string)
}

fn record() -> impl Strategy<Value = HostRecord> {
    (token(), optional_token(), role(), optional_token(), name()).prop_map(
        |(instance, stage, role, host, name)| {
            HostRecord::new(format!("i-{}", instance), stage, role, host).with_name(name)
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 96,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: persisting then loading yields the same set of records.
    #[test]
    fn property_format_then_parse_is_set_equal(records in proptest::collection::vec(record(), 0..12)) {
        // one instance has a single stage, host and name in provider state
        let mut seen: Vec<HostRecord> = Vec::new();
        for r in records {
            if let Some(first) = seen.iter().find(|s| s.instance_id == r.instance_id) {
                let aligned = HostRecord::new(&first.instance_id, &first.stage, r.role, &first.host)
                    .with_name(first.name.clone());
                seen.push(aligned);
            } else {
                seen.push(r);
            }
        }
        let hosts: HostSet = seen.into_iter().collect();

        let text = format_host_table(&hosts);
        let parsed = parse_host_table(&text).unwrap();
        prop_assert_eq!(parsed, hosts);
    }

    /// PROPERTY: parsing arbitrary text never panics.
    #[test]
    fn property_parse_never_panics(content in "(?s).{0,512}") {
        let _ = parse_host_table(&content);
    }

    /// PROPERTY: a row with the wrong column count fails on its own line.
    #[test]
    fn property_bad_column_count_reports_line(
        good_rows in 0usize..5,
        columns in prop_oneof![1usize..4, 6usize..9],
    ) {
        let mut text = String::from("Instance Stage Role Host Name\n----\n");
        for i in 0..good_rows {
            text.push_str(&format!("i-{} staging app h{}.example.com\n", i, i));
        }
        let bad: Vec<String> = (0..columns).map(|c| format!("c{}", c)).collect();
        text.push_str(&bad.join(" "));
        text.push('\n');

        let err = parse_host_table(&text).unwrap_err();
        prop_assert_eq!(err.line, 3 + good_rows);
    }
}
