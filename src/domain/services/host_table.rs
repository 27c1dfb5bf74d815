//! Tabular text form of the host inventory
//!
//! ```text
//! Instance     Stage        Role         Host                   Name
//! --------------------------------------------------------------------------------
//! i-0a1b2c     production   app-worker   ec2-1-2-3-4.compute    galaxy-production-app-worker-i-0a1b2c
//! ```
//!
//! The first two lines are always header and divider and are never parsed.
//! One row per instance; its roles are hyphen-joined.
//!
//! Every row has exactly five whitespace-separated columns when written. An
//! empty value is written as `-`, and whitespace or `%` inside a value is
//! percent-escaped (`web one` becomes `web%20one`), so a value never spills
//! into the next column.

use crate::domain::entities::{HostRecord, HostSet};
use crate::domain::value_objects::{join_roles, split_roles};

const DIVIDER_WIDTH: usize = 80;
const HEADER_LINES: usize = 2;
const EMPTY_COLUMN: &str = "-";

/// Row-level parse failure (1-based line number)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostTableError {
    pub line: usize,
    pub message: String,
}

/// Render the inventory. Records sharing an instance are folded into one
/// row, in first-seen order.
pub fn format_host_table(hosts: &HostSet) -> String {
    let mut rows: Vec<(&HostRecord, Vec<&str>)> = Vec::new();
    for record in hosts.iter() {
        match rows.iter_mut().find(|(first, _)| {
            first.instance_id == record.instance_id
                && first.stage == record.stage
                && first.host == record.host
                && first.name == record.name
        }) {
            Some((_, roles)) => roles.push(&record.role),
            None => rows.push((record, vec![record.role.as_str()])),
        }
    }

    let mut out = format_row("Instance", "Stage", "Role", "Host", "Name");
    out.push_str(&"-".repeat(DIVIDER_WIDTH));
    out.push('\n');
    for (record, roles) in rows {
        out.push_str(&format_row(
            &encode_column(&record.instance_id),
            &encode_column(&record.stage),
            &encode_column(&join_roles(&roles)),
            &encode_column(&record.host),
            &encode_column(&record.name),
        ));
    }
    out
}

fn format_row(instance: &str, stage: &str, role: &str, host: &str, name: &str) -> String {
    format!(
        "{:<10}   {:<10}   {:<10}   {:<20}   {}\n",
        instance, stage, role, host, name
    )
}

/// Escape a value so it occupies exactly one column.
fn encode_column(value: &str) -> String {
    if value.is_empty() {
        return EMPTY_COLUMN.to_string();
    }
    if value == EMPTY_COLUMN {
        return "%2D".to_string();
    }
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if c.is_whitespace() || c == '%' {
            let mut buf = [0u8; 4];
            for byte in c.encode_utf8(&mut buf).bytes() {
                out.push_str(&format!("%{:02X}", byte));
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Inverse of [`encode_column`]. A `%` not followed by two hex digits is
/// kept literally, so hand-written rows still load.
fn decode_column(column: &str) -> String {
    if column == EMPTY_COLUMN {
        return String::new();
    }
    let bytes = column.as_bytes();
    let mut out: Vec<u8> = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let Some(byte) = hex_byte(bytes[i + 1], bytes[i + 2]) {
                out.push(byte);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_byte(high: u8, low: u8) -> Option<u8> {
    let digit = |b: u8| (b as char).to_digit(16);
    Some((digit(high)? * 16 + digit(low)?) as u8)
}

/// Parse the inventory text.
///
/// Skips the two header lines, blank lines and `#` comments. Each remaining
/// row needs 4 columns (`instance stage roles host`) or 5 (plus name).
pub fn parse_host_table(content: &str) -> Result<HostSet, HostTableError> {
    let mut hosts = HostSet::new();
    for (index, line) in content.lines().enumerate() {
        if index < HEADER_LINES {
            continue;
        }
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let columns: Vec<&str> = trimmed.split_whitespace().collect();
        if columns.len() != 4 && columns.len() != 5 {
            return Err(HostTableError {
                line: index + 1,
                message: format!("expected 4 or 5 columns, found {}", columns.len()),
            });
        }

        let roles = split_roles(&decode_column(columns[2]));
        if roles.is_empty() {
            return Err(HostTableError {
                line: index + 1,
                message: "row has no roles".to_string(),
            });
        }

        let instance = decode_column(columns[0]);
        let stage = decode_column(columns[1]);
        let host = decode_column(columns[3]);
        let name = columns.get(4).map(|c| decode_column(c)).unwrap_or_default();
        for role in roles {
            hosts.insert(HostRecord::new(&instance, &stage, role, &host).with_name(&name));
        }
    }
    Ok(hosts)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Instance     Stage        Role         Host                   Name
--------------------------------------------------------------------------------
i-0001       production   app-worker   a.example.com          galaxy-production-app-worker-i-0001
# retired: i-0002 production app b.example.com
i-0003       staging      app          s.example.com

";

    #[test]
    fn parse_expands_roles_and_skips_comments() {
        let hosts = parse_host_table(SAMPLE).unwrap();
        assert_eq!(hosts.len(), 3);
        assert_eq!(hosts.records()[0].role, "app");
        assert_eq!(hosts.records()[1].role, "worker");
        assert_eq!(hosts.records()[2].stage, "staging");
        assert_eq!(hosts.records()[2].name, "");
    }

    #[test]
    fn parse_never_reads_the_first_two_lines() {
        let content = "i-1 production app a.example.com\ni-2 production app b.example.com\n";
        assert!(parse_host_table(content).unwrap().is_empty());
    }

    #[test]
    fn parse_rejects_wrong_column_count_with_line_number() {
        let content = "header\n-----\ni-1 production app a.example.com\ni-2 production\n";
        let err = parse_host_table(content).unwrap_err();
        assert_eq!(err.line, 4);
        assert!(err.message.contains("found 2"));
    }

    #[test]
    fn parse_accepts_comma_joined_roles() {
        let content = "header\n-----\ni-1 production app,worker a.example.com\n";
        let hosts = parse_host_table(content).unwrap();
        assert_eq!(hosts.len(), 2);
    }

    #[test]
    fn format_folds_roles_per_instance() {
        let hosts: HostSet = vec![
            HostRecord::new("i-1", "production", "app", "a.example.com").with_name("web one"),
            HostRecord::new("i-1", "production", "worker", "a.example.com").with_name("web one"),
        ]
        .into_iter()
        .collect();

        let table = format_host_table(&hosts);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "-".repeat(80));
        assert!(lines[2].contains("app-worker"));
        assert!(lines[2].ends_with("web%20one"));
    }

    #[test]
    fn empty_columns_are_written_as_dash_and_read_back_empty() {
        let hosts: HostSet = vec![
            HostRecord::new("i-1", "staging", "app", "").with_name("web"),
            HostRecord::new("i-2", "", "app", "a.example.com"),
        ]
        .into_iter()
        .collect();

        let table = format_host_table(&hosts);
        for row in table.lines().skip(2) {
            assert_eq!(row.split_whitespace().count(), 5, "row: {row}");
        }

        let parsed = parse_host_table(&table).unwrap();
        assert_eq!(parsed, hosts);
        let unreachable = parsed.iter().find(|r| r.instance_id == "i-1").unwrap();
        assert_eq!(unreachable.host, "");
        assert_eq!(unreachable.name, "web");
    }

    #[test]
    fn names_with_spaces_survive_unchanged() {
        let hosts: HostSet = vec![
            HostRecord::new("i-1", "staging", "app", "a.example.com").with_name("staging app"),
            HostRecord::new("i-2", "staging", "app", "b.example.com").with_name("50% done\tnow"),
            HostRecord::new("i-3", "staging", "app", "c.example.com").with_name("-"),
        ]
        .into_iter()
        .collect();

        assert_eq!(parse_host_table(&format_host_table(&hosts)).unwrap(), hosts);
    }

    #[test]
    fn stray_percent_in_hand_written_row_is_literal() {
        let content = "header\n-----\ni-1 staging app a.example.com 100%\n";
        let hosts = parse_host_table(content).unwrap();
        assert_eq!(hosts.records()[0].name, "100%");
    }

    #[test]
    fn format_then_parse_round_trips() {
        let hosts: HostSet = vec![
            HostRecord::new("i-1", "production", "app", "a.example.com").with_name("galaxy-a"),
            HostRecord::new("i-1", "production", "worker", "a.example.com").with_name("galaxy-a"),
            HostRecord::new("i-2", "staging", "app", "b.example.com"),
        ]
        .into_iter()
        .collect();

        let parsed = parse_host_table(&format_host_table(&hosts)).unwrap();
        assert_eq!(parsed, hosts);
    }
}
