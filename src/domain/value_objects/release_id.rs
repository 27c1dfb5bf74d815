//! Release Identifier Value Object
//!
//! A release is named after the UTC second it was created in, formatted as
//! `YYYYMMDDHHMMSS`. The width is fixed, so sorting names as strings sorts
//! releases from oldest to newest.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};

/// Timestamp-derived release name
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReleaseId(String);

impl ReleaseId {
    /// Number of digits in every release name
    pub const WIDTH: usize = 14;

    const FORMAT: &'static str = "%Y%m%d%H%M%S";

    /// Derive the identifier for a release created at `now` (seconds resolution).
    pub fn from_datetime(now: DateTime<Utc>) -> Self {
        Self(now.format(Self::FORMAT).to_string())
    }

    /// Parse a directory name. Returns `None` for anything that is not a
    /// release created by this tool (wrong width, non-digits, impossible date).
    pub fn parse(name: &str) -> Option<Self> {
        if name.len() != Self::WIDTH || !name.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        NaiveDateTime::parse_from_str(name, Self::FORMAT).ok()?;
        Some(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Creation time encoded in the name
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        NaiveDateTime::parse_from_str(&self.0, Self::FORMAT)
            .ok()
            .map(|naive| naive.and_utc())
    }
}

impl fmt::Display for ReleaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ReleaseId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| {
            format!(
                "invalid release '{}': expected {} digits (YYYYMMDDHHMMSS)",
                s,
                Self::WIDTH
            )
        })
    }
}
