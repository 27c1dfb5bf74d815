//! Event Sink Implementations
//!
//! Provides concrete implementations of DeployEventSink:
//! - JsonEventSink: NDJSON output for CI/automation
//! - LogEventSink: `tracing` output for humans

mod json;
mod log;

pub use json::{event_json, JsonEventSink};
pub use log::LogEventSink;
