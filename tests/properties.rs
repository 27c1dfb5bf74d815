//! Property tests for Stagehand.
//!
//! Properties use randomized input generation to explore edge cases and
//! protect invariants like "never panics" and "round-trips".
//!
//! Run with: `cargo test --test properties`

#[path = "properties/host_table.rs"]
mod host_table;

#[path = "properties/retention.rs"]
mod retention;
