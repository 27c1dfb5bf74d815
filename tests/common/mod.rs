//! Common test utilities for Stagehand CLI tests.
//!
//! This module provides:
//! - `TestEnv`: Isolated project directory plus helpers to run the binary
//! - Assertion macros: `assert_output_contains!`
//! - Fixtures: Reusable test content constants

#![allow(dead_code)]

pub mod env;
pub mod fixtures;

pub use env::*;
pub use fixtures::*;

/// Assert that stdout or stderr contains a substring.
#[macro_export]
macro_rules! assert_output_contains {
    ($result:expr, $needle:expr) => {
        let combined = $result.combined_output();
        assert!(
            combined.contains($needle),
            "Expected output to contain '{}'.\nstdout:\n{}\nstderr:\n{}",
            $needle,
            $result.stdout,
            $result.stderr
        );
    };
}
