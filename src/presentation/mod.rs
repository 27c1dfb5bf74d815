//! Presentation Layer
//!
//! This layer handles:
//! - CLI argument parsing (via clap)
//! - Creating use cases with infrastructure dependencies
//! - Output formatting (text/JSON)
//!
//! ## Structure
//!
//! - `cli` - Command line definition
//! - `factory` - Creates use cases with proper dependencies (dependency injection)
//! - `output` - Output rendering

pub mod cli;
pub mod factory;
pub mod output;

pub use cli::{
    AppAction, BranchCommand, Cli, Commands, EnvCommand, HostFilter, HostsCommand,
    ReleasesCommand, VhostCommand,
};
pub use output::OutputFormat;
