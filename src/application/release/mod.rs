//! Release Module
//!
//! ## Structure
//!
//! - `options` - Settings and per-run switches (`ReleaseSettings`, `DeployOptions`)
//! - `result` - Reports (`PruneReport`, `DeployReport`)
//! - `manager` - Single-host release operations (`ReleaseManager`)
//! - `pipeline` - Multi-host deploy orchestration (`DeployPipeline`)

mod manager;
mod options;
mod pipeline;
mod result;

pub use manager::ReleaseManager;
pub use options::{DeployOptions, MigrationSettings, ReleaseSettings, RestartMode};
pub use pipeline::{migration_host, DeployPipeline, APP_ROLE};
pub use result::{DeployReport, HostOutcome, MigrationReport, PruneReport};
