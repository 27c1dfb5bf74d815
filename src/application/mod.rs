//! Application Layer
//!
//! Use cases that orchestrate the business flow.
//! This layer:
//! - Depends on Domain layer (entities, services, ports)
//! - Does NOT contain business rules (those are in Domain)
//! - Coordinates between Infrastructure and Domain
//!
//! ## Use Cases
//!
//! - `HostRegistry` - Refresh, persist, select and diff the host inventory
//! - `ReleaseManager` - Single-host release operations
//! - `DeployPipeline` - Multi-host deploy with events and cancellation
//! - `AppServices` - Process manager and web server lifecycle
//! - `EnvironmentPush` - Env file and secrets upload
//! - `BranchPromotion` - Fast-forward a stage branch and push it
//! - `RenderUseCase` - Task definition rendering from files

pub mod branch;
pub mod cancel;
pub mod environment;
pub mod hosts;
pub mod release;
pub mod render;
pub mod services;

#[cfg(test)]
pub(crate) mod testing;

pub use branch::{BranchPromotion, MergeMode};
pub use cancel::CancellationToken;
pub use environment::EnvironmentPush;
pub use hosts::{diff_host_tables, HostDiff, HostRegistry};
pub use release::{
    DeployOptions, DeployPipeline, DeployReport, HostOutcome, PruneReport, ReleaseManager,
    ReleaseSettings, RestartMode,
};
pub use render::RenderUseCase;
pub use services::{AppServices, ServiceAction, ServiceSettings, VirtualHost};
