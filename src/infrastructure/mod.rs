//! Infrastructure Layer
//!
//! Concrete implementations of domain ports.
//! This layer handles all I/O operations.
//!
//! ## Structure
//!
//! - `shell/` - RemoteShell implementations (ssh, local `sh`)
//! - `inventory/` - InventoryProvider over the `aws` CLI
//! - `repositories/` - Hosts file, per-stage environment documents and the
//!   local secrets directory
//! - `events/` - DeployEventSink implementations

pub mod events;
pub mod inventory;
pub mod repositories;
pub mod shell;

// Re-export for convenience
pub use events::{JsonEventSink, LogEventSink};
pub use inventory::AwsCliInventory;
pub use repositories::{collect_secret_files, TextHostRepository, YamlEnvironmentRepository};
pub use shell::{LocalConnector, LocalShell, SshConnector, SshSettings, SshShell};
