//! Domain Ports (Interfaces)
//!
//! These traits define the boundaries of the domain layer.
//! Infrastructure layer provides concrete implementations.

pub mod deploy_events;
pub mod environment_repository;
pub mod host_repository;
pub mod inventory;
pub mod remote_shell;

pub use deploy_events::{DeployEvent, DeployEventSink, NoopEventSink};
pub use environment_repository::EnvironmentRepository;
pub use host_repository::{HostFileError, HostRepository};
pub use inventory::InventoryProvider;
pub use remote_shell::{
    shell_quote, CommandOutput, RemoteCommand, RemoteShell, ShellConnector, ShellError,
    ShellResult,
};
