//! Shell implementations of the `RemoteShell` port
//!
//! - `SshShell` - remote hosts via the system `ssh` binary
//! - `LocalShell` - this machine via `sh -c`

mod local;
mod process;
mod ssh;

pub use local::{LocalConnector, LocalShell};
pub use process::run_with_timeout;
pub use ssh::{SshConnector, SshSettings, SshShell};
