//! Domain Entities
//!
//! - `HostRecord` / `HostSet` - the host inventory
//! - `ReleaseLayout` / `SharedLink` - where releases live on a host
//! - `EnvironmentConfig` - per-stage task definition inputs
//! - `SecretFile` - one file of the local secrets directory

mod environment;
mod host;
mod release;
mod secret;

pub use environment::{EnvironmentConfig, ResourceValue, Scalar};
pub use host::{DeployTarget, HostRecord, HostSet, InventoryInstance};
pub use release::{ReleaseLayout, SharedLink};
pub use secret::SecretFile;
