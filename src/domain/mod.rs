//! Domain Layer
//!
//! Pure deployment logic without I/O dependencies.
//!
//! ## Structure
//!
//! - `entities/` - Host inventory, release layout, stage environment
//! - `value_objects/` - Release ids, pipeline stages, role tags
//! - `services/` - Host table codec, retention, task definition renderer
//! - `ports/` - Interface definitions for infrastructure
//!
//! ## Design Principles
//!
//! 1. **No I/O** - This layer never touches the file system or network directly
//! 2. **Pure Functions** - Services are stateless and testable
//! 3. **Ports & Adapters** - All I/O goes through trait-defined ports

pub mod entities;
pub mod ports;
pub mod services;
pub mod value_objects;
