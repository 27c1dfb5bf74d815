//! Domain Services
//!
//! Stateless logic over domain entities.
//! - `host_table` - text form of the host inventory
//! - `retention` - which releases a prune keeps
//! - `renderer` - task definition rendering

pub mod host_table;
pub mod renderer;
pub mod retention;

pub use host_table::{format_host_table, parse_host_table, HostTableError};
pub use renderer::{
    render_task_definition, secret_reference, Placeholders, RenderOptions, ResourceFieldType,
};
pub use retention::{plan_retention, RetentionPlan};
