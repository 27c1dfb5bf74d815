//! Domain Value Objects
//!
//! Immutable value types that represent domain concepts.

mod pipeline_stage;
mod release_id;
mod role;

pub use pipeline_stage::PipelineStage;
pub use release_id::ReleaseId;
pub use role::{join_roles, split_roles};
