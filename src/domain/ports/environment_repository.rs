//! EnvironmentRepository port - per-stage renderer inputs

use crate::domain::entities::EnvironmentConfig;
use crate::error::StagehandResult;

pub trait EnvironmentRepository {
    /// Load the document for `stage`.
    ///
    /// Fails with `ConfigNotFound` when the stage has no document and with
    /// `Parse` when it is malformed.
    fn load(&self, stage: &str) -> StagehandResult<EnvironmentConfig>;
}
