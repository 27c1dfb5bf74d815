//! InventoryProvider port - live machine state from the cloud provider

use crate::domain::entities::InventoryInstance;
use crate::error::StagehandResult;

pub trait InventoryProvider: Send + Sync {
    /// All instances tagged `Project=<project>`.
    ///
    /// Implementations may pre-filter on state; callers still filter on
    /// `running`. Fails with `ProviderUnavailable` when the query cannot
    /// complete. No retry is attempted here.
    fn instances(&self, project: &str) -> StagehandResult<Vec<InventoryInstance>>;
}
