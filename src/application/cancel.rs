//! Cooperative cancellation
//!
//! Set from the Ctrl+C handler and checked between pipeline steps. A step
//! already running on a host is never interrupted; its own timeout bounds it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::domain::value_objects::PipelineStage;
use crate::error::{StagehandError, StagehandResult};

#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Fail with `Cancelled` if cancellation was requested before `next`.
    pub fn check(&self, next: PipelineStage) -> StagehandResult<()> {
        if self.is_cancelled() {
            Err(StagehandError::Cancelled { stage: next })
        } else {
            Ok(())
        }
    }
}
