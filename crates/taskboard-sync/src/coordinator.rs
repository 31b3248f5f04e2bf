use std::sync::Arc;

use taskboard_core::task::{ColumnId, Task, UpdateTask};
use taskboard_service::{ServiceError, TaskStore};
use tracing::{info, warn};

use crate::cache::{CacheSnapshot, ColumnQueryCache};

/// Request to move one task into another column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveTask {
    pub task_id: String,
    pub from: ColumnId,
    pub to: ColumnId,
}

impl MoveTask {
    pub fn new(task: &Task, to: ColumnId) -> Self {
        Self {
            task_id: task.id.clone(),
            from: task.column,
            to,
        }
    }

    pub fn is_noop(&self) -> bool {
        self.from == self.to
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Source and destination were the same column; nothing was sent.
    Unchanged,
    /// The store accepted the move.
    Moved(Task),
}

/// A move whose optimistic cache edit has been applied.
/// Holds the pre-image needed to undo it.
#[derive(Debug)]
pub struct AppliedMove {
    pub command: MoveTask,
    snapshot: CacheSnapshot,
    touched: usize,
}

impl AppliedMove {
    /// Number of cache entries the task was removed from.
    pub fn touched(&self) -> usize {
        self.touched
    }

    /// Restore every snapshotted entry verbatim.
    pub fn compensate(self, cache: &ColumnQueryCache) {
        warn!(
            "rolling back move of {} ({} entries)",
            self.command.task_id,
            self.snapshot.len()
        );
        cache.restore(self.snapshot);
    }
}

/// Applies cross-column moves optimistically.
///
/// The task disappears from every cached listing at once; it is not
/// inserted into the destination, which only shows it after the
/// post-move refetch.
pub struct MoveCoordinator {
    cache: Arc<ColumnQueryCache>,
    store: Arc<dyn TaskStore>,
}

impl MoveCoordinator {
    pub fn new(cache: Arc<ColumnQueryCache>, store: Arc<dyn TaskStore>) -> Self {
        Self { cache, store }
    }

    /// Cancel in-flight loads, snapshot the cache and pull the task out of it.
    pub fn apply(&self, command: MoveTask) -> AppliedMove {
        let (snapshot, touched) = self.cache.detach_task(&command.task_id);
        info!(
            "moving {} {} -> {} (removed from {touched} cached listings)",
            command.task_id,
            command.from.as_str(),
            command.to.as_str()
        );
        AppliedMove {
            command,
            snapshot,
            touched,
        }
    }

    /// Run the whole move: optimistic removal, persistence, rollback on
    /// failure, and invalidation of every listing once settled.
    pub async fn execute(&self, command: MoveTask) -> Result<MoveOutcome, ServiceError> {
        if command.is_noop() {
            return Ok(MoveOutcome::Unchanged);
        }

        let applied = self.apply(command);
        let result = self
            .store
            .update(&applied.command.task_id, &UpdateTask::move_to(applied.command.to))
            .await;

        let outcome = match result {
            Ok(task) => Ok(MoveOutcome::Moved(task)),
            Err(e) => {
                warn!("move of {} failed: {e}", applied.command.task_id);
                applied.compensate(&self.cache);
                Err(e)
            }
        };
        self.cache.invalidate(|_| true);
        outcome
    }
}
