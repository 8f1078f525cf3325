/*
[INPUT]:  Drag-end gestures, reorder plans, `BoardBackend::update_task`
[OUTPUT]: Concurrent position writes followed by a mandatory authoritative reload
[POS]:    Persistence layer - turns optimistic moves into backend state and reconciles
[UPDATE]: When write fan-out, reload policy or failure reporting changes
*/

use std::sync::Arc;

use futures_util::future::join_all;
use thiserror::Error;
use uuid::Uuid;

use taskboard_adapter::{BoardBackend, BoardId, TaskId, TaskboardError};

use crate::notify::Notifier;
use crate::reorder::{DropTarget, PositionUpdate, ResolutionError};
use crate::store::{BoardStore, FetchError, LoadOutcome, SnapshotSlice};

/// One rejected task write.
#[derive(Debug)]
pub struct FailedWrite {
    pub task_id: TaskId,
    pub source: TaskboardError,
}

/// Some writes of a move were rejected.
#[derive(Debug, Error)]
#[error(
    "{} of {attempted} task writes failed on board {board_id}",
    .failures.len()
)]
pub struct PersistenceError {
    pub board_id: BoardId,
    pub attempted: usize,
    pub failures: Vec<FailedWrite>,
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum MoveOutcome {
    /// The gesture resolved to nothing; no writes were issued.
    Cancelled(ResolutionError),
    /// Every write landed and the board was reloaded.
    Persisted {
        updates: Vec<PositionUpdate>,
        reload: LoadOutcome,
    },
}

/// Persistence Synchronizer.
#[derive(Clone)]
pub struct PersistenceSynchronizer {
    backend: Arc<dyn BoardBackend>,
    store: BoardStore,
    notifier: Notifier,
}

impl PersistenceSynchronizer {
    pub fn new(backend: Arc<dyn BoardBackend>, store: BoardStore, notifier: Notifier) -> Self {
        Self {
            backend,
            store,
            notifier,
        }
    }

    pub fn store(&self) -> &BoardStore {
        &self.store
    }

    /// Drag-end with an id straight from the gesture.
    pub async fn handle_drag_end_raw(
        &self,
        active: TaskId,
        over: Uuid,
    ) -> Result<MoveOutcome, SyncError> {
        match self.store.resolve_target(over) {
            Ok(target) => self.handle_drag_end(active, target).await,
            Err(reason) => Ok(self.cancelled(active, reason)),
        }
    }

    /// Apply the move locally, persist it, then reload.
    ///
    /// Unresolvable gestures come back as `MoveOutcome::Cancelled` without
    /// touching the store or the backend. Backend failures are reported
    /// through the notifier and returned.
    pub async fn handle_drag_end(
        &self,
        active: TaskId,
        over: DropTarget,
    ) -> Result<MoveOutcome, SyncError> {
        let (relocation, slice) = match self.store.apply_drop(active, over) {
            Ok(applied) => applied,
            Err(reason) => return Ok(self.cancelled(active, reason)),
        };

        tracing::debug!(
            task_id = %active,
            from = %relocation.from_column,
            to = %relocation.to_column,
            updates = relocation.updates.len(),
            "task moved locally"
        );

        let board_id = slice.board_id();
        let reload = self
            .persist(board_id, &relocation.updates, Some(slice))
            .await?;
        Ok(MoveOutcome::Persisted {
            updates: relocation.updates,
            reload,
        })
    }

    /// Write every update concurrently, wait for all of them, then reload
    /// the board whatever the outcome.
    pub async fn persist_move(
        &self,
        board_id: BoardId,
        updates: &[PositionUpdate],
    ) -> Result<LoadOutcome, SyncError> {
        self.persist(board_id, updates, None).await
    }

    /// Reload after a mutation, notifying on failure.
    pub async fn reload(&self, board_id: BoardId) -> Result<LoadOutcome, FetchError> {
        self.store.load(board_id).await.inspect_err(|error| {
            self.notifier.error("Could not load board", error);
        })
    }

    async fn persist(
        &self,
        board_id: BoardId,
        updates: &[PositionUpdate],
        slice: Option<SnapshotSlice>,
    ) -> Result<LoadOutcome, SyncError> {
        let failures = self.write_all(updates).await;
        let reload = self.store.load(board_id).await;

        if failures.is_empty() {
            return match reload {
                Ok(outcome) => {
                    tracing::info!(board_id = %board_id, updates = updates.len(), "move persisted");
                    Ok(outcome)
                }
                Err(error) => {
                    self.notifier.error("Could not load board", &error);
                    Err(error.into())
                }
            };
        }

        let error = PersistenceError {
            board_id,
            attempted: updates.len(),
            failures,
        };
        self.notifier.error("Could not move task", &error);

        if let Err(fetch) = reload {
            // the optimistic order was never confirmed and cannot be refreshed
            self.notifier.error("Could not load board", &fetch);
            if let Some(slice) = slice {
                self.store.rollback(slice);
            }
        }
        Err(error.into())
    }

    async fn write_all(&self, updates: &[PositionUpdate]) -> Vec<FailedWrite> {
        let writes = updates.iter().map(|update| async move {
            let result = self
                .backend
                .update_task(update.task_id, update.placement())
                .await;
            (update.task_id, result)
        });

        join_all(writes)
            .await
            .into_iter()
            .filter_map(|(task_id, result)| match result {
                Ok(()) => None,
                Err(source) => {
                    tracing::warn!(task_id = %task_id, error = %source, "task write failed");
                    Some(FailedWrite { task_id, source })
                }
            })
            .collect()
    }

    fn cancelled(&self, active: TaskId, reason: ResolutionError) -> MoveOutcome {
        tracing::debug!(task_id = %active, %reason, "drag gesture cancelled");
        MoveOutcome::Cancelled(reason)
    }
}
