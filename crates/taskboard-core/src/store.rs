/*
[INPUT]:  `BoardBackend` reads, optimistic relocations from the reorder engine
[OUTPUT]: Owned, injectable board snapshot with generation-guarded loads
[POS]:    State layer - the only holder of board state; written by loads and local moves
[UPDATE]: When load round trips, discard rules or rollback semantics change
*/

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use taskboard_adapter::{BoardBackend, BoardId, ColumnId, Task, TaskId, TaskboardError};

use crate::reorder::{self, DropTarget, Relocation, ResolutionError};
use crate::snapshot::{BoardSnapshot, SnapshotError};

/// A board read that could not produce a trustworthy snapshot.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to load board {board_id}: {source}")]
    Backend {
        board_id: BoardId,
        source: TaskboardError,
    },
    #[error("board {board_id} returned inconsistent rows: {source}")]
    Invalid {
        board_id: BoardId,
        source: SnapshotError,
    },
}

impl FetchError {
    pub fn board_id(&self) -> BoardId {
        match self {
            FetchError::Backend { board_id, .. } | FetchError::Invalid { board_id, .. } => {
                *board_id
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscardReason {
    /// The store was closed while the read was in flight.
    Closed,
    /// A newer load or local move happened while the read was in flight.
    Superseded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded { board_id: BoardId, tasks: usize },
    Discarded(DiscardReason),
}

impl LoadOutcome {
    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadOutcome::Loaded { .. })
    }
}

/// Column task lists as they were before an optimistic move.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotSlice {
    board_id: BoardId,
    columns: Vec<(ColumnId, Vec<Task>)>,
}

impl SnapshotSlice {
    pub fn board_id(&self) -> BoardId {
        self.board_id
    }

    pub fn column_ids(&self) -> impl Iterator<Item = ColumnId> + '_ {
        self.columns.iter().map(|(column_id, _)| *column_id)
    }

    pub fn tasks_in(&self, column_id: ColumnId) -> Option<&[Task]> {
        self.columns
            .iter()
            .find(|(id, _)| *id == column_id)
            .map(|(_, tasks)| tasks.as_slice())
    }
}

#[derive(Debug, Default)]
struct StoreState {
    snapshot: Option<BoardSnapshot>,
    generation: u64,
}

/// Board Snapshot Store.
///
/// Clones share one state; hand a clone to every component that reads the
/// board. Writes happen through `load` and the local-move methods only.
#[derive(Clone)]
pub struct BoardStore {
    backend: Arc<dyn BoardBackend>,
    state: Arc<RwLock<StoreState>>,
    shutdown: CancellationToken,
}

impl BoardStore {
    pub fn new(backend: Arc<dyn BoardBackend>) -> Self {
        Self {
            backend,
            state: Arc::new(RwLock::new(StoreState::default())),
            shutdown: CancellationToken::new(),
        }
    }

    /// Fetch the board and replace the snapshot.
    ///
    /// On error the previous snapshot stays. A read that finishes after a
    /// newer load or local move, or after `close`, is discarded.
    pub async fn load(&self, board_id: BoardId) -> Result<LoadOutcome, FetchError> {
        if self.shutdown.is_cancelled() {
            return Ok(LoadOutcome::Discarded(DiscardReason::Closed));
        }
        let ticket = self.bump_generation();

        let fetched = tokio::select! {
            _ = self.shutdown.cancelled() => {
                tracing::debug!(board_id = %board_id, "board load dropped: store closed");
                return Ok(LoadOutcome::Discarded(DiscardReason::Closed));
            }
            fetched = fetch_snapshot(self.backend.as_ref(), board_id) => fetched,
        };

        let mut state = self.write();
        if self.shutdown.is_cancelled() {
            return Ok(LoadOutcome::Discarded(DiscardReason::Closed));
        }
        if state.generation != ticket {
            tracing::debug!(
                board_id = %board_id,
                ticket,
                current = state.generation,
                "board load superseded"
            );
            return Ok(LoadOutcome::Discarded(DiscardReason::Superseded));
        }

        let snapshot = fetched?;
        let tasks = snapshot.task_count();
        state.snapshot = Some(snapshot);
        tracing::info!(board_id = %board_id, tasks, "board loaded");
        Ok(LoadOutcome::Loaded { board_id, tasks })
    }

    /// Copy of the current snapshot
    pub fn snapshot(&self) -> Option<BoardSnapshot> {
        self.read().snapshot.clone()
    }

    pub fn board_id(&self) -> Option<BoardId> {
        self.read().snapshot.as_ref().map(BoardSnapshot::board_id)
    }

    /// Tasks of a column ordered by position
    pub fn tasks_by_column(&self, column_id: ColumnId) -> Vec<Task> {
        self.read()
            .snapshot
            .as_ref()
            .map(|snapshot| snapshot.tasks_in(column_id).to_vec())
            .unwrap_or_default()
    }

    /// Resolve a bare drop-target id against the current snapshot.
    pub fn resolve_target(&self, raw: Uuid) -> Result<DropTarget, ResolutionError> {
        let state = self.read();
        let snapshot = state.snapshot.as_ref().ok_or(ResolutionError::NoBoard)?;
        DropTarget::resolve(snapshot, raw)
    }

    /// Optimistically move a task to `target_index` of `target_column`.
    pub fn apply_local_move(
        &self,
        task_id: TaskId,
        target_column: ColumnId,
        target_index: usize,
    ) -> Result<SnapshotSlice, ResolutionError> {
        self.mutate(|snapshot| reorder::relocate(snapshot, task_id, target_column, target_index))
            .map(|(_, slice)| slice)
    }

    /// Plan and apply a drag-end gesture in one step.
    pub fn apply_drop(
        &self,
        active: TaskId,
        over: DropTarget,
    ) -> Result<(Relocation, SnapshotSlice), ResolutionError> {
        self.mutate(|snapshot| reorder::plan_move(snapshot, active, over))
    }

    /// Restore the column lists captured by an optimistic move.
    ///
    /// Returns false when the store no longer shows that board.
    pub fn rollback(&self, slice: SnapshotSlice) -> bool {
        let mut state = self.write();
        let Some(snapshot) = state.snapshot.as_mut() else {
            return false;
        };
        if snapshot.board_id() != slice.board_id {
            return false;
        }
        for (column_id, tasks) in slice.columns {
            snapshot.replace_tasks(column_id, tasks);
        }
        state.generation += 1;
        true
    }

    /// Forget the board, e.g. after it was deleted.
    pub fn clear(&self) {
        let mut state = self.write();
        state.snapshot = None;
        state.generation += 1;
    }

    /// Stop accepting load results; in-flight reads are dropped.
    pub fn close(&self) {
        self.shutdown.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    fn mutate<F>(&self, plan: F) -> Result<(Relocation, SnapshotSlice), ResolutionError>
    where
        F: FnOnce(&BoardSnapshot) -> Result<Relocation, ResolutionError>,
    {
        let mut state = self.write();
        let Some(snapshot) = state.snapshot.as_mut() else {
            return Err(ResolutionError::NoBoard);
        };
        let relocation = plan(snapshot)?;
        let slice = apply_relocation(snapshot, &relocation);
        state.generation += 1;
        Ok((relocation, slice))
    }

    fn bump_generation(&self) -> u64 {
        let mut state = self.write();
        state.generation += 1;
        state.generation
    }

    fn read(&self) -> RwLockReadGuard<'_, StoreState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Read one board: columns with embedded tasks, then checklist items and
/// tag links for the resulting task set concurrently.
pub async fn fetch_snapshot(
    backend: &dyn BoardBackend,
    board_id: BoardId,
) -> Result<BoardSnapshot, FetchError> {
    let backend_error = |source| FetchError::Backend { board_id, source };

    let rows = backend
        .list_columns_with_tasks(board_id)
        .await
        .map_err(backend_error)?;
    let task_ids: Vec<TaskId> = rows
        .iter()
        .flat_map(|row| row.tasks.iter().map(|task| task.id))
        .collect();

    let (checklist_items, task_tags) = if task_ids.is_empty() {
        (Vec::new(), Vec::new())
    } else {
        tokio::try_join!(
            backend.list_checklist_items(&task_ids),
            backend.list_task_tags(&task_ids)
        )
        .map_err(backend_error)?
    };

    BoardSnapshot::from_rows(board_id, rows, checklist_items, task_tags)
        .map_err(|source| FetchError::Invalid { board_id, source })
}

fn apply_relocation(snapshot: &mut BoardSnapshot, relocation: &Relocation) -> SnapshotSlice {
    let touched: HashMap<TaskId, Task> = relocation
        .orders
        .iter()
        .flat_map(|order| snapshot.tasks_in(order.column_id).iter().cloned())
        .map(|task| (task.id, task))
        .collect();

    let mut previous = Vec::with_capacity(relocation.orders.len());
    for order in &relocation.orders {
        let tasks = order
            .task_ids
            .iter()
            .enumerate()
            .filter_map(|(index, task_id)| {
                touched.get(task_id).cloned().map(|mut task| {
                    task.column_id = order.column_id;
                    task.position = index as i32;
                    task
                })
            })
            .collect();
        previous.push((order.column_id, snapshot.replace_tasks(order.column_id, tasks)));
    }

    SnapshotSlice {
        board_id: snapshot.board_id(),
        columns: previous,
    }
}
