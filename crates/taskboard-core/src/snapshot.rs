/*
[INPUT]:  Column rows with embedded tasks, checklist rows and tag links for one board
[OUTPUT]: Validated, position-ordered board snapshot with per-column task lists
[POS]:    State layer - immutable view the reorder engine plans against
[UPDATE]: When board rows gain fields the engine or workflows read
*/

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use taskboard_adapter::{
    BoardId, ChecklistItem, ChecklistItemId, Column, ColumnId, ColumnWithTasks, TagId, Task,
    TaskId, TaskTag,
};

/// Rows that cannot be trusted as a board.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotError {
    #[error("column {column_id} belongs to board {actual}, expected {expected}")]
    ForeignColumn {
        column_id: ColumnId,
        expected: BoardId,
        actual: BoardId,
    },
    #[error("column {0} appears twice")]
    DuplicateColumn(ColumnId),
    #[error("task {0} appears twice")]
    DuplicateTask(TaskId),
    #[error("task {task_id} is embedded under column {embedded_in} but points at {column_id}")]
    MisplacedTask {
        task_id: TaskId,
        column_id: ColumnId,
        embedded_in: ColumnId,
    },
}

/// Columns and tasks of one board as of the last authoritative load,
/// plus any optimistic moves applied since.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardSnapshot {
    board_id: BoardId,
    columns: Vec<Column>,
    tasks: HashMap<ColumnId, Vec<Task>>,
    checklists: HashMap<TaskId, Vec<ChecklistItem>>,
    tags: HashMap<TaskId, Vec<TagId>>,
}

impl BoardSnapshot {
    /// Validate raw rows and order them by position.
    ///
    /// Checklist items and tag links pointing at tasks outside the board
    /// are dropped.
    pub fn from_rows(
        board_id: BoardId,
        rows: Vec<ColumnWithTasks>,
        checklist_items: Vec<ChecklistItem>,
        task_tags: Vec<TaskTag>,
    ) -> Result<Self, SnapshotError> {
        let mut columns = Vec::with_capacity(rows.len());
        let mut tasks = HashMap::with_capacity(rows.len());
        let mut seen_tasks = HashSet::new();

        for ColumnWithTasks {
            column,
            tasks: mut column_tasks,
        } in rows
        {
            if column.board_id != board_id {
                return Err(SnapshotError::ForeignColumn {
                    column_id: column.id,
                    expected: board_id,
                    actual: column.board_id,
                });
            }
            if tasks.contains_key(&column.id) {
                return Err(SnapshotError::DuplicateColumn(column.id));
            }

            for task in &column_tasks {
                if task.column_id != column.id {
                    return Err(SnapshotError::MisplacedTask {
                        task_id: task.id,
                        column_id: task.column_id,
                        embedded_in: column.id,
                    });
                }
                if !seen_tasks.insert(task.id) {
                    return Err(SnapshotError::DuplicateTask(task.id));
                }
            }

            // stable: equal positions keep server order
            column_tasks.sort_by_key(|task| task.position);
            tasks.insert(column.id, column_tasks);
            columns.push(column);
        }
        columns.sort_by_key(|column| column.position);

        let mut checklists: HashMap<TaskId, Vec<ChecklistItem>> = HashMap::new();
        for item in checklist_items {
            if seen_tasks.contains(&item.task_id) {
                checklists.entry(item.task_id).or_default().push(item);
            }
        }
        for items in checklists.values_mut() {
            items.sort_by_key(|item| item.position);
        }

        let mut tags: HashMap<TaskId, Vec<TagId>> = HashMap::new();
        for link in task_tags {
            if seen_tasks.contains(&link.task_id) {
                let entry = tags.entry(link.task_id).or_default();
                if !entry.contains(&link.tag_id) {
                    entry.push(link.tag_id);
                }
            }
        }

        Ok(Self {
            board_id,
            columns,
            tasks,
            checklists,
            tags,
        })
    }

    pub fn board_id(&self) -> BoardId {
        self.board_id
    }

    /// Columns ordered by position
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, column_id: ColumnId) -> Option<&Column> {
        self.columns.iter().find(|column| column.id == column_id)
    }

    pub fn has_column(&self, column_id: ColumnId) -> bool {
        self.tasks.contains_key(&column_id)
    }

    /// Tasks of a column ordered by position; empty for unknown columns.
    pub fn tasks_in(&self, column_id: ColumnId) -> &[Task] {
        self.tasks
            .get(&column_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn task(&self, task_id: TaskId) -> Option<&Task> {
        self.tasks
            .values()
            .flat_map(|tasks| tasks.iter())
            .find(|task| task.id == task_id)
    }

    pub fn column_of(&self, task_id: TaskId) -> Option<ColumnId> {
        self.task(task_id).map(|task| task.column_id)
    }

    /// Every task, column by column in board order.
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.columns
            .iter()
            .flat_map(move |column| self.tasks_in(column.id).iter())
    }

    pub fn task_ids(&self) -> Vec<TaskId> {
        self.tasks().map(|task| task.id).collect()
    }

    pub fn task_count(&self) -> usize {
        self.tasks.values().map(Vec::len).sum()
    }

    pub fn checklist(&self, task_id: TaskId) -> &[ChecklistItem] {
        self.checklists
            .get(&task_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn checklist_item(&self, item_id: ChecklistItemId) -> Option<&ChecklistItem> {
        self.checklists
            .values()
            .flat_map(|items| items.iter())
            .find(|item| item.id == item_id)
    }

    pub fn tags_of(&self, task_id: TaskId) -> &[TagId] {
        self.tags.get(&task_id).map(Vec::as_slice).unwrap_or_default()
    }

    /// Swap in a column's task list, returning the previous one.
    pub(crate) fn replace_tasks(&mut self, column_id: ColumnId, tasks: Vec<Task>) -> Vec<Task> {
        self.tasks.insert(column_id, tasks).unwrap_or_default()
    }
}
