/*
[INPUT]:  Board snapshot, dragged task id, drop target (task or column)
[OUTPUT]: New per-column orderings plus the (task, column, position) writes to persist
[POS]:    Engine layer - pure reorder planning, no I/O and no mutation
[UPDATE]: When drop semantics or renumbering rules change
*/

use thiserror::Error;
use uuid::Uuid;

use taskboard_adapter::{ColumnId, Task, TaskId, TaskPlacement};

use crate::snapshot::BoardSnapshot;

/// What the dragged task was released over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DropTarget {
    /// Another task; the drop lands in that task's column at its index.
    Task(TaskId),
    /// A column body; the drop appends (or, within the same column,
    /// moves to the last slot).
    Column(ColumnId),
}

impl DropTarget {
    /// Interpret a bare id from a drag event: task ids win over column ids.
    pub fn resolve(snapshot: &BoardSnapshot, raw: Uuid) -> Result<Self, ResolutionError> {
        let task_id = TaskId::from(raw);
        if snapshot.task(task_id).is_some() {
            return Ok(DropTarget::Task(task_id));
        }
        let column_id = ColumnId::from(raw);
        if snapshot.has_column(column_id) {
            return Ok(DropTarget::Column(column_id));
        }
        Err(ResolutionError::UnresolvedTarget(raw))
    }
}

/// Drag gestures that resolve to nothing. Callers treat these as a
/// cancelled gesture, never as a user-facing error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ResolutionError {
    #[error("no board is loaded")]
    NoBoard,
    #[error("task {0} is not on the board")]
    UnknownTask(TaskId),
    #[error("drop target {0} is neither a task nor a column on the board")]
    UnresolvedTarget(Uuid),
    #[error("task {0} was dropped where it already is")]
    Unchanged(TaskId),
}

/// One task write of a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PositionUpdate {
    pub task_id: TaskId,
    pub column_id: ColumnId,
    pub position: i32,
}

impl PositionUpdate {
    pub fn placement(&self) -> TaskPlacement {
        TaskPlacement::new(self.column_id, self.position)
    }
}

/// Resulting order of one column touched by a move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnOrder {
    pub column_id: ColumnId,
    pub task_ids: Vec<TaskId>,
}

/// Full outcome of a planned move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relocation {
    pub task_id: TaskId,
    pub from_column: ColumnId,
    pub to_column: ColumnId,
    /// Source column first, then the destination when it differs.
    pub orders: Vec<ColumnOrder>,
    /// Only tasks whose column or position actually changes.
    pub updates: Vec<PositionUpdate>,
}

impl Relocation {
    pub fn is_cross_column(&self) -> bool {
        self.from_column != self.to_column
    }
}

/// Plan the move for a drag-end event.
pub fn plan_move(
    snapshot: &BoardSnapshot,
    active: TaskId,
    over: DropTarget,
) -> Result<Relocation, ResolutionError> {
    let from_column = snapshot
        .column_of(active)
        .ok_or(ResolutionError::UnknownTask(active))?;

    let (to_column, over_index) = match over {
        DropTarget::Task(over_task) => {
            let column_id = snapshot
                .column_of(over_task)
                .ok_or(ResolutionError::UnresolvedTarget(over_task.as_uuid()))?;
            (column_id, index_of(snapshot.tasks_in(column_id), over_task))
        }
        DropTarget::Column(column_id) if snapshot.has_column(column_id) => (column_id, None),
        DropTarget::Column(column_id) => {
            return Err(ResolutionError::UnresolvedTarget(column_id.as_uuid()));
        }
    };

    let target_len = snapshot.tasks_in(to_column).len();
    let target_index = match over_index {
        Some(index) => index,
        // column body: last slot of its own column, end of any other
        None if to_column == from_column => target_len.saturating_sub(1),
        None => target_len,
    };

    relocate(snapshot, active, to_column, target_index)
}

/// Move a task to `target_index` of `target_column`.
///
/// Within one column this is an array move (remove, then insert at the
/// index in the shortened list); across columns the task is inserted at
/// the index of the destination list. Out-of-range indexes clamp to the
/// end. Every touched column is renumbered `0..n-1`.
pub fn relocate(
    snapshot: &BoardSnapshot,
    task_id: TaskId,
    target_column: ColumnId,
    target_index: usize,
) -> Result<Relocation, ResolutionError> {
    let from_column = snapshot
        .column_of(task_id)
        .ok_or(ResolutionError::UnknownTask(task_id))?;
    if !snapshot.has_column(target_column) {
        return Err(ResolutionError::UnresolvedTarget(target_column.as_uuid()));
    }

    let mut source: Vec<TaskId> = ids(snapshot.tasks_in(from_column));
    let old_index = source
        .iter()
        .position(|id| *id == task_id)
        .ok_or(ResolutionError::UnknownTask(task_id))?;

    let orders = if from_column == target_column {
        let new_index = target_index.min(source.len() - 1);
        if new_index == old_index {
            return Err(ResolutionError::Unchanged(task_id));
        }
        array_move(&mut source, old_index, new_index);
        vec![ColumnOrder {
            column_id: from_column,
            task_ids: source,
        }]
    } else {
        source.remove(old_index);
        let mut destination = ids(snapshot.tasks_in(target_column));
        let insert_at = target_index.min(destination.len());
        destination.insert(insert_at, task_id);
        vec![
            ColumnOrder {
                column_id: from_column,
                task_ids: source,
            },
            ColumnOrder {
                column_id: target_column,
                task_ids: destination,
            },
        ]
    };

    let updates = diff_positions(snapshot, &orders);
    Ok(Relocation {
        task_id,
        from_column,
        to_column: target_column,
        orders,
        updates,
    })
}

/// Remove the element at `from` and insert it at `to`.
pub fn array_move<T>(items: &mut Vec<T>, from: usize, to: usize) {
    if from == to || from >= items.len() {
        return;
    }
    let item = items.remove(from);
    let to = to.min(items.len());
    items.insert(to, item);
}

/// Writes needed to turn the snapshot into `orders`, renumbered from zero.
fn diff_positions(snapshot: &BoardSnapshot, orders: &[ColumnOrder]) -> Vec<PositionUpdate> {
    let mut updates = Vec::new();
    for order in orders {
        for (index, task_id) in order.task_ids.iter().enumerate() {
            let position = index as i32;
            let unchanged = snapshot
                .task(*task_id)
                .is_some_and(|task| task.column_id == order.column_id && task.position == position);
            if !unchanged {
                updates.push(PositionUpdate {
                    task_id: *task_id,
                    column_id: order.column_id,
                    position,
                });
            }
        }
    }
    updates
}

fn ids(tasks: &[Task]) -> Vec<TaskId> {
    tasks.iter().map(|task| task.id).collect()
}

fn index_of(tasks: &[Task], task_id: TaskId) -> Option<usize> {
    tasks.iter().position(|task| task.id == task_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use taskboard_adapter::{BoardId, Column, ColumnWithTasks, Priority};

    struct Board {
        snapshot: BoardSnapshot,
        todo: ColumnId,
        doing: ColumnId,
        t: Vec<TaskId>,
    }

    fn task(column_id: ColumnId, position: i32) -> Task {
        Task {
            id: TaskId::new_v4(),
            title: format!("task {position}"),
            description: None,
            column_id,
            position,
            priority: Priority::Medium,
            due_date: None,
            completed: false,
            assigned_to: None,
            created_by: None,
            created_at: None,
            updated_at: None,
        }
    }

    fn column(board_id: BoardId, name: &str, position: i32) -> Column {
        Column {
            id: ColumnId::new_v4(),
            name: name.to_string(),
            color: "#ef4444".to_string(),
            position,
            board_id,
        }
    }

    /// "To Do" holds `todo_count` tasks, "Doing" holds `doing_count`.
    fn board(todo_count: i32, doing_count: i32) -> Board {
        let board_id = BoardId::new_v4();
        let todo = column(board_id, "To Do", 0);
        let doing = column(board_id, "Doing", 1);
        let todo_tasks: Vec<Task> = (0..todo_count).map(|p| task(todo.id, p)).collect();
        let doing_tasks: Vec<Task> = (0..doing_count).map(|p| task(doing.id, p)).collect();
        let t = todo_tasks.iter().chain(doing_tasks.iter()).map(|t| t.id).collect();
        let snapshot = BoardSnapshot::from_rows(
            board_id,
            vec![
                ColumnWithTasks {
                    column: todo.clone(),
                    tasks: todo_tasks,
                },
                ColumnWithTasks {
                    column: doing.clone(),
                    tasks: doing_tasks,
                },
            ],
            vec![],
            vec![],
        )
        .unwrap();
        Board {
            snapshot,
            todo: todo.id,
            doing: doing.id,
            t,
        }
    }

    fn order_of(relocation: &Relocation, column_id: ColumnId) -> Vec<TaskId> {
        relocation
            .orders
            .iter()
            .find(|order| order.column_id == column_id)
            .map(|order| order.task_ids.clone())
            .unwrap_or_default()
    }

    #[test]
    fn test_same_column_move_to_front() {
        let b = board(3, 0);
        let (t1, t2, t3) = (b.t[0], b.t[1], b.t[2]);

        let relocation = plan_move(&b.snapshot, t3, DropTarget::Task(t1)).unwrap();

        assert_eq!(order_of(&relocation, b.todo), vec![t3, t1, t2]);
        assert_eq!(relocation.updates.len(), 3);
        assert!(relocation.updates.contains(&PositionUpdate {
            task_id: t3,
            column_id: b.todo,
            position: 0,
        }));
        assert!(!relocation.is_cross_column());
    }

    #[test]
    fn test_cross_column_append() {
        let b = board(2, 1);
        let (t1, t2, t3) = (b.t[0], b.t[1], b.t[2]);

        let relocation = plan_move(&b.snapshot, t1, DropTarget::Column(b.doing)).unwrap();

        assert_eq!(order_of(&relocation, b.todo), vec![t2]);
        assert_eq!(order_of(&relocation, b.doing), vec![t3, t1]);
        let mut updates = relocation.updates.clone();
        updates.sort_by_key(|u| u.position);
        assert_eq!(
            updates,
            vec![
                PositionUpdate {
                    task_id: t2,
                    column_id: b.todo,
                    position: 0,
                },
                PositionUpdate {
                    task_id: t1,
                    column_id: b.doing,
                    position: 1,
                },
            ]
        );
    }

    #[test]
    fn test_cross_column_insert_before_target_task() {
        let b = board(1, 2);
        let (t1, d1, d2) = (b.t[0], b.t[1], b.t[2]);

        let relocation = plan_move(&b.snapshot, t1, DropTarget::Task(d2)).unwrap();

        assert_eq!(order_of(&relocation, b.doing), vec![d1, t1, d2]);
        assert!(order_of(&relocation, b.todo).is_empty());
        // d1 keeps position 0, so only t1 and d2 are written
        assert_eq!(relocation.updates.len(), 2);
    }

    #[test]
    fn test_drop_on_self_is_unchanged() {
        let b = board(2, 0);
        let t1 = b.t[0];
        assert_eq!(
            plan_move(&b.snapshot, t1, DropTarget::Task(t1)),
            Err(ResolutionError::Unchanged(t1))
        );
    }

    #[test]
    fn test_last_task_dropped_on_own_column_is_unchanged() {
        let b = board(3, 0);
        let t3 = b.t[2];
        assert_eq!(
            plan_move(&b.snapshot, t3, DropTarget::Column(b.todo)),
            Err(ResolutionError::Unchanged(t3))
        );
    }

    #[test]
    fn test_unknown_ids_do_not_resolve() {
        let b = board(1, 0);
        let stranger = Uuid::new_v4();

        assert_eq!(
            DropTarget::resolve(&b.snapshot, stranger),
            Err(ResolutionError::UnresolvedTarget(stranger))
        );
        assert_eq!(
            plan_move(&b.snapshot, TaskId::from(stranger), DropTarget::Column(b.todo)),
            Err(ResolutionError::UnknownTask(TaskId::from(stranger)))
        );
        assert!(matches!(
            plan_move(&b.snapshot, b.t[0], DropTarget::Column(ColumnId::from(stranger))),
            Err(ResolutionError::UnresolvedTarget(_))
        ));
    }

    #[test]
    fn test_resolve_prefers_tasks_then_columns() {
        let b = board(1, 0);
        assert_eq!(
            DropTarget::resolve(&b.snapshot, b.t[0].as_uuid()),
            Ok(DropTarget::Task(b.t[0]))
        );
        assert_eq!(
            DropTarget::resolve(&b.snapshot, b.doing.as_uuid()),
            Ok(DropTarget::Column(b.doing))
        );
    }

    #[rstest]
    #[case(0, 4)]
    #[case(4, 0)]
    #[case(1, 3)]
    #[case(2, 9)]
    fn test_same_column_moves_renumber_contiguously(#[case] from: usize, #[case] to: usize) {
        let b = board(5, 0);
        let relocation = relocate(&b.snapshot, b.t[from], b.todo, to).unwrap();

        let order = order_of(&relocation, b.todo);
        assert_eq!(order.len(), 5);
        assert_eq!(order[to.min(4)], b.t[from]);
        for update in &relocation.updates {
            let index = order.iter().position(|id| *id == update.task_id).unwrap();
            assert_eq!(update.position, index as i32);
        }
    }

    #[rstest]
    #[case(vec![1, 2, 3], 0, 2, vec![2, 3, 1])]
    #[case(vec![1, 2, 3], 2, 0, vec![3, 1, 2])]
    #[case(vec![1, 2, 3], 1, 1, vec![1, 2, 3])]
    #[case(vec![1, 2, 3], 0, 7, vec![2, 3, 1])]
    fn test_array_move(
        #[case] mut items: Vec<i32>,
        #[case] from: usize,
        #[case] to: usize,
        #[case] expected: Vec<i32>,
    ) {
        array_move(&mut items, from, to);
        assert_eq!(items, expected);
    }
}
