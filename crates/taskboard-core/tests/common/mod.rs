/*
[INPUT]:  Seeded boards, injected failures and read gates
[OUTPUT]: In-memory `BoardCatalog` that records every backend call
[POS]:    Test utilities - shared fake backend
[UPDATE]: When the backing-store traits gain methods
*/

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use tokio::sync::{Notify, mpsc};

use taskboard_adapter::{
    Board, BoardBackend, BoardCatalog, BoardId, ChecklistItem, ChecklistItemId, Column, ColumnId,
    ColumnWithTasks, MemberId, NewBoard, NewChecklistItem, NewColumn, NewProject,
    NewProjectMember, NewTag, NewTask, Priority, Profile, ProfileRole, Project, ProjectId,
    ProjectMember, Result, Tag, TagId, Task, TaskId, TaskPatch, TaskPlacement, TaskTag,
    TaskboardError, UserId,
};
use taskboard_core::config::BoardConfig;
use taskboard_core::{Notification, Notifier, ProjectWorkspace};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    ListColumnsWithTasks(BoardId),
    ListChecklistItems(usize),
    ListTaskTags(usize),
    UpdateTask(TaskId, TaskPlacement),
    SetColumnPosition(ColumnId, i32),
    Write(&'static str),
}

#[derive(Default)]
struct FakeState {
    projects: Vec<Project>,
    boards: Vec<Board>,
    columns: Vec<Column>,
    tasks: Vec<Task>,
    checklist: Vec<ChecklistItem>,
    tags: Vec<Tag>,
    task_tags: Vec<TaskTag>,
    members: Vec<ProjectMember>,
    profiles: Vec<Profile>,
    calls: Vec<Call>,
    failing_updates: HashSet<TaskId>,
    fail_reads: bool,
    user: Option<UserId>,
}

/// Gate that parks board reads until the test releases them.
#[derive(Clone, Default)]
pub struct ReadGate {
    pub started: Arc<Notify>,
    pub release: Arc<Notify>,
}

#[derive(Default)]
pub struct FakeBackend {
    state: Mutex<FakeState>,
    gate: Mutex<Option<ReadGate>>,
}

/// Ids of a seeded board; `tasks[i]` lists column `i`'s tasks in order.
#[derive(Debug, Clone)]
pub struct SeededBoard {
    pub project_id: ProjectId,
    pub board_id: BoardId,
    pub columns: Vec<ColumnId>,
    pub tasks: Vec<Vec<TaskId>>,
}

fn api_error(message: &str) -> TaskboardError {
    TaskboardError::Api {
        status: 500,
        code: None,
        message: message.to_string(),
    }
}

fn not_found(table: &'static str, id: impl ToString) -> TaskboardError {
    TaskboardError::NotFound {
        table,
        id: id.to_string(),
    }
}

pub fn task_row(column_id: ColumnId, title: &str, position: i32) -> Task {
    Task {
        id: TaskId::new_v4(),
        title: title.to_string(),
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

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn signed_in() -> (Arc<Self>, UserId) {
        let backend = Self::new();
        let user = UserId::new_v4();
        backend.lock().user = Some(user);
        (backend, user)
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    /// One project with one board whose columns hold `"<column> <n>"` tasks.
    pub fn seed_board(&self, columns: &[(&str, usize)]) -> SeededBoard {
        let mut state = self.lock();
        let project = Project {
            id: ProjectId::new_v4(),
            name: "Launch".to_string(),
            description: None,
            created_by: state.user,
            created_at: None,
            updated_at: None,
        };
        let board = Board {
            id: BoardId::new_v4(),
            name: "Sprint".to_string(),
            project_id: project.id,
            created_at: None,
            updated_at: None,
        };

        let mut seeded = SeededBoard {
            project_id: project.id,
            board_id: board.id,
            columns: Vec::new(),
            tasks: Vec::new(),
        };
        for (position, (name, count)) in columns.iter().enumerate() {
            let column = Column {
                id: ColumnId::new_v4(),
                name: name.to_string(),
                color: "#6366f1".to_string(),
                position: position as i32,
                board_id: board.id,
            };
            let tasks: Vec<Task> = (0..*count)
                .map(|i| task_row(column.id, &format!("{name} {}", i + 1), i as i32))
                .collect();
            seeded.columns.push(column.id);
            seeded.tasks.push(tasks.iter().map(|task| task.id).collect());
            state.tasks.extend(tasks);
            state.columns.push(column);
        }
        state.projects.push(project);
        state.boards.push(board);
        seeded
    }

    pub fn add_profile(&self, full_name: Option<&str>) -> UserId {
        let user_id = UserId::new_v4();
        self.lock().profiles.push(Profile {
            user_id,
            approved: true,
            full_name: full_name.map(str::to_string),
            email: None,
            avatar_url: None,
            role: ProfileRole::Client,
            created_at: None,
        });
        user_id
    }

    pub fn add_checklist_item(&self, task_id: TaskId, text: &str, completed: bool) {
        let mut state = self.lock();
        let position = state
            .checklist
            .iter()
            .filter(|item| item.task_id == task_id)
            .count() as i32;
        state.checklist.push(ChecklistItem {
            id: ChecklistItemId::new_v4(),
            task_id,
            text: text.to_string(),
            completed,
            position,
        });
    }

    pub fn fail_update_for(&self, task_id: TaskId) {
        self.lock().failing_updates.insert(task_id);
    }

    pub fn fail_reads(&self, fail: bool) {
        self.lock().fail_reads = fail;
    }

    pub fn install_gate(&self) -> ReadGate {
        let gate = ReadGate::default();
        *self.gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn remove_gate(&self) {
        *self.gate.lock().unwrap() = None;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    pub fn update_calls(&self) -> Vec<(TaskId, TaskPlacement)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::UpdateTask(task_id, placement) => Some((task_id, placement)),
                _ => None,
            })
            .collect()
    }

    pub fn board_loads(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, Call::ListColumnsWithTasks(_)))
            .count()
    }

    /// Backend-side order of a column as `(task, position)` pairs
    pub fn stored_order(&self, column_id: ColumnId) -> Vec<(TaskId, i32)> {
        let mut tasks: Vec<Task> = self
            .lock()
            .tasks
            .iter()
            .filter(|task| task.column_id == column_id)
            .cloned()
            .collect();
        tasks.sort_by_key(|task| task.position);
        tasks.iter().map(|task| (task.id, task.position)).collect()
    }

    pub fn projects(&self) -> Vec<Project> {
        self.lock().projects.clone()
    }

    pub fn boards(&self) -> Vec<Board> {
        self.lock().boards.clone()
    }

    pub fn columns_of(&self, board_id: BoardId) -> Vec<Column> {
        let mut columns: Vec<Column> = self
            .lock()
            .columns
            .iter()
            .filter(|column| column.board_id == board_id)
            .cloned()
            .collect();
        columns.sort_by_key(|column| column.position);
        columns
    }

    pub fn tasks_of(&self, column_id: ColumnId) -> Vec<Task> {
        let mut tasks: Vec<Task> = self
            .lock()
            .tasks
            .iter()
            .filter(|task| task.column_id == column_id)
            .cloned()
            .collect();
        tasks.sort_by_key(|task| task.position);
        tasks
    }

    pub fn members(&self) -> Vec<ProjectMember> {
        self.lock().members.clone()
    }

    fn record(&self, call: Call) {
        self.lock().calls.push(call);
    }

    fn check_reads(&self) -> Result<()> {
        if self.lock().fail_reads {
            return Err(api_error("read failed"));
        }
        Ok(())
    }
}

#[async_trait]
impl BoardBackend for FakeBackend {
    async fn list_columns(&self, board_id: BoardId) -> Result<Vec<Column>> {
        self.check_reads()?;
        Ok(self.columns_of(board_id))
    }

    async fn list_tasks(&self, column_ids: &[ColumnId]) -> Result<Vec<Task>> {
        self.check_reads()?;
        let mut tasks: Vec<Task> = self
            .lock()
            .tasks
            .iter()
            .filter(|task| column_ids.contains(&task.column_id))
            .cloned()
            .collect();
        tasks.sort_by_key(|task| task.position);
        Ok(tasks)
    }

    async fn list_columns_with_tasks(&self, board_id: BoardId) -> Result<Vec<ColumnWithTasks>> {
        self.record(Call::ListColumnsWithTasks(board_id));
        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.started.notify_one();
            gate.release.notified().await;
        }
        self.check_reads()?;

        Ok(self
            .columns_of(board_id)
            .into_iter()
            .map(|column| {
                let tasks = self.tasks_of(column.id);
                ColumnWithTasks { column, tasks }
            })
            .collect())
    }

    async fn list_checklist_items(&self, task_ids: &[TaskId]) -> Result<Vec<ChecklistItem>> {
        self.record(Call::ListChecklistItems(task_ids.len()));
        self.check_reads()?;
        Ok(self
            .lock()
            .checklist
            .iter()
            .filter(|item| task_ids.contains(&item.task_id))
            .cloned()
            .collect())
    }

    async fn list_task_tags(&self, task_ids: &[TaskId]) -> Result<Vec<TaskTag>> {
        self.record(Call::ListTaskTags(task_ids.len()));
        self.check_reads()?;
        Ok(self
            .lock()
            .task_tags
            .iter()
            .filter(|link| task_ids.contains(&link.task_id))
            .copied()
            .collect())
    }

    async fn update_task(&self, task_id: TaskId, placement: TaskPlacement) -> Result<()> {
        self.record(Call::UpdateTask(task_id, placement));
        // let sibling writes interleave like real requests
        tokio::task::yield_now().await;

        let mut state = self.lock();
        if state.failing_updates.contains(&task_id) {
            return Err(api_error("update rejected"));
        }
        let task = state
            .tasks
            .iter_mut()
            .find(|task| task.id == task_id)
            .ok_or_else(|| not_found("tasks", task_id))?;
        if let Some(column_id) = placement.column_id {
            task.column_id = column_id;
        }
        if let Some(position) = placement.position {
            task.position = position;
        }
        Ok(())
    }
}

#[async_trait]
impl BoardCatalog for FakeBackend {
    fn current_user(&self) -> Option<UserId> {
        self.lock().user
    }

    async fn list_projects(&self) -> Result<Vec<Project>> {
        self.check_reads()?;
        Ok(self.projects())
    }

    async fn create_project(&self, project: &NewProject) -> Result<Project> {
        self.record(Call::Write("create_project"));
        let project = Project {
            id: ProjectId::new_v4(),
            name: project.name.clone(),
            description: project.description.clone(),
            created_by: project.created_by,
            created_at: None,
            updated_at: None,
        };
        self.lock().projects.push(project.clone());
        Ok(project)
    }

    async fn rename_project(&self, project_id: ProjectId, name: &str) -> Result<()> {
        let mut state = self.lock();
        let project = state
            .projects
            .iter_mut()
            .find(|project| project.id == project_id)
            .ok_or_else(|| not_found("projects", project_id))?;
        project.name = name.to_string();
        Ok(())
    }

    async fn delete_project(&self, project_id: ProjectId) -> Result<()> {
        let boards: Vec<BoardId> = self
            .boards()
            .iter()
            .filter(|board| board.project_id == project_id)
            .map(|board| board.id)
            .collect();
        for board_id in boards {
            self.delete_board(board_id).await?;
        }
        self.lock().projects.retain(|project| project.id != project_id);
        Ok(())
    }

    async fn list_boards(&self, project_id: ProjectId) -> Result<Vec<Board>> {
        self.check_reads()?;
        Ok(self
            .boards()
            .into_iter()
            .rev()
            .filter(|board| board.project_id == project_id)
            .collect())
    }

    async fn get_board(&self, board_id: BoardId) -> Result<Board> {
        self.boards()
            .into_iter()
            .find(|board| board.id == board_id)
            .ok_or_else(|| not_found("boards", board_id))
    }

    async fn create_board(&self, board: &NewBoard) -> Result<Board> {
        self.record(Call::Write("create_board"));
        let board = Board {
            id: BoardId::new_v4(),
            name: board.name.clone(),
            project_id: board.project_id,
            created_at: None,
            updated_at: None,
        };
        self.lock().boards.push(board.clone());
        Ok(board)
    }

    async fn rename_board(&self, board_id: BoardId, name: &str) -> Result<()> {
        let mut state = self.lock();
        let board = state
            .boards
            .iter_mut()
            .find(|board| board.id == board_id)
            .ok_or_else(|| not_found("boards", board_id))?;
        board.name = name.to_string();
        Ok(())
    }

    async fn delete_board(&self, board_id: BoardId) -> Result<()> {
        self.record(Call::Write("delete_board"));
        let mut state = self.lock();
        let columns: Vec<ColumnId> = state
            .columns
            .iter()
            .filter(|column| column.board_id == board_id)
            .map(|column| column.id)
            .collect();
        state.tasks.retain(|task| !columns.contains(&task.column_id));
        state.columns.retain(|column| column.board_id != board_id);
        state.boards.retain(|board| board.id != board_id);
        Ok(())
    }

    async fn get_column(&self, column_id: ColumnId) -> Result<Column> {
        self.lock()
            .columns
            .iter()
            .find(|column| column.id == column_id)
            .cloned()
            .ok_or_else(|| not_found("board_columns", column_id))
    }

    async fn create_columns(&self, columns: &[NewColumn]) -> Result<Vec<Column>> {
        self.record(Call::Write("create_columns"));
        let created: Vec<Column> = columns
            .iter()
            .map(|column| Column {
                id: ColumnId::new_v4(),
                name: column.name.clone(),
                color: column.color.clone(),
                position: column.position,
                board_id: column.board_id,
            })
            .collect();
        self.lock().columns.extend(created.iter().cloned());
        Ok(created)
    }

    async fn set_column_position(&self, column_id: ColumnId, position: i32) -> Result<()> {
        self.record(Call::SetColumnPosition(column_id, position));
        let mut state = self.lock();
        let column = state
            .columns
            .iter_mut()
            .find(|column| column.id == column_id)
            .ok_or_else(|| not_found("board_columns", column_id))?;
        column.position = position;
        Ok(())
    }

    async fn delete_column(&self, column_id: ColumnId) -> Result<()> {
        let mut state = self.lock();
        state.tasks.retain(|task| task.column_id != column_id);
        state.columns.retain(|column| column.id != column_id);
        Ok(())
    }

    async fn get_task(&self, task_id: TaskId) -> Result<Task> {
        self.lock()
            .tasks
            .iter()
            .find(|task| task.id == task_id)
            .cloned()
            .ok_or_else(|| not_found("tasks", task_id))
    }

    async fn create_tasks(&self, tasks: &[NewTask]) -> Result<Vec<Task>> {
        self.record(Call::Write("create_tasks"));
        let created: Vec<Task> = tasks
            .iter()
            .map(|task| Task {
                id: TaskId::new_v4(),
                title: task.title.clone(),
                description: task.description.clone(),
                column_id: task.column_id,
                position: task.position,
                priority: task.priority,
                due_date: task.due_date,
                completed: task.completed,
                assigned_to: task.assigned_to,
                created_by: task.created_by,
                created_at: None,
                updated_at: None,
            })
            .collect();
        self.lock().tasks.extend(created.iter().cloned());
        Ok(created)
    }

    async fn update_task_fields(&self, task_id: TaskId, patch: &TaskPatch) -> Result<()> {
        self.record(Call::Write("update_task_fields"));
        let mut state = self.lock();
        let task = state
            .tasks
            .iter_mut()
            .find(|task| task.id == task_id)
            .ok_or_else(|| not_found("tasks", task_id))?;
        if let Some(title) = &patch.title {
            task.title = title.clone();
        }
        if let Some(description) = &patch.description {
            task.description = description.clone();
        }
        if let Some(priority) = patch.priority {
            task.priority = priority;
        }
        if let Some(due_date) = patch.due_date {
            task.due_date = due_date;
        }
        if let Some(assigned_to) = patch.assigned_to {
            task.assigned_to = assigned_to;
        }
        if let Some(completed) = patch.completed {
            task.completed = completed;
        }
        Ok(())
    }

    async fn delete_task(&self, task_id: TaskId) -> Result<()> {
        self.lock().tasks.retain(|task| task.id != task_id);
        Ok(())
    }

    async fn create_checklist_item(&self, item: &NewChecklistItem) -> Result<ChecklistItem> {
        let item = ChecklistItem {
            id: ChecklistItemId::new_v4(),
            task_id: item.task_id,
            text: item.text.clone(),
            completed: item.completed,
            position: item.position,
        };
        self.lock().checklist.push(item.clone());
        Ok(item)
    }

    async fn set_checklist_item_completed(
        &self,
        item_id: ChecklistItemId,
        completed: bool,
    ) -> Result<()> {
        let mut state = self.lock();
        let item = state
            .checklist
            .iter_mut()
            .find(|item| item.id == item_id)
            .ok_or_else(|| not_found("task_checklist_items", item_id))?;
        item.completed = completed;
        Ok(())
    }

    async fn delete_checklist_item(&self, item_id: ChecklistItemId) -> Result<()> {
        self.lock().checklist.retain(|item| item.id != item_id);
        Ok(())
    }

    async fn list_tags(&self, project_id: ProjectId) -> Result<Vec<Tag>> {
        Ok(self
            .lock()
            .tags
            .iter()
            .filter(|tag| tag.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn create_tag(&self, tag: &NewTag) -> Result<Tag> {
        let tag = Tag {
            id: TagId::new_v4(),
            name: tag.name.clone(),
            color: tag.color.clone(),
            project_id: tag.project_id,
        };
        self.lock().tags.push(tag.clone());
        Ok(tag)
    }

    async fn attach_tag(&self, task_id: TaskId, tag_id: TagId) -> Result<()> {
        self.lock().task_tags.push(TaskTag { task_id, tag_id });
        Ok(())
    }

    async fn detach_tag(&self, task_id: TaskId, tag_id: TagId) -> Result<()> {
        self.lock()
            .task_tags
            .retain(|link| !(link.task_id == task_id && link.tag_id == tag_id));
        Ok(())
    }

    async fn list_project_members(&self, project_id: ProjectId) -> Result<Vec<ProjectMember>> {
        Ok(self
            .members()
            .into_iter()
            .filter(|member| member.project_id == project_id)
            .collect())
    }

    async fn list_profiles(&self, user_ids: &[UserId]) -> Result<Vec<Profile>> {
        Ok(self
            .lock()
            .profiles
            .iter()
            .filter(|profile| user_ids.contains(&profile.user_id))
            .cloned()
            .collect())
    }

    async fn find_profile_by_name(&self, full_name: &str) -> Result<Option<Profile>> {
        Ok(self
            .lock()
            .profiles
            .iter()
            .find(|profile| profile.full_name.as_deref() == Some(full_name))
            .cloned())
    }

    async fn add_project_member(&self, member: &NewProjectMember) -> Result<ProjectMember> {
        self.record(Call::Write("add_project_member"));
        let member = ProjectMember {
            id: MemberId::new_v4(),
            project_id: member.project_id,
            user_id: member.user_id,
            role: Some(member.role.clone()),
        };
        self.lock().members.push(member.clone());
        Ok(member)
    }

    async fn remove_project_member(&self, member_id: MemberId) -> Result<()> {
        self.lock().members.retain(|member| member.id != member_id);
        Ok(())
    }
}

pub fn workspace(
    backend: &Arc<FakeBackend>,
) -> (
    ProjectWorkspace<FakeBackend>,
    mpsc::UnboundedReceiver<Notification>,
) {
    let (notifier, rx) = Notifier::channel();
    let workspace = ProjectWorkspace::new(backend.clone(), notifier, BoardConfig::default());
    (workspace, rx)
}

/// Everything queued so far, without waiting
pub fn drain(rx: &mut mpsc::UnboundedReceiver<Notification>) -> Vec<Notification> {
    let mut notifications = Vec::new();
    while let Ok(notification) = rx.try_recv() {
        notifications.push(notification);
    }
    notifications
}

/// Positions of every column equal `0..n`.
pub fn assert_contiguous(backend: &FakeBackend, columns: &[ColumnId]) {
    for column_id in columns {
        let positions: Vec<i32> = backend
            .stored_order(*column_id)
            .into_iter()
            .map(|(_, position)| position)
            .collect();
        let expected: Vec<i32> = (0..positions.len() as i32).collect();
        assert_eq!(positions, expected, "column {column_id} is not contiguous");
    }
}
