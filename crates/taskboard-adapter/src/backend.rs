/*
[INPUT]:  Board, column and task identifiers from the synchronization core
[OUTPUT]: Backing-store operations behind object-safe async traits
[POS]:    Seam between the core and the hosted backend (REST client or fakes)
[UPDATE]: When the core needs a new backing-store operation
*/

use async_trait::async_trait;
use std::collections::HashMap;

use crate::http::{Result, TaskboardClient};
use crate::types::{
    Board, BoardId, ChecklistItem, ChecklistItemId, Column, ColumnId, ColumnWithTasks, MemberId,
    NewBoard, NewChecklistItem, NewColumn, NewProject, NewProjectMember, NewTag, NewTask, Profile,
    Project, ProjectId, ProjectMember, Tag, TagId, Task, TaskId, TaskPatch, TaskPlacement,
    TaskTag, UserId,
};

/// Reads and the single write the board synchronization core relies on.
///
/// Authorization is the backend's job; every call runs as whatever
/// principal the implementation was signed in with.
#[async_trait]
pub trait BoardBackend: Send + Sync {
    /// Columns of a board ordered by position
    async fn list_columns(&self, board_id: BoardId) -> Result<Vec<Column>>;

    /// Tasks of the given columns ordered by position
    async fn list_tasks(&self, column_ids: &[ColumnId]) -> Result<Vec<Task>>;

    /// Columns with their tasks attached.
    ///
    /// The default issues the two reads above; backends that can join
    /// server-side override it to save a round trip.
    async fn list_columns_with_tasks(&self, board_id: BoardId) -> Result<Vec<ColumnWithTasks>> {
        let columns = self.list_columns(board_id).await?;
        let column_ids: Vec<ColumnId> = columns.iter().map(|column| column.id).collect();
        let tasks = self.list_tasks(&column_ids).await?;

        let mut by_column: HashMap<ColumnId, Vec<Task>> = HashMap::new();
        for task in tasks {
            by_column.entry(task.column_id).or_default().push(task);
        }

        Ok(columns
            .into_iter()
            .map(|column| {
                let tasks = by_column.remove(&column.id).unwrap_or_default();
                ColumnWithTasks { column, tasks }
            })
            .collect())
    }

    async fn list_checklist_items(&self, task_ids: &[TaskId]) -> Result<Vec<ChecklistItem>>;

    async fn list_task_tags(&self, task_ids: &[TaskId]) -> Result<Vec<TaskTag>>;

    /// Write a task's column and/or position
    async fn update_task(&self, task_id: TaskId, placement: TaskPlacement) -> Result<()>;
}

/// Create/rename/delete operations behind the project and board workflows.
#[async_trait]
pub trait BoardCatalog: BoardBackend {
    /// Principal the backend acts as, if signed in
    fn current_user(&self) -> Option<UserId>;

    async fn list_projects(&self) -> Result<Vec<Project>>;
    async fn create_project(&self, project: &NewProject) -> Result<Project>;
    async fn rename_project(&self, project_id: ProjectId, name: &str) -> Result<()>;
    async fn delete_project(&self, project_id: ProjectId) -> Result<()>;

    /// Boards of a project, newest first
    async fn list_boards(&self, project_id: ProjectId) -> Result<Vec<Board>>;
    async fn get_board(&self, board_id: BoardId) -> Result<Board>;
    async fn create_board(&self, board: &NewBoard) -> Result<Board>;
    async fn rename_board(&self, board_id: BoardId, name: &str) -> Result<()>;
    async fn delete_board(&self, board_id: BoardId) -> Result<()>;

    async fn get_column(&self, column_id: ColumnId) -> Result<Column>;
    async fn create_columns(&self, columns: &[NewColumn]) -> Result<Vec<Column>>;
    async fn set_column_position(&self, column_id: ColumnId, position: i32) -> Result<()>;
    async fn delete_column(&self, column_id: ColumnId) -> Result<()>;

    async fn get_task(&self, task_id: TaskId) -> Result<Task>;
    async fn create_tasks(&self, tasks: &[NewTask]) -> Result<Vec<Task>>;
    async fn update_task_fields(&self, task_id: TaskId, patch: &TaskPatch) -> Result<()>;
    async fn delete_task(&self, task_id: TaskId) -> Result<()>;

    async fn create_checklist_item(&self, item: &NewChecklistItem) -> Result<ChecklistItem>;
    async fn set_checklist_item_completed(
        &self,
        item_id: ChecklistItemId,
        completed: bool,
    ) -> Result<()>;
    async fn delete_checklist_item(&self, item_id: ChecklistItemId) -> Result<()>;

    async fn list_tags(&self, project_id: ProjectId) -> Result<Vec<Tag>>;
    async fn create_tag(&self, tag: &NewTag) -> Result<Tag>;
    async fn attach_tag(&self, task_id: TaskId, tag_id: TagId) -> Result<()>;
    async fn detach_tag(&self, task_id: TaskId, tag_id: TagId) -> Result<()>;

    async fn list_project_members(&self, project_id: ProjectId) -> Result<Vec<ProjectMember>>;
    async fn list_profiles(&self, user_ids: &[UserId]) -> Result<Vec<Profile>>;
    async fn find_profile_by_name(&self, full_name: &str) -> Result<Option<Profile>>;
    async fn add_project_member(&self, member: &NewProjectMember) -> Result<ProjectMember>;
    async fn remove_project_member(&self, member_id: MemberId) -> Result<()>;
}

#[async_trait]
impl BoardBackend for TaskboardClient {
    async fn list_columns(&self, board_id: BoardId) -> Result<Vec<Column>> {
        self.query_columns(board_id).await
    }

    async fn list_tasks(&self, column_ids: &[ColumnId]) -> Result<Vec<Task>> {
        self.query_tasks(column_ids).await
    }

    async fn list_columns_with_tasks(&self, board_id: BoardId) -> Result<Vec<ColumnWithTasks>> {
        self.query_columns_with_tasks(board_id).await
    }

    async fn list_checklist_items(&self, task_ids: &[TaskId]) -> Result<Vec<ChecklistItem>> {
        self.query_checklist_items(task_ids).await
    }

    async fn list_task_tags(&self, task_ids: &[TaskId]) -> Result<Vec<TaskTag>> {
        self.query_task_tags(task_ids).await
    }

    async fn update_task(&self, task_id: TaskId, placement: TaskPlacement) -> Result<()> {
        self.update_task_placement(task_id, placement).await.map(|_| ())
    }
}

#[async_trait]
impl BoardCatalog for TaskboardClient {
    fn current_user(&self) -> Option<UserId> {
        self.session().user_id()
    }

    async fn list_projects(&self) -> Result<Vec<Project>> {
        self.query_projects().await
    }

    async fn create_project(&self, project: &NewProject) -> Result<Project> {
        self.insert_project(project).await
    }

    async fn rename_project(&self, project_id: ProjectId, name: &str) -> Result<()> {
        TaskboardClient::rename_project(self, project_id, name)
            .await
            .map(|_| ())
    }

    async fn delete_project(&self, project_id: ProjectId) -> Result<()> {
        TaskboardClient::delete_project(self, project_id).await
    }

    async fn list_boards(&self, project_id: ProjectId) -> Result<Vec<Board>> {
        self.query_boards(project_id).await
    }

    async fn get_board(&self, board_id: BoardId) -> Result<Board> {
        self.query_board(board_id).await
    }

    async fn create_board(&self, board: &NewBoard) -> Result<Board> {
        self.insert_board(board).await
    }

    async fn rename_board(&self, board_id: BoardId, name: &str) -> Result<()> {
        TaskboardClient::rename_board(self, board_id, name)
            .await
            .map(|_| ())
    }

    async fn delete_board(&self, board_id: BoardId) -> Result<()> {
        TaskboardClient::delete_board(self, board_id).await
    }

    async fn get_column(&self, column_id: ColumnId) -> Result<Column> {
        self.query_column(column_id).await
    }

    async fn create_columns(&self, columns: &[NewColumn]) -> Result<Vec<Column>> {
        self.insert_columns(columns).await
    }

    async fn set_column_position(&self, column_id: ColumnId, position: i32) -> Result<()> {
        TaskboardClient::set_column_position(self, column_id, position)
            .await
            .map(|_| ())
    }

    async fn delete_column(&self, column_id: ColumnId) -> Result<()> {
        TaskboardClient::delete_column(self, column_id).await
    }

    async fn get_task(&self, task_id: TaskId) -> Result<Task> {
        self.query_task(task_id).await
    }

    async fn create_tasks(&self, tasks: &[NewTask]) -> Result<Vec<Task>> {
        self.insert_tasks(tasks).await
    }

    async fn update_task_fields(&self, task_id: TaskId, patch: &TaskPatch) -> Result<()> {
        TaskboardClient::update_task_fields(self, task_id, patch)
            .await
            .map(|_| ())
    }

    async fn delete_task(&self, task_id: TaskId) -> Result<()> {
        TaskboardClient::delete_task(self, task_id).await
    }

    async fn create_checklist_item(&self, item: &NewChecklistItem) -> Result<ChecklistItem> {
        self.insert_checklist_item(item).await
    }

    async fn set_checklist_item_completed(
        &self,
        item_id: ChecklistItemId,
        completed: bool,
    ) -> Result<()> {
        TaskboardClient::set_checklist_item_completed(self, item_id, completed)
            .await
            .map(|_| ())
    }

    async fn delete_checklist_item(&self, item_id: ChecklistItemId) -> Result<()> {
        TaskboardClient::delete_checklist_item(self, item_id).await
    }

    async fn list_tags(&self, project_id: ProjectId) -> Result<Vec<Tag>> {
        self.query_tags(project_id).await
    }

    async fn create_tag(&self, tag: &NewTag) -> Result<Tag> {
        self.insert_tag(tag).await
    }

    async fn attach_tag(&self, task_id: TaskId, tag_id: TagId) -> Result<()> {
        TaskboardClient::attach_tag(self, task_id, tag_id).await
    }

    async fn detach_tag(&self, task_id: TaskId, tag_id: TagId) -> Result<()> {
        TaskboardClient::detach_tag(self, task_id, tag_id).await
    }

    async fn list_project_members(&self, project_id: ProjectId) -> Result<Vec<ProjectMember>> {
        self.query_project_members(project_id).await
    }

    async fn list_profiles(&self, user_ids: &[UserId]) -> Result<Vec<Profile>> {
        self.query_profiles(user_ids).await
    }

    async fn find_profile_by_name(&self, full_name: &str) -> Result<Option<Profile>> {
        self.query_profile_by_name(full_name).await
    }

    async fn add_project_member(&self, member: &NewProjectMember) -> Result<ProjectMember> {
        self.insert_project_member(member).await
    }

    async fn remove_project_member(&self, member_id: MemberId) -> Result<()> {
        self.delete_project_member(member_id).await
    }
}
