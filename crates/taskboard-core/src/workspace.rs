/*
[INPUT]:  `BoardCatalog` backend, board defaults from config, user actions
[OUTPUT]: Project, board, column, task, checklist, tag and member workflows
[POS]:    Application layer - every mutation reloads the selected board afterwards
[UPDATE]: When adding a workflow or changing copy/position rules
*/

use std::collections::HashMap;
use std::sync::Arc;

use futures_util::future::join_all;
use thiserror::Error;
use uuid::Uuid;

use taskboard_adapter::{
    Board, BoardBackend, BoardCatalog, BoardId, ChecklistItem, ChecklistItemId, Column, ColumnId,
    MemberId, NewBoard, NewChecklistItem, NewColumn, NewProject, NewProjectMember, NewTag,
    NewTask, Project, ProjectId, ProjectMember, Tag, TagId, Task, TaskId, TaskPatch,
    TaskboardError, UserId,
};

use crate::config::{BoardConfig, is_hex_color};
use crate::notify::Notifier;
use crate::reorder::DropTarget;
use crate::snapshot::BoardSnapshot;
use crate::store::{BoardStore, FetchError, LoadOutcome};
use crate::sync::{MoveOutcome, PersistenceSynchronizer, SyncError};

/// Role given to users a project is shared with.
pub const SHARED_MEMBER_ROLE: &str = "client";

/// Shown for members whose profile row is missing or hidden.
pub const UNKNOWN_USER: &str = "Unknown user";

#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error(transparent)]
    Backend(#[from] TaskboardError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Sync(#[from] SyncError),
    #[error("you need to be signed in to {0}")]
    NotSignedIn(&'static str),
    #[error("no board is selected")]
    NoBoardSelected,
    #[error("column {0} is not on the selected board")]
    UnknownColumn(ColumnId),
    #[error("{0}")]
    InvalidInput(String),
    #[error("no user named {0:?}; use the full name as registered")]
    UnknownUser(String),
    #[error("{0} already has access to this project")]
    AlreadyMember(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnDirection {
    Left,
    Right,
}

/// A project member with the display fields of their profile.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberWithProfile {
    pub member: ProjectMember,
    pub full_name: String,
    pub avatar_url: Option<String>,
}

/// Split pasted text into task titles.
///
/// A single non-empty line is one title, kept verbatim apart from
/// surrounding whitespace. Several lines become one title each, with
/// checklist and list markers (`[ ]`, `[x]`, `- [ ]`, `*`, `-`, `1.`)
/// stripped; lines left empty are skipped.
pub fn parse_batch_titles(text: &str) -> Vec<String> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    if lines.len() <= 1 {
        return lines.into_iter().map(str::to_string).collect();
    }

    lines
        .into_iter()
        .map(strip_list_marker)
        .filter(|title| !title.is_empty())
        .map(str::to_string)
        .collect()
}

fn strip_list_marker(line: &str) -> &str {
    let line = strip_checkbox(line).unwrap_or(line);
    let line = line
        .strip_prefix('-')
        .and_then(|rest| strip_checkbox(rest.trim_start()))
        .unwrap_or(line);
    let line = line.strip_prefix('*').map(str::trim_start).unwrap_or(line);
    let line = line.strip_prefix('-').map(str::trim_start).unwrap_or(line);
    let line = strip_ordinal(line).unwrap_or(line);
    line.trim()
}

/// `[ ]`, `[x]`, `[X]` with optional inner spaces
fn strip_checkbox(line: &str) -> Option<&str> {
    let rest = line.strip_prefix('[')?.trim_start();
    let rest = rest.strip_prefix(['x', 'X']).unwrap_or(rest).trim_start();
    rest.strip_prefix(']').map(str::trim_start)
}

/// `12.` style ordinals
fn strip_ordinal(line: &str) -> Option<&str> {
    let digits = line.len() - line.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        return None;
    }
    line[digits..].strip_prefix('.').map(str::trim_start)
}

/// Owns the store, synchronizer and notifier for one signed-in session.
pub struct ProjectWorkspace<C: BoardCatalog + 'static> {
    catalog: Arc<C>,
    store: BoardStore,
    sync: PersistenceSynchronizer,
    notifier: Notifier,
    board: BoardConfig,
}

impl<C: BoardCatalog + 'static> ProjectWorkspace<C> {
    pub fn new(catalog: Arc<C>, notifier: Notifier, board: BoardConfig) -> Self {
        let backend: Arc<dyn BoardBackend> = catalog.clone();
        let store = BoardStore::new(backend.clone());
        let sync = PersistenceSynchronizer::new(backend, store.clone(), notifier.clone());
        Self {
            catalog,
            store,
            sync,
            notifier,
            board,
        }
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn store(&self) -> &BoardStore {
        &self.store
    }

    // ---- projects ----

    pub async fn list_projects(&self) -> Result<Vec<Project>, WorkspaceError> {
        self.check("Could not load projects", self.catalog.list_projects().await)
    }

    pub async fn create_project(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> Result<Project, WorkspaceError> {
        const FAILED: &str = "Could not create project";
        let user = self.require_user(FAILED, "create projects")?;
        let name = self.required_text(FAILED, name, "project name")?;

        let project = NewProject {
            name,
            description: description
                .map(str::trim)
                .filter(|text| !text.is_empty())
                .map(str::to_string),
            created_by: Some(user),
        };
        let project = self.check(FAILED, self.catalog.create_project(&project).await)?;
        self.notifier
            .success("Project created", format!("\"{}\" was created", project.name));
        Ok(project)
    }

    pub async fn rename_project(
        &self,
        project_id: ProjectId,
        name: &str,
    ) -> Result<(), WorkspaceError> {
        const FAILED: &str = "Could not rename project";
        let name = self.required_text(FAILED, name, "project name")?;
        self.check(FAILED, self.catalog.rename_project(project_id, &name).await)?;
        self.notifier.success("Project renamed", name);
        Ok(())
    }

    /// Delete a project; the store is cleared if it shows one of its boards.
    pub async fn delete_project(&self, project_id: ProjectId) -> Result<(), WorkspaceError> {
        const FAILED: &str = "Could not delete project";
        let boards = self.check(FAILED, self.catalog.list_boards(project_id).await)?;
        self.check(FAILED, self.catalog.delete_project(project_id).await)?;

        if let Some(selected) = self.store.board_id() {
            if boards.iter().any(|board| board.id == selected) {
                self.store.clear();
            }
        }
        self.notifier.success("Project deleted", project_id.to_string());
        Ok(())
    }

    /// Deep-copy a project: every board with its columns and tasks.
    pub async fn duplicate_project(&self, project_id: ProjectId) -> Result<Project, WorkspaceError> {
        const FAILED: &str = "Could not duplicate project";
        let user = self.require_user(FAILED, "duplicate projects")?;

        let projects = self.check(FAILED, self.catalog.list_projects().await)?;
        let original = projects
            .into_iter()
            .find(|project| project.id == project_id)
            .ok_or_else(|| TaskboardError::NotFound {
                table: "projects",
                id: project_id.to_string(),
            });
        let original = self.check(FAILED, original)?;

        let copy = NewProject {
            name: format!("{}{}", original.name, self.board.copy_suffix),
            description: original.description.clone(),
            created_by: Some(user),
        };
        let copy = self.check(FAILED, self.catalog.create_project(&copy).await)?;

        let boards = self.check(FAILED, self.catalog.list_boards(project_id).await)?;
        for board in boards {
            let new_board = NewBoard {
                name: board.name.clone(),
                project_id: copy.id,
            };
            let new_board = self.check(FAILED, self.catalog.create_board(&new_board).await)?;
            let copied = self.copy_board_contents(board.id, new_board.id, user).await;
            self.check(FAILED, copied)?;
        }

        self.notifier.success(
            "Project duplicated",
            format!("\"{}\" was duplicated", original.name),
        );
        Ok(copy)
    }

    // ---- boards ----

    /// Boards of a project, newest first
    pub async fn list_boards(&self, project_id: ProjectId) -> Result<Vec<Board>, WorkspaceError> {
        self.check("Could not load boards", self.catalog.list_boards(project_id).await)
    }

    /// Make a board the one the store shows.
    pub async fn select_board(&self, board_id: BoardId) -> Result<LoadOutcome, WorkspaceError> {
        Ok(self.sync.reload(board_id).await?)
    }

    /// Create a board with the configured default columns.
    pub async fn create_board(
        &self,
        project_id: ProjectId,
        name: &str,
    ) -> Result<Board, WorkspaceError> {
        const FAILED: &str = "Could not create board";
        let name = self.required_text(FAILED, name, "board name")?;

        let board = NewBoard { name, project_id };
        let board = self.check(FAILED, self.catalog.create_board(&board).await)?;

        let columns: Vec<NewColumn> = self
            .board
            .default_columns
            .iter()
            .enumerate()
            .map(|(position, template)| NewColumn {
                name: template.name.clone(),
                color: template.color.clone(),
                position: position as i32,
                board_id: board.id,
            })
            .collect();
        if !columns.is_empty() {
            self.check(FAILED, self.catalog.create_columns(&columns).await)?;
        }

        self.notifier
            .success("Board created", format!("\"{}\" was created", board.name));
        Ok(board)
    }

    pub async fn rename_board(&self, board_id: BoardId, name: &str) -> Result<(), WorkspaceError> {
        const FAILED: &str = "Could not rename board";
        let name = self.required_text(FAILED, name, "board name")?;
        self.check(FAILED, self.catalog.rename_board(board_id, &name).await)?;
        self.notifier.success("Board renamed", name);
        Ok(())
    }

    /// Delete a board; the store is cleared if it was the selected one.
    pub async fn delete_board(&self, board_id: BoardId) -> Result<(), WorkspaceError> {
        self.check(
            "Could not delete board",
            self.catalog.delete_board(board_id).await,
        )?;
        if self.store.board_id() == Some(board_id) {
            self.store.clear();
        }
        self.notifier.success("Board deleted", board_id.to_string());
        Ok(())
    }

    /// Copy a board into the same project under a suffixed name.
    pub async fn duplicate_board(&self, board_id: BoardId) -> Result<Board, WorkspaceError> {
        const FAILED: &str = "Could not duplicate board";
        let user = self.require_user(FAILED, "duplicate boards")?;

        let original = self.check(FAILED, self.catalog.get_board(board_id).await)?;
        let copy = NewBoard {
            name: format!("{}{}", original.name, self.board.copy_suffix),
            project_id: original.project_id,
        };
        let copy = self.check(FAILED, self.catalog.create_board(&copy).await)?;
        let copied = self.copy_board_contents(original.id, copy.id, user).await;
        self.check(FAILED, copied)?;

        self.notifier.success(
            "Board duplicated",
            format!("\"{}\" was duplicated", original.name),
        );
        Ok(copy)
    }

    // ---- columns ----

    /// Append a column to the selected board.
    pub async fn create_column(&self, name: &str, color: &str) -> Result<Column, WorkspaceError> {
        const FAILED: &str = "Could not create column";
        let name = self.required_text(FAILED, name, "column name")?;
        let color = color.trim();
        if !is_hex_color(color) {
            return self.fail(
                FAILED,
                WorkspaceError::InvalidInput(format!("{color:?} is not a #rrggbb color")),
            );
        }
        let snapshot = self.selected(FAILED)?;

        let column = NewColumn {
            name,
            color: color.to_string(),
            position: next_position(snapshot.columns().iter().map(|column| column.position)),
            board_id: snapshot.board_id(),
        };
        let created = self.check(FAILED, self.catalog.create_columns(&[column]).await)?;
        let created = self.check(FAILED, first_created("board_columns", created))?;

        self.notifier
            .success("Column created", format!("\"{}\" was created", created.name));
        self.reload_selected().await?;
        Ok(created)
    }

    /// Copy a column and its tasks to the end of the selected board.
    pub async fn duplicate_column(&self, column_id: ColumnId) -> Result<Column, WorkspaceError> {
        const FAILED: &str = "Could not duplicate column";
        let snapshot = self.selected(FAILED)?;
        let user = self.catalog.current_user();

        let original = self.check(FAILED, self.catalog.get_column(column_id).await)?;
        let copy = NewColumn {
            name: format!("{}{}", original.name, self.board.copy_suffix),
            color: original.color.clone(),
            position: next_position(snapshot.columns().iter().map(|column| column.position)),
            board_id: snapshot.board_id(),
        };
        let created = self.check(FAILED, self.catalog.create_columns(&[copy]).await)?;
        let created = self.check(FAILED, first_created("board_columns", created))?;

        let tasks = self.check(FAILED, self.catalog.list_tasks(&[column_id]).await)?;
        let copies: Vec<NewTask> = tasks
            .iter()
            .map(|task| copy_of(task, created.id, task.position, user.or(task.created_by)))
            .collect();
        if !copies.is_empty() {
            self.check(FAILED, self.catalog.create_tasks(&copies).await)?;
        }

        self.notifier.success(
            "Column duplicated",
            format!("\"{}\" was duplicated", original.name),
        );
        self.reload_selected().await?;
        Ok(created)
    }

    /// Delete a column; its tasks go with it on the backend.
    pub async fn delete_column(&self, column_id: ColumnId) -> Result<(), WorkspaceError> {
        self.check(
            "Could not delete column",
            self.catalog.delete_column(column_id).await,
        )?;
        self.notifier.success("Column deleted", column_id.to_string());
        self.reload_selected().await?;
        Ok(())
    }

    /// Swap a column with its neighbour and renumber the board. Returns false at the board edge.
    pub async fn move_column(
        &self,
        column_id: ColumnId,
        direction: ColumnDirection,
    ) -> Result<bool, WorkspaceError> {
        const FAILED: &str = "Could not move column";
        let snapshot = self.selected(FAILED)?;
        let columns = snapshot.columns();
        let Some(index) = columns.iter().position(|column| column.id == column_id) else {
            return self.fail(FAILED, WorkspaceError::UnknownColumn(column_id));
        };

        let neighbour = match direction {
            ColumnDirection::Left => index.checked_sub(1),
            ColumnDirection::Right => Some(index + 1).filter(|next| *next < columns.len()),
        };
        let Some(neighbour) = neighbour else {
            return Ok(false);
        };

        // rewrite positions as 0..n in the swapped order
        let mut order: Vec<&Column> = columns.iter().collect();
        order.swap(index, neighbour);
        let writes = order
            .iter()
            .zip(0..)
            .filter(|(column, position)| column.position != *position)
            .map(|(column, position)| self.catalog.set_column_position(column.id, position));
        let results = join_all(writes).await;
        self.reload_selected().await?;
        for result in results {
            self.check(FAILED, result)?;
        }
        Ok(true)
    }

    // ---- tasks ----

    /// Create one task, or one per line for multi-line text, at the end
    /// of a column.
    pub async fn create_tasks(
        &self,
        column_id: ColumnId,
        text: &str,
    ) -> Result<Vec<Task>, WorkspaceError> {
        const FAILED: &str = "Could not create task";
        let user = self.require_user(FAILED, "create tasks")?;
        let titles = parse_batch_titles(text);
        if titles.is_empty() {
            return self.fail(
                FAILED,
                WorkspaceError::InvalidInput("task title cannot be empty".to_string()),
            );
        }

        let start = self.next_task_position(FAILED, column_id).await?;
        let tasks: Vec<NewTask> = titles
            .into_iter()
            .enumerate()
            .map(|(offset, title)| NewTask {
                created_by: Some(user),
                ..NewTask::titled(title, column_id, start + offset as i32)
            })
            .collect();
        let created = self.check(FAILED, self.catalog.create_tasks(&tasks).await)?;

        match created.as_slice() {
            [single] => self
                .notifier
                .success("Task created", format!("\"{}\" was created", single.title)),
            many => self.notifier.success(
                "Batch creation complete",
                format!("{} tasks were created", many.len()),
            ),
        }
        self.reload_selected().await?;
        Ok(created)
    }

    /// Copy a task to the end of its column, incomplete.
    pub async fn duplicate_task(&self, task_id: TaskId) -> Result<Task, WorkspaceError> {
        const FAILED: &str = "Could not duplicate task";
        let user = self.require_user(FAILED, "duplicate tasks")?;

        let original = self.check(FAILED, self.catalog.get_task(task_id).await)?;
        let position = self.next_task_position(FAILED, original.column_id).await?;
        let mut copy = copy_of(&original, original.column_id, position, Some(user));
        copy.title = format!("{}{}", original.title, self.board.copy_suffix);

        let created = self.check(FAILED, self.catalog.create_tasks(&[copy]).await)?;
        let created = self.check(FAILED, first_created("tasks", created))?;
        self.notifier.success(
            "Task duplicated",
            format!("\"{}\" was duplicated", original.title),
        );
        self.reload_selected().await?;
        Ok(created)
    }

    pub async fn delete_task(&self, task_id: TaskId) -> Result<(), WorkspaceError> {
        self.check("Could not delete task", self.catalog.delete_task(task_id).await)?;
        self.notifier.success("Task deleted", task_id.to_string());
        self.reload_selected().await?;
        Ok(())
    }

    /// Edit title, description, priority, due date or assignee.
    pub async fn update_task(
        &self,
        task_id: TaskId,
        mut patch: TaskPatch,
    ) -> Result<(), WorkspaceError> {
        const FAILED: &str = "Could not update task";
        if let Some(title) = patch.title.take() {
            patch.title = Some(self.required_text(FAILED, &title, "task title")?);
        }
        if patch.is_empty() {
            return Ok(());
        }

        self.check(FAILED, self.catalog.update_task_fields(task_id, &patch).await)?;
        self.notifier.success("Task updated", "Changes were saved");
        self.reload_selected().await?;
        Ok(())
    }

    pub async fn set_task_completed(
        &self,
        task_id: TaskId,
        completed: bool,
    ) -> Result<(), WorkspaceError> {
        let patch = TaskPatch {
            completed: Some(completed),
            ..TaskPatch::default()
        };
        self.check(
            "Could not update task",
            self.catalog.update_task_fields(task_id, &patch).await,
        )?;
        self.reload_selected().await?;
        Ok(())
    }

    /// Drag-end on the selected board.
    pub async fn move_task(
        &self,
        active: TaskId,
        over: DropTarget,
    ) -> Result<MoveOutcome, WorkspaceError> {
        Ok(self.sync.handle_drag_end(active, over).await?)
    }

    /// Drag-end with the drop target given as a bare id.
    pub async fn move_task_raw(
        &self,
        active: TaskId,
        over: Uuid,
    ) -> Result<MoveOutcome, WorkspaceError> {
        Ok(self.sync.handle_drag_end_raw(active, over).await?)
    }

    // ---- checklist ----

    pub async fn add_checklist_item(
        &self,
        task_id: TaskId,
        text: &str,
    ) -> Result<ChecklistItem, WorkspaceError> {
        const FAILED: &str = "Could not add item";
        let text = self.required_text(FAILED, text, "checklist item")?;
        let position = self.store.snapshot().map_or(0, |snapshot| {
            next_position(snapshot.checklist(task_id).iter().map(|item| item.position))
        });

        let item = NewChecklistItem {
            task_id,
            text,
            position,
            completed: false,
        };
        let item = self.check(FAILED, self.catalog.create_checklist_item(&item).await)?;
        self.notifier.success("Item added", item.text.clone());
        self.reload_selected().await?;
        Ok(item)
    }

    pub async fn set_checklist_item_completed(
        &self,
        item_id: ChecklistItemId,
        completed: bool,
    ) -> Result<(), WorkspaceError> {
        self.check(
            "Could not update item",
            self.catalog
                .set_checklist_item_completed(item_id, completed)
                .await,
        )?;
        self.reload_selected().await?;
        Ok(())
    }

    pub async fn delete_checklist_item(
        &self,
        item_id: ChecklistItemId,
    ) -> Result<(), WorkspaceError> {
        self.check(
            "Could not delete item",
            self.catalog.delete_checklist_item(item_id).await,
        )?;
        self.reload_selected().await?;
        Ok(())
    }

    // ---- tags ----

    pub async fn list_tags(&self, project_id: ProjectId) -> Result<Vec<Tag>, WorkspaceError> {
        self.check("Could not load tags", self.catalog.list_tags(project_id).await)
    }

    pub async fn create_tag(
        &self,
        project_id: ProjectId,
        name: &str,
        color: &str,
    ) -> Result<Tag, WorkspaceError> {
        const FAILED: &str = "Could not create tag";
        let name = self.required_text(FAILED, name, "tag name")?;
        if !is_hex_color(color.trim()) {
            return self.fail(
                FAILED,
                WorkspaceError::InvalidInput(format!("{color:?} is not a #rrggbb color")),
            );
        }

        let tag = NewTag {
            name,
            color: color.trim().to_string(),
            project_id,
        };
        let tag = self.check(FAILED, self.catalog.create_tag(&tag).await)?;
        self.notifier.success("Tag created", tag.name.clone());
        Ok(tag)
    }

    pub async fn attach_tag(&self, task_id: TaskId, tag_id: TagId) -> Result<(), WorkspaceError> {
        self.check(
            "Could not add tag",
            self.catalog.attach_tag(task_id, tag_id).await,
        )?;
        self.reload_selected().await?;
        Ok(())
    }

    pub async fn detach_tag(&self, task_id: TaskId, tag_id: TagId) -> Result<(), WorkspaceError> {
        self.check(
            "Could not remove tag",
            self.catalog.detach_tag(task_id, tag_id).await,
        )?;
        self.reload_selected().await?;
        Ok(())
    }

    // ---- members ----

    pub async fn list_members(
        &self,
        project_id: ProjectId,
    ) -> Result<Vec<MemberWithProfile>, WorkspaceError> {
        const FAILED: &str = "Could not load members";
        let members = self.check(FAILED, self.catalog.list_project_members(project_id).await)?;
        let user_ids: Vec<UserId> = members.iter().map(|member| member.user_id).collect();
        let profiles = self.check(FAILED, self.catalog.list_profiles(&user_ids).await)?;
        let mut profiles: HashMap<UserId, _> = profiles
            .into_iter()
            .map(|profile| (profile.user_id, profile))
            .collect();

        Ok(members
            .into_iter()
            .map(|member| {
                let profile = profiles.remove(&member.user_id);
                MemberWithProfile {
                    full_name: profile
                        .as_ref()
                        .and_then(|profile| profile.full_name.clone())
                        .unwrap_or_else(|| UNKNOWN_USER.to_string()),
                    avatar_url: profile.and_then(|profile| profile.avatar_url),
                    member,
                }
            })
            .collect())
    }

    /// Give a user, looked up by full name, access to a project.
    pub async fn share_project(
        &self,
        project_id: ProjectId,
        full_name: &str,
    ) -> Result<ProjectMember, WorkspaceError> {
        const FAILED: &str = "Could not share project";
        let full_name = self.required_text(FAILED, full_name, "user name")?;

        let profile = self.check(FAILED, self.catalog.find_profile_by_name(&full_name).await)?;
        let Some(profile) = profile else {
            return self.fail(FAILED, WorkspaceError::UnknownUser(full_name));
        };

        let members = self.check(FAILED, self.catalog.list_project_members(project_id).await)?;
        if members.iter().any(|member| member.user_id == profile.user_id) {
            return self.fail(FAILED, WorkspaceError::AlreadyMember(full_name));
        }

        let member = NewProjectMember {
            project_id,
            user_id: profile.user_id,
            role: SHARED_MEMBER_ROLE.to_string(),
        };
        let member = self.check(FAILED, self.catalog.add_project_member(&member).await)?;
        self.notifier
            .success("Project shared", format!("{full_name} was added to the project"));
        Ok(member)
    }

    pub async fn remove_member(&self, member_id: MemberId) -> Result<(), WorkspaceError> {
        self.check(
            "Could not remove member",
            self.catalog.remove_project_member(member_id).await,
        )?;
        self.notifier
            .success("Member removed", "The user no longer has access");
        Ok(())
    }

    // ---- helpers ----

    /// Copy columns (same positions) and tasks (same positions, reset to
    /// incomplete, created by `user`) from one board into another.
    async fn copy_board_contents(
        &self,
        source: BoardId,
        target: BoardId,
        user: UserId,
    ) -> Result<(), TaskboardError> {
        let columns = self.catalog.list_columns(source).await?;
        if columns.is_empty() {
            return Ok(());
        }

        let copies: Vec<NewColumn> = columns
            .iter()
            .map(|column| NewColumn {
                name: column.name.clone(),
                color: column.color.clone(),
                position: column.position,
                board_id: target,
            })
            .collect();
        let created = self.catalog.create_columns(&copies).await?;
        if created.len() != columns.len() {
            return Err(TaskboardError::InvalidResponse(format!(
                "expected {} copied columns, got {}",
                columns.len(),
                created.len()
            )));
        }
        let mapping: HashMap<ColumnId, ColumnId> = columns
            .iter()
            .zip(&created)
            .map(|(old, new)| (old.id, new.id))
            .collect();

        let column_ids: Vec<ColumnId> = columns.iter().map(|column| column.id).collect();
        let tasks = self.catalog.list_tasks(&column_ids).await?;
        let copies: Vec<NewTask> = tasks
            .iter()
            .filter_map(|task| {
                let column_id = mapping.get(&task.column_id)?;
                Some(copy_of(task, *column_id, task.position, Some(user)))
            })
            .collect();
        if !copies.is_empty() {
            self.catalog.create_tasks(&copies).await?;
        }
        Ok(())
    }

    async fn next_task_position(
        &self,
        failed: &'static str,
        column_id: ColumnId,
    ) -> Result<i32, WorkspaceError> {
        if let Some(snapshot) = self.store.snapshot() {
            if snapshot.has_column(column_id) {
                return Ok(next_position(
                    snapshot.tasks_in(column_id).iter().map(|task| task.position),
                ));
            }
        }
        let tasks = self.check(failed, self.catalog.list_tasks(&[column_id]).await)?;
        Ok(next_position(tasks.iter().map(|task| task.position)))
    }

    async fn reload_selected(&self) -> Result<(), WorkspaceError> {
        if let Some(board_id) = self.store.board_id() {
            self.sync.reload(board_id).await?;
        }
        Ok(())
    }

    fn selected(&self, failed: &'static str) -> Result<BoardSnapshot, WorkspaceError> {
        match self.store.snapshot() {
            Some(snapshot) => Ok(snapshot),
            None => self.fail(failed, WorkspaceError::NoBoardSelected),
        }
    }

    fn require_user(
        &self,
        failed: &'static str,
        action: &'static str,
    ) -> Result<UserId, WorkspaceError> {
        match self.catalog.current_user() {
            Some(user) => Ok(user),
            None => self.fail(failed, WorkspaceError::NotSignedIn(action)),
        }
    }

    fn required_text(
        &self,
        failed: &'static str,
        value: &str,
        field: &str,
    ) -> Result<String, WorkspaceError> {
        let value = value.trim();
        if value.is_empty() {
            return self.fail(
                failed,
                WorkspaceError::InvalidInput(format!("{field} cannot be empty")),
            );
        }
        Ok(value.to_string())
    }

    fn check<T, E>(&self, failed: &str, result: Result<T, E>) -> Result<T, WorkspaceError>
    where
        E: Into<WorkspaceError>,
    {
        result.or_else(|error| self.fail(failed, error.into()))
    }

    fn fail<T>(&self, failed: &str, error: WorkspaceError) -> Result<T, WorkspaceError> {
        self.notifier.error(failed, &error);
        Err(error)
    }
}

fn copy_of(task: &Task, column_id: ColumnId, position: i32, created_by: Option<UserId>) -> NewTask {
    NewTask {
        title: task.title.clone(),
        description: task.description.clone(),
        column_id,
        position,
        priority: task.priority,
        due_date: task.due_date,
        completed: false,
        assigned_to: None,
        created_by,
    }
}

/// One past the highest position, or 0 when nothing is there yet.
fn next_position(positions: impl Iterator<Item = i32>) -> i32 {
    positions.max().map_or(0, |highest| highest + 1)
}

fn first_created<T>(table: &'static str, rows: Vec<T>) -> Result<T, TaskboardError> {
    rows.into_iter()
        .next()
        .ok_or_else(|| TaskboardError::InvalidResponse(format!("insert into {table} returned no rows")))
}
