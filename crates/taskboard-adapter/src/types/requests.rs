/*
[INPUT]:  Insert and update payloads for tables and auth endpoints
[OUTPUT]: Serializable request bodies; partial updates skip absent fields
[POS]:    Data layer - what the client writes
[UPDATE]: When a write starts sending a new field
*/

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::enums::Priority;
use super::ids::{BoardId, ColumnId, ProjectId, TaskId, UserId};
use super::models::serde_helpers;

/// Column + position pair written when a task is reordered or moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TaskPlacement {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_id: Option<ColumnId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<i32>,
}

impl TaskPlacement {
    pub fn new(column_id: ColumnId, position: i32) -> Self {
        Self {
            column_id: Some(column_id),
            position: Some(position),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.column_id.is_none() && self.position.is_none()
    }
}

/// Partial update of the editable task fields.
///
/// Nullable columns use `Option<Option<_>>`: the outer `None` leaves the
/// column untouched, `Some(None)` clears it.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_due_date_patch"
    )]
    pub due_date: Option<Option<NaiveDate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<Option<UserId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.priority.is_none()
            && self.due_date.is_none()
            && self.assigned_to.is_none()
            && self.completed.is_none()
    }
}

fn serialize_due_date_patch<S>(
    value: &Option<Option<NaiveDate>>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match value {
        Some(inner) => serde_helpers::lenient_date::serialize(inner, serializer),
        None => serializer.serialize_none(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProject {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<UserId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBoard {
    pub name: String,
    pub project_id: ProjectId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewColumn {
    pub name: String,
    pub color: String,
    pub position: i32,
    pub board_id: BoardId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub column_id: ColumnId,
    pub position: i32,
    pub priority: Priority,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::lenient_date"
    )]
    pub due_date: Option<NaiveDate>,
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<UserId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<UserId>,
}

impl NewTask {
    /// A fresh, incomplete, medium-priority task.
    pub fn titled(title: impl Into<String>, column_id: ColumnId, position: i32) -> Self {
        Self {
            title: title.into(),
            description: None,
            column_id,
            position,
            priority: Priority::default(),
            due_date: None,
            completed: false,
            assigned_to: None,
            created_by: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewChecklistItem {
    pub task_id: TaskId,
    pub text: String,
    pub position: i32,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTag {
    pub name: String,
    pub color: String,
    pub project_id: ProjectId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProjectMember {
    pub project_id: ProjectId,
    pub user_id: UserId,
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PasswordCredentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub data: SignUpMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignUpMetadata {
    pub full_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}
