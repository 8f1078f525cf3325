/*
[INPUT]:  Rows returned by the relational REST API
[OUTPUT]: Project, board, column, task, checklist, tag and profile records
[POS]:    Data layer - row shapes read from the backing store
[UPDATE]: When a table gains or renames a column
*/

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::enums::{Priority, ProfileRole};
use super::ids::{
    BoardId, ChecklistItemId, ColumnId, MemberId, ProjectId, TagId, TaskId, UserId,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_by: Option<UserId>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub id: BoardId,
    pub name: String,
    pub project_id: ProjectId,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A lane of a board. `position` orders columns within the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub id: ColumnId,
    pub name: String,
    pub color: String,
    pub position: i32,
    pub board_id: BoardId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub column_id: ColumnId,
    pub position: i32,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, with = "serde_helpers::lenient_date")]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub assigned_to: Option<UserId>,
    #[serde(default)]
    pub created_by: Option<UserId>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub id: ChecklistItemId,
    pub task_id: TaskId,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    pub position: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
    pub color: String,
    pub project_id: ProjectId,
}

/// Row of the `task_tags` join table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskTag {
    pub task_id: TaskId,
    pub tag_id: TagId,
}

/// Column row with its tasks embedded by the `select=*,tasks(*)` read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnWithTasks {
    #[serde(flatten)]
    pub column: Column,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: UserId,
    #[serde(default)]
    pub approved: bool,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub role: ProfileRole,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectMember {
    pub id: MemberId,
    pub project_id: ProjectId,
    pub user_id: UserId,
    #[serde(default)]
    pub role: Option<String>,
}

pub(crate) mod serde_helpers {
    /// Due dates come back either as `date` ("2024-05-01") or as a
    /// timestamp depending on the column type; both collapse to a date.
    pub mod lenient_date {
        use chrono::{DateTime, NaiveDate};
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S>(value: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match value {
                Some(date) => serializer.serialize_str(&date.format("%Y-%m-%d").to_string()),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
        where
            D: Deserializer<'de>,
        {
            let raw: Option<String> = Option::deserialize(deserializer)?;
            let Some(raw) = raw else {
                return Ok(None);
            };
            let raw = raw.trim();
            if raw.is_empty() {
                return Ok(None);
            }

            if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
                return Ok(Some(date));
            }

            DateTime::parse_from_rfc3339(raw)
                .map(|timestamp| Some(timestamp.date_naive()))
                .map_err(serde::de::Error::custom)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_task_deserializes_backend_row() {
        let row = json!({
            "id": "0b7c1f2e-8d4b-4b5e-9f53-1d6a2c3b4e5f",
            "title": "Write release notes",
            "description": null,
            "column_id": "9a0e3c4d-5b6f-4a7b-8c9d-0e1f2a3b4c5d",
            "position": 2,
            "priority": "high",
            "due_date": "2024-05-01",
            "completed": false,
            "assigned_to": null,
            "created_by": "1c2d3e4f-5a6b-4c7d-8e9f-0a1b2c3d4e5f",
            "created_at": "2024-04-01T10:00:00.123456+00:00",
            "updated_at": "2024-04-02T10:00:00+00:00"
        });

        let task: Task = serde_json::from_value(row).expect("task row");
        assert_eq!(task.position, 2);
        assert_eq!(task.priority, Priority::High);
        assert_eq!(task.due_date, NaiveDate::from_ymd_opt(2024, 5, 1));
        assert!(task.description.is_none());
        assert!(task.assigned_to.is_none());
    }

    #[test]
    fn test_due_date_accepts_timestamp() {
        let row = json!({
            "id": "0b7c1f2e-8d4b-4b5e-9f53-1d6a2c3b4e5f",
            "title": "Ship",
            "column_id": "9a0e3c4d-5b6f-4a7b-8c9d-0e1f2a3b4c5d",
            "position": 0,
            "due_date": "2024-06-30T23:00:00+00:00"
        });

        let task: Task = serde_json::from_value(row).expect("task row");
        assert_eq!(task.due_date, NaiveDate::from_ymd_opt(2024, 6, 30));
        assert_eq!(task.priority, Priority::Medium);
        assert!(!task.completed);
    }

    #[test]
    fn test_column_with_embedded_tasks() {
        let row = json!({
            "id": "9a0e3c4d-5b6f-4a7b-8c9d-0e1f2a3b4c5d",
            "name": "To Do",
            "color": "#ef4444",
            "position": 0,
            "board_id": "5e6f7a8b-9c0d-4e1f-8a2b-3c4d5e6f7a8b",
            "tasks": [{
                "id": "0b7c1f2e-8d4b-4b5e-9f53-1d6a2c3b4e5f",
                "title": "Ship",
                "column_id": "9a0e3c4d-5b6f-4a7b-8c9d-0e1f2a3b4c5d",
                "position": 0
            }]
        });

        let column: ColumnWithTasks = serde_json::from_value(row).expect("column row");
        assert_eq!(column.column.name, "To Do");
        assert_eq!(column.tasks.len(), 1);
        assert_eq!(column.tasks[0].column_id, column.column.id);
    }

    #[test]
    fn test_invalid_due_date_is_rejected() {
        let row = json!({
            "id": "0b7c1f2e-8d4b-4b5e-9f53-1d6a2c3b4e5f",
            "title": "Ship",
            "column_id": "9a0e3c4d-5b6f-4a7b-8c9d-0e1f2a3b4c5d",
            "position": 0,
            "due_date": "next tuesday"
        });

        assert!(serde_json::from_value::<Task>(row).is_err());
    }
}
