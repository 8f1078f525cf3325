/*
[INPUT]:  Task, checklist and tag ids plus new rows and patches
[OUTPUT]: Ordered task rows, checklist rows, tag rows and associations
[POS]:    HTTP layer - task, checklist and tag endpoints (require a session)
[UPDATE]: When adding task endpoints or task-related tables
*/

// ### Task Endpoints

use crate::http::client::{eq, first_row, in_list};
use crate::http::{Result, TaskboardClient};
use crate::types::{
    ChecklistItem, ChecklistItemId, ColumnId, NewChecklistItem, NewTag, NewTask, ProjectId, Tag,
    TagId, Task, TaskId, TaskPatch, TaskPlacement, TaskTag,
};
use serde_json::json;

impl TaskboardClient {
    /// Tasks of the given columns ordered by position
    ///
    /// GET /rest/v1/tasks?column_id=in.(...)&order=position.asc
    pub async fn query_tasks(&self, column_ids: &[ColumnId]) -> Result<Vec<Task>> {
        if column_ids.is_empty() {
            return Ok(Vec::new());
        }
        self.select_rows(
            "tasks",
            &[
                ("select", "*".to_string()),
                ("column_id", in_list(column_ids.iter())),
                ("order", "position.asc".to_string()),
            ],
        )
        .await
    }

    /// GET /rest/v1/tasks?id=eq.{id}
    pub async fn query_task(&self, task_id: TaskId) -> Result<Task> {
        let id = task_id.to_string();
        let rows = self
            .select_rows("tasks", &[("select", "*".to_string()), ("id", eq(&id))])
            .await?;
        first_row("tasks", &id, rows)
    }

    /// POST /rest/v1/tasks (batch)
    pub async fn insert_tasks(&self, tasks: &[NewTask]) -> Result<Vec<Task>> {
        if tasks.is_empty() {
            return Ok(Vec::new());
        }
        self.insert_rows("tasks", tasks).await
    }

    /// Write a task's column and/or position
    ///
    /// PATCH /rest/v1/tasks?id=eq.{id}
    pub async fn update_task_placement(
        &self,
        task_id: TaskId,
        placement: TaskPlacement,
    ) -> Result<Task> {
        self.update_row("tasks", task_id, &placement).await
    }

    /// PATCH /rest/v1/tasks?id=eq.{id}
    pub async fn update_task_fields(&self, task_id: TaskId, patch: &TaskPatch) -> Result<Task> {
        self.update_row("tasks", task_id, patch).await
    }

    /// Checklist items and tag links cascade server-side.
    ///
    /// DELETE /rest/v1/tasks?id=eq.{id}
    pub async fn delete_task(&self, task_id: TaskId) -> Result<()> {
        self.delete_rows("tasks", &[("id", eq(task_id))]).await
    }

    /// GET /rest/v1/task_checklist_items?task_id=in.(...)&order=position.asc
    pub async fn query_checklist_items(&self, task_ids: &[TaskId]) -> Result<Vec<ChecklistItem>> {
        if task_ids.is_empty() {
            return Ok(Vec::new());
        }
        self.select_rows(
            "task_checklist_items",
            &[
                ("select", "*".to_string()),
                ("task_id", in_list(task_ids.iter())),
                ("order", "position.asc".to_string()),
            ],
        )
        .await
    }

    /// POST /rest/v1/task_checklist_items
    pub async fn insert_checklist_item(&self, item: &NewChecklistItem) -> Result<ChecklistItem> {
        let rows = self
            .insert_rows("task_checklist_items", std::slice::from_ref(item))
            .await?;
        first_row("task_checklist_items", &item.task_id.to_string(), rows)
    }

    /// PATCH /rest/v1/task_checklist_items?id=eq.{id}
    pub async fn set_checklist_item_completed(
        &self,
        item_id: ChecklistItemId,
        completed: bool,
    ) -> Result<ChecklistItem> {
        self.update_row(
            "task_checklist_items",
            item_id,
            &json!({ "completed": completed }),
        )
        .await
    }

    /// DELETE /rest/v1/task_checklist_items?id=eq.{id}
    pub async fn delete_checklist_item(&self, item_id: ChecklistItemId) -> Result<()> {
        self.delete_rows("task_checklist_items", &[("id", eq(item_id))])
            .await
    }

    /// GET /rest/v1/project_tags?project_id=eq.{id}&order=name.asc
    pub async fn query_tags(&self, project_id: ProjectId) -> Result<Vec<Tag>> {
        self.select_rows(
            "project_tags",
            &[
                ("select", "*".to_string()),
                ("project_id", eq(project_id)),
                ("order", "name.asc".to_string()),
            ],
        )
        .await
    }

    /// POST /rest/v1/project_tags
    pub async fn insert_tag(&self, tag: &NewTag) -> Result<Tag> {
        let rows = self
            .insert_rows("project_tags", std::slice::from_ref(tag))
            .await?;
        first_row("project_tags", &tag.name, rows)
    }

    /// GET /rest/v1/task_tags?select=task_id,tag_id&task_id=in.(...)
    pub async fn query_task_tags(&self, task_ids: &[TaskId]) -> Result<Vec<TaskTag>> {
        if task_ids.is_empty() {
            return Ok(Vec::new());
        }
        self.select_rows(
            "task_tags",
            &[
                ("select", "task_id,tag_id".to_string()),
                ("task_id", in_list(task_ids.iter())),
            ],
        )
        .await
    }

    /// POST /rest/v1/task_tags
    pub async fn attach_tag(&self, task_id: TaskId, tag_id: TagId) -> Result<()> {
        let link = TaskTag { task_id, tag_id };
        let _: Vec<TaskTag> = self
            .insert_rows("task_tags", std::slice::from_ref(&link))
            .await?;
        Ok(())
    }

    /// DELETE /rest/v1/task_tags?task_id=eq.{task}&tag_id=eq.{tag}
    pub async fn detach_tag(&self, task_id: TaskId, tag_id: TagId) -> Result<()> {
        self.delete_rows("task_tags", &[("task_id", eq(task_id)), ("tag_id", eq(tag_id))])
            .await
    }
}
