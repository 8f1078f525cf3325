/*
[INPUT]:  Project ids, names and member lookups
[OUTPUT]: Project rows, member rows and profile rows
[POS]:    HTTP layer - project and membership endpoints (require a session)
[UPDATE]: When adding project endpoints or changing sharing rules
*/

// ### Project Endpoints

use crate::http::client::{eq, first_row, in_list};
use crate::http::{Result, TaskboardClient};
use crate::types::{
    MemberId, NewProject, NewProjectMember, Profile, Project, ProjectId, ProjectMember, UserId,
};
use serde_json::json;

impl TaskboardClient {
    /// List projects visible to the principal, newest first
    ///
    /// GET /rest/v1/projects?select=*&order=created_at.desc
    pub async fn query_projects(&self) -> Result<Vec<Project>> {
        self.select_rows("projects", &[("select", "*"), ("order", "created_at.desc")])
            .await
    }

    /// GET /rest/v1/projects?id=eq.{id}
    pub async fn query_project(&self, project_id: ProjectId) -> Result<Project> {
        let id = project_id.to_string();
        let rows = self
            .select_rows("projects", &[("select", "*".to_string()), ("id", eq(&id))])
            .await?;
        first_row("projects", &id, rows)
    }

    /// POST /rest/v1/projects
    pub async fn insert_project(&self, project: &NewProject) -> Result<Project> {
        let rows = self
            .insert_rows("projects", std::slice::from_ref(project))
            .await?;
        first_row("projects", &project.name, rows)
    }

    /// PATCH /rest/v1/projects?id=eq.{id}
    pub async fn rename_project(&self, project_id: ProjectId, name: &str) -> Result<Project> {
        self.update_row("projects", project_id, &json!({ "name": name }))
            .await
    }

    /// DELETE /rest/v1/projects?id=eq.{id}
    pub async fn delete_project(&self, project_id: ProjectId) -> Result<()> {
        self.delete_rows("projects", &[("id", eq(project_id))]).await
    }

    /// GET /rest/v1/project_members?project_id=eq.{id}
    pub async fn query_project_members(&self, project_id: ProjectId) -> Result<Vec<ProjectMember>> {
        self.select_rows(
            "project_members",
            &[("select", "*".to_string()), ("project_id", eq(project_id))],
        )
        .await
    }

    /// POST /rest/v1/project_members
    pub async fn insert_project_member(&self, member: &NewProjectMember) -> Result<ProjectMember> {
        let rows = self
            .insert_rows("project_members", std::slice::from_ref(member))
            .await?;
        first_row("project_members", &member.user_id.to_string(), rows)
    }

    /// DELETE /rest/v1/project_members?id=eq.{id}
    pub async fn delete_project_member(&self, member_id: MemberId) -> Result<()> {
        self.delete_rows("project_members", &[("id", eq(member_id))])
            .await
    }

    /// GET /rest/v1/profiles?user_id=in.(...)
    pub async fn query_profiles(&self, user_ids: &[UserId]) -> Result<Vec<Profile>> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }
        self.select_rows(
            "profiles",
            &[
                ("select", "*".to_string()),
                ("user_id", in_list(user_ids.iter())),
            ],
        )
        .await
    }

    /// Look a user up by the full name on their profile
    ///
    /// GET /rest/v1/profiles?full_name=eq.{name}&limit=1
    pub async fn query_profile_by_name(&self, full_name: &str) -> Result<Option<Profile>> {
        let rows: Vec<Profile> = self
            .select_rows(
                "profiles",
                &[
                    ("select", "*".to_string()),
                    ("full_name", eq(full_name.trim())),
                    ("limit", "1".to_string()),
                ],
            )
            .await?;
        Ok(rows.into_iter().next())
    }
}
