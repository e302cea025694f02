//! Projects and users.

use super::CrucibleClient;
use crate::errors::{CrucibleError, GetOrAddError};
use crate::models::{NewUser, Project, User};
use crate::types::*;
use serde_json::Value;
use std::future::Future;

impl CrucibleClient {
    /// List all projects accessible with this API key.
    pub async fn list_projects(&self) -> Result<Vec<Project>, CrucibleError> {
        self.send(self.get("projects")).await
    }

    /// Get a project. Returns `None` if the project does not exist.
    pub async fn get_project(&self, id: &ProjectIdRef) -> Result<Option<Project>, CrucibleError> {
        self.send_optional(self.get(&format!("projects/{}", id))).await
    }

    pub async fn add_project(&self, project: &Project) -> Result<Project, CrucibleError> {
        self.send(self.post("projects").json(project)).await
    }

    /// Get the users who are members of a project.
    pub async fn get_project_users(&self, id: &ProjectIdRef) -> Result<Vec<User>, CrucibleError> {
        self.send(self.get(&format!("projects/{}/users", id))).await
    }

    /// Get a project, or create it from what `lookup` finds.
    pub async fn get_or_add_project<F, Fut>(
        &self,
        id: &ProjectIdRef,
        lookup: F,
    ) -> Result<Project, GetOrAddError>
    where
        F: FnOnce(ProjectId) -> Fut,
        Fut: Future<Output = Option<Project>>,
    {
        if let Some(project) = self.get_project(id).await? {
            return Ok(project);
        }
        let info = lookup(id.to_owned()).await.ok_or_else(|| GetOrAddError::NotFound {
            kind: "Project",
            id: id.to_string(),
        })?;
        Ok(self.add_project(&info).await?)
    }

    /// Get a user by ORCID. Returns `None` if no such user.
    pub async fn get_user(&self, orcid: &OrcidRef) -> Result<Option<User>, CrucibleError> {
        self.send_optional(self.get(&format!("users/{}", orcid))).await
    }

    /// Find a user by email, trying their LBL email if nothing matches their
    /// primary email.
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, CrucibleError> {
        for param in ["email", "lbl_email"] {
            let found: Option<Value> = self
                .send_optional(self.get("users").query(&[(param, email)]))
                .await?;
            if let Some(user) = found.and_then(first_record) {
                return Ok(Some(serde_json::from_value(user)?));
            }
        }
        Ok(None)
    }

    /// Create a user and add them to the given projects.
    pub async fn add_user(
        &self,
        user: User,
        project_ids: Vec<ProjectId>,
    ) -> Result<User, CrucibleError> {
        let body = NewUser {
            user_info: user,
            project_ids,
        };
        self.send(self.post("users").json(&body)).await
    }

    /// Get a user, or create them from what `lookup` finds.
    /// `lookup` also gives the projects to add a new user to.
    pub async fn get_or_add_user<F, Fut>(
        &self,
        orcid: &OrcidRef,
        lookup: F,
    ) -> Result<User, GetOrAddError>
    where
        F: FnOnce(Orcid) -> Fut,
        Fut: Future<Output = Option<(User, Vec<ProjectId>)>>,
    {
        if let Some(user) = self.get_user(orcid).await? {
            return Ok(user);
        }
        let (info, projects) = lookup(orcid.to_owned())
            .await
            .ok_or_else(|| GetOrAddError::NotFound {
                kind: "User",
                id: orcid.to_string(),
            })?;
        Ok(self.add_user(info, projects).await?)
    }
}

/// The API answers some searches with a list and others with a single object.
fn first_record(value: Value) -> Option<Value> {
    match value {
        Value::Array(records) => records.into_iter().next(),
        Value::Object(record) if record.is_empty() => None,
        Value::Object(record) => Some(Value::Object(record)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;
    use serde_json::json;

    #[rstest]
    #[case(json!([]), None)]
    #[case(json!({}), None)]
    #[case(json!(null), None)]
    #[case(json!([{"id": 1}, {"id": 2}]), Some(json!({"id": 1})))]
    #[case(json!({"id": 3}), Some(json!({"id": 3})))]
    fn test_first_record(#[case] value: Value, #[case] expected: Option<Value>) {
        assert_eq!(first_record(value), expected)
    }
}
