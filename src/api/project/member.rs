//
//  harbor-client
//  api/project/member.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Project membership calls.
//!
//! A membership has its own server-assigned ID (the *mid*), which is what
//! the role-update and delete endpoints address. It is resolved from the
//! member list by username; it is never the user ID.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Project, ProjectClient, ProjectError};
use crate::api::options::ListOptions;
use crate::api::transport::Operation;
use crate::api::user::{User, UserClient, UserError};

/// Entity type Harbor uses for user memberships.
pub const ENTITY_TYPE_USER: &str = "u";

/// Entity type Harbor uses for group memberships.
pub const ENTITY_TYPE_GROUP: &str = "g";

/// Built-in project roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    ProjectAdmin,
    Developer,
    Guest,
    Maintainer,
    LimitedGuest,
}

impl Role {
    pub fn id(self) -> i64 {
        match self {
            Self::ProjectAdmin => 1,
            Self::Developer => 2,
            Self::Guest => 3,
            Self::Maintainer => 4,
            Self::LimitedGuest => 5,
        }
    }

    pub fn from_id(id: i64) -> Option<Self> {
        match id {
            1 => Some(Self::ProjectAdmin),
            2 => Some(Self::Developer),
            3 => Some(Self::Guest),
            4 => Some(Self::Maintainer),
            5 => Some(Self::LimitedGuest),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ProjectAdmin => "admin",
            Self::Developer => "developer",
            Self::Guest => "guest",
            Self::Maintainer => "maintainer",
            Self::LimitedGuest => "limited-guest",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts role names (`developer`) or numeric role IDs (`2`).
impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(role) = s.parse::<i64>().ok().and_then(Self::from_id) {
            return Ok(role);
        }
        match s.to_lowercase().as_str() {
            "admin" | "projectadmin" | "project-admin" => Ok(Self::ProjectAdmin),
            "developer" => Ok(Self::Developer),
            "guest" => Ok(Self::Guest),
            "maintainer" => Ok(Self::Maintainer),
            "limited-guest" | "limitedguest" => Ok(Self::LimitedGuest),
            _ => Err(format!("unknown role '{s}'")),
        }
    }
}

/// A project membership (`ProjectMemberEntity`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ProjectMember {
    /// Membership ID (mid).
    #[serde(default)]
    pub id: i64,

    #[serde(default)]
    pub project_id: i64,

    /// Username or group name.
    #[serde(default)]
    pub entity_name: String,

    /// `u` for users, `g` for groups.
    #[serde(default)]
    pub entity_type: String,

    /// User or group ID.
    #[serde(default)]
    pub entity_id: i64,

    #[serde(default)]
    pub role_id: i64,

    #[serde(default)]
    pub role_name: Option<String>,

    #[serde(default)]
    pub creation_time: Option<DateTime<Utc>>,
}

impl ProjectMember {
    pub fn is_user(&self) -> bool {
        self.entity_type == ENTITY_TYPE_USER
    }
}

#[derive(Debug, Serialize)]
struct MemberRequest<'a> {
    role_id: i64,
    member_user: MemberUser<'a>,
}

#[derive(Debug, Serialize)]
struct MemberUser<'a> {
    user_id: i64,
    username: &'a str,
}

#[derive(Debug, Serialize)]
struct RoleRequest {
    role_id: i64,
}

impl ProjectClient {
    /// Confirms `user` exists under the same ID.
    async fn verify_member(&self, user: &User) -> Result<(), ProjectError> {
        if user.username.is_empty() {
            return Err(ProjectError::NotProvided("user"));
        }

        let users = UserClient::new(self.transport.clone(), ListOptions::default());
        match users.get_user_by_name(&user.username).await {
            Ok(existing) if existing.user_id == user.user_id => Ok(()),
            Ok(_) | Err(UserError::NotFound) => Err(ProjectError::MemberMismatch),
            Err(err) => Err(ProjectError::User(err)),
        }
    }

    /// Adds a user to a project with the given role.
    pub async fn add_project_member(
        &self,
        project: &Project,
        user: &User,
        role: Role,
    ) -> Result<(), ProjectError> {
        self.verify(project).await?;
        self.verify_member(user).await?;

        let request = MemberRequest {
            role_id: role.id(),
            member_user: MemberUser {
                user_id: user.user_id,
                username: &user.username,
            },
        };

        let operation = Operation::post("/projects/{project_id}/members")
            .path_param("project_id", project.project_id)
            .json(&request)
            .map_err(ProjectError::Transport)?;
        self.send(operation).await.map_err(member_error)?;

        tracing::debug!("Added {} to {} as {role}", user.username, project.name);
        Ok(())
    }

    /// Lists one page of a project's members using this subclient's options.
    pub async fn list_project_members(
        &self,
        project: &Project,
    ) -> Result<Vec<ProjectMember>, ProjectError> {
        self.members_with(project, &self.options, None).await
    }

    async fn members_with(
        &self,
        project: &Project,
        options: &ListOptions,
        entity_name: Option<&str>,
    ) -> Result<Vec<ProjectMember>, ProjectError> {
        if project.project_id <= 0 {
            return Err(ProjectError::InvalidId(project.project_id));
        }

        let operation = Operation::get("/projects/{project_id}/members")
            .path_param("project_id", project.project_id)
            .query("page", options.page)
            .query("page_size", options.page_size)
            .query_opt("entityname", entity_name);

        Ok(self
            .send(operation)
            .await?
            .json_opt()
            .map_err(ProjectError::Transport)?
            .unwrap_or_default())
    }

    /// Resolves the membership ID (mid) of a user in a project.
    ///
    /// Queries the first page filtered by `entityname`, so the result does
    /// not depend on the configured page.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectError::UserIsNoMember`] when no user membership
    /// with that username exists.
    pub async fn project_member_id(
        &self,
        project: &Project,
        username: &str,
    ) -> Result<i64, ProjectError> {
        if username.is_empty() {
            return Err(ProjectError::NotProvided("username"));
        }

        self.members_with(project, &self.options.lookup(), Some(username))
            .await?
            .into_iter()
            .find(|member| member.is_user() && member.entity_name == username)
            .map(|member| member.id)
            .ok_or(ProjectError::UserIsNoMember)
    }

    /// Changes a member's role.
    pub async fn update_project_member_role(
        &self,
        project: &Project,
        user: &User,
        role: Role,
    ) -> Result<(), ProjectError> {
        self.verify(project).await?;
        let mid = self.project_member_id(project, &user.username).await?;

        let operation = Operation::put("/projects/{project_id}/members/{mid}")
            .path_param("project_id", project.project_id)
            .path_param("mid", mid)
            .json(&RoleRequest { role_id: role.id() })
            .map_err(ProjectError::Transport)?;
        self.send(operation).await.map_err(member_error)?;

        Ok(())
    }

    /// Removes a user from a project.
    pub async fn delete_project_member(
        &self,
        project: &Project,
        user: &User,
    ) -> Result<(), ProjectError> {
        self.verify(project).await?;
        let mid = self.project_member_id(project, &user.username).await?;

        let operation = Operation::delete("/projects/{project_id}/members/{mid}")
            .path_param("project_id", project.project_id)
            .path_param("mid", mid);
        self.send(operation).await?;

        tracing::debug!("Removed {} from {}", user.username, project.name);
        Ok(())
    }
}

fn member_error(err: ProjectError) -> ProjectError {
    match err {
        ProjectError::BadRequest => ProjectError::InvalidRequest,
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json as j;

    use super::*;
    use crate::api::project::tests::library;
    use crate::api::testing::{empty, json, status, FakeTransport};
    use crate::api::transport::Method;

    fn alice(id: i64) -> User {
        User {
            user_id: id,
            username: "alice".into(),
            ..User::default()
        }
    }

    /// Project `library` (ID 3) whose members are group `alice` (mid 4) and
    /// user `alice` (user 11, mid 7).
    fn team() -> Arc<FakeTransport> {
        FakeTransport::new(|op| match (op.method, op.path().as_str()) {
            (Method::Get, "/projects") => json(200, j!([{"project_id": 3, "name": "library"}])),
            (Method::Get, "/users") => json(200, j!([{"user_id": 11, "username": "alice"}])),
            (Method::Get, "/projects/3/members") => json(
                200,
                j!([
                    {"id": 4, "entity_type": "g", "entity_name": "alice", "entity_id": 2},
                    {"id": 7, "entity_type": "u", "entity_name": "alice", "entity_id": 11, "role_id": 3}
                ]),
            ),
            (Method::Post, "/projects/3/members") => empty(201),
            (Method::Put, "/projects/3/members/7") | (Method::Delete, "/projects/3/members/7") => {
                empty(200)
            }
            _ => status(404),
        })
    }

    #[tokio::test]
    async fn test_update_role_addresses_membership_id() {
        let fake = team();
        let client = ProjectClient::new(fake.clone(), ListOptions::default());

        client
            .update_project_member_role(&library(3), &alice(11), Role::Developer)
            .await
            .unwrap();

        let put = fake.calls().pop().unwrap();
        assert_eq!(put.method, Method::Put);
        assert_eq!(put.path(), "/projects/3/members/7");
        assert_eq!(put.body.unwrap()["role_id"], 2);
    }

    #[tokio::test]
    async fn test_member_id_skips_groups() {
        let fake = team();
        let client = ProjectClient::new(fake.clone(), ListOptions::default());

        assert_eq!(client.project_member_id(&library(3), "alice").await.unwrap(), 7);
        let members = client.list_project_members(&library(3)).await.unwrap();
        assert_eq!(members[0].entity_type, ENTITY_TYPE_GROUP);
        assert!(!members[0].is_user());
        assert_eq!(fake.calls()[0].query_value("entityname"), Some("alice"));
        assert_eq!(fake.calls()[1].query_value("entityname"), None);
        assert!(matches!(
            client.project_member_id(&library(3), "bob").await.unwrap_err(),
            ProjectError::UserIsNoMember
        ));
    }

    #[tokio::test]
    async fn test_member_id_beyond_first_page() {
        // Twelve memberships; alice is the last one.
        let roster: Vec<_> = (1..=12)
            .map(|n| {
                let name = if n == 12 { "alice".to_string() } else { format!("user{n}") };
                j!({"id": 100 + n, "entity_type": "u", "entity_name": name, "entity_id": n})
            })
            .collect();
        let fake = FakeTransport::new(move |op| {
            let page: usize = op.query_value("page").unwrap().parse().unwrap();
            let size: usize = op.query_value("page_size").unwrap().parse().unwrap();
            let matching: Vec<_> = roster
                .iter()
                .filter(|m| {
                    op.query_value("entityname")
                        .map_or(true, |name| m["entity_name"] == name)
                })
                .cloned()
                .collect();
            let slice: Vec<_> = matching.into_iter().skip((page - 1) * size).take(size).collect();
            json(200, j!(slice))
        });
        let client = ProjectClient::new(fake.clone(), ListOptions::default().with_page(2));

        assert_eq!(client.project_member_id(&library(3), "alice").await.unwrap(), 112);

        let op = &fake.calls()[0];
        assert_eq!(op.query_value("page"), Some("1"));
        assert_eq!(op.query_value("entityname"), Some("alice"));
    }

    #[tokio::test]
    async fn test_add_member() {
        let fake = team();
        let client = ProjectClient::new(fake.clone(), ListOptions::default());

        client
            .add_project_member(&library(3), &alice(11), Role::Maintainer)
            .await
            .unwrap();

        let post = fake.calls().pop().unwrap();
        let body = post.body.unwrap();
        assert_eq!(body["role_id"], 4);
        assert_eq!(body["member_user"]["user_id"], 11);
        assert_eq!(body["member_user"]["username"], "alice");
    }

    #[tokio::test]
    async fn test_add_member_rejects_unknown_user() {
        let fake = team();
        let client = ProjectClient::new(fake.clone(), ListOptions::default());

        assert!(matches!(
            client
                .add_project_member(&library(3), &alice(12), Role::Guest)
                .await
                .unwrap_err(),
            ProjectError::MemberMismatch
        ));

        let bob = User {
            user_id: 20,
            username: "bob".into(),
            ..User::default()
        };
        assert!(matches!(
            client
                .add_project_member(&library(3), &bob, Role::Guest)
                .await
                .unwrap_err(),
            ProjectError::MemberMismatch
        ));

        assert!(matches!(
            client
                .add_project_member(&library(8), &alice(11), Role::Guest)
                .await
                .unwrap_err(),
            ProjectError::Mismatch
        ));
        assert_eq!(fake.mutations(), 0);
    }

    #[tokio::test]
    async fn test_delete_member() {
        let fake = team();
        let client = ProjectClient::new(fake.clone(), ListOptions::default());

        client
            .delete_project_member(&library(3), &alice(11))
            .await
            .unwrap();
        assert_eq!(fake.log().last().unwrap(), "DELETE /projects/3/members/7");
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!("developer".parse::<Role>().unwrap(), Role::Developer);
        assert_eq!("4".parse::<Role>().unwrap(), Role::Maintainer);
        assert_eq!("Project-Admin".parse::<Role>().unwrap(), Role::ProjectAdmin);
        assert!("9".parse::<Role>().is_err());
        assert!("owner".parse::<Role>().is_err());
    }
}
