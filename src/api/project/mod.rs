//
//  harbor-client
//  api/project/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Harbor Project API
//!
//! Types and the [`ProjectClient`] subclient for Harbor projects. Projects
//! group repositories and carry quota limits, a fixed set of metadata keys
//! (see [`metadata`]) and a member list (see [`member`]).
//!
//! ## API Endpoints
//!
//! ```text
//! GET/POST       /projects
//! GET/PUT/DELETE /projects/{project_id}
//! GET/POST       /projects/{project_id}/metadatas
//! GET/DELETE     /projects/{project_id}/metadatas/{meta_name}
//! GET/POST       /projects/{project_id}/members
//! PUT/DELETE     /projects/{project_id}/members/{mid}
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use harbor_client::api::project::ProjectRequest;
//! # async fn run(client: harbor_client::api::HarborClient) -> Result<(), Box<dyn std::error::Error>> {
//! let projects = client.projects();
//!
//! let project = projects
//!     .create_project(&ProjectRequest::new("team-a").storage_limit(10 * 1024 * 1024 * 1024))
//!     .await?;
//! println!("Created project {} ({})", project.name, project.project_id);
//! # Ok(())
//! # }
//! ```
//!
//! ## Notes
//!
//! - Project names are unique; the project ID is assigned by the server.
//! - A storage limit of `-1` means unlimited.

pub mod member;
pub mod metadata;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::common::{NameOrId, StatusKind};
use super::options::ListOptions;
use super::transport::{Operation, Response, Transport, TransportError};
use super::user::UserError;

pub use member::{ProjectMember, Role};
pub use metadata::MetadataKey;

/// A Harbor project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Project {
    #[serde(default)]
    pub project_id: i64,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub owner_id: i64,

    #[serde(default)]
    pub owner_name: Option<String>,

    /// Upstream registry for proxy-cache projects.
    #[serde(default)]
    pub registry_id: Option<i64>,

    #[serde(default)]
    pub repo_count: i64,

    #[serde(default)]
    pub creation_time: Option<DateTime<Utc>>,

    #[serde(default)]
    pub update_time: Option<DateTime<Utc>>,

    #[serde(default)]
    pub deleted: bool,

    #[serde(default)]
    pub metadata: ProjectMetadata,
}

impl Project {
    /// Whether the project is readable anonymously.
    pub fn is_public(&self) -> bool {
        self.metadata.public.as_deref() == Some("true")
    }
}

/// Project metadata. Harbor stores every value as a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ProjectMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_content_trust: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_scan: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reuse_sys_cve_allowlist: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prevent_vul: Option<String>,
}

/// Request body for creating or updating a project (`ProjectReq`).
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProjectRequest {
    pub project_name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub public: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ProjectMetadata>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub count_limit: Option<i64>,

    /// Storage quota in bytes, `-1` for unlimited.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_limit: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub registry_id: Option<i64>,
}

impl ProjectRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            project_name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn public(mut self, public: bool) -> Self {
        self.public = Some(public);
        self
    }

    #[must_use]
    pub fn count_limit(mut self, limit: i64) -> Self {
        self.count_limit = Some(limit);
        self
    }

    #[must_use]
    pub fn storage_limit(mut self, limit: i64) -> Self {
        self.storage_limit = Some(limit);
        self
    }

    #[must_use]
    pub fn registry_id(mut self, id: i64) -> Self {
        self.registry_id = Some(id);
        self
    }
}

/// Errors returned by [`ProjectClient`].
#[derive(Error, Debug)]
pub enum ProjectError {
    #[error("project not found")]
    NotFound,

    #[error("{0} not provided")]
    NotProvided(&'static str),

    #[error("invalid project id {0}")]
    InvalidId(i64),

    #[error("project id does not match the server record for this name")]
    Mismatch,

    /// The user passed to a membership call does not exist or has another ID.
    #[error("user does not match any existing user")]
    MemberMismatch,

    #[error("user is not a member of the project")]
    UserIsNoMember,

    #[error("project already exists")]
    AlreadyExists,

    #[error("invalid project request")]
    BadRequest,

    /// The server rejected a metadata or membership body.
    #[error("invalid request")]
    InvalidRequest,

    #[error("unauthorized")]
    Unauthorized,

    #[error("no permission to manage this project")]
    NoPermission,

    #[error("internal server error")]
    InternalError,

    /// A user lookup made on behalf of a membership call failed.
    #[error(transparent)]
    User(UserError),

    #[error(transparent)]
    Transport(TransportError),
}

/// Maps a transport failure onto [`ProjectError`].
pub fn translate(err: TransportError) -> ProjectError {
    match StatusKind::of(&err) {
        Some(StatusKind::BadRequest) => ProjectError::BadRequest,
        Some(StatusKind::Unauthorized) => ProjectError::Unauthorized,
        Some(StatusKind::Forbidden) => ProjectError::NoPermission,
        Some(StatusKind::NotFound) => ProjectError::NotFound,
        Some(StatusKind::Conflict) => ProjectError::AlreadyExists,
        Some(StatusKind::Internal) => ProjectError::InternalError,
        Some(StatusKind::Created) | None => ProjectError::Transport(err),
    }
}

/// Subclient for `/projects`, including metadata and membership calls.
#[derive(Clone)]
pub struct ProjectClient {
    transport: Arc<dyn Transport>,
    options: ListOptions,
}

impl ProjectClient {
    pub fn new(transport: Arc<dyn Transport>, options: ListOptions) -> Self {
        Self { transport, options }
    }

    /// Returns a copy of this subclient using different list options.
    #[must_use]
    pub fn with_options(&self, options: ListOptions) -> Self {
        Self::new(self.transport.clone(), options)
    }

    async fn send(&self, operation: Operation) -> Result<Response, ProjectError> {
        self.transport.submit(operation).await.map_err(translate)
    }

    /// Creates a project and returns the server's record of it.
    pub async fn create_project(&self, request: &ProjectRequest) -> Result<Project, ProjectError> {
        if request.project_name.is_empty() {
            return Err(ProjectError::NotProvided("project name"));
        }

        let operation = Operation::post("/projects")
            .json(request)
            .map_err(ProjectError::Transport)?;
        self.send(operation).await?;

        tracing::debug!("Created project {}", request.project_name);
        self.get_project_by_name(&request.project_name).await
    }

    /// Looks a project up by exact name.
    pub async fn get_project_by_name(&self, name: &str) -> Result<Project, ProjectError> {
        if name.is_empty() {
            return Err(ProjectError::NotProvided("project name"));
        }

        let operation = self
            .options
            .lookup()
            .apply(Operation::get("/projects"))
            .query("name", name);
        let projects: Vec<Project> = self
            .send(operation)
            .await?
            .json_opt()
            .map_err(ProjectError::Transport)?
            .unwrap_or_default();

        projects
            .into_iter()
            .find(|project| project.name == name)
            .ok_or(ProjectError::NotFound)
    }

    /// Fetches a project by ID.
    pub async fn get_project_by_id(&self, id: i64) -> Result<Project, ProjectError> {
        if id <= 0 {
            return Err(ProjectError::InvalidId(id));
        }

        let operation = Operation::get("/projects/{project_id}").path_param("project_id", id);
        let project: Project = self
            .send(operation)
            .await?
            .json_opt()
            .map_err(ProjectError::Transport)?
            .ok_or(ProjectError::NotFound)?;

        if project.project_id != id {
            return Err(ProjectError::InvalidId(id));
        }

        Ok(project)
    }

    /// Lists one page of projects using this subclient's options.
    pub async fn list_projects(&self) -> Result<Vec<Project>, ProjectError> {
        let operation = self.options.apply(Operation::get("/projects"));
        Ok(self
            .send(operation)
            .await?
            .json_opt()
            .map_err(ProjectError::Transport)?
            .unwrap_or_default())
    }

    /// Checks that `project` names an existing project with the same ID.
    pub(crate) async fn verify(&self, project: &Project) -> Result<(), ProjectError> {
        if project.name.is_empty() {
            return Err(ProjectError::NotProvided("project"));
        }

        let existing = self.get_project_by_name(&project.name).await?;
        if existing.project_id != project.project_id {
            return Err(ProjectError::Mismatch);
        }

        Ok(())
    }

    /// Updates a project's metadata and, optionally, its storage quota.
    pub async fn update_project(
        &self,
        project: &Project,
        storage_limit: Option<i64>,
    ) -> Result<(), ProjectError> {
        self.verify(project).await?;

        let request = ProjectRequest {
            project_name: project.name.clone(),
            metadata: Some(project.metadata.clone()),
            storage_limit,
            ..ProjectRequest::default()
        };

        let operation = Operation::put("/projects/{project_id}")
            .path_param("project_id", project.project_id)
            .json(&request)
            .map_err(ProjectError::Transport)?;
        self.send(operation).await?;

        Ok(())
    }

    /// Deletes a project after confirming it exists under the same ID.
    pub async fn delete_project(&self, project: &Project) -> Result<(), ProjectError> {
        self.verify(project).await?;

        let operation =
            Operation::delete("/projects/{project_id}").path_param("project_id", project.project_id);
        self.send(operation).await?;

        tracing::debug!("Deleted project {}", project.name);
        Ok(())
    }

    /// Reports whether a project exists. Only "not found" becomes `false`.
    pub async fn project_exists(&self, project: impl Into<NameOrId>) -> Result<bool, ProjectError> {
        let result = match project.into() {
            NameOrId::Id(id) => self.get_project_by_id(id).await,
            NameOrId::Name(name) => self.get_project_by_name(&name).await,
        };

        match result {
            Ok(_) => Ok(true),
            Err(ProjectError::NotFound) => Ok(false),
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::{empty, json, status, FakeTransport};
    use crate::api::transport::Method;
    use serde_json::json as j;

    pub(super) fn library(id: i64) -> Project {
        Project {
            project_id: id,
            name: "library".into(),
            ..Project::default()
        }
    }

    /// Serves project lookups for `library` (ID 5) and accepts mutations on it.
    fn registry() -> Arc<FakeTransport> {
        FakeTransport::new(|op| match (op.method, op.path().as_str()) {
            (Method::Get, "/projects") => json(
                200,
                j!([
                    {"project_id": 9, "name": "library-mirror"},
                    {"project_id": 5, "name": "library", "metadata": {"public": "true"}}
                ]),
            ),
            (Method::Get, "/projects/5") => json(200, j!({"project_id": 5, "name": "library"})),
            (Method::Get, _) => status(404),
            (_, "/projects/5") => empty(200),
            _ => status(500),
        })
    }

    #[tokio::test]
    async fn test_get_by_empty_name_makes_no_call() {
        let fake = FakeTransport::offline();
        let client = ProjectClient::new(fake.clone(), ListOptions::default());

        assert!(matches!(
            client.get_project_by_name("").await.unwrap_err(),
            ProjectError::NotProvided(_)
        ));
        assert!(matches!(
            client.get_project_by_id(0).await.unwrap_err(),
            ProjectError::InvalidId(0)
        ));
        assert_eq!(fake.count(), 0);
    }

    #[tokio::test]
    async fn test_get_by_name() {
        let fake = registry();
        let client = ProjectClient::new(fake.clone(), ListOptions::default().with_page_size(50));

        let project = client.get_project_by_name("library").await.unwrap();
        assert_eq!(project.project_id, 5);
        assert!(project.is_public());

        let op = &fake.calls()[0];
        assert_eq!(op.query_value("name"), Some("library"));
        assert_eq!(op.query_value("page_size"), Some("50"));
    }

    #[tokio::test]
    async fn test_get_by_name_ignores_listing_options() {
        let fake = FakeTransport::new(|op| {
            match (op.query_value("page"), op.query_value("q")) {
                (Some("1"), None) => json(200, j!([{"project_id": 5, "name": "library"}])),
                _ => json(200, j!([])),
            }
        });
        let options = ListOptions::default()
            .with_page(2)
            .with_sort("name")
            .with_query("public=true");
        let client = ProjectClient::new(fake.clone(), options);

        assert_eq!(client.get_project_by_name("library").await.unwrap().project_id, 5);
        assert!(client.project_exists("library").await.unwrap());

        let op = &fake.calls()[0];
        assert_eq!(op.query_value("page"), Some("1"));
        assert_eq!(op.query_value("name"), Some("library"));
        assert_eq!(op.query_value("sort"), None);
    }

    #[tokio::test]
    async fn test_get_by_id() {
        let fake = registry();
        let client = ProjectClient::new(fake, ListOptions::default());

        assert_eq!(client.get_project_by_id(5).await.unwrap().name, "library");
        assert!(matches!(
            client.get_project_by_id(6).await.unwrap_err(),
            ProjectError::NotFound
        ));
    }

    #[tokio::test]
    async fn test_create_then_fetch_by_name() {
        let fake = FakeTransport::new(|op| match op.method {
            Method::Post => {
                let body = op.body.as_ref().unwrap();
                assert_eq!(body["project_name"], "team-a");
                assert_eq!(body["storage_limit"], 1024);
                assert!(body.get("count_limit").is_none());
                empty(201)
            }
            _ => json(200, j!([{"project_id": 12, "name": "team-a"}])),
        });
        let client = ProjectClient::new(fake.clone(), ListOptions::default());

        let project = client
            .create_project(&ProjectRequest::new("team-a").storage_limit(1024))
            .await
            .unwrap();
        assert_eq!(project.name, "team-a");
        assert_eq!(fake.log(), vec!["POST /projects", "GET /projects"]);
    }

    #[tokio::test]
    async fn test_create_surfaces_failed_follow_up() {
        let fake = FakeTransport::new(|op| match op.method {
            Method::Post => empty(201),
            _ => status(500),
        });
        let client = ProjectClient::new(fake.clone(), ListOptions::default());

        let err = client
            .create_project(&ProjectRequest::new("team-a"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProjectError::InternalError));
        assert_eq!(fake.mutations(), 1);
    }

    #[tokio::test]
    async fn test_create_conflict() {
        let fake = FakeTransport::new(|_| status(409));
        let client = ProjectClient::new(fake, ListOptions::default());

        assert!(matches!(
            client.create_project(&ProjectRequest::new("library")).await.unwrap_err(),
            ProjectError::AlreadyExists
        ));
    }

    #[tokio::test]
    async fn test_update_and_delete_reject_mismatch() {
        let fake = registry();
        let client = ProjectClient::new(fake.clone(), ListOptions::default());

        assert!(matches!(
            client.update_project(&library(6), Some(10)).await.unwrap_err(),
            ProjectError::Mismatch
        ));
        assert!(matches!(
            client.delete_project(&library(6)).await.unwrap_err(),
            ProjectError::Mismatch
        ));
        assert_eq!(fake.mutations(), 0);
    }

    #[tokio::test]
    async fn test_update_sends_storage_limit() {
        let fake = registry();
        let client = ProjectClient::new(fake.clone(), ListOptions::default());

        client.update_project(&library(5), Some(-1)).await.unwrap();
        client.delete_project(&library(5)).await.unwrap();

        let calls = fake.calls();
        let put = calls.iter().find(|op| op.method == Method::Put).unwrap();
        assert_eq!(put.path(), "/projects/5");
        assert_eq!(put.body.as_ref().unwrap()["storage_limit"], -1);
        assert_eq!(fake.log().last().unwrap(), "DELETE /projects/5");
    }

    #[tokio::test]
    async fn test_exists() {
        let fake = registry();
        let client = ProjectClient::new(fake, ListOptions::default());

        assert!(client.project_exists("library").await.unwrap());
        assert!(!client.project_exists("ghost").await.unwrap());
        assert!(client.project_exists(5_i64).await.unwrap());
        assert!(!client.project_exists(8_i64).await.unwrap());
    }

    #[tokio::test]
    async fn test_exists_propagates_other_errors() {
        let fake = FakeTransport::new(|_| status(401));
        let client = ProjectClient::new(fake, ListOptions::default());

        assert!(matches!(
            client.project_exists("library").await.unwrap_err(),
            ProjectError::Unauthorized
        ));
    }

    #[test]
    fn test_translate_is_pure() {
        for _ in 0..2 {
            assert!(matches!(
                translate(TransportError::from_status(500, "boom")),
                ProjectError::InternalError
            ));
        }
        assert!(matches!(
            translate(TransportError::from_status(201, "")),
            ProjectError::Transport(_)
        ));
    }
}
