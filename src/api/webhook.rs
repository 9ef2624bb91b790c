//
//  harbor-client
//  api/webhook.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Harbor Webhook API
//!
//! Webhook policies belong to a project and notify HTTP or Slack targets
//! about project events. Every call on [`WebhookClient`] takes the owning
//! [`Project`].
//!
//! ```text
//! GET/POST       /projects/{project_id}/webhook/policies
//! GET/PUT/DELETE /projects/{project_id}/webhook/policies/{webhook_policy_id}
//! ```
//!
//! Some Harbor releases answer `201` to updates and deletes; the translator
//! treats that as success.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::common::{NameOrId, StatusKind};
use super::options::ListOptions;
use super::project::Project;
use super::transport::{Operation, Response, Transport, TransportError};

/// Event types a policy can subscribe to.
pub const EVENT_TYPES: &[&str] = &[
    "PUSH_ARTIFACT",
    "PULL_ARTIFACT",
    "DELETE_ARTIFACT",
    "SCANNING_COMPLETED",
    "SCANNING_STOPPED",
    "SCANNING_FAILED",
    "QUOTA_EXCEED",
    "QUOTA_WARNING",
    "REPLICATION",
    "TAG_RETENTION",
];

/// A project webhook policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct WebhookPolicy {
    #[serde(default, skip_serializing_if = "is_zero")]
    pub id: i64,

    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub project_id: i64,

    #[serde(default)]
    pub targets: Vec<WebhookTarget>,

    #[serde(default)]
    pub event_types: Vec<String>,

    #[serde(default)]
    pub enabled: bool,

    #[serde(default, skip_serializing)]
    pub creator: Option<String>,

    #[serde(default, skip_serializing)]
    pub creation_time: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing)]
    pub update_time: Option<DateTime<Utc>>,
}

fn is_zero(id: &i64) -> bool {
    *id == 0
}

/// Where notifications are delivered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct WebhookTarget {
    /// `http` or `slack`.
    #[serde(rename = "type", default)]
    pub kind: String,

    #[serde(default)]
    pub address: String,

    /// Sent verbatim as the `Authorization` header.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_header: Option<String>,

    #[serde(default)]
    pub skip_cert_verify: bool,
}

impl WebhookTarget {
    pub fn http(address: impl Into<String>) -> Self {
        Self {
            kind: "http".into(),
            address: address.into(),
            ..Self::default()
        }
    }
}

/// Errors returned by [`WebhookClient`].
#[derive(Error, Debug)]
pub enum WebhookError {
    #[error("webhook policy not found")]
    NotFound,

    #[error("{0} not provided")]
    NotProvided(&'static str),

    #[error("invalid id {0}")]
    InvalidId(i64),

    #[error("webhook policy id does not match the server record for this name")]
    Mismatch,

    #[error("webhook policy already exists")]
    AlreadyExists,

    #[error("invalid webhook request")]
    BadRequest,

    #[error("unauthorized")]
    Unauthorized,

    #[error("no permission to manage webhooks of this project")]
    NoPermission,

    #[error("internal server error")]
    InternalError,

    #[error(transparent)]
    Transport(TransportError),
}

/// Maps a transport failure onto [`WebhookError`].
///
/// A `201` is a success in disguise and yields `Ok(())`.
pub fn translate(err: TransportError) -> Result<(), WebhookError> {
    Err(match StatusKind::of(&err) {
        Some(StatusKind::Created) => return Ok(()),
        Some(StatusKind::BadRequest) => WebhookError::BadRequest,
        Some(StatusKind::Unauthorized) => WebhookError::Unauthorized,
        Some(StatusKind::Forbidden) => WebhookError::NoPermission,
        Some(StatusKind::NotFound) => WebhookError::NotFound,
        Some(StatusKind::Conflict) => WebhookError::AlreadyExists,
        Some(StatusKind::Internal) => WebhookError::InternalError,
        None => WebhookError::Transport(err),
    })
}

fn check_project(project: &Project) -> Result<(), WebhookError> {
    if project.project_id <= 0 {
        return Err(WebhookError::InvalidId(project.project_id));
    }
    Ok(())
}

/// Subclient for project webhook policies.
#[derive(Clone)]
pub struct WebhookClient {
    transport: Arc<dyn Transport>,
    options: ListOptions,
}

impl WebhookClient {
    pub fn new(transport: Arc<dyn Transport>, options: ListOptions) -> Self {
        Self { transport, options }
    }

    #[must_use]
    pub fn with_options(&self, options: ListOptions) -> Self {
        Self::new(self.transport.clone(), options)
    }

    /// `Ok(None)` means the server answered `201` where another success
    /// code was expected.
    async fn send(&self, operation: Operation) -> Result<Option<Response>, WebhookError> {
        match self.transport.submit(operation).await {
            Ok(response) => Ok(Some(response)),
            Err(err) => translate(err).map(|()| None),
        }
    }

    /// Creates a webhook policy and returns the server's record of it.
    pub async fn create_webhook_policy(
        &self,
        project: &Project,
        policy: &WebhookPolicy,
    ) -> Result<WebhookPolicy, WebhookError> {
        check_project(project)?;
        if policy.name.is_empty() {
            return Err(WebhookError::NotProvided("policy name"));
        }
        if policy.targets.is_empty() {
            return Err(WebhookError::NotProvided("webhook target"));
        }

        let mut body = policy.clone();
        body.project_id = project.project_id;

        let operation = Operation::post("/projects/{project_id}/webhook/policies")
            .path_param("project_id", project.project_id)
            .json(&body)
            .map_err(WebhookError::Transport)?;
        self.send(operation).await?;

        tracing::debug!("Created webhook policy {} in {}", policy.name, project.name);
        self.get_webhook_policy_by_name(project, &policy.name).await
    }

    pub async fn get_webhook_policy_by_name(
        &self,
        project: &Project,
        name: &str,
    ) -> Result<WebhookPolicy, WebhookError> {
        check_project(project)?;
        if name.is_empty() {
            return Err(WebhookError::NotProvided("policy name"));
        }

        let options = self.options.lookup().with_query(format!("name=~{name}"));
        let policies = self.list_with(project, &options).await?;

        policies
            .into_iter()
            .find(|policy| policy.name == name)
            .ok_or(WebhookError::NotFound)
    }

    pub async fn get_webhook_policy_by_id(
        &self,
        project: &Project,
        id: i64,
    ) -> Result<WebhookPolicy, WebhookError> {
        check_project(project)?;
        if id <= 0 {
            return Err(WebhookError::InvalidId(id));
        }

        let operation =
            Operation::get("/projects/{project_id}/webhook/policies/{webhook_policy_id}")
                .path_param("project_id", project.project_id)
                .path_param("webhook_policy_id", id);

        let policy: WebhookPolicy = match self.send(operation).await? {
            Some(response) => response.json_opt().map_err(WebhookError::Transport)?,
            None => None,
        }
        .ok_or(WebhookError::NotFound)?;

        if policy.id != id {
            return Err(WebhookError::InvalidId(id));
        }

        Ok(policy)
    }

    /// Lists one page of a project's webhook policies.
    pub async fn list_webhook_policies(
        &self,
        project: &Project,
    ) -> Result<Vec<WebhookPolicy>, WebhookError> {
        check_project(project)?;
        self.list_with(project, &self.options).await
    }

    async fn list_with(
        &self,
        project: &Project,
        options: &ListOptions,
    ) -> Result<Vec<WebhookPolicy>, WebhookError> {
        let operation = options.apply(
            Operation::get("/projects/{project_id}/webhook/policies")
                .path_param("project_id", project.project_id),
        );

        match self.send(operation).await? {
            Some(response) => Ok(response
                .json_opt()
                .map_err(WebhookError::Transport)?
                .unwrap_or_default()),
            None => Ok(Vec::new()),
        }
    }

    async fn verify(&self, project: &Project, policy: &WebhookPolicy) -> Result<(), WebhookError> {
        if policy.name.is_empty() {
            return Err(WebhookError::NotProvided("policy"));
        }

        let existing = self.get_webhook_policy_by_name(project, &policy.name).await?;
        if existing.id != policy.id {
            return Err(WebhookError::Mismatch);
        }

        Ok(())
    }

    pub async fn update_webhook_policy(
        &self,
        project: &Project,
        policy: &WebhookPolicy,
    ) -> Result<(), WebhookError> {
        self.verify(project, policy).await?;

        let operation =
            Operation::put("/projects/{project_id}/webhook/policies/{webhook_policy_id}")
                .path_param("project_id", project.project_id)
                .path_param("webhook_policy_id", policy.id)
                .json(policy)
                .map_err(WebhookError::Transport)?;
        self.send(operation).await?;

        Ok(())
    }

    pub async fn delete_webhook_policy(
        &self,
        project: &Project,
        policy: &WebhookPolicy,
    ) -> Result<(), WebhookError> {
        self.verify(project, policy).await?;

        let operation =
            Operation::delete("/projects/{project_id}/webhook/policies/{webhook_policy_id}")
                .path_param("project_id", project.project_id)
                .path_param("webhook_policy_id", policy.id);
        self.send(operation).await?;

        tracing::debug!("Deleted webhook policy {} in {}", policy.name, project.name);
        Ok(())
    }

    /// Reports whether a policy exists in the project. Only "not found"
    /// becomes `false`.
    pub async fn webhook_policy_exists(
        &self,
        project: &Project,
        policy: impl Into<NameOrId>,
    ) -> Result<bool, WebhookError> {
        let result = match policy.into() {
            NameOrId::Id(id) => self.get_webhook_policy_by_id(project, id).await,
            NameOrId::Name(name) => self.get_webhook_policy_by_name(project, &name).await,
        };

        match result {
            Ok(_) => Ok(true),
            Err(WebhookError::NotFound) => Ok(false),
            Err(err) => Err(err),
        }
    }
}
