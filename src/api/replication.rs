//
//  harbor-client
//  api/replication.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Harbor Replication API
//!
//! Replication policies copy artifacts between Harbor and a remote
//! [`Registry`]. A policy either pulls (`src_registry` set) or pushes
//! (`dest_registry` set) and runs manually, on a cron schedule or on
//! push/delete events. Each run is recorded as a [`ReplicationExecution`].
//!
//! ## API Endpoints
//!
//! ```text
//! GET/POST       /replication/policies
//! GET/PUT/DELETE /replication/policies/{id}
//! GET/POST       /replication/executions
//! GET            /replication/executions/{id}
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! # async fn run(client: harbor_client::api::HarborClient) -> Result<(), Box<dyn std::error::Error>> {
//! let replications = client.replications();
//!
//! let policy = replications.get_replication_policy_by_name("mirror-hub").await?;
//! replications.trigger_replication_execution(&policy).await?;
//!
//! for execution in replications.list_replication_executions(&policy).await? {
//!     println!("{} {}", execution.id, execution.status);
//! }
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::common::{NameOrId, StatusKind};
use super::options::ListOptions;
use super::registry::Registry;
use super::transport::{Operation, Response, Transport, TransportError};

/// A replication policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ReplicationPolicy {
    #[serde(default, skip_serializing_if = "is_zero")]
    pub id: i64,

    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Source registry for pull-based policies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src_registry: Option<Registry>,

    /// Destination registry for push-based policies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest_registry: Option<Registry>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest_namespace: Option<String>,

    /// How many leading path components of the source repository are
    /// replaced by `dest_namespace`. `-1` keeps the full path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest_namespace_replace_count: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger: Option<ReplicationTrigger>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<ReplicationFilter>,

    #[serde(default)]
    pub replicate_deletion: bool,

    /// Overwrite artifacts that already exist at the destination.
    #[serde(default, rename = "override")]
    pub override_existing: bool,

    #[serde(default)]
    pub enabled: bool,

    /// Bandwidth limit in KB/s, `-1` for unlimited.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<i64>,

    #[serde(default, skip_serializing)]
    pub creation_time: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing)]
    pub update_time: Option<DateTime<Utc>>,
}

fn is_zero(id: &i64) -> bool {
    *id == 0
}

/// When a policy runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ReplicationTrigger {
    /// `manual`, `scheduled` or `event_based`.
    #[serde(rename = "type", default)]
    pub kind: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_settings: Option<TriggerSettings>,
}

impl ReplicationTrigger {
    pub fn manual() -> Self {
        Self {
            kind: "manual".into(),
            trigger_settings: None,
        }
    }

    pub fn event_based() -> Self {
        Self {
            kind: "event_based".into(),
            trigger_settings: None,
        }
    }

    /// A schedule in Harbor's six-field cron format.
    pub fn scheduled(cron: impl Into<String>) -> Self {
        Self {
            kind: "scheduled".into(),
            trigger_settings: Some(TriggerSettings { cron: cron.into() }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TriggerSettings {
    #[serde(default)]
    pub cron: String,
}

/// Narrows what a policy replicates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ReplicationFilter {
    /// `name`, `tag`, `label` or `resource`.
    #[serde(rename = "type", default)]
    pub kind: String,

    /// Pattern or value, shape depends on `kind`.
    #[serde(default)]
    pub value: serde_json::Value,

    /// `matches` or `excludes`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decoration: Option<String>,
}

/// One run of a replication policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ReplicationExecution {
    #[serde(default)]
    pub id: i64,

    #[serde(default)]
    pub policy_id: i64,

    /// `InProgress`, `Succeed`, `Stopped` or `Failed`.
    #[serde(default)]
    pub status: String,

    #[serde(default)]
    pub status_text: Option<String>,

    #[serde(default)]
    pub trigger: Option<String>,

    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,

    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,

    #[serde(default)]
    pub total: i64,

    #[serde(default)]
    pub failed: i64,

    #[serde(default)]
    pub succeed: i64,

    #[serde(default)]
    pub in_progress: i64,

    #[serde(default)]
    pub stopped: i64,
}

#[derive(Debug, Serialize)]
struct StartReplicationExecution {
    policy_id: i64,
}

/// Errors returned by [`ReplicationClient`].
#[derive(Error, Debug)]
pub enum ReplicationError {
    #[error("replication policy not found")]
    NotFound,

    #[error("{0} not provided")]
    NotProvided(&'static str),

    #[error("invalid replication id {0}")]
    InvalidId(i64),

    #[error("replication policy id does not match the server record for this name")]
    Mismatch,

    #[error("replication policy already exists")]
    AlreadyExists,

    #[error("invalid replication request")]
    BadRequest,

    #[error("illegal replication id format")]
    IllegalIdFormat,

    #[error("unauthorized")]
    Unauthorized,

    #[error("no permission to manage replication")]
    NoPermission,

    /// The addressed replication execution does not exist.
    #[error("replication execution does not exist")]
    IdNotExists,

    #[error("internal server error")]
    InternalError,

    #[error(transparent)]
    Transport(TransportError),
}

/// Maps a transport failure onto [`ReplicationError`].
pub fn translate(err: TransportError) -> ReplicationError {
    match StatusKind::of(&err) {
        Some(StatusKind::BadRequest) => ReplicationError::BadRequest,
        Some(StatusKind::Unauthorized) => ReplicationError::Unauthorized,
        Some(StatusKind::Forbidden) => ReplicationError::NoPermission,
        Some(StatusKind::NotFound) => ReplicationError::NotFound,
        Some(StatusKind::Conflict) => ReplicationError::AlreadyExists,
        Some(StatusKind::Internal) => ReplicationError::InternalError,
        Some(StatusKind::Created) | None => ReplicationError::Transport(err),
    }
}

fn by_id(err: ReplicationError) -> ReplicationError {
    match err {
        ReplicationError::BadRequest => ReplicationError::IllegalIdFormat,
        other => other,
    }
}

/// Subclient for `/replication`.
#[derive(Clone)]
pub struct ReplicationClient {
    transport: Arc<dyn Transport>,
    options: ListOptions,
}

impl ReplicationClient {
    pub fn new(transport: Arc<dyn Transport>, options: ListOptions) -> Self {
        Self { transport, options }
    }

    #[must_use]
    pub fn with_options(&self, options: ListOptions) -> Self {
        Self::new(self.transport.clone(), options)
    }

    async fn send(&self, operation: Operation) -> Result<Response, ReplicationError> {
        self.transport.submit(operation).await.map_err(translate)
    }

    /// Creates a policy and returns the server's record of it.
    pub async fn create_replication_policy(
        &self,
        policy: &ReplicationPolicy,
    ) -> Result<ReplicationPolicy, ReplicationError> {
        if policy.name.is_empty() {
            return Err(ReplicationError::NotProvided("policy name"));
        }
        if policy.src_registry.is_none() && policy.dest_registry.is_none() {
            return Err(ReplicationError::NotProvided("source or destination registry"));
        }

        let operation = Operation::post("/replication/policies")
            .json(policy)
            .map_err(ReplicationError::Transport)?;
        self.send(operation).await?;

        tracing::debug!("Created replication policy {}", policy.name);
        self.get_replication_policy_by_name(&policy.name).await
    }

    pub async fn get_replication_policy_by_name(
        &self,
        name: &str,
    ) -> Result<ReplicationPolicy, ReplicationError> {
        if name.is_empty() {
            return Err(ReplicationError::NotProvided("policy name"));
        }

        let operation = self
            .options
            .lookup()
            .apply(Operation::get("/replication/policies"))
            .query("name", name);
        let policies: Vec<ReplicationPolicy> = self
            .send(operation)
            .await?
            .json_opt()
            .map_err(ReplicationError::Transport)?
            .unwrap_or_default();

        policies
            .into_iter()
            .find(|policy| policy.name == name)
            .ok_or(ReplicationError::NotFound)
    }

    pub async fn get_replication_policy_by_id(
        &self,
        id: i64,
    ) -> Result<ReplicationPolicy, ReplicationError> {
        if id <= 0 {
            return Err(ReplicationError::InvalidId(id));
        }

        let operation = Operation::get("/replication/policies/{id}").path_param("id", id);
        let policy: ReplicationPolicy = self
            .send(operation)
            .await
            .map_err(by_id)?
            .json_opt()
            .map_err(ReplicationError::Transport)?
            .ok_or(ReplicationError::NotFound)?;

        if policy.id != id {
            return Err(ReplicationError::InvalidId(id));
        }

        Ok(policy)
    }

    /// Lists one page of policies using this subclient's options.
    pub async fn list_replication_policies(
        &self,
    ) -> Result<Vec<ReplicationPolicy>, ReplicationError> {
        let operation = self.options.apply(Operation::get("/replication/policies"));
        Ok(self
            .send(operation)
            .await?
            .json_opt()
            .map_err(ReplicationError::Transport)?
            .unwrap_or_default())
    }

    async fn verify(&self, policy: &ReplicationPolicy) -> Result<(), ReplicationError> {
        if policy.name.is_empty() {
            return Err(ReplicationError::NotProvided("policy"));
        }

        let existing = self.get_replication_policy_by_name(&policy.name).await?;
        if existing.id != policy.id {
            return Err(ReplicationError::Mismatch);
        }

        Ok(())
    }

    pub async fn update_replication_policy(
        &self,
        policy: &ReplicationPolicy,
    ) -> Result<(), ReplicationError> {
        self.verify(policy).await?;

        let operation = Operation::put("/replication/policies/{id}")
            .path_param("id", policy.id)
            .json(policy)
            .map_err(ReplicationError::Transport)?;
        self.send(operation).await.map_err(by_id)?;

        Ok(())
    }

    pub async fn delete_replication_policy(
        &self,
        policy: &ReplicationPolicy,
    ) -> Result<(), ReplicationError> {
        self.verify(policy).await?;

        let operation =
            Operation::delete("/replication/policies/{id}").path_param("id", policy.id);
        self.send(operation).await.map_err(by_id)?;

        tracing::debug!("Deleted replication policy {}", policy.name);
        Ok(())
    }

    /// Reports whether a policy exists. Only "not found" becomes `false`.
    pub async fn replication_policy_exists(
        &self,
        policy: impl Into<NameOrId>,
    ) -> Result<bool, ReplicationError> {
        let result = match policy.into() {
            NameOrId::Id(id) => self.get_replication_policy_by_id(id).await,
            NameOrId::Name(name) => self.get_replication_policy_by_name(&name).await,
        };

        match result {
            Ok(_) => Ok(true),
            Err(ReplicationError::NotFound) => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Starts a manual run of a policy.
    pub async fn trigger_replication_execution(
        &self,
        policy: &ReplicationPolicy,
    ) -> Result<(), ReplicationError> {
        self.verify(policy).await?;

        let operation = Operation::post("/replication/executions")
            .json(&StartReplicationExecution {
                policy_id: policy.id,
            })
            .map_err(ReplicationError::Transport)?;
        self.send(operation).await?;

        tracing::debug!("Triggered replication policy {}", policy.name);
        Ok(())
    }

    /// Lists one page of a policy's executions using this subclient's options.
    pub async fn list_replication_executions(
        &self,
        policy: &ReplicationPolicy,
    ) -> Result<Vec<ReplicationExecution>, ReplicationError> {
        if policy.id <= 0 {
            return Err(ReplicationError::InvalidId(policy.id));
        }

        let operation = Operation::get("/replication/executions")
            .query("policy_id", policy.id)
            .query("page", self.options.page)
            .query("page_size", self.options.page_size)
            .query_opt("sort", self.options.sort.as_deref());

        Ok(self
            .send(operation)
            .await?
            .json_opt()
            .map_err(ReplicationError::Transport)?
            .unwrap_or_default())
    }

    /// Fetches a single execution.
    ///
    /// # Errors
    ///
    /// Returns [`ReplicationError::IdNotExists`] when no execution has that ID.
    pub async fn get_replication_execution(
        &self,
        id: i64,
    ) -> Result<ReplicationExecution, ReplicationError> {
        if id <= 0 {
            return Err(ReplicationError::InvalidId(id));
        }

        let operation = Operation::get("/replication/executions/{id}").path_param("id", id);
        let execution = match self.send(operation).await.map_err(by_id) {
            Ok(response) => response.json_opt().map_err(ReplicationError::Transport)?,
            Err(ReplicationError::NotFound) => None,
            Err(err) => return Err(err),
        };

        execution.ok_or(ReplicationError::IdNotExists)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::{empty, json, status, FakeTransport};
    use crate::api::transport::Method;
    use serde_json::json as j;

    fn mirror(id: i64) -> ReplicationPolicy {
        ReplicationPolicy {
            id,
            name: "mirror-hub".into(),
            src_registry: Some(Registry {
                id: 1,
                name: "hub".into(),
                ..Registry::default()
            }),
            trigger: Some(ReplicationTrigger::manual()),
            ..ReplicationPolicy::default()
        }
    }

    fn server() -> Arc<FakeTransport> {
        FakeTransport::new(|op| match (op.method, op.path().as_str()) {
            (Method::Get, "/replication/policies") => json(
                200,
                j!([{"id": 3, "name": "mirror-hub", "override": true,
                     "trigger": {"type": "scheduled", "trigger_settings": {"cron": "0 0 * * * *"}}}]),
            ),
            (Method::Get, "/replication/policies/3") => json(200, j!({"id": 3, "name": "mirror-hub"})),
            (Method::Get, "/replication/executions") => json(
                200,
                j!([{"id": 40, "policy_id": 3, "status": "Succeed", "total": 2, "succeed": 2}]),
            ),
            (Method::Get, "/replication/executions/40") => {
                json(200, j!({"id": 40, "policy_id": 3, "status": "Succeed"}))
            }
            (Method::Get, _) => status(404),
            (Method::Post, "/replication/executions") => empty(201),
            (_, "/replication/policies/3") => empty(200),
            _ => status(500),
        })
    }

    #[tokio::test]
    async fn test_short_circuits() {
        let fake = FakeTransport::offline();
        let client = ReplicationClient::new(fake.clone(), ListOptions::default());

        assert!(matches!(
            client.get_replication_policy_by_name("").await.unwrap_err(),
            ReplicationError::NotProvided(_)
        ));
        assert!(matches!(
            client.get_replication_policy_by_id(0).await.unwrap_err(),
            ReplicationError::InvalidId(0)
        ));
        assert!(matches!(
            client.get_replication_execution(-2).await.unwrap_err(),
            ReplicationError::InvalidId(-2)
        ));

        let mut orphan = mirror(0);
        orphan.src_registry = None;
        assert!(matches!(
            client.create_replication_policy(&orphan).await.unwrap_err(),
            ReplicationError::NotProvided(_)
        ));
        assert_eq!(fake.count(), 0);
    }

    #[tokio::test]
    async fn test_get_by_name_decodes_trigger() {
        let client = ReplicationClient::new(server(), ListOptions::default());

        let policy = client.get_replication_policy_by_name("mirror-hub").await.unwrap();
        assert_eq!(policy.id, 3);
        assert!(policy.override_existing);
        let trigger = policy.trigger.unwrap();
        assert_eq!(trigger, ReplicationTrigger::scheduled("0 0 * * * *"));
    }

    #[tokio::test]
    async fn test_get_by_name_ignores_listing_options() {
        let fake = FakeTransport::new(|op| {
            match (op.query_value("page"), op.query_value("q")) {
                (Some("1"), None) => json(200, j!([{"id": 3, "name": "mirror-hub"}])),
                _ => json(200, j!([])),
            }
        });
        let options = ListOptions::default()
            .with_page(2)
            .with_sort("name")
            .with_query("enabled=true");
        let client = ReplicationClient::new(fake.clone(), options);

        let policy = client.get_replication_policy_by_name("mirror-hub").await.unwrap();
        assert_eq!(policy.id, 3);
        assert!(client.replication_policy_exists("mirror-hub").await.unwrap());

        let op = &fake.calls()[0];
        assert_eq!(op.query_value("page"), Some("1"));
        assert_eq!(op.query_value("name"), Some("mirror-hub"));
        assert_eq!(op.query_value("sort"), None);
    }

    #[tokio::test]
    async fn test_create_then_fetch_by_name() {
        let fake = FakeTransport::new(|op| match op.method {
            Method::Post => {
                let body = op.body.as_ref().unwrap();
                assert_eq!(body["src_registry"]["id"], 1);
                assert_eq!(body["trigger"]["type"], "manual");
                assert_eq!(body["override"], false);
                empty(201)
            }
            _ => json(200, j!([{"id": 8, "name": "mirror-hub"}])),
        });
        let client = ReplicationClient::new(fake, ListOptions::default());

        let policy = client.create_replication_policy(&mirror(0)).await.unwrap();
        assert_eq!(policy.name, "mirror-hub");
        assert_eq!(policy.id, 8);
    }

    #[tokio::test]
    async fn test_update_and_delete_reject_mismatch() {
        let fake = server();
        let client = ReplicationClient::new(fake.clone(), ListOptions::default());

        assert!(matches!(
            client.update_replication_policy(&mirror(4)).await.unwrap_err(),
            ReplicationError::Mismatch
        ));
        assert!(matches!(
            client.delete_replication_policy(&mirror(4)).await.unwrap_err(),
            ReplicationError::Mismatch
        ));
        assert!(matches!(
            client.trigger_replication_execution(&mirror(4)).await.unwrap_err(),
            ReplicationError::Mismatch
        ));
        assert_eq!(fake.mutations(), 0);

        client.update_replication_policy(&mirror(3)).await.unwrap();
        assert_eq!(fake.log().last().unwrap(), "PUT /replication/policies/3");
    }

    #[tokio::test]
    async fn test_executions() {
        let fake = server();
        let client = ReplicationClient::new(fake.clone(), ListOptions::default());

        client.trigger_replication_execution(&mirror(3)).await.unwrap();
        let post = fake.calls().pop().unwrap();
        assert_eq!(post.body.unwrap()["policy_id"], 3);

        let executions = client.list_replication_executions(&mirror(3)).await.unwrap();
        assert_eq!(executions.len(), 1);
        assert_eq!(executions[0].succeed, 2);
        assert_eq!(fake.calls().pop().unwrap().query_value("policy_id"), Some("3"));

        assert_eq!(client.get_replication_execution(40).await.unwrap().status, "Succeed");
        assert!(matches!(
            client.get_replication_execution(41).await.unwrap_err(),
            ReplicationError::IdNotExists
        ));
    }

    #[tokio::test]
    async fn test_exists() {
        let client = ReplicationClient::new(server(), ListOptions::default());

        assert!(client.replication_policy_exists("mirror-hub").await.unwrap());
        assert!(!client.replication_policy_exists("other").await.unwrap());
        assert!(client.replication_policy_exists(3_i64).await.unwrap());
        assert!(!client.replication_policy_exists(5_i64).await.unwrap());
    }

    #[test]
    fn test_translate_is_pure() {
        for _ in 0..2 {
            assert!(matches!(
                translate(TransportError::from_status(500, "")),
                ReplicationError::InternalError
            ));
        }
    }
}
