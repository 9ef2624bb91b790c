//
//  harbor-client
//  api/registry.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Harbor Registry API
//!
//! Registry endpoints describe remote registries Harbor can replicate from
//! or to, or proxy as a pull-through cache.
//!
//! ```text
//! GET/POST       /registries
//! GET/PUT/DELETE /registries/{id}
//! ```

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::common::{NameOrId, StatusKind};
use super::options::ListOptions;
use super::transport::{Operation, Response, Transport, TransportError};

/// A remote registry endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Registry {
    #[serde(default, skip_serializing_if = "is_zero")]
    pub id: i64,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub url: String,

    /// Adapter type, e.g. `harbor`, `docker-hub`, `docker-registry`.
    #[serde(rename = "type", default)]
    pub kind: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub insecure: bool,

    /// Health as last observed by Harbor (`healthy`, `unhealthy`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential: Option<RegistryCredential>,

    #[serde(default, skip_serializing)]
    pub creation_time: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing)]
    pub update_time: Option<DateTime<Utc>>,
}

fn is_zero(id: &i64) -> bool {
    *id == 0
}

/// Credential Harbor uses against a remote registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RegistryCredential {
    /// `basic` or `oauth`.
    #[serde(rename = "type", default)]
    pub kind: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_secret: Option<String>,
}

/// Request body for updating a registry. Unset fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RegistryUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_secret: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insecure: Option<bool>,
}

impl From<&Registry> for RegistryUpdate {
    fn from(registry: &Registry) -> Self {
        let credential = registry.credential.as_ref();
        Self {
            name: Some(registry.name.clone()),
            description: registry.description.clone(),
            url: Some(registry.url.clone()),
            credential_type: credential.map(|c| c.kind.clone()),
            access_key: credential.and_then(|c| c.access_key.clone()),
            access_secret: credential.and_then(|c| c.access_secret.clone()),
            insecure: Some(registry.insecure),
        }
    }
}

/// Errors returned by [`RegistryClient`].
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("registry not found")]
    NotFound,

    #[error("{0} not provided")]
    NotProvided(&'static str),

    #[error("invalid registry id {0}")]
    InvalidId(i64),

    #[error("registry id does not match the server record for this name")]
    Mismatch,

    #[error("registry already exists")]
    AlreadyExists,

    #[error("invalid registry request")]
    BadRequest,

    /// The server rejected the ID in the request path.
    #[error("illegal registry id format")]
    IllegalIdFormat,

    #[error("unauthorized")]
    Unauthorized,

    #[error("no permission to manage registries")]
    NoPermission,

    #[error("internal server error")]
    InternalError,

    #[error(transparent)]
    Transport(TransportError),
}

/// Maps a transport failure onto [`RegistryError`].
pub fn translate(err: TransportError) -> RegistryError {
    match StatusKind::of(&err) {
        Some(StatusKind::BadRequest) => RegistryError::BadRequest,
        Some(StatusKind::Unauthorized) => RegistryError::Unauthorized,
        Some(StatusKind::Forbidden) => RegistryError::NoPermission,
        Some(StatusKind::NotFound) => RegistryError::NotFound,
        Some(StatusKind::Conflict) => RegistryError::AlreadyExists,
        Some(StatusKind::Internal) => RegistryError::InternalError,
        Some(StatusKind::Created) | None => RegistryError::Transport(err),
    }
}

/// A 400 on an ID-addressed call means the ID itself was rejected.
fn by_id(err: RegistryError) -> RegistryError {
    match err {
        RegistryError::BadRequest => RegistryError::IllegalIdFormat,
        other => other,
    }
}

/// Subclient for `/registries`.
#[derive(Clone)]
pub struct RegistryClient {
    transport: Arc<dyn Transport>,
    options: ListOptions,
}

impl RegistryClient {
    pub fn new(transport: Arc<dyn Transport>, options: ListOptions) -> Self {
        Self { transport, options }
    }

    #[must_use]
    pub fn with_options(&self, options: ListOptions) -> Self {
        Self::new(self.transport.clone(), options)
    }

    async fn send(&self, operation: Operation) -> Result<Response, RegistryError> {
        self.transport.submit(operation).await.map_err(translate)
    }

    /// Registers a remote registry and returns the server's record of it.
    pub async fn create_registry(&self, registry: &Registry) -> Result<Registry, RegistryError> {
        if registry.name.is_empty() {
            return Err(RegistryError::NotProvided("registry name"));
        }
        if registry.url.is_empty() {
            return Err(RegistryError::NotProvided("registry url"));
        }

        let operation = Operation::post("/registries")
            .json(registry)
            .map_err(RegistryError::Transport)?;
        self.send(operation).await?;

        tracing::debug!("Created registry {}", registry.name);
        self.get_registry_by_name(&registry.name).await
    }

    pub async fn get_registry_by_name(&self, name: &str) -> Result<Registry, RegistryError> {
        if name.is_empty() {
            return Err(RegistryError::NotProvided("registry name"));
        }

        let options = self.options.lookup().with_query(format!("name=~{name}"));
        let registries = self.list_with(&options).await?;

        registries
            .into_iter()
            .find(|registry| registry.name == name)
            .ok_or(RegistryError::NotFound)
    }

    pub async fn get_registry_by_id(&self, id: i64) -> Result<Registry, RegistryError> {
        if id <= 0 {
            return Err(RegistryError::InvalidId(id));
        }

        let operation = Operation::get("/registries/{id}").path_param("id", id);
        let registry: Registry = self
            .send(operation)
            .await
            .map_err(by_id)?
            .json_opt()
            .map_err(RegistryError::Transport)?
            .ok_or(RegistryError::NotFound)?;

        if registry.id != id {
            return Err(RegistryError::InvalidId(id));
        }

        Ok(registry)
    }

    /// Lists one page of registries using this subclient's options.
    pub async fn list_registries(&self) -> Result<Vec<Registry>, RegistryError> {
        self.list_with(&self.options).await
    }

    async fn list_with(&self, options: &ListOptions) -> Result<Vec<Registry>, RegistryError> {
        let operation = options.apply(Operation::get("/registries"));
        Ok(self
            .send(operation)
            .await?
            .json_opt()
            .map_err(RegistryError::Transport)?
            .unwrap_or_default())
    }

    async fn verify(&self, registry: &Registry) -> Result<(), RegistryError> {
        if registry.name.is_empty() {
            return Err(RegistryError::NotProvided("registry"));
        }

        let existing = self.get_registry_by_name(&registry.name).await?;
        if existing.id != registry.id {
            return Err(RegistryError::Mismatch);
        }

        Ok(())
    }

    /// Writes the registry's name, URL, credential and flags back to Harbor.
    pub async fn update_registry(&self, registry: &Registry) -> Result<(), RegistryError> {
        self.verify(registry).await?;

        let operation = Operation::put("/registries/{id}")
            .path_param("id", registry.id)
            .json(&RegistryUpdate::from(registry))
            .map_err(RegistryError::Transport)?;
        self.send(operation).await.map_err(by_id)?;

        Ok(())
    }

    pub async fn delete_registry(&self, registry: &Registry) -> Result<(), RegistryError> {
        self.verify(registry).await?;

        let operation = Operation::delete("/registries/{id}").path_param("id", registry.id);
        self.send(operation).await.map_err(by_id)?;

        tracing::debug!("Deleted registry {}", registry.name);
        Ok(())
    }

    /// Reports whether a registry exists. Only "not found" becomes `false`.
    pub async fn registry_exists(
        &self,
        registry: impl Into<NameOrId>,
    ) -> Result<bool, RegistryError> {
        let result = match registry.into() {
            NameOrId::Id(id) => self.get_registry_by_id(id).await,
            NameOrId::Name(name) => self.get_registry_by_name(&name).await,
        };

        match result {
            Ok(_) => Ok(true),
            Err(RegistryError::NotFound) => Ok(false),
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

    fn hub(id: i64) -> Registry {
        Registry {
            id,
            name: "hub".into(),
            url: "https://hub.docker.com".into(),
            kind: "docker-hub".into(),
            ..Registry::default()
        }
    }

    fn remote() -> Arc<FakeTransport> {
        FakeTransport::new(|op| match (op.method, op.path().as_str()) {
            (Method::Get, "/registries") => json(
                200,
                j!([
                    {"id": 2, "name": "hub-mirror", "url": "https://m", "type": "harbor"},
                    {"id": 1, "name": "hub", "url": "https://hub.docker.com", "type": "docker-hub",
                     "credential": {"type": "basic", "access_key": "bot"}}
                ]),
            ),
            (Method::Get, "/registries/1") => json(
                200,
                j!({"id": 1, "name": "hub", "url": "https://hub.docker.com", "type": "docker-hub"}),
            ),
            (Method::Get, _) => status(404),
            (_, "/registries/1") => empty(200),
            _ => status(500),
        })
    }

    #[tokio::test]
    async fn test_short_circuits() {
        let fake = FakeTransport::offline();
        let client = RegistryClient::new(fake.clone(), ListOptions::default());

        assert!(matches!(
            client.get_registry_by_name("").await.unwrap_err(),
            RegistryError::NotProvided(_)
        ));
        assert!(matches!(
            client.get_registry_by_id(-1).await.unwrap_err(),
            RegistryError::InvalidId(-1)
        ));
        assert_eq!(fake.count(), 0);
    }

    #[tokio::test]
    async fn test_get_by_name_and_id() {
        let fake = remote();
        let client = RegistryClient::new(fake.clone(), ListOptions::default());

        let registry = client.get_registry_by_name("hub").await.unwrap();
        assert_eq!(registry.id, 1);
        assert_eq!(registry.kind, "docker-hub");
        assert_eq!(registry.credential.unwrap().access_key.as_deref(), Some("bot"));
        assert_eq!(fake.calls()[0].query_value("q"), Some("name=~hub"));

        assert_eq!(client.get_registry_by_id(1).await.unwrap().name, "hub");
        assert!(matches!(
            client.get_registry_by_id(3).await.unwrap_err(),
            RegistryError::NotFound
        ));
    }

    #[tokio::test]
    async fn test_get_by_name_ignores_listing_options() {
        let fake = FakeTransport::new(|op| {
            match (op.query_value("page"), op.query_value("q")) {
                (Some("1"), Some("name=~hub")) => json(
                    200,
                    j!([{"id": 1, "name": "hub", "url": "https://hub.docker.com", "type": "docker-hub"}]),
                ),
                _ => json(200, j!([])),
            }
        });
        let options = ListOptions::default()
            .with_page(3)
            .with_sort("-name")
            .with_query("type=harbor");
        let client = RegistryClient::new(fake.clone(), options);

        assert_eq!(client.get_registry_by_name("hub").await.unwrap().id, 1);
        assert!(client.registry_exists("hub").await.unwrap());
        assert_eq!(fake.calls()[0].query_value("sort"), None);
    }

    #[tokio::test]
    async fn test_create_then_fetch_by_name() {
        let fake = FakeTransport::new(|op| match op.method {
            Method::Post => {
                let body = op.body.as_ref().unwrap();
                assert_eq!(body["type"], "docker-hub");
                assert!(body.get("id").is_none());
                empty(201)
            }
            _ => json(
                200,
                j!([{"id": 4, "name": "hub", "url": "https://hub.docker.com", "type": "docker-hub"}]),
            ),
        });
        let client = RegistryClient::new(fake, ListOptions::default());

        let created = client.create_registry(&hub(0)).await.unwrap();
        assert_eq!(created.name, "hub");
        assert_eq!(created.id, 4);
    }

    #[tokio::test]
    async fn test_update_and_delete_reject_mismatch() {
        let fake = remote();
        let client = RegistryClient::new(fake.clone(), ListOptions::default());

        assert!(matches!(
            client.update_registry(&hub(2)).await.unwrap_err(),
            RegistryError::Mismatch
        ));
        assert!(matches!(
            client.delete_registry(&hub(2)).await.unwrap_err(),
            RegistryError::Mismatch
        ));
        assert_eq!(fake.mutations(), 0);
    }

    #[tokio::test]
    async fn test_update_sends_flattened_credential() {
        let fake = remote();
        let client = RegistryClient::new(fake.clone(), ListOptions::default());

        let mut registry = hub(1);
        registry.credential = Some(RegistryCredential {
            kind: "basic".into(),
            access_key: Some("bot".into()),
            access_secret: Some("s3cret".into()),
        });
        client.update_registry(&registry).await.unwrap();

        let put = fake.calls().pop().unwrap();
        let body = put.body.unwrap();
        assert_eq!(body["credential_type"], "basic");
        assert_eq!(body["access_secret"], "s3cret");
        assert_eq!(body["insecure"], false);
    }

    #[tokio::test]
    async fn test_exists() {
        let client = RegistryClient::new(remote(), ListOptions::default());

        assert!(client.registry_exists("hub").await.unwrap());
        assert!(!client.registry_exists("quay").await.unwrap());
        assert!(client.registry_exists(1_i64).await.unwrap());
        assert!(!client.registry_exists(9_i64).await.unwrap());
    }

    #[test]
    fn test_translate() {
        for _ in 0..2 {
            assert!(matches!(
                translate(TransportError::from_status(500, "")),
                RegistryError::InternalError
            ));
        }
        assert!(matches!(
            by_id(translate(TransportError::from_status(400, ""))),
            RegistryError::IllegalIdFormat
        ));
        assert!(matches!(
            translate(TransportError::from_status(409, "")),
            RegistryError::AlreadyExists
        ));
    }
}
