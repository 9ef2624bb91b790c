//
//  harbor-client
//  api/system.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Harbor System API
//!
//! Instance-wide information and the garbage collection schedule.
//!
//! ```text
//! GET          /systeminfo
//! GET          /health
//! GET          /statistics
//! GET/POST/PUT /system/gc/schedule
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::common::StatusKind;
use super::transport::{Operation, Response, Transport, TransportError};

/// General instance information (`GeneralInfo`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SystemInfo {
    #[serde(default)]
    pub harbor_version: Option<String>,
    #[serde(default)]
    pub auth_mode: Option<String>,
    #[serde(default)]
    pub registry_url: Option<String>,
    #[serde(default)]
    pub external_url: Option<String>,
    /// `everyone` or `adminonly`.
    #[serde(default)]
    pub project_creation_restriction: Option<String>,
    #[serde(default)]
    pub self_registration: Option<bool>,
    #[serde(default)]
    pub has_ca_root: Option<bool>,
    #[serde(default)]
    pub read_only: Option<bool>,
    #[serde(default)]
    pub with_notary: Option<bool>,
    #[serde(default)]
    pub with_chartmuseum: Option<bool>,
}

/// Overall and per-component health (`OverallHealthStatus`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Health {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub components: Vec<ComponentHealth>,
}

impl Health {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ComponentHealth {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Project and repository counters (`Statistic`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Statistics {
    #[serde(default)]
    pub private_project_count: i64,
    #[serde(default)]
    pub private_repo_count: i64,
    #[serde(default)]
    pub public_project_count: i64,
    #[serde(default)]
    pub public_repo_count: i64,
    #[serde(default)]
    pub total_project_count: i64,
    #[serde(default)]
    pub total_repo_count: i64,
    /// Bytes.
    #[serde(default)]
    pub total_storage_consumption: i64,
}

/// Garbage collection schedule (`Schedule`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GcSchedule {
    #[serde(default)]
    pub schedule: ScheduleSpec,

    /// Job parameters, e.g. `delete_untagged`.
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub parameters: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ScheduleSpec {
    /// `Hourly`, `Daily`, `Weekly`, `Custom`, `Manual` or `None`.
    #[serde(rename = "type", default)]
    pub kind: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cron: Option<String>,
}

/// Schedule type that disables garbage collection.
pub const SCHEDULE_NONE: &str = "None";

/// Schedule type that takes its timing from `cron`.
pub const SCHEDULE_CUSTOM: &str = "Custom";

impl GcSchedule {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            schedule: ScheduleSpec {
                kind: kind.into(),
                cron: None,
            },
            parameters: serde_json::Map::new(),
        }
    }

    /// A schedule in Harbor's six-field cron format.
    pub fn custom(cron: impl Into<String>) -> Self {
        let mut schedule = Self::new(SCHEDULE_CUSTOM);
        schedule.schedule.cron = Some(cron.into());
        schedule
    }

    #[must_use]
    pub fn delete_untagged(mut self, delete: bool) -> Self {
        self.parameters
            .insert("delete_untagged".into(), serde_json::Value::Bool(delete));
        self
    }

    pub fn is_disabled(&self) -> bool {
        self.schedule.kind.is_empty() || self.schedule.kind == SCHEDULE_NONE
    }
}

/// Errors returned by [`SystemClient`].
#[derive(Error, Debug)]
pub enum SystemError {
    #[error("{0} not provided")]
    NotProvided(&'static str),

    #[error("no garbage collection schedule configured")]
    NotFound,

    #[error("garbage collection schedule already exists")]
    AlreadyExists,

    #[error("invalid schedule")]
    BadRequest,

    #[error("unauthorized")]
    Unauthorized,

    #[error("system administrator role required")]
    NoPermission,

    #[error("internal server error")]
    InternalError,

    #[error(transparent)]
    Transport(TransportError),
}

/// Maps a transport failure onto [`SystemError`].
pub fn translate(err: TransportError) -> SystemError {
    match StatusKind::of(&err) {
        Some(StatusKind::BadRequest) => SystemError::BadRequest,
        Some(StatusKind::Unauthorized) => SystemError::Unauthorized,
        Some(StatusKind::Forbidden) => SystemError::NoPermission,
        Some(StatusKind::NotFound) => SystemError::NotFound,
        Some(StatusKind::Conflict) => SystemError::AlreadyExists,
        Some(StatusKind::Internal) => SystemError::InternalError,
        Some(StatusKind::Created) | None => SystemError::Transport(err),
    }
}

/// Subclient for instance-wide endpoints. Nothing here is paged.
#[derive(Clone)]
pub struct SystemClient {
    transport: Arc<dyn Transport>,
}

impl SystemClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    async fn send(&self, operation: Operation) -> Result<Response, SystemError> {
        self.transport.submit(operation).await.map_err(translate)
    }

    async fn fetch<T>(&self, path: &'static str) -> Result<T, SystemError>
    where
        T: serde::de::DeserializeOwned + Default,
    {
        Ok(self
            .send(Operation::get(path))
            .await?
            .json_opt()
            .map_err(SystemError::Transport)?
            .unwrap_or_default())
    }

    pub async fn get_system_info(&self) -> Result<SystemInfo, SystemError> {
        self.fetch("/systeminfo").await
    }

    pub async fn get_health(&self) -> Result<Health, SystemError> {
        self.fetch("/health").await
    }

    pub async fn get_statistics(&self) -> Result<Statistics, SystemError> {
        self.fetch("/statistics").await
    }

    /// Returns the current GC schedule. An unconfigured schedule comes back
    /// with an empty or `None` type.
    pub async fn get_gc_schedule(&self) -> Result<GcSchedule, SystemError> {
        self.fetch("/system/gc/schedule").await
    }

    pub async fn create_gc_schedule(&self, schedule: &GcSchedule) -> Result<(), SystemError> {
        check_schedule(schedule)?;

        let operation = Operation::post("/system/gc/schedule")
            .json(schedule)
            .map_err(SystemError::Transport)?;
        self.send(operation).await?;

        tracing::debug!("Created GC schedule {}", schedule.schedule.kind);
        Ok(())
    }

    pub async fn update_gc_schedule(&self, schedule: &GcSchedule) -> Result<(), SystemError> {
        check_schedule(schedule)?;

        let operation = Operation::put("/system/gc/schedule")
            .json(schedule)
            .map_err(SystemError::Transport)?;
        self.send(operation).await?;

        Ok(())
    }

    /// Disables scheduled garbage collection.
    pub async fn reset_gc_schedule(&self) -> Result<(), SystemError> {
        self.update_gc_schedule(&GcSchedule::new(SCHEDULE_NONE)).await
    }
}

fn check_schedule(schedule: &GcSchedule) -> Result<(), SystemError> {
    if schedule.schedule.kind.is_empty() {
        return Err(SystemError::NotProvided("schedule type"));
    }
    if schedule.schedule.kind == SCHEDULE_CUSTOM
        && schedule.schedule.cron.as_deref().unwrap_or_default().is_empty()
    {
        return Err(SystemError::NotProvided("cron expression"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::{empty, json, status, FakeTransport};
    use crate::api::transport::Method;
    use serde_json::json as j;

    #[tokio::test]
    async fn test_info_health_statistics() {
        let fake = FakeTransport::new(|op| match op.path().as_str() {
            "/systeminfo" => json(200, j!({"harbor_version": "v2.10.0", "auth_mode": "db_auth"})),
            "/health" => json(
                200,
                j!({"status": "unhealthy", "components": [
                    {"name": "core", "status": "healthy"},
                    {"name": "redis", "status": "unhealthy", "error": "dial tcp: timeout"}
                ]}),
            ),
            "/statistics" => json(200, j!({"total_project_count": 4, "total_storage_consumption": 2048})),
            _ => status(404),
        });
        let client = SystemClient::new(fake);

        let info = client.get_system_info().await.unwrap();
        assert_eq!(info.harbor_version.as_deref(), Some("v2.10.0"));

        let health = client.get_health().await.unwrap();
        assert!(!health.is_healthy());
        assert_eq!(health.components[1].error.as_deref(), Some("dial tcp: timeout"));

        let stats = client.get_statistics().await.unwrap();
        assert_eq!(stats.total_project_count, 4);
        assert_eq!(stats.total_storage_consumption, 2048);
    }

    #[tokio::test]
    async fn test_gc_schedule_round_trip() {
        let fake = FakeTransport::new(|op| match op.method {
            Method::Get => json(
                200,
                j!({"schedule": {"type": "Custom", "cron": "0 0 2 * * *"},
                    "parameters": {"delete_untagged": true}}),
            ),
            Method::Post => empty(201),
            _ => empty(200),
        });
        let client = SystemClient::new(fake.clone());

        let schedule = client.get_gc_schedule().await.unwrap();
        assert_eq!(schedule, GcSchedule::custom("0 0 2 * * *").delete_untagged(true));

        client
            .create_gc_schedule(&GcSchedule::new("Daily"))
            .await
            .unwrap();
        client.reset_gc_schedule().await.unwrap();

        let reset = fake.calls().pop().unwrap();
        assert_eq!(reset.method, Method::Put);
        assert_eq!(reset.body.unwrap()["schedule"]["type"], "None");
    }

    #[tokio::test]
    async fn test_schedule_validation() {
        let fake = FakeTransport::offline();
        let client = SystemClient::new(fake.clone());

        assert!(matches!(
            client.create_gc_schedule(&GcSchedule::default()).await.unwrap_err(),
            SystemError::NotProvided(_)
        ));
        assert!(matches!(
            client
                .update_gc_schedule(&GcSchedule::new(SCHEDULE_CUSTOM))
                .await
                .unwrap_err(),
            SystemError::NotProvided("cron expression")
        ));
        assert_eq!(fake.count(), 0);
    }

    #[tokio::test]
    async fn test_non_admin() {
        let client = SystemClient::new(FakeTransport::new(|_| status(403)));
        assert!(matches!(
            client.get_gc_schedule().await.unwrap_err(),
            SystemError::NoPermission
        ));
    }

    #[test]
    fn test_disabled_schedule() {
        assert!(GcSchedule::default().is_disabled());
        assert!(GcSchedule::new(SCHEDULE_NONE).is_disabled());
        assert!(!GcSchedule::new("Weekly").is_disabled());
    }
}
