//
//  harbor-client
//  api/project/metadata.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Project metadata calls.
//!
//! Metadata is a string-to-string map restricted to the keys in
//! [`MetadataKey`]. Harbor's update endpoint does not reliably upsert, so
//! [`ProjectClient::update_project_metadata`] reads, deletes and re-adds
//! the key instead.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{Project, ProjectClient, ProjectError};
use crate::api::transport::Operation;

/// Metadata keys Harbor accepts on a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataKey {
    EnableContentTrust,
    AutoScan,
    Severity,
    ReuseSysCveAllowlist,
    Public,
    PreventVul,
}

impl MetadataKey {
    pub const ALL: [MetadataKey; 6] = [
        Self::EnableContentTrust,
        Self::AutoScan,
        Self::Severity,
        Self::ReuseSysCveAllowlist,
        Self::Public,
        Self::PreventVul,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EnableContentTrust => "enable_content_trust",
            Self::AutoScan => "auto_scan",
            Self::Severity => "severity",
            Self::ReuseSysCveAllowlist => "reuse_sys_cve_allowlist",
            Self::Public => "public",
            Self::PreventVul => "prevent_vul",
        }
    }
}

impl fmt::Display for MetadataKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetadataKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| {
                let valid: Vec<_> = Self::ALL.iter().map(MetadataKey::as_str).collect();
                format!("unknown metadata key '{s}' (expected one of: {})", valid.join(", "))
            })
    }
}

/// A 400 on a metadata body means the key or value was rejected.
fn metadata_error(err: ProjectError) -> ProjectError {
    match err {
        ProjectError::BadRequest => ProjectError::InvalidRequest,
        other => other,
    }
}

fn check_project(project: &Project) -> Result<(), ProjectError> {
    if project.project_id <= 0 {
        return Err(ProjectError::InvalidId(project.project_id));
    }
    Ok(())
}

impl ProjectClient {
    /// Adds a metadata key to a project.
    pub async fn add_project_metadata(
        &self,
        project: &Project,
        key: MetadataKey,
        value: &str,
    ) -> Result<(), ProjectError> {
        check_project(project)?;
        if value.is_empty() {
            return Err(ProjectError::NotProvided("metadata value"));
        }

        let body = BTreeMap::from([(key.as_str(), value)]);
        let operation = Operation::post("/projects/{project_id}/metadatas")
            .path_param("project_id", project.project_id)
            .json(&body)
            .map_err(ProjectError::Transport)?;
        self.send(operation).await.map_err(metadata_error)?;

        Ok(())
    }

    /// Reads a single metadata value.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectError::NotFound`] when the key is not set.
    pub async fn get_project_metadata_value(
        &self,
        project: &Project,
        key: MetadataKey,
    ) -> Result<String, ProjectError> {
        check_project(project)?;

        let operation = Operation::get("/projects/{project_id}/metadatas/{meta_name}")
            .path_param("project_id", project.project_id)
            .path_param("meta_name", key);
        let mut values: BTreeMap<String, String> = self
            .send(operation)
            .await
            .map_err(metadata_error)?
            .json_opt()
            .map_err(ProjectError::Transport)?
            .unwrap_or_default();

        values.remove(key.as_str()).ok_or(ProjectError::NotFound)
    }

    /// Returns every metadata key set on a project.
    pub async fn list_project_metadata(
        &self,
        project: &Project,
    ) -> Result<BTreeMap<String, String>, ProjectError> {
        check_project(project)?;

        let operation = Operation::get("/projects/{project_id}/metadatas")
            .path_param("project_id", project.project_id);
        Ok(self
            .send(operation)
            .await?
            .json_opt()
            .map_err(ProjectError::Transport)?
            .unwrap_or_default())
    }

    /// Replaces a metadata value.
    ///
    /// Always issues `GET`, `DELETE` then `POST` on the key. A missing key
    /// is not an error.
    pub async fn update_project_metadata(
        &self,
        project: &Project,
        key: MetadataKey,
        value: &str,
    ) -> Result<(), ProjectError> {
        check_project(project)?;
        if value.is_empty() {
            return Err(ProjectError::NotProvided("metadata value"));
        }

        match self.get_project_metadata_value(project, key).await {
            Ok(previous) => tracing::debug!("Replacing {key}={previous} on {}", project.name),
            Err(ProjectError::NotFound) => {}
            Err(err) => return Err(err),
        }

        match self.delete_project_metadata_value(project, key).await {
            Ok(()) | Err(ProjectError::NotFound) => {}
            Err(err) => return Err(err),
        }

        self.add_project_metadata(project, key, value).await
    }

    /// Removes a metadata key from a project.
    pub async fn delete_project_metadata_value(
        &self,
        project: &Project,
        key: MetadataKey,
    ) -> Result<(), ProjectError> {
        check_project(project)?;

        let operation = Operation::delete("/projects/{project_id}/metadatas/{meta_name}")
            .path_param("project_id", project.project_id)
            .path_param("meta_name", key);
        self.send(operation).await.map_err(metadata_error)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::api::options::ListOptions;
    use crate::api::project::tests::library;
    use crate::api::testing::{empty, json, status, FakeTransport};
    use crate::api::transport::Method;

    type Store = Arc<Mutex<BTreeMap<String, String>>>;

    /// Backs `/projects/5/metadatas` with an in-memory map.
    fn store(seed: &[(&str, &str)]) -> (Store, Arc<FakeTransport>) {
        let store: Store = Arc::new(Mutex::new(
            seed.iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        ));

        let state = store.clone();
        let fake = FakeTransport::new(move |op| {
            let mut map = state.lock().unwrap();
            let segments = op.segments();
            let key = segments.get(3).cloned();

            match (op.method, key) {
                (Method::Get, None) => json(200, serde_json::to_value(&*map).unwrap()),
                (Method::Get, Some(key)) => match map.get(&key) {
                    Some(value) => json(200, serde_json::json!({ key: value })),
                    None => status(404),
                },
                (Method::Delete, Some(key)) => match map.remove(&key) {
                    Some(_) => empty(200),
                    None => status(404),
                },
                (Method::Post, None) => {
                    let body: BTreeMap<String, String> =
                        serde_json::from_value(op.body.clone().unwrap()).unwrap();
                    if body.values().any(|v| v == "bogus") {
                        return status(400);
                    }
                    map.extend(body);
                    empty(201)
                }
                _ => status(500),
            }
        });

        (store, fake)
    }

    #[tokio::test]
    async fn test_update_is_get_delete_post() {
        let (store, fake) = store(&[("auto_scan", "false")]);
        let client = ProjectClient::new(fake.clone(), ListOptions::default());

        client
            .update_project_metadata(&library(5), MetadataKey::AutoScan, "true")
            .await
            .unwrap();

        assert_eq!(
            fake.log(),
            vec![
                "GET /projects/5/metadatas/auto_scan",
                "DELETE /projects/5/metadatas/auto_scan",
                "POST /projects/5/metadatas",
            ]
        );
        assert_eq!(store.lock().unwrap()["auto_scan"], "true");
    }

    #[tokio::test]
    async fn test_update_missing_key_still_adds() {
        let (store, fake) = store(&[]);
        let client = ProjectClient::new(fake.clone(), ListOptions::default());

        client
            .update_project_metadata(&library(5), MetadataKey::Severity, "high")
            .await
            .unwrap();

        assert_eq!(fake.count(), 3);
        assert_eq!(store.lock().unwrap()["severity"], "high");
    }

    #[tokio::test]
    async fn test_get_and_list() {
        let (_, fake) = store(&[("public", "true"), ("auto_scan", "false")]);
        let client = ProjectClient::new(fake, ListOptions::default());

        let value = client
            .get_project_metadata_value(&library(5), MetadataKey::Public)
            .await
            .unwrap();
        assert_eq!(value, "true");

        assert!(matches!(
            client
                .get_project_metadata_value(&library(5), MetadataKey::PreventVul)
                .await
                .unwrap_err(),
            ProjectError::NotFound
        ));

        let all = client.list_project_metadata(&library(5)).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_rejected_value_is_invalid_request() {
        let (_, fake) = store(&[]);
        let client = ProjectClient::new(fake, ListOptions::default());

        assert!(matches!(
            client
                .add_project_metadata(&library(5), MetadataKey::Severity, "bogus")
                .await
                .unwrap_err(),
            ProjectError::InvalidRequest
        ));
    }

    #[tokio::test]
    async fn test_preconditions_make_no_call() {
        let fake = FakeTransport::offline();
        let client = ProjectClient::new(fake.clone(), ListOptions::default());

        assert!(matches!(
            client
                .add_project_metadata(&library(0), MetadataKey::Public, "true")
                .await
                .unwrap_err(),
            ProjectError::InvalidId(0)
        ));
        assert!(matches!(
            client
                .update_project_metadata(&library(5), MetadataKey::Public, "")
                .await
                .unwrap_err(),
            ProjectError::NotProvided(_)
        ));
        assert_eq!(fake.count(), 0);
    }

    #[test]
    fn test_key_parsing() {
        assert_eq!(
            "reuse_sys_cve_allowlist".parse::<MetadataKey>().unwrap(),
            MetadataKey::ReuseSysCveAllowlist
        );
        assert!("retention_id".parse::<MetadataKey>().is_err());
        for key in MetadataKey::ALL {
            assert_eq!(key.to_string().parse::<MetadataKey>().unwrap(), key);
        }
    }
}
