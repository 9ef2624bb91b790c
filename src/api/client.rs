//
//  harbor-client
//  api/client.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # HTTP Client for the Harbor API
//!
//! This module provides [`RestTransport`], the reqwest-backed implementation
//! of [`Transport`], and [`HarborClient`], the entry point that hands out
//! resource subclients sharing one transport.
//!
//! ## Features
//!
//! - `/api/v2.0` base URL derivation from a bare host or URL
//! - Basic authentication on every request
//! - Per-client timeout and optional TLS verification bypass
//! - Harbor error body parsing for readable messages
//! - Custom User-Agent header

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use url::Url;

use super::options::ListOptions;
use super::project::ProjectClient;
use super::registry::RegistryClient;
use super::replication::ReplicationClient;
use super::system::SystemClient;
use super::transport::{Operation, Response, Transport, TransportError};
use super::user::UserClient;
use super::webhook::WebhookClient;
use crate::auth::Credential;
use crate::config::ClientConfig;

/// Path of the v2 API below the Harbor URL.
pub const API_PATH: &str = "/api/v2.0";

/// Parses a Harbor API error body and builds a status error.
///
/// Harbor reports failures as:
/// ```json
/// {"errors": [{"code": "NOT_FOUND", "message": "project 42 not found"}]}
/// ```
///
/// Older endpoints occasionally answer with a bare `{"message": "..."}` or
/// plain text. When nothing can be extracted the raw body is kept, and an
/// empty body falls back to the status' canonical reason.
pub fn format_api_error(status: StatusCode, body: &str) -> TransportError {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| {
            json.get("errors")
                .and_then(|e| e.as_array())
                .and_then(|arr| arr.first())
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .or_else(|| json.get("message").and_then(|m| m.as_str()))
                .map(str::to_string)
        })
        .unwrap_or_else(|| {
            let body = body.trim();
            if body.is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("no response body")
                    .to_string()
            } else {
                body.to_string()
            }
        });

    TransportError::from_status(status.as_u16(), message)
}

/// Derives the API base URL from a configured Harbor URL.
///
/// A missing scheme defaults to `https`, and [`API_PATH`] is appended
/// unless already present.
///
/// # Example
///
/// ```rust
/// use harbor_client::api::client::api_base_url;
///
/// let url = api_base_url("harbor.example.com/").unwrap();
/// assert_eq!(url.as_str(), "https://harbor.example.com/api/v2.0");
/// ```
pub fn api_base_url(raw: &str) -> Result<Url, url::ParseError> {
    let raw = raw.trim().trim_end_matches('/');
    let with_scheme = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("https://{raw}")
    };
    let base = if with_scheme.ends_with(API_PATH) {
        with_scheme
    } else {
        format!("{with_scheme}{API_PATH}")
    };
    Url::parse(&base)
}

/// [`Transport`] implementation over reqwest.
pub struct RestTransport {
    /// The underlying HTTP client
    http: Client,
    /// API base, e.g. `https://harbor.example.com/api/v2.0`
    base_url: Url,
    /// Optional authentication credentials
    credential: Option<Credential>,
}

impl RestTransport {
    /// Builds a transport from client settings.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::InvalidUrl`] for an unusable URL and
    /// [`TransportError::Network`] when the HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        let http = Client::builder()
            .user_agent(format!("{}/{}", crate::APP_NAME, crate::VERSION))
            .timeout(config.timeout)
            .danger_accept_invalid_certs(config.insecure)
            .build()?;

        Ok(Self {
            http,
            base_url: api_base_url(&config.url)?,
            credential: config.credential.clone(),
        })
    }

    /// Returns the API base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Builds the full request URL, percent-encoding each path segment.
    pub fn url_for(&self, operation: &Operation) -> Result<Url, TransportError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| TransportError::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(operation.segments());

        if !operation.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&operation.query);
        }

        Ok(url)
    }
}

#[async_trait]
impl Transport for RestTransport {
    async fn submit(&self, operation: Operation) -> Result<Response, TransportError> {
        let url = self.url_for(&operation)?;
        tracing::debug!("{} {}", operation.method, url);

        let mut request = self.http.request(operation.method.into(), url);

        if let Some(credential) = &self.credential {
            request = credential.apply_to_request(request);
        }

        if let Some(body) = &operation.body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !operation.expected_status.contains(&status.as_u16()) {
            tracing::debug!("{} answered {}", operation, status);
            return Err(format_api_error(status, &text));
        }

        let body = if text.trim().is_empty() {
            None
        } else {
            Some(serde_json::from_str(&text)?)
        };

        Ok(Response::new(status.as_u16(), body))
    }
}

/// Entry point for the Harbor API.
///
/// A `HarborClient` owns a shared [`Transport`] and the default
/// [`ListOptions`]; each accessor hands out a subclient holding its own
/// copy of both, so subclients can be moved into tasks freely.
///
/// # Example
///
/// ```rust,no_run
/// use harbor_client::api::HarborClient;
/// use harbor_client::auth::Credential;
/// use harbor_client::config::ClientConfig;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = ClientConfig::new("https://harbor.example.com")
///     .with_credential(Credential::basic("admin", "Harbor12345"));
/// let client = HarborClient::new(&config)?;
///
/// let project = client.projects().get_project_by_name("library").await?;
/// println!("{} has id {}", project.name, project.project_id);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct HarborClient {
    transport: Arc<dyn Transport>,
    options: ListOptions,
}

impl HarborClient {
    /// Creates a client talking HTTP to the configured server.
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        let transport = RestTransport::new(config)?;
        Ok(Self::with_transport(Arc::new(transport), config.list.clone()))
    }

    /// Creates a client over any transport.
    pub fn with_transport(transport: Arc<dyn Transport>, options: ListOptions) -> Self {
        Self { transport, options }
    }

    /// The list defaults handed to subclients.
    pub fn options(&self) -> &ListOptions {
        &self.options
    }

    pub fn users(&self) -> UserClient {
        UserClient::new(self.transport.clone(), self.options.clone())
    }

    pub fn projects(&self) -> ProjectClient {
        ProjectClient::new(self.transport.clone(), self.options.clone())
    }

    pub fn registries(&self) -> RegistryClient {
        RegistryClient::new(self.transport.clone(), self.options.clone())
    }

    pub fn replications(&self) -> ReplicationClient {
        ReplicationClient::new(self.transport.clone(), self.options.clone())
    }

    pub fn webhooks(&self) -> WebhookClient {
        WebhookClient::new(self.transport.clone(), self.options.clone())
    }

    pub fn system(&self) -> SystemClient {
        SystemClient::new(self.transport.clone())
    }
}
