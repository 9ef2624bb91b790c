//
//  harbor-client
//  api/transport.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Transport Boundary
//!
//! Every subclient talks to Harbor through the [`Transport`] trait. A call is
//! described by an [`Operation`] (method, path template, path and query
//! parameters, JSON body and the status codes the endpoint documents as
//! success) and answered with a [`Response`] or a [`TransportError`].
//!
//! The production implementation is [`RestTransport`](super::client::RestTransport);
//! tests swap in a recording fake.
//!
//! ## Path Templates
//!
//! Templates use `{placeholder}` segments which are substituted from the
//! operation's path parameters:
//!
//! ```rust
//! use harbor_client::api::transport::{Method, Operation};
//!
//! let op = Operation::new(Method::Delete, "/projects/{project_id}/members/{mid}")
//!     .path_param("project_id", 3)
//!     .path_param("mid", 7);
//!
//! assert_eq!(op.path(), "/projects/3/members/7");
//! ```

use std::fmt;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// HTTP verbs used by the Harbor API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    /// Returns the upper-case verb.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }

    /// Status codes an endpoint answers with on success unless the
    /// operation says otherwise.
    fn default_expected(self) -> &'static [u16] {
        match self {
            Self::Post => &[201],
            Self::Get | Self::Put | Self::Delete => &[200],
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Describes a single call against the Harbor API.
///
/// Operations are plain values: building one has no side effects and the
/// same operation can be inspected by a test double before or instead of
/// being sent.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    /// HTTP method.
    pub method: Method,

    /// Path relative to the API base, with `{name}` placeholders.
    pub path_template: &'static str,

    /// Values for the placeholders in `path_template`.
    pub path_params: Vec<(&'static str, String)>,

    /// Query string parameters, in insertion order.
    pub query: Vec<(String, String)>,

    /// JSON request body.
    pub body: Option<serde_json::Value>,

    /// Status codes treated as success. Anything else is reported as
    /// [`TransportError::Status`].
    pub expected_status: &'static [u16],
}

impl Operation {
    /// Creates an operation with the method's default success codes
    /// (`201` for POST, `200` otherwise).
    pub fn new(method: Method, path_template: &'static str) -> Self {
        Self {
            method,
            path_template,
            path_params: Vec::new(),
            query: Vec::new(),
            body: None,
            expected_status: method.default_expected(),
        }
    }

    pub fn get(path_template: &'static str) -> Self {
        Self::new(Method::Get, path_template)
    }

    pub fn post(path_template: &'static str) -> Self {
        Self::new(Method::Post, path_template)
    }

    pub fn put(path_template: &'static str) -> Self {
        Self::new(Method::Put, path_template)
    }

    pub fn delete(path_template: &'static str) -> Self {
        Self::new(Method::Delete, path_template)
    }

    /// Binds a `{name}` placeholder.
    #[must_use]
    pub fn path_param(mut self, name: &'static str, value: impl ToString) -> Self {
        self.path_params.push((name, value.to_string()));
        self
    }

    /// Appends a query parameter.
    #[must_use]
    pub fn query(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((name.into(), value.to_string()));
        self
    }

    /// Appends a query parameter when a value is present.
    #[must_use]
    pub fn query_opt(self, name: impl Into<String>, value: Option<impl ToString>) -> Self {
        match value {
            Some(value) => self.query(name, value),
            None => self,
        }
    }

    /// Serializes `body` as the JSON request body.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Decode`] if `body` cannot be represented as JSON.
    pub fn json<B: Serialize>(mut self, body: &B) -> Result<Self, TransportError> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Returns the resolved path segments, unencoded.
    ///
    /// Placeholders without a bound value are left as-is.
    pub fn segments(&self) -> Vec<String> {
        self.path_template
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(|segment| {
                segment
                    .strip_prefix('{')
                    .and_then(|s| s.strip_suffix('}'))
                    .and_then(|name| {
                        self.path_params
                            .iter()
                            .find(|(param, _)| *param == name)
                            .map(|(_, value)| value.clone())
                    })
                    .unwrap_or_else(|| segment.to_string())
            })
            .collect()
    }

    /// Returns the resolved path, e.g. `/users/5`.
    pub fn path(&self) -> String {
        format!("/{}", self.segments().join("/"))
    }

    /// Looks up a query parameter by name.
    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path())
    }
}

/// A successful answer from the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    /// HTTP status code.
    pub status: u16,

    /// Decoded JSON body, `None` when the server sent no body.
    pub body: Option<serde_json::Value>,
}

impl Response {
    pub fn new(status: u16, body: Option<serde_json::Value>) -> Self {
        Self { status, body }
    }

    /// Decodes the body into `T`. A missing body decodes as JSON `null`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Decode`] when the body does not match `T`.
    pub fn json<T: DeserializeOwned>(self) -> Result<T, TransportError> {
        Ok(serde_json::from_value(
            self.body.unwrap_or(serde_json::Value::Null),
        )?)
    }

    /// Decodes the body into `T`, returning `None` when there is no payload.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Decode`] when a payload is present but does
    /// not match `T`.
    pub fn json_opt<T: DeserializeOwned>(self) -> Result<Option<T>, TransportError> {
        match self.body {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
        }
    }
}

/// Raw failure reported by a [`Transport`].
///
/// Subclients never hand this to callers directly for status failures;
/// each resource runs it through its own translator first. Failures the
/// translators do not recognise are passed along unchanged.
#[derive(Error, Debug)]
pub enum TransportError {
    /// The server answered with a status the operation does not list as success.
    #[error("unexpected status {code}: {message}")]
    Status {
        /// HTTP status code.
        code: u16,
        /// Message extracted from the error body.
        message: String,
    },

    /// Connection, TLS or timeout failure.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The request or response body was not valid for its type.
    #[error("Invalid JSON body: {0}")]
    Decode(#[from] serde_json::Error),

    /// The configured server URL cannot be used as an API base.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl TransportError {
    /// Builds a status failure.
    pub fn from_status(code: u16, message: impl Into<String>) -> Self {
        Self::Status {
            code,
            message: message.into(),
        }
    }

    /// Returns the HTTP status code for status failures.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// Executes [`Operation`]s against a Harbor server.
///
/// Implementations must be safe to share between tasks; subclients hold
/// them behind an `Arc` and never mutate them.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Submits one operation and waits for its answer.
    async fn submit(&self, operation: Operation) -> Result<Response, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_expected_status() {
        assert_eq!(Operation::post("/users").expected_status, &[201]);
        assert_eq!(Operation::get("/users").expected_status, &[200]);
        assert_eq!(Operation::put("/users/1").expected_status, &[200]);
        assert_eq!(Operation::delete("/users/1").expected_status, &[200]);
    }

    #[test]
    fn test_path_substitution() {
        let op = Operation::get("/projects/{project_id}/metadatas/{meta_name}")
            .path_param("project_id", 12)
            .path_param("meta_name", "auto_scan");
        assert_eq!(op.path(), "/projects/12/metadatas/auto_scan");
        assert_eq!(op.to_string(), "GET /projects/12/metadatas/auto_scan");
    }

    #[test]
    fn test_unbound_placeholder_is_kept() {
        let op = Operation::get("/users/{user_id}");
        assert_eq!(op.path(), "/users/{user_id}");
    }

    #[test]
    fn test_query_helpers() {
        let op = Operation::get("/users")
            .query("page_size", 10)
            .query_opt("sort", None::<String>)
            .query_opt("q", Some("username=~alice"));
        assert_eq!(op.query_value("page_size"), Some("10"));
        assert_eq!(op.query_value("sort"), None);
        assert_eq!(op.query_value("q"), Some("username=~alice"));
    }

    #[test]
    fn test_response_json_opt() {
        let empty = Response::new(200, None);
        assert_eq!(empty.json_opt::<serde_json::Value>().unwrap(), None);

        let null = Response::new(200, Some(serde_json::Value::Null));
        assert_eq!(null.json_opt::<serde_json::Value>().unwrap(), None);

        let value = Response::new(200, Some(serde_json::json!({"a": 1})));
        let decoded: serde_json::Value = value.json_opt().unwrap().unwrap();
        assert_eq!(decoded["a"], 1);
    }

    #[test]
    fn test_error_status() {
        assert_eq!(TransportError::from_status(404, "gone").status(), Some(404));
        let decode = serde_json::from_str::<u8>("x").unwrap_err();
        assert_eq!(TransportError::from(decode).status(), None);
    }
}
