//
//  harbor-client
//  api/common/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Common API Types
//!
//! Shared building blocks for the resource subclients:
//!
//! - [`NameOrId`] - identifier accepted by the `*_exists` operations
//! - [`StatusKind`] - the status classes every error translator maps from
//!
//! # Example
//!
//! ```rust
//! use harbor_client::api::common::NameOrId;
//!
//! assert_eq!(NameOrId::from(7), NameOrId::Id(7));
//! assert_eq!(NameOrId::from("library"), NameOrId::Name("library".to_string()));
//! assert_eq!("42".parse::<NameOrId>().unwrap(), NameOrId::Id(42));
//! ```

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use super::transport::TransportError;

/// Identifies a resource either by its server-assigned ID or by its
/// unique name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NameOrId {
    Id(i64),
    Name(String),
}

impl From<i64> for NameOrId {
    fn from(id: i64) -> Self {
        Self::Id(id)
    }
}

impl From<&str> for NameOrId {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for NameOrId {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

/// Strings that parse as integers become IDs, everything else a name.
impl FromStr for NameOrId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.parse::<i64>() {
            Ok(id) => Self::Id(id),
            Err(_) => Self::Name(s.to_string()),
        })
    }
}

impl fmt::Display for NameOrId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Name(name) => f.write_str(name),
        }
    }
}

/// HTTP status classes shared by every resource's error translator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Created,
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    Internal,
}

impl StatusKind {
    /// Classifies a transport failure. Non-status failures and codes
    /// outside the shared table yield `None`.
    pub fn of(err: &TransportError) -> Option<Self> {
        match err.status()? {
            201 => Some(Self::Created),
            400 => Some(Self::BadRequest),
            401 => Some(Self::Unauthorized),
            403 => Some(Self::Forbidden),
            404 => Some(Self::NotFound),
            409 => Some(Self::Conflict),
            500 => Some(Self::Internal),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_or_id_parsing() {
        assert_eq!("12".parse::<NameOrId>().unwrap(), NameOrId::Id(12));
        assert_eq!("-1".parse::<NameOrId>().unwrap(), NameOrId::Id(-1));
        assert_eq!(
            "library".parse::<NameOrId>().unwrap(),
            NameOrId::Name("library".into())
        );
        assert_eq!(NameOrId::Name("x".into()).to_string(), "x");
    }

    #[test]
    fn test_status_kind() {
        let kind = |code| StatusKind::of(&TransportError::from_status(code, ""));
        assert_eq!(kind(201), Some(StatusKind::Created));
        assert_eq!(kind(400), Some(StatusKind::BadRequest));
        assert_eq!(kind(404), Some(StatusKind::NotFound));
        assert_eq!(kind(409), Some(StatusKind::Conflict));
        assert_eq!(kind(500), Some(StatusKind::Internal));
        assert_eq!(kind(502), None);
    }
}
