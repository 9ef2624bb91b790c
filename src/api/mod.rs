//
//  harbor-client
//  api/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # API Client Layer
//!
//! This module provides the client for Harbor's v2 REST API (`/api/v2.0`).
//!
//! ## Architecture
//!
//! - [`transport`]: The [`Transport`] boundary and the [`Operation`](transport::Operation)
//!   descriptor every call is expressed as
//! - [`client`]: The reqwest-backed [`RestTransport`](client::RestTransport) and the
//!   [`HarborClient`] facade handing out subclients
//! - [`options`]: Per-subclient [`ListOptions`] (page, page size, sort, query)
//! - [`common`]: Shared types ([`NameOrId`], status classification)
//! - [`user`], [`project`], [`registry`], [`replication`], [`webhook`], [`system`]:
//!   One subclient per resource, each with its own error type and translator
//!
//! ## Usage
//!
//! ```rust,no_run
//! use harbor_client::api::HarborClient;
//! use harbor_client::auth::Credential;
//! use harbor_client::config::ClientConfig;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::new("harbor.example.com")
//!     .with_credential(Credential::basic("admin", "Harbor12345"))
//!     .with_page_size(50);
//! let client = HarborClient::new(&config)?;
//!
//! if !client.projects().project_exists("team-a").await? {
//!     println!("team-a is missing");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Each subclient returns its own error enum. Status failures are mapped by
//! the resource's `translate` function:
//!
//! - `400`: `BadRequest` (`IllegalIdFormat` or `InvalidRequest` on some calls)
//! - `401`: `Unauthorized`
//! - `403`: `NoPermission`
//! - `404`: `NotFound` (`IdNotExists` for users addressed by ID)
//! - `409`: `AlreadyExists`
//! - `500`: `InternalError`
//!
//! Anything else is passed along in the `Transport` variant.

/// reqwest-backed transport and the [`HarborClient`] facade.
pub mod client;

/// Shared identifier and status types.
pub mod common;

/// List request shaping.
pub mod options;

/// Project subclient, including metadata and membership calls.
pub mod project;

/// Registry endpoint subclient.
pub mod registry;

/// Replication policy and execution subclient.
pub mod replication;

/// Instance information and GC schedule subclient.
pub mod system;

/// The transport boundary.
pub mod transport;

/// User subclient.
pub mod user;

/// Project webhook policy subclient.
pub mod webhook;

#[cfg(test)]
pub(crate) mod testing;

pub use client::HarborClient;
pub use common::NameOrId;
pub use options::ListOptions;
pub use transport::{Transport, TransportError};
