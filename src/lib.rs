//
//  harbor-client
//  lib.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Harbor Client Library
//!
//! A client for the Harbor container registry's v2 REST API, and the
//! `harbor` command-line tool built on it.
//!
//! ## Overview
//!
//! The library is organised as one subclient per Harbor resource, all
//! sharing a single [`Transport`](api::Transport):
//!
//! - **Users**: create, look up, search, update profile/password/admin flag, delete
//! - **Projects**: CRUD, metadata keys and project membership
//! - **Registries**: remote registry endpoints
//! - **Replication**: policies and their executions
//! - **Webhooks**: per-project notification policies
//! - **System**: version info, health, statistics and the GC schedule
//!
//! Every update or delete first re-fetches the entity by name and refuses
//! to proceed when the caller's ID no longer matches the server's.
//!
//! ## Module Structure
//!
//! - [`api`]: Transport boundary, HTTP client and resource subclients
//! - [`auth`]: HTTP Basic credentials
//! - [`config`]: Client configuration and the CLI's config file
//! - [`cli`]: Command-line interface definitions using clap
//! - [`output`]: Table and JSON rendering for the CLI
//! - [`util`]: Time and size formatting
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use harbor_client::api::HarborClient;
//! use harbor_client::auth::Credential;
//! use harbor_client::config::ClientConfig;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::new("https://harbor.example.com")
//!     .with_credential(Credential::basic("admin", "Harbor12345"));
//! let client = HarborClient::new(&config)?;
//!
//! let user = client.users().get_user_by_name("alice").await?;
//! println!("alice has ID {}", user.user_id);
//! # Ok(())
//! # }
//! ```

/// Command-line interface definitions.
///
/// Contains all CLI commands, arguments, and subcommands defined using the clap derive API.
pub mod cli;

/// Harbor v2 API client.
///
/// The transport boundary, the reqwest-backed HTTP client and one
/// subclient per resource.
pub mod api;

/// HTTP Basic credentials attached to every request.
pub mod auth;

/// Configuration.
///
/// [`ClientConfig`](config::ClientConfig) for library users and the
/// TOML file the CLI reads, stored in platform-specific locations:
/// - Linux: `~/.config/harbor/config.toml`
/// - macOS: `~/Library/Application Support/harbor/config.toml`
/// - Windows: `%APPDATA%\harbor\config\config.toml`
pub mod config;

/// Output formatting for the CLI.
pub mod output;

/// Formatting and parsing helpers.
pub mod util;

/// Re-export of the main CLI struct.
pub use cli::Cli;

/// Re-export of the CLI configuration file.
pub use config::Config;

/// Application name, used for display and the configuration directory.
pub const APP_NAME: &str = "harbor";

/// Application version, from Cargo.toml.
///
/// # Example
///
/// ```rust
/// use harbor_client::VERSION;
///
/// println!("harbor version {}", VERSION);
/// ```
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Exit codes for the CLI.
///
/// # Exit Code Ranges
///
/// - `0`: Success
/// - `1-3`: General errors and usage issues
/// - `4-7`: Authentication and permission issues
/// - `8-15`: Resource-related issues
/// - `16-31`: Operation-related issues
pub mod exit_codes {
    use crate::api::project::ProjectError;
    use crate::api::registry::RegistryError;
    use crate::api::replication::ReplicationError;
    use crate::api::system::SystemError;
    use crate::api::user::UserError;
    use crate::api::webhook::WebhookError;

    /// The command completed without errors.
    pub const SUCCESS: i32 = 0;

    /// An unspecified error occurred. Check stderr for details.
    pub const ERROR: i32 = 1;

    /// The command was invoked with invalid arguments or options.
    pub const USAGE: i32 = 2;

    /// Credentials are missing or were rejected, or the user lacks the
    /// required role.
    pub const AUTH_ERROR: i32 = 4;

    /// The requested user, project, registry or policy does not exist.
    pub const NOT_FOUND: i32 = 8;

    /// The resource already exists.
    pub const CONFLICT: i32 = 9;

    /// The caller's ID does not match the server's record for that name.
    pub const MISMATCH: i32 = 10;

    /// Picks the exit code for an error returned by a command.
    pub fn for_error(err: &anyhow::Error) -> i32 {
        err.chain()
            .find_map(|cause| {
                if let Some(e) = cause.downcast_ref::<UserError>() {
                    return Some(match e {
                        UserError::NotFound | UserError::IdNotExists => NOT_FOUND,
                        UserError::Unauthorized | UserError::NoPermission => AUTH_ERROR,
                        UserError::AlreadyExists => CONFLICT,
                        UserError::Mismatch => MISMATCH,
                        _ => ERROR,
                    });
                }
                if let Some(e) = cause.downcast_ref::<ProjectError>() {
                    return Some(match e {
                        ProjectError::NotFound | ProjectError::UserIsNoMember => NOT_FOUND,
                        ProjectError::Unauthorized | ProjectError::NoPermission => AUTH_ERROR,
                        ProjectError::AlreadyExists => CONFLICT,
                        ProjectError::Mismatch | ProjectError::MemberMismatch => MISMATCH,
                        _ => ERROR,
                    });
                }
                if let Some(e) = cause.downcast_ref::<RegistryError>() {
                    return Some(match e {
                        RegistryError::NotFound => NOT_FOUND,
                        RegistryError::Unauthorized | RegistryError::NoPermission => AUTH_ERROR,
                        RegistryError::AlreadyExists => CONFLICT,
                        RegistryError::Mismatch => MISMATCH,
                        _ => ERROR,
                    });
                }
                if let Some(e) = cause.downcast_ref::<ReplicationError>() {
                    return Some(match e {
                        ReplicationError::NotFound | ReplicationError::IdNotExists => NOT_FOUND,
                        ReplicationError::Unauthorized | ReplicationError::NoPermission => {
                            AUTH_ERROR
                        }
                        ReplicationError::AlreadyExists => CONFLICT,
                        ReplicationError::Mismatch => MISMATCH,
                        _ => ERROR,
                    });
                }
                if let Some(e) = cause.downcast_ref::<WebhookError>() {
                    return Some(match e {
                        WebhookError::NotFound => NOT_FOUND,
                        WebhookError::Unauthorized | WebhookError::NoPermission => AUTH_ERROR,
                        WebhookError::AlreadyExists => CONFLICT,
                        WebhookError::Mismatch => MISMATCH,
                        _ => ERROR,
                    });
                }
                if let Some(e) = cause.downcast_ref::<SystemError>() {
                    return Some(match e {
                        SystemError::NotFound => NOT_FOUND,
                        SystemError::Unauthorized | SystemError::NoPermission => AUTH_ERROR,
                        SystemError::AlreadyExists => CONFLICT,
                        _ => ERROR,
                    });
                }
                None
            })
            .unwrap_or(ERROR)
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_for_error() {
            let err = anyhow::Error::new(UserError::NotFound);
            assert_eq!(for_error(&err), NOT_FOUND);

            let err = anyhow::Error::new(ProjectError::MemberMismatch).context("adding member");
            assert_eq!(for_error(&err), MISMATCH);

            let err = anyhow::Error::new(SystemError::NoPermission);
            assert_eq!(for_error(&err), AUTH_ERROR);

            assert_eq!(for_error(&anyhow::anyhow!("boom")), ERROR);
        }
    }
}
