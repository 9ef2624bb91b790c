//
//  harbor-client
//  config/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Configuration Module
//!
//! Two layers of configuration live here:
//!
//! - [`ClientConfig`]: what the library needs to talk to a Harbor instance
//!   (URL, credential, timeout, TLS verification and list defaults). It is
//!   built in code and passed to [`HarborClient::new`](crate::api::HarborClient::new).
//! - [`Config`]: the `harbor` CLI's TOML file, stored in the platform
//!   configuration directory, which produces a [`ClientConfig`].
//!
//! ## Configuration File Location
//!
//! - **Linux**: `~/.config/harbor/config.toml`
//! - **macOS**: `~/Library/Application Support/harbor/config.toml`
//! - **Windows**: `C:\Users\<User>\AppData\Roaming\harbor\config.toml`
//!
//! ## Example Configuration File
//!
//! ```toml
//! [server]
//! url = "https://harbor.example.com"
//! username = "admin"
//! insecure = false
//!
//! [defaults]
//! page_size = 25
//! sort = "name"
//! timeout_secs = 30
//! ```
//!
//! The password is never written to the file; the CLI reads it from
//! `--password` or `HARBOR_PASSWORD`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::api::options::{ListOptions, DEFAULT_PAGE_SIZE};
use crate::auth::Credential;

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Keys accepted by [`Config::get`] and [`Config::set`].
pub const VALID_KEYS: &[&str] = &[
    "url",
    "username",
    "insecure",
    "page_size",
    "sort",
    "query",
    "timeout_secs",
];

/// Settings for a [`HarborClient`](crate::api::HarborClient).
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use harbor_client::auth::Credential;
/// use harbor_client::config::ClientConfig;
///
/// let config = ClientConfig::new("https://harbor.example.com")
///     .with_credential(Credential::basic("admin", "Harbor12345"))
///     .with_timeout(Duration::from_secs(10))
///     .with_page_size(100);
///
/// assert_eq!(config.list.page_size, 100);
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Harbor URL; `/api/v2.0` is appended when missing.
    pub url: String,

    /// Basic credential attached to every request.
    pub credential: Option<Credential>,

    /// Per-request timeout.
    pub timeout: Duration,

    /// Skip TLS certificate verification.
    pub insecure: bool,

    /// List defaults handed to every subclient.
    pub list: ListOptions,
}

impl ClientConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            credential: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            insecure: false,
            list: ListOptions::default(),
        }
    }

    #[must_use]
    pub fn with_credential(mut self, credential: Credential) -> Self {
        self.credential = Some(credential);
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn insecure(mut self, insecure: bool) -> Self {
        self.insecure = insecure;
        self
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: i64) -> Self {
        self.list = self.list.with_page_size(page_size);
        self
    }

    #[must_use]
    pub fn with_sort(mut self, sort: impl Into<String>) -> Self {
        self.list = self.list.with_sort(sort);
        self
    }

    #[must_use]
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.list = self.list.with_query(query);
        self
    }
}

/// The CLI configuration file.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Which Harbor instance to talk to.
    #[serde(default)]
    pub server: ServerConfig,

    /// Defaults for list calls and timeouts.
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

/// Connection settings for the configured Harbor instance.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ServerConfig {
    /// Base URL, e.g. `https://harbor.example.com`.
    #[serde(default)]
    pub url: Option<String>,

    /// Account used for Basic authentication.
    #[serde(default)]
    pub username: Option<String>,

    /// Skip TLS certificate verification.
    #[serde(default)]
    pub insecure: bool,
}

/// Request defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DefaultsConfig {
    #[serde(default = "default_page_size")]
    pub page_size: i64,

    #[serde(default)]
    pub sort: Option<String>,

    #[serde(default)]
    pub query: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            sort: None,
            query: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Config {
    /// Loads the configuration from the default location, falling back to
    /// defaults when the file does not exist.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Loads the configuration from `path`.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Ok(toml::from_str(&content)?)
        } else {
            Ok(Self::default())
        }
    }

    /// Writes the configuration to the default location.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Writes the configuration to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("", "", crate::APP_NAME)
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Reads a value by key. Unset optional values yield `None`.
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "url" => self.server.url.clone(),
            "username" => self.server.username.clone(),
            "insecure" => Some(self.server.insecure.to_string()),
            "page_size" => Some(self.defaults.page_size.to_string()),
            "sort" => self.defaults.sort.clone(),
            "query" => self.defaults.query.clone(),
            "timeout_secs" => Some(self.defaults.timeout_secs.to_string()),
            _ => None,
        }
    }

    /// Sets a value by key, validating numeric and boolean values.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "url" => self.server.url = Some(value.to_string()),
            "username" => self.server.username = Some(value.to_string()),
            "insecure" => self.server.insecure = parse_value(key, value)?,
            "page_size" => {
                let page_size: i64 = parse_value(key, value)?;
                if page_size <= 0 {
                    bail!("page_size must be a positive integer");
                }
                self.defaults.page_size = page_size;
            }
            "sort" => self.defaults.sort = Some(value.to_string()),
            "query" => self.defaults.query = Some(value.to_string()),
            "timeout_secs" => self.defaults.timeout_secs = parse_value(key, value)?,
            _ => bail!(
                "Unknown configuration key '{}'. Valid keys: {}",
                key,
                VALID_KEYS.join(", ")
            ),
        }
        Ok(())
    }

    /// Resets a key to its default.
    pub fn unset(&mut self, key: &str) -> Result<()> {
        match key {
            "url" => self.server.url = None,
            "username" => self.server.username = None,
            "insecure" => self.server.insecure = false,
            "page_size" => self.defaults.page_size = default_page_size(),
            "sort" => self.defaults.sort = None,
            "query" => self.defaults.query = None,
            "timeout_secs" => self.defaults.timeout_secs = default_timeout_secs(),
            _ => bail!(
                "Unknown configuration key '{}'. Valid keys: {}",
                key,
                VALID_KEYS.join(", ")
            ),
        }
        Ok(())
    }

    /// Builds the client settings for the configured server.
    ///
    /// `url` and `username` override the file values when given.
    pub fn client_config(
        &self,
        url: Option<&str>,
        username: Option<&str>,
        password: Option<&str>,
    ) -> Result<ClientConfig> {
        let url = url
            .map(str::to_string)
            .or_else(|| self.server.url.clone())
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "No Harbor URL configured. Use --url, HARBOR_URL or 'harbor config set url <URL>'."
                )
            })?;

        let mut config = ClientConfig::new(url)
            .insecure(self.server.insecure)
            .with_timeout(Duration::from_secs(self.defaults.timeout_secs))
            .with_page_size(self.defaults.page_size);

        if let Some(sort) = &self.defaults.sort {
            config = config.with_sort(sort.clone());
        }
        if let Some(query) = &self.defaults.query {
            config = config.with_query(query.clone());
        }

        let username = username.map(str::to_string).or_else(|| self.server.username.clone());
        match (username, password) {
            (Some(username), Some(password)) => {
                config = config.with_credential(Credential::basic(username, password));
            }
            (Some(_), None) => {
                tracing::debug!("No password supplied, sending requests anonymously");
            }
            (None, Some(_)) => bail!("A password was supplied without a username"),
            (None, None) => {}
        }

        Ok(config)
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid value '{}' for {}", value, key))
}
