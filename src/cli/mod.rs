//
//  harbor-client
//  cli/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! CLI command definitions using clap derive macros

mod completion;
mod config;
mod project;
mod registry;
mod replication;
mod system;
mod user;
mod webhook;

pub use completion::CompletionCommand;
pub use config::ConfigCommand;
pub use project::ProjectCommand;
pub use registry::RegistryCommand;
pub use replication::ReplicationCommand;
pub use system::SystemCommand;
pub use user::UserCommand;
pub use webhook::WebhookCommand;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::api::HarborClient;
use crate::config::Config;
use crate::output::OutputWriter;

/// Harbor CLI - Manage a Harbor registry from the command line
#[derive(Parser, Debug)]
#[command(
    name = "harbor",
    version,
    about = "Manage a Harbor container registry from the command line",
    long_about = "harbor is a CLI for the Harbor v2 API.\n\n\
                  It manages users, projects, registries, replication, webhooks and \
                  system settings.",
    propagate_version = true,
    after_help = "Use 'harbor <command> --help' for more information about a command."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOptions,
}

/// Global options available to all commands
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Harbor URL, e.g. https://harbor.example.com
    #[arg(long, global = true, env = "HARBOR_URL")]
    pub url: Option<String>,

    /// Harbor username
    #[arg(long, short = 'u', global = true, env = "HARBOR_USERNAME")]
    pub username: Option<String>,

    /// Harbor password or CLI secret
    #[arg(long, global = true, env = "HARBOR_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Skip TLS certificate verification
    #[arg(long, global = true)]
    pub insecure: bool,

    /// Entries per page for list commands
    #[arg(long, global = true)]
    pub page_size: Option<i64>,

    /// Page to fetch for list commands
    #[arg(long, global = true, default_value = "1")]
    pub page: i64,

    /// Sort expression for list commands, e.g. -creation_time
    #[arg(long, global = true)]
    pub sort: Option<String>,

    /// Path to the configuration file
    #[arg(long, global = true, env = "HARBOR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable interactive prompts
    #[arg(long, global = true, env = "HARBOR_NO_PROMPT")]
    pub no_prompt: bool,
}

impl GlobalOptions {
    /// Loads the configuration file from `--config` or the default location.
    pub fn load_config(&self) -> Result<Config> {
        match &self.config {
            Some(path) => Config::load_from(path),
            None => Config::load(),
        }
    }

    /// Builds a client from the configuration file and the global flags.
    pub fn client(&self) -> Result<HarborClient> {
        let config = self.load_config()?;
        let mut client_config = config.client_config(
            self.url.as_deref(),
            self.username.as_deref(),
            self.password.as_deref(),
        )?;

        if self.insecure {
            client_config = client_config.insecure(true);
        }
        if let Some(page_size) = self.page_size {
            client_config = client_config.with_page_size(page_size);
        }
        if let Some(sort) = &self.sort {
            client_config = client_config.with_sort(sort.clone());
        }
        client_config.list = client_config.list.with_page(self.page);

        tracing::debug!("Using Harbor at {}", client_config.url);
        Ok(HarborClient::new(&client_config)?)
    }

    pub fn output(&self) -> OutputWriter {
        OutputWriter::from_flag(self.json)
    }
}

/// Asks for confirmation before a destructive action.
///
/// Returns `true` without prompting when `skip` is set.
pub(crate) fn confirm(prompt: &str, skip: bool, global: &GlobalOptions) -> Result<bool> {
    if skip {
        return Ok(true);
    }
    if global.no_prompt {
        anyhow::bail!("Refusing to continue without confirmation. Pass --confirm.");
    }

    let confirmed = dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()?;

    if !confirmed {
        println!("Cancelled.");
    }
    Ok(confirmed)
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage users
    User(UserCommand),

    /// Manage projects, their metadata and members
    #[command(visible_alias = "proj")]
    Project(ProjectCommand),

    /// Manage remote registry endpoints
    #[command(visible_alias = "reg")]
    Registry(RegistryCommand),

    /// Manage replication policies and executions
    #[command(visible_alias = "repl")]
    Replication(ReplicationCommand),

    /// Manage project webhook policies
    Webhook(WebhookCommand),

    /// Show system information and manage garbage collection
    System(SystemCommand),

    /// Manage CLI configuration
    Config(ConfigCommand),

    /// Generate shell completion scripts
    Completion(CompletionCommand),

    /// Print version information
    Version,
}
