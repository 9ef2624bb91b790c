//
//  harbor-client
//  cli/registry.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Registry endpoint commands
//!
//! ## Examples
//!
//! ```bash
//! # Register Docker Hub with credentials
//! harbor registry create dockerhub https://hub.docker.com --type docker-hub \
//!     --access-key me --access-secret token
//!
//! # Point an endpoint at a new URL
//! harbor registry update dockerhub --endpoint https://registry-1.docker.io
//! ```

use anyhow::{bail, Result};
use clap::{Args, Subcommand};

use crate::api::registry::{Registry, RegistryClient, RegistryCredential};
use crate::api::NameOrId;

use super::user::print_exists;
use super::{confirm, GlobalOptions};

/// Manage remote registry endpoints
#[derive(Args, Debug)]
pub struct RegistryCommand {
    #[command(subcommand)]
    pub command: RegistrySubcommand,
}

#[derive(Subcommand, Debug)]
pub enum RegistrySubcommand {
    /// List registry endpoints
    #[command(visible_alias = "ls")]
    List,

    /// View a registry by name or ID
    View(RegistryArg),

    /// Register a new remote registry
    Create(CreateArgs),

    /// Update an existing registry
    Update(UpdateArgs),

    /// Delete a registry
    Delete(DeleteArgs),

    /// Check whether a registry exists
    Exists(RegistryArg),
}

#[derive(Args, Debug)]
pub struct RegistryArg {
    /// Registry name or numeric registry ID
    pub registry: NameOrId,
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Registry name
    pub name: String,

    /// Endpoint URL
    pub endpoint: String,

    /// Adapter type, e.g. harbor, docker-hub, docker-registry
    #[arg(long = "type", short = 't', default_value = "harbor")]
    pub kind: String,

    /// Description
    #[arg(long, short = 'd')]
    pub description: Option<String>,

    /// Access key or username for the remote registry
    #[arg(long)]
    pub access_key: Option<String>,

    /// Access secret or password for the remote registry
    #[arg(long, requires = "access_key")]
    pub access_secret: Option<String>,

    /// Skip TLS verification against the remote registry
    #[arg(long)]
    pub skip_tls_verify: bool,
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Registry name or numeric registry ID
    pub registry: NameOrId,

    /// New endpoint URL
    #[arg(long)]
    pub endpoint: Option<String>,

    /// New description
    #[arg(long, short = 'd')]
    pub description: Option<String>,

    /// New access key
    #[arg(long)]
    pub access_key: Option<String>,

    /// New access secret
    #[arg(long)]
    pub access_secret: Option<String>,

    /// Skip TLS verification against the remote registry
    #[arg(long)]
    pub skip_tls_verify: Option<bool>,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Registry name or numeric registry ID
    pub registry: NameOrId,

    /// Skip confirmation prompt
    #[arg(long)]
    pub confirm: bool,
}

impl RegistryCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        match &self.command {
            RegistrySubcommand::List => self.list(global).await,
            RegistrySubcommand::View(args) => self.view(args, global).await,
            RegistrySubcommand::Create(args) => self.create(args, global).await,
            RegistrySubcommand::Update(args) => self.update(args, global).await,
            RegistrySubcommand::Delete(args) => self.delete(args, global).await,
            RegistrySubcommand::Exists(args) => self.exists(args, global).await,
        }
    }

    async fn list(&self, global: &GlobalOptions) -> Result<()> {
        let registries = global.client()?.registries().list_registries().await?;
        global.output().write_list(&registries)
    }

    async fn view(&self, args: &RegistryArg, global: &GlobalOptions) -> Result<()> {
        let registries = global.client()?.registries();
        let registry = resolve(&registries, &args.registry).await?;
        global.output().write(&registry)
    }

    async fn create(&self, args: &CreateArgs, global: &GlobalOptions) -> Result<()> {
        let credential = args.access_key.as_ref().map(|key| RegistryCredential {
            kind: "basic".to_string(),
            access_key: Some(key.clone()),
            access_secret: args.access_secret.clone(),
        });

        let registry = Registry {
            name: args.name.clone(),
            url: args.endpoint.clone(),
            kind: args.kind.clone(),
            description: args.description.clone(),
            insecure: args.skip_tls_verify,
            credential,
            ..Registry::default()
        };

        let created = global
            .client()?
            .registries()
            .create_registry(&registry)
            .await?;

        let writer = global.output();
        if global.json {
            writer.write(&created)?;
        } else {
            writer.write_success(&format!(
                "Created registry {} (ID {})",
                created.name, created.id
            ));
        }
        Ok(())
    }

    async fn update(&self, args: &UpdateArgs, global: &GlobalOptions) -> Result<()> {
        if args.endpoint.is_none()
            && args.description.is_none()
            && args.access_key.is_none()
            && args.access_secret.is_none()
            && args.skip_tls_verify.is_none()
        {
            bail!("Nothing to update.");
        }

        let registries = global.client()?.registries();
        let mut registry = resolve(&registries, &args.registry).await?;

        if let Some(endpoint) = &args.endpoint {
            registry.url = endpoint.clone();
        }
        if let Some(description) = &args.description {
            registry.description = Some(description.clone());
        }
        if let Some(insecure) = args.skip_tls_verify {
            registry.insecure = insecure;
        }
        if args.access_key.is_some() || args.access_secret.is_some() {
            let credential = registry.credential.get_or_insert_with(|| RegistryCredential {
                kind: "basic".to_string(),
                ..RegistryCredential::default()
            });
            if let Some(key) = &args.access_key {
                credential.access_key = Some(key.clone());
            }
            if let Some(secret) = &args.access_secret {
                credential.access_secret = Some(secret.clone());
            }
        }

        registries.update_registry(&registry).await?;
        global
            .output()
            .write_success(&format!("Updated registry {}", registry.name));
        Ok(())
    }

    async fn delete(&self, args: &DeleteArgs, global: &GlobalOptions) -> Result<()> {
        let registries = global.client()?.registries();
        let registry = resolve(&registries, &args.registry).await?;

        if !confirm(
            &format!("Delete registry {}?", registry.name),
            args.confirm,
            global,
        )? {
            return Ok(());
        }

        registries.delete_registry(&registry).await?;
        global
            .output()
            .write_success(&format!("Deleted registry {}", registry.name));
        Ok(())
    }

    async fn exists(&self, args: &RegistryArg, global: &GlobalOptions) -> Result<()> {
        let exists = global
            .client()?
            .registries()
            .registry_exists(args.registry.clone())
            .await?;
        print_exists("Registry", &args.registry, exists, global)
    }
}

/// Looks up a registry by name or ID.
pub(super) async fn resolve(registries: &RegistryClient, registry: &NameOrId) -> Result<Registry> {
    let registry = match registry {
        NameOrId::Id(id) => registries.get_registry_by_id(*id).await?,
        NameOrId::Name(name) => registries.get_registry_by_name(name).await?,
    };
    Ok(registry)
}
