//
//  harbor-client
//  cli/webhook.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Webhook policy commands
//!
//! Webhook policies belong to a project; every subcommand takes the project
//! first.
//!
//! ## Examples
//!
//! ```bash
//! # List webhook policies of a project
//! harbor webhook list team-a
//!
//! # Notify CI on every push
//! harbor webhook create team-a ci --address https://ci.example.com/hook \
//!     --events PUSH_ARTIFACT
//!
//! # Delete a policy
//! harbor webhook delete team-a ci
//! ```

use anyhow::{bail, Result};
use clap::{Args, Subcommand};

use crate::api::project::Project;
use crate::api::webhook::{WebhookClient, WebhookPolicy, WebhookTarget, EVENT_TYPES};
use crate::api::NameOrId;

use super::project::resolve as resolve_project;
use super::{confirm, GlobalOptions};

/// Manage project webhook policies
#[derive(Args, Debug)]
pub struct WebhookCommand {
    #[command(subcommand)]
    pub command: WebhookSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum WebhookSubcommand {
    /// List webhook policies of a project
    #[command(visible_alias = "ls")]
    List(ProjectArg),

    /// View a webhook policy
    View(PolicyArgs),

    /// Create a webhook policy
    Create(CreateArgs),

    /// Update a webhook policy
    Edit(EditArgs),

    /// Delete a webhook policy
    Delete(DeleteArgs),

    /// Check whether a webhook policy exists
    Exists(PolicyArgs),

    /// List the event types a policy can subscribe to
    Events,
}

#[derive(Args, Debug)]
pub struct ProjectArg {
    /// Project name or numeric project ID
    pub project: NameOrId,
}

#[derive(Args, Debug)]
pub struct PolicyArgs {
    /// Project name or numeric project ID
    pub project: NameOrId,

    /// Policy name or numeric policy ID
    pub policy: NameOrId,
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Project name or numeric project ID
    pub project: NameOrId,

    /// Policy name
    pub name: String,

    /// Endpoint notifications are posted to
    #[arg(long, short = 'a')]
    pub address: String,

    /// Description
    #[arg(long, short = 'd')]
    pub description: Option<String>,

    /// Events to listen for (comma-separated)
    #[arg(long, short = 'e', value_delimiter = ',', required = true)]
    pub events: Vec<String>,

    /// Value sent as the Authorization header
    #[arg(long)]
    pub auth_header: Option<String>,

    /// Skip TLS verification of the endpoint
    #[arg(long)]
    pub skip_cert_verify: bool,

    /// Create the policy disabled
    #[arg(long)]
    pub disabled: bool,
}

#[derive(Args, Debug)]
pub struct EditArgs {
    /// Project name or numeric project ID
    pub project: NameOrId,

    /// Policy name or numeric policy ID
    pub policy: NameOrId,

    /// New endpoint address
    #[arg(long, short = 'a')]
    pub address: Option<String>,

    /// New description
    #[arg(long, short = 'd')]
    pub description: Option<String>,

    /// Replace subscribed events (comma-separated)
    #[arg(long, short = 'e', value_delimiter = ',')]
    pub events: Option<Vec<String>>,

    /// Enable or disable the policy
    #[arg(long)]
    pub enabled: Option<bool>,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Project name or numeric project ID
    pub project: NameOrId,

    /// Policy name or numeric policy ID
    pub policy: NameOrId,

    /// Skip confirmation prompt
    #[arg(long)]
    pub confirm: bool,
}

impl WebhookCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        match &self.command {
            WebhookSubcommand::List(args) => self.list(args, global).await,
            WebhookSubcommand::View(args) => self.view(args, global).await,
            WebhookSubcommand::Create(args) => self.create(args, global).await,
            WebhookSubcommand::Edit(args) => self.edit(args, global).await,
            WebhookSubcommand::Delete(args) => self.delete(args, global).await,
            WebhookSubcommand::Exists(args) => self.exists(args, global).await,
            WebhookSubcommand::Events => self.events(global),
        }
    }

    async fn list(&self, args: &ProjectArg, global: &GlobalOptions) -> Result<()> {
        let client = global.client()?;
        let project = resolve_project(&client.projects(), &args.project).await?;

        let policies = client.webhooks().list_webhook_policies(&project).await?;
        global.output().write_list(&policies)
    }

    async fn view(&self, args: &PolicyArgs, global: &GlobalOptions) -> Result<()> {
        let client = global.client()?;
        let project = resolve_project(&client.projects(), &args.project).await?;

        let policy = resolve(&client.webhooks(), &project, &args.policy).await?;
        global.output().write(&policy)
    }

    async fn create(&self, args: &CreateArgs, global: &GlobalOptions) -> Result<()> {
        check_events(&args.events)?;

        let client = global.client()?;
        let project = resolve_project(&client.projects(), &args.project).await?;

        let target = WebhookTarget {
            auth_header: args.auth_header.clone(),
            skip_cert_verify: args.skip_cert_verify,
            ..WebhookTarget::http(&args.address)
        };
        let policy = WebhookPolicy {
            name: args.name.clone(),
            description: args.description.clone(),
            project_id: project.project_id,
            targets: vec![target],
            event_types: args.events.clone(),
            enabled: !args.disabled,
            ..WebhookPolicy::default()
        };

        let created = client
            .webhooks()
            .create_webhook_policy(&project, &policy)
            .await?;

        let writer = global.output();
        if global.json {
            writer.write(&created)?;
        } else {
            writer.write_success(&format!(
                "Created webhook policy {} in {}",
                created.name, project.name
            ));
        }
        Ok(())
    }

    async fn edit(&self, args: &EditArgs, global: &GlobalOptions) -> Result<()> {
        if args.address.is_none()
            && args.description.is_none()
            && args.events.is_none()
            && args.enabled.is_none()
        {
            bail!("Nothing to update.");
        }
        if let Some(events) = &args.events {
            check_events(events)?;
        }

        let client = global.client()?;
        let webhooks = client.webhooks();
        let project = resolve_project(&client.projects(), &args.project).await?;
        let mut policy = resolve(&webhooks, &project, &args.policy).await?;

        if let Some(address) = &args.address {
            match policy.targets.first_mut() {
                Some(target) => target.address = address.clone(),
                None => policy.targets.push(WebhookTarget::http(address)),
            }
        }
        if let Some(description) = &args.description {
            policy.description = Some(description.clone());
        }
        if let Some(events) = &args.events {
            policy.event_types = events.clone();
        }
        if let Some(enabled) = args.enabled {
            policy.enabled = enabled;
        }

        webhooks.update_webhook_policy(&project, &policy).await?;
        global
            .output()
            .write_success(&format!("Updated webhook policy {}", policy.name));
        Ok(())
    }

    async fn delete(&self, args: &DeleteArgs, global: &GlobalOptions) -> Result<()> {
        let client = global.client()?;
        let webhooks = client.webhooks();
        let project = resolve_project(&client.projects(), &args.project).await?;
        let policy = resolve(&webhooks, &project, &args.policy).await?;

        if !confirm(
            &format!("Delete webhook policy {} from {}?", policy.name, project.name),
            args.confirm,
            global,
        )? {
            return Ok(());
        }

        webhooks.delete_webhook_policy(&project, &policy).await?;
        global
            .output()
            .write_success(&format!("Deleted webhook policy {}", policy.name));
        Ok(())
    }

    async fn exists(&self, args: &PolicyArgs, global: &GlobalOptions) -> Result<()> {
        let client = global.client()?;
        let project = resolve_project(&client.projects(), &args.project).await?;

        let exists = client
            .webhooks()
            .webhook_policy_exists(&project, args.policy.clone())
            .await?;
        super::user::print_exists("Webhook policy", &args.policy, exists, global)
    }

    fn events(&self, global: &GlobalOptions) -> Result<()> {
        if global.json {
            println!("{}", serde_json::to_string_pretty(EVENT_TYPES)?);
        } else {
            for event in EVENT_TYPES {
                println!("{}", event);
            }
        }
        Ok(())
    }
}

fn check_events(events: &[String]) -> Result<()> {
    if events.is_empty() {
        bail!("At least one event type is required.");
    }
    for event in events {
        if !EVENT_TYPES.contains(&event.as_str()) {
            bail!(
                "Unknown event type '{}'. Valid types: {}",
                event,
                EVENT_TYPES.join(", ")
            );
        }
    }
    Ok(())
}

async fn resolve(
    webhooks: &WebhookClient,
    project: &Project,
    policy: &NameOrId,
) -> Result<WebhookPolicy> {
    let policy = match policy {
        NameOrId::Id(id) => webhooks.get_webhook_policy_by_id(project, *id).await?,
        NameOrId::Name(name) => webhooks.get_webhook_policy_by_name(project, name).await?,
    };
    Ok(policy)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_events() {
        assert!(check_events(&["PUSH_ARTIFACT".to_string()]).is_ok());
        assert!(check_events(&[]).is_err());

        let err = check_events(&["PUSH".to_string()]).unwrap_err();
        assert!(err.to_string().contains("Unknown event type 'PUSH'"));
    }
}
