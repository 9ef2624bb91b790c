//
//  harbor-client
//  cli/replication.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Replication policy and execution commands
//!
//! ## Examples
//!
//! ```bash
//! # Pull library/* from Docker Hub every night
//! harbor replication create nightly --src-registry dockerhub \
//!     --dest-namespace mirror --filter-name 'library/**' \
//!     --trigger scheduled --cron '0 0 2 * * *'
//!
//! # Run it now and watch the executions
//! harbor replication trigger nightly
//! harbor replication executions nightly
//! ```

use anyhow::{bail, Result};
use clap::{Args, Subcommand, ValueEnum};

use crate::api::replication::{
    ReplicationClient, ReplicationFilter, ReplicationPolicy, ReplicationTrigger,
};
use crate::api::NameOrId;

use super::registry::resolve as resolve_registry;
use super::user::print_exists;
use super::{confirm, GlobalOptions};

/// Manage replication policies and executions
#[derive(Args, Debug)]
pub struct ReplicationCommand {
    #[command(subcommand)]
    pub command: ReplicationSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum ReplicationSubcommand {
    /// List replication policies
    #[command(visible_alias = "ls")]
    List,

    /// View a policy by name or ID
    View(PolicyArg),

    /// Create a replication policy
    Create(CreateArgs),

    /// Update a replication policy
    Update(UpdateArgs),

    /// Delete a replication policy
    Delete(DeleteArgs),

    /// Check whether a policy exists
    Exists(PolicyArg),

    /// Start a manual run of a policy
    Trigger(PolicyArg),

    /// List runs of a policy
    Executions(PolicyArg),

    /// View a single run by execution ID
    Execution(ExecutionArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum TriggerKind {
    Manual,
    EventBased,
    Scheduled,
}

#[derive(Args, Debug)]
pub struct PolicyArg {
    /// Policy name or numeric policy ID
    pub policy: NameOrId,
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Policy name
    pub name: String,

    /// Description
    #[arg(long, short = 'd')]
    pub description: Option<String>,

    /// Pull from this registry (name or ID)
    #[arg(long, conflicts_with = "dest_registry")]
    pub src_registry: Option<NameOrId>,

    /// Push to this registry (name or ID)
    #[arg(long)]
    pub dest_registry: Option<NameOrId>,

    /// Namespace the replicated repositories land in
    #[arg(long)]
    pub dest_namespace: Option<String>,

    /// When the policy runs
    #[arg(long, value_enum, default_value = "manual")]
    pub trigger: TriggerKind,

    /// Cron expression for scheduled policies (six fields)
    #[arg(long, required_if_eq("trigger", "scheduled"))]
    pub cron: Option<String>,

    /// Only replicate repositories matching this pattern
    #[arg(long)]
    pub filter_name: Option<String>,

    /// Only replicate tags matching this pattern
    #[arg(long)]
    pub filter_tag: Option<String>,

    /// Propagate deletions to the destination
    #[arg(long)]
    pub replicate_deletion: bool,

    /// Overwrite artifacts that already exist at the destination
    #[arg(long = "override")]
    pub override_existing: bool,

    /// Create the policy disabled
    #[arg(long)]
    pub disabled: bool,

    /// Bandwidth limit in KB/s
    #[arg(long)]
    pub speed: Option<i64>,
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Policy name or numeric policy ID
    pub policy: NameOrId,

    /// New description
    #[arg(long, short = 'd')]
    pub description: Option<String>,

    /// Enable or disable the policy
    #[arg(long)]
    pub enabled: Option<bool>,

    /// New cron expression; switches the policy to a scheduled trigger
    #[arg(long)]
    pub cron: Option<String>,

    /// New bandwidth limit in KB/s
    #[arg(long)]
    pub speed: Option<i64>,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Policy name or numeric policy ID
    pub policy: NameOrId,

    /// Skip confirmation prompt
    #[arg(long)]
    pub confirm: bool,
}

#[derive(Args, Debug)]
pub struct ExecutionArgs {
    /// Execution ID
    pub id: i64,
}

impl ReplicationCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        match &self.command {
            ReplicationSubcommand::List => self.list(global).await,
            ReplicationSubcommand::View(args) => self.view(args, global).await,
            ReplicationSubcommand::Create(args) => self.create(args, global).await,
            ReplicationSubcommand::Update(args) => self.update(args, global).await,
            ReplicationSubcommand::Delete(args) => self.delete(args, global).await,
            ReplicationSubcommand::Exists(args) => self.exists(args, global).await,
            ReplicationSubcommand::Trigger(args) => self.trigger(args, global).await,
            ReplicationSubcommand::Executions(args) => self.executions(args, global).await,
            ReplicationSubcommand::Execution(args) => self.execution(args, global).await,
        }
    }

    async fn list(&self, global: &GlobalOptions) -> Result<()> {
        let policies = global
            .client()?
            .replications()
            .list_replication_policies()
            .await?;
        global.output().write_list(&policies)
    }

    async fn view(&self, args: &PolicyArg, global: &GlobalOptions) -> Result<()> {
        let replications = global.client()?.replications();
        let policy = resolve(&replications, &args.policy).await?;
        global.output().write(&policy)
    }

    async fn create(&self, args: &CreateArgs, global: &GlobalOptions) -> Result<()> {
        if args.src_registry.is_none() && args.dest_registry.is_none() {
            bail!("Pass --src-registry or --dest-registry.");
        }

        let client = global.client()?;
        let registries = client.registries();

        let src_registry = match &args.src_registry {
            Some(registry) => Some(resolve_registry(&registries, registry).await?),
            None => None,
        };
        let dest_registry = match &args.dest_registry {
            Some(registry) => Some(resolve_registry(&registries, registry).await?),
            None => None,
        };

        let trigger = match args.trigger {
            TriggerKind::Manual => ReplicationTrigger::manual(),
            TriggerKind::EventBased => ReplicationTrigger::event_based(),
            TriggerKind::Scheduled => {
                ReplicationTrigger::scheduled(args.cron.clone().unwrap_or_default())
            }
        };

        let mut filters = Vec::new();
        if let Some(pattern) = &args.filter_name {
            filters.push(filter("name", pattern));
        }
        if let Some(pattern) = &args.filter_tag {
            filters.push(filter("tag", pattern));
        }

        let policy = ReplicationPolicy {
            name: args.name.clone(),
            description: args.description.clone(),
            src_registry,
            dest_registry,
            dest_namespace: args.dest_namespace.clone(),
            trigger: Some(trigger),
            filters,
            replicate_deletion: args.replicate_deletion,
            override_existing: args.override_existing,
            enabled: !args.disabled,
            speed: args.speed,
            ..ReplicationPolicy::default()
        };

        let created = client
            .replications()
            .create_replication_policy(&policy)
            .await?;

        let writer = global.output();
        if global.json {
            writer.write(&created)?;
        } else {
            writer.write_success(&format!(
                "Created replication policy {} (ID {})",
                created.name, created.id
            ));
        }
        Ok(())
    }

    async fn update(&self, args: &UpdateArgs, global: &GlobalOptions) -> Result<()> {
        if args.description.is_none()
            && args.enabled.is_none()
            && args.cron.is_none()
            && args.speed.is_none()
        {
            bail!("Nothing to update.");
        }

        let replications = global.client()?.replications();
        let mut policy = resolve(&replications, &args.policy).await?;

        if let Some(description) = &args.description {
            policy.description = Some(description.clone());
        }
        if let Some(enabled) = args.enabled {
            policy.enabled = enabled;
        }
        if let Some(cron) = &args.cron {
            policy.trigger = Some(ReplicationTrigger::scheduled(cron.clone()));
        }
        if let Some(speed) = args.speed {
            policy.speed = Some(speed);
        }

        replications.update_replication_policy(&policy).await?;
        global
            .output()
            .write_success(&format!("Updated replication policy {}", policy.name));
        Ok(())
    }

    async fn delete(&self, args: &DeleteArgs, global: &GlobalOptions) -> Result<()> {
        let replications = global.client()?.replications();
        let policy = resolve(&replications, &args.policy).await?;

        if !confirm(
            &format!("Delete replication policy {}?", policy.name),
            args.confirm,
            global,
        )? {
            return Ok(());
        }

        replications.delete_replication_policy(&policy).await?;
        global
            .output()
            .write_success(&format!("Deleted replication policy {}", policy.name));
        Ok(())
    }

    async fn exists(&self, args: &PolicyArg, global: &GlobalOptions) -> Result<()> {
        let exists = global
            .client()?
            .replications()
            .replication_policy_exists(args.policy.clone())
            .await?;
        print_exists("Replication policy", &args.policy, exists, global)
    }

    async fn trigger(&self, args: &PolicyArg, global: &GlobalOptions) -> Result<()> {
        let replications = global.client()?.replications();
        let policy = resolve(&replications, &args.policy).await?;

        replications.trigger_replication_execution(&policy).await?;
        global
            .output()
            .write_success(&format!("Started replication policy {}", policy.name));
        Ok(())
    }

    async fn executions(&self, args: &PolicyArg, global: &GlobalOptions) -> Result<()> {
        let replications = global.client()?.replications();
        let policy = resolve(&replications, &args.policy).await?;

        let executions = replications.list_replication_executions(&policy).await?;
        global.output().write_list(&executions)
    }

    async fn execution(&self, args: &ExecutionArgs, global: &GlobalOptions) -> Result<()> {
        let execution = global
            .client()?
            .replications()
            .get_replication_execution(args.id)
            .await?;
        global.output().write(&execution)
    }
}

fn filter(kind: &str, pattern: &str) -> ReplicationFilter {
    ReplicationFilter {
        kind: kind.to_string(),
        value: serde_json::Value::String(pattern.to_string()),
        decoration: None,
    }
}

async fn resolve(replications: &ReplicationClient, policy: &NameOrId) -> Result<ReplicationPolicy> {
    let policy = match policy {
        NameOrId::Id(id) => replications.get_replication_policy_by_id(*id).await?,
        NameOrId::Name(name) => replications.get_replication_policy_by_name(name).await?,
    };
    Ok(policy)
}
