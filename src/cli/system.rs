//
//  harbor-client
//  cli/system.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! System information and garbage collection commands
//!
//! ## Examples
//!
//! ```bash
//! harbor system info
//! harbor system health
//!
//! # Collect garbage every Saturday night, untagged artifacts included
//! harbor system gc set --schedule custom --cron '0 0 23 * * 6' --delete-untagged
//! ```

use anyhow::{bail, Result};
use clap::{Args, Subcommand, ValueEnum};

use crate::api::system::GcSchedule;

use super::{confirm, GlobalOptions};

/// Show system information and manage garbage collection
#[derive(Args, Debug)]
pub struct SystemCommand {
    #[command(subcommand)]
    pub command: SystemSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum SystemSubcommand {
    /// Show version, auth mode and registry settings
    Info,

    /// Show health of Harbor and its components
    Health,

    /// Show project, repository and storage totals
    #[command(visible_alias = "statistics")]
    Stats,

    /// Manage the garbage collection schedule
    Gc(GcCommand),
}

#[derive(Args, Debug)]
pub struct GcCommand {
    #[command(subcommand)]
    pub command: GcSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum GcSubcommand {
    /// Show the current schedule
    Show,

    /// Create or replace the schedule
    Set(GcSetArgs),

    /// Disable scheduled garbage collection
    Reset(GcResetArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScheduleKind {
    Hourly,
    Daily,
    Weekly,
    Custom,
}

impl ScheduleKind {
    fn as_str(self) -> &'static str {
        match self {
            Self::Hourly => "Hourly",
            Self::Daily => "Daily",
            Self::Weekly => "Weekly",
            Self::Custom => "Custom",
        }
    }
}

#[derive(Args, Debug)]
pub struct GcSetArgs {
    /// How often garbage collection runs
    #[arg(long, value_enum)]
    pub schedule: ScheduleKind,

    /// Cron expression for custom schedules (six fields)
    #[arg(long, required_if_eq("schedule", "custom"))]
    pub cron: Option<String>,

    /// Also remove untagged artifacts
    #[arg(long)]
    pub delete_untagged: bool,
}

#[derive(Args, Debug)]
pub struct GcResetArgs {
    /// Skip confirmation prompt
    #[arg(long)]
    pub confirm: bool,
}

impl SystemCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        match &self.command {
            SystemSubcommand::Info => self.info(global).await,
            SystemSubcommand::Health => self.health(global).await,
            SystemSubcommand::Stats => self.stats(global).await,
            SystemSubcommand::Gc(gc) => self.gc(&gc.command, global).await,
        }
    }

    async fn info(&self, global: &GlobalOptions) -> Result<()> {
        let info = global.client()?.system().get_system_info().await?;
        global.output().write(&info)
    }

    async fn health(&self, global: &GlobalOptions) -> Result<()> {
        let health = global.client()?.system().get_health().await?;
        global.output().write(&health)?;

        if !health.is_healthy() {
            bail!("Harbor reports status '{}'", health.status);
        }
        Ok(())
    }

    async fn stats(&self, global: &GlobalOptions) -> Result<()> {
        let stats = global.client()?.system().get_statistics().await?;
        global.output().write(&stats)
    }

    async fn gc(&self, command: &GcSubcommand, global: &GlobalOptions) -> Result<()> {
        let system = global.client()?.system();
        let writer = global.output();

        match command {
            GcSubcommand::Show => {
                let schedule = system.get_gc_schedule().await?;
                writer.write(&schedule)?;
            }
            GcSubcommand::Set(args) => {
                let schedule = match args.schedule {
                    ScheduleKind::Custom => {
                        GcSchedule::custom(args.cron.clone().unwrap_or_default())
                    }
                    kind => GcSchedule::new(kind.as_str()),
                }
                .delete_untagged(args.delete_untagged);

                // Harbor rejects POST once a schedule exists and PUT before one does.
                if system.get_gc_schedule().await?.is_disabled() {
                    system.create_gc_schedule(&schedule).await?;
                } else {
                    system.update_gc_schedule(&schedule).await?;
                }
                writer.write_success(&format!(
                    "Garbage collection scheduled {}",
                    schedule.schedule.kind.to_lowercase()
                ));
            }
            GcSubcommand::Reset(args) => {
                if !confirm("Disable scheduled garbage collection?", args.confirm, global)? {
                    return Ok(());
                }
                system.reset_gc_schedule().await?;
                writer.write_success("Scheduled garbage collection disabled");
            }
        }
        Ok(())
    }
}
