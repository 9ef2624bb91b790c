//
//  harbor-client
//  cli/project.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Project management commands
//!
//! Covers projects themselves, their metadata keys and their members.
//!
//! ## Examples
//!
//! ```bash
//! # Create a public project with a 10 GB quota
//! harbor project create team-a --public --storage-limit 10GB
//!
//! # Turn on vulnerability scanning on push
//! harbor project metadata set team-a auto_scan true
//!
//! # Add a developer
//! harbor project member add team-a alice --role developer
//! ```

use anyhow::{bail, Result};
use clap::{Args, Subcommand};

use crate::api::project::{MetadataKey, Project, ProjectClient, ProjectRequest, Role};
use crate::api::NameOrId;
use crate::util::parse_size;

use super::user::print_exists;
use super::{confirm, GlobalOptions};

/// Manage projects, their metadata and members
#[derive(Args, Debug)]
pub struct ProjectCommand {
    #[command(subcommand)]
    pub command: ProjectSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum ProjectSubcommand {
    /// List projects
    #[command(visible_alias = "ls")]
    List,

    /// View a project by name or ID
    View(ProjectArg),

    /// Create a new project
    Create(CreateArgs),

    /// Update visibility or storage quota
    Update(UpdateArgs),

    /// Delete a project
    Delete(DeleteArgs),

    /// Check whether a project exists
    Exists(ProjectArg),

    /// Manage project metadata
    Metadata(MetadataCommand),

    /// Manage project members
    #[command(visible_alias = "members")]
    Member(MemberCommand),
}

#[derive(Args, Debug)]
pub struct MetadataCommand {
    #[command(subcommand)]
    pub command: MetadataSubcommand,
}

#[derive(Args, Debug)]
pub struct MemberCommand {
    #[command(subcommand)]
    pub command: MemberSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum MetadataSubcommand {
    /// List all metadata of a project
    #[command(visible_alias = "ls")]
    List(ProjectArg),

    /// Print a single metadata value
    Get(MetadataKeyArgs),

    /// Add a metadata key that is not set yet
    Add(MetadataValueArgs),

    /// Replace a metadata value
    Set(MetadataValueArgs),

    /// Remove a metadata key
    Delete(MetadataKeyArgs),
}

#[derive(Subcommand, Debug)]
pub enum MemberSubcommand {
    /// List project members
    #[command(visible_alias = "ls")]
    List(ProjectArg),

    /// Add a user to a project
    Add(MemberRoleArgs),

    /// Change a member's role
    Role(MemberRoleArgs),

    /// Remove a user from a project
    Remove(MemberArgs),
}

#[derive(Args, Debug)]
pub struct ProjectArg {
    /// Project name or numeric project ID
    pub project: NameOrId,
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Project name
    pub name: String,

    /// Make the project readable anonymously
    #[arg(long)]
    pub public: bool,

    /// Storage quota, e.g. 500MB, 10GB or unlimited
    #[arg(long)]
    pub storage_limit: Option<String>,

    /// Maximum number of artifacts
    #[arg(long)]
    pub count_limit: Option<i64>,

    /// Upstream registry ID, for proxy-cache projects
    #[arg(long)]
    pub registry_id: Option<i64>,
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Project name or numeric project ID
    pub project: NameOrId,

    /// Make the project public or private
    #[arg(long)]
    pub public: Option<bool>,

    /// New storage quota, e.g. 500MB, 10GB or unlimited
    #[arg(long)]
    pub storage_limit: Option<String>,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Project name or numeric project ID
    pub project: NameOrId,

    /// Skip confirmation prompt
    #[arg(long)]
    pub confirm: bool,
}

#[derive(Args, Debug)]
pub struct MetadataKeyArgs {
    /// Project name or numeric project ID
    pub project: NameOrId,

    /// Metadata key, e.g. public, auto_scan, severity
    pub key: MetadataKey,
}

#[derive(Args, Debug)]
pub struct MetadataValueArgs {
    /// Project name or numeric project ID
    pub project: NameOrId,

    /// Metadata key, e.g. public, auto_scan, severity
    pub key: MetadataKey,

    /// New value
    pub value: String,
}

#[derive(Args, Debug)]
pub struct MemberArgs {
    /// Project name or numeric project ID
    pub project: NameOrId,

    /// Username of the member
    pub username: String,

    /// Skip confirmation prompt
    #[arg(long)]
    pub confirm: bool,
}

#[derive(Args, Debug)]
pub struct MemberRoleArgs {
    /// Project name or numeric project ID
    pub project: NameOrId,

    /// Username of the member
    pub username: String,

    /// Role name or ID: projectAdmin, developer, guest, maintainer, limitedGuest
    #[arg(long, short = 'r', default_value = "developer")]
    pub role: Role,
}

impl ProjectCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        match &self.command {
            ProjectSubcommand::List => self.list(global).await,
            ProjectSubcommand::View(args) => self.view(args, global).await,
            ProjectSubcommand::Create(args) => self.create(args, global).await,
            ProjectSubcommand::Update(args) => self.update(args, global).await,
            ProjectSubcommand::Delete(args) => self.delete(args, global).await,
            ProjectSubcommand::Exists(args) => self.exists(args, global).await,
            ProjectSubcommand::Metadata(metadata) => {
                self.metadata(&metadata.command, global).await
            }
            ProjectSubcommand::Member(member) => self.member(&member.command, global).await,
        }
    }

    async fn list(&self, global: &GlobalOptions) -> Result<()> {
        let projects = global.client()?.projects().list_projects().await?;
        global.output().write_list(&projects)
    }

    async fn view(&self, args: &ProjectArg, global: &GlobalOptions) -> Result<()> {
        let projects = global.client()?.projects();
        let project = resolve(&projects, &args.project).await?;
        global.output().write(&project)
    }

    async fn create(&self, args: &CreateArgs, global: &GlobalOptions) -> Result<()> {
        let mut request = ProjectRequest::new(&args.name).public(args.public);
        if let Some(limit) = &args.storage_limit {
            request = request.storage_limit(parse_size(limit)?);
        }
        if let Some(limit) = args.count_limit {
            request = request.count_limit(limit);
        }
        if let Some(id) = args.registry_id {
            request = request.registry_id(id);
        }

        let project = global.client()?.projects().create_project(&request).await?;

        let writer = global.output();
        if global.json {
            writer.write(&project)?;
        } else {
            writer.write_success(&format!(
                "Created project {} (ID {})",
                project.name, project.project_id
            ));
        }
        Ok(())
    }

    async fn update(&self, args: &UpdateArgs, global: &GlobalOptions) -> Result<()> {
        if args.public.is_none() && args.storage_limit.is_none() {
            bail!("Nothing to update. Pass --public or --storage-limit.");
        }
        let storage_limit = args.storage_limit.as_deref().map(parse_size).transpose()?;

        let projects = global.client()?.projects();
        let mut project = resolve(&projects, &args.project).await?;
        if let Some(public) = args.public {
            project.metadata.public = Some(public.to_string());
        }

        projects.update_project(&project, storage_limit).await?;
        global
            .output()
            .write_success(&format!("Updated project {}", project.name));
        Ok(())
    }

    async fn delete(&self, args: &DeleteArgs, global: &GlobalOptions) -> Result<()> {
        let projects = global.client()?.projects();
        let project = resolve(&projects, &args.project).await?;

        if !confirm(
            &format!("Delete project {}?", project.name),
            args.confirm,
            global,
        )? {
            return Ok(());
        }

        projects.delete_project(&project).await?;
        global
            .output()
            .write_success(&format!("Deleted project {}", project.name));
        Ok(())
    }

    async fn exists(&self, args: &ProjectArg, global: &GlobalOptions) -> Result<()> {
        let exists = global
            .client()?
            .projects()
            .project_exists(args.project.clone())
            .await?;
        print_exists("Project", &args.project, exists, global)
    }

    async fn metadata(&self, command: &MetadataSubcommand, global: &GlobalOptions) -> Result<()> {
        let projects = global.client()?.projects();
        let writer = global.output();

        match command {
            MetadataSubcommand::List(args) => {
                let project = resolve(&projects, &args.project).await?;
                let values = projects.list_project_metadata(&project).await?;
                writer.write(&values)?;
            }
            MetadataSubcommand::Get(args) => {
                let project = resolve(&projects, &args.project).await?;
                let value = projects
                    .get_project_metadata_value(&project, args.key)
                    .await?;
                if global.json {
                    let result = serde_json::json!({ args.key.as_str(): value });
                    println!("{}", serde_json::to_string_pretty(&result)?);
                } else {
                    println!("{}", value);
                }
            }
            MetadataSubcommand::Add(args) => {
                let project = resolve(&projects, &args.project).await?;
                projects
                    .add_project_metadata(&project, args.key, &args.value)
                    .await?;
                writer.write_success(&format!(
                    "Added {} = {} to {}",
                    args.key, args.value, project.name
                ));
            }
            MetadataSubcommand::Set(args) => {
                let project = resolve(&projects, &args.project).await?;
                projects
                    .update_project_metadata(&project, args.key, &args.value)
                    .await?;
                writer.write_success(&format!(
                    "Set {} = {} on {}",
                    args.key, args.value, project.name
                ));
            }
            MetadataSubcommand::Delete(args) => {
                let project = resolve(&projects, &args.project).await?;
                projects
                    .delete_project_metadata_value(&project, args.key)
                    .await?;
                writer.write_success(&format!("Removed {} from {}", args.key, project.name));
            }
        }
        Ok(())
    }

    async fn member(&self, command: &MemberSubcommand, global: &GlobalOptions) -> Result<()> {
        let client = global.client()?;
        let projects = client.projects();
        let users = client.users();
        let writer = global.output();

        match command {
            MemberSubcommand::List(args) => {
                let project = resolve(&projects, &args.project).await?;
                let members = projects.list_project_members(&project).await?;
                writer.write_list(&members)?;
            }
            MemberSubcommand::Add(args) => {
                let project = resolve(&projects, &args.project).await?;
                let user = users.get_user_by_name(&args.username).await?;
                projects
                    .add_project_member(&project, &user, args.role)
                    .await?;
                writer.write_success(&format!(
                    "Added {} to {} as {}",
                    user.username, project.name, args.role
                ));
            }
            MemberSubcommand::Role(args) => {
                let project = resolve(&projects, &args.project).await?;
                let user = users.get_user_by_name(&args.username).await?;
                projects
                    .update_project_member_role(&project, &user, args.role)
                    .await?;
                writer.write_success(&format!(
                    "{} is now {} in {}",
                    user.username, args.role, project.name
                ));
            }
            MemberSubcommand::Remove(args) => {
                let project = resolve(&projects, &args.project).await?;
                let user = users.get_user_by_name(&args.username).await?;

                if !confirm(
                    &format!("Remove {} from {}?", user.username, project.name),
                    args.confirm,
                    global,
                )? {
                    return Ok(());
                }

                projects.delete_project_member(&project, &user).await?;
                writer.write_success(&format!(
                    "Removed {} from {}",
                    user.username, project.name
                ));
            }
        }
        Ok(())
    }
}

/// Looks up a project by name or ID.
pub(super) async fn resolve(projects: &ProjectClient, project: &NameOrId) -> Result<Project> {
    let project = match project {
        NameOrId::Id(id) => projects.get_project_by_id(*id).await?,
        NameOrId::Name(name) => projects.get_project_by_name(name).await?,
    };
    Ok(project)
}

