//
//  harbor-client
//  cli/user.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! User management commands
//!
//! ## Examples
//!
//! ```bash
//! # List users
//! harbor user list
//!
//! # View a user by name or ID
//! harbor user view alice
//! harbor user view 5
//!
//! # Create a user
//! harbor user create alice --email alice@example.com --realname "Alice A" --user-password Secret123
//!
//! # Grant admin rights
//! harbor user sysadmin alice --enable
//! ```

use anyhow::{bail, Result};
use clap::{Args, Subcommand};

use crate::api::user::{PasswordRequest, User, UserClient, UserCreationRequest, UserProfile};
use crate::api::NameOrId;

use super::{confirm, GlobalOptions};

/// Manage users
#[derive(Args, Debug)]
pub struct UserCommand {
    #[command(subcommand)]
    pub command: UserSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum UserSubcommand {
    /// List users
    #[command(visible_alias = "ls")]
    List,

    /// View a user by name or ID
    View(UserArg),

    /// Create a new user
    Create(CreateArgs),

    /// Search users by username fragment
    Search(SearchArgs),

    /// Update a user's email, real name or comment
    Update(UpdateArgs),

    /// Change a user's password
    Password(PasswordArgs),

    /// Grant or revoke system administrator rights
    Sysadmin(SysadminArgs),

    /// Delete a user
    Delete(DeleteArgs),

    /// Check whether a user exists
    Exists(UserArg),
}

#[derive(Args, Debug)]
pub struct UserArg {
    /// Username or numeric user ID
    pub user: NameOrId,
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Login name
    pub username: String,

    /// Email address
    #[arg(long, short = 'e')]
    pub email: String,

    /// Display name
    #[arg(long, short = 'r')]
    pub realname: String,

    /// Initial password
    #[arg(long, env = "HARBOR_NEW_USER_PASSWORD", hide_env_values = true)]
    pub user_password: String,

    /// Free-form comment
    #[arg(long, short = 'c')]
    pub comment: Option<String>,
}

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Username fragment
    pub username: String,
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Username or numeric user ID
    pub user: NameOrId,

    /// New email address
    #[arg(long, short = 'e')]
    pub email: Option<String>,

    /// New display name
    #[arg(long, short = 'r')]
    pub realname: Option<String>,

    /// New comment
    #[arg(long, short = 'c')]
    pub comment: Option<String>,
}

#[derive(Args, Debug)]
pub struct PasswordArgs {
    /// Username or numeric user ID
    pub user: NameOrId,

    /// Current password (may be omitted by administrators)
    #[arg(long, default_value = "")]
    pub old: String,

    /// New password
    #[arg(long)]
    pub new: String,
}

#[derive(Args, Debug)]
pub struct SysadminArgs {
    /// Username or numeric user ID
    pub user: NameOrId,

    /// Grant administrator rights
    #[arg(long, conflicts_with = "disable")]
    pub enable: bool,

    /// Revoke administrator rights
    #[arg(long)]
    pub disable: bool,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Username or numeric user ID
    pub user: NameOrId,

    /// Skip confirmation prompt
    #[arg(long)]
    pub confirm: bool,
}

impl UserCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        match &self.command {
            UserSubcommand::List => self.list(global).await,
            UserSubcommand::View(args) => self.view(args, global).await,
            UserSubcommand::Create(args) => self.create(args, global).await,
            UserSubcommand::Search(args) => self.search(args, global).await,
            UserSubcommand::Update(args) => self.update(args, global).await,
            UserSubcommand::Password(args) => self.password(args, global).await,
            UserSubcommand::Sysadmin(args) => self.sysadmin(args, global).await,
            UserSubcommand::Delete(args) => self.delete(args, global).await,
            UserSubcommand::Exists(args) => self.exists(args, global).await,
        }
    }

    async fn list(&self, global: &GlobalOptions) -> Result<()> {
        let users = global.client()?.users().list_users().await?;
        global.output().write_list(&users)
    }

    async fn view(&self, args: &UserArg, global: &GlobalOptions) -> Result<()> {
        let users = global.client()?.users();
        let user = resolve(&users, &args.user).await?;
        global.output().write(&user)
    }

    async fn create(&self, args: &CreateArgs, global: &GlobalOptions) -> Result<()> {
        let request = UserCreationRequest {
            username: args.username.clone(),
            email: args.email.clone(),
            realname: args.realname.clone(),
            password: args.user_password.clone(),
            comment: args.comment.clone(),
        };

        let user = global.client()?.users().create_user(&request).await?;

        let writer = global.output();
        if global.json {
            writer.write(&user)?;
        } else {
            writer.write_success(&format!(
                "Created user {} (ID {})",
                user.username, user.user_id
            ));
        }
        Ok(())
    }

    async fn search(&self, args: &SearchArgs, global: &GlobalOptions) -> Result<()> {
        let results = global
            .client()?
            .users()
            .search_users(&args.username)
            .await?;
        global.output().write_list(&results)
    }

    async fn update(&self, args: &UpdateArgs, global: &GlobalOptions) -> Result<()> {
        if args.email.is_none() && args.realname.is_none() && args.comment.is_none() {
            bail!("Nothing to update. Pass --email, --realname or --comment.");
        }

        let users = global.client()?.users();
        let user = resolve(&users, &args.user).await?;

        let profile = UserProfile {
            email: args.email.clone().or_else(|| user.email.clone()),
            realname: args.realname.clone().or_else(|| user.realname.clone()),
            comment: args.comment.clone().or_else(|| user.comment.clone()),
        };
        users.update_user_profile(&user, &profile).await?;

        global
            .output()
            .write_success(&format!("Updated user {}", user.username));
        Ok(())
    }

    async fn password(&self, args: &PasswordArgs, global: &GlobalOptions) -> Result<()> {
        let users = global.client()?.users();
        let user = resolve(&users, &args.user).await?;

        let writer = global.output();
        if args.old.is_empty() {
            writer.write_warning("No current password given; only administrators may do this.");
        }

        let request = PasswordRequest {
            old_password: args.old.clone(),
            new_password: args.new.clone(),
        };
        users.update_user_password(&user, &request).await?;

        writer.write_success(&format!("Changed password for {}", user.username));
        Ok(())
    }

    async fn sysadmin(&self, args: &SysadminArgs, global: &GlobalOptions) -> Result<()> {
        if !args.enable && !args.disable {
            bail!("Pass --enable or --disable.");
        }

        let users = global.client()?.users();
        let user = resolve(&users, &args.user).await?;
        users.set_user_sysadmin(&user, args.enable).await?;

        let action = if args.enable { "Granted" } else { "Revoked" };
        global.output().write_success(&format!(
            "{} administrator rights for {}",
            action, user.username
        ));
        Ok(())
    }

    async fn delete(&self, args: &DeleteArgs, global: &GlobalOptions) -> Result<()> {
        let users = global.client()?.users();
        let user = resolve(&users, &args.user).await?;

        if !confirm(
            &format!("Delete user {}?", user.username),
            args.confirm,
            global,
        )? {
            return Ok(());
        }

        users.delete_user(&user).await?;
        global
            .output()
            .write_success(&format!("Deleted user {}", user.username));
        Ok(())
    }

    async fn exists(&self, args: &UserArg, global: &GlobalOptions) -> Result<()> {
        let exists = global
            .client()?
            .users()
            .user_exists(args.user.clone())
            .await?;
        print_exists("User", &args.user, exists, global)
    }
}

async fn resolve(users: &UserClient, user: &NameOrId) -> Result<User> {
    let user = match user {
        NameOrId::Id(id) => users.get_user_by_id(*id).await?,
        NameOrId::Name(name) => users.get_user_by_name(name).await?,
    };
    Ok(user)
}

/// Prints the outcome of an `exists` subcommand.
pub(super) fn print_exists(
    kind: &str,
    target: &NameOrId,
    exists: bool,
    global: &GlobalOptions,
) -> Result<()> {
    if global.json {
        let result = serde_json::json!({
            "name": target.to_string(),
            "exists": exists,
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else if exists {
        println!("{} {} exists", kind, target);
    } else {
        println!("{} {} does not exist", kind, target);
    }
    Ok(())
}
