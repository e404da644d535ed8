//! `itam user` command - Console users and roles

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{read_secret, success, truncate_str, warning, Context};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::identity::{CollaboratorId, UserId};
use crate::core::{queries, validation, AuthError, UserDeletion};
use crate::entities::{Capability, Role, User};

#[derive(Subcommand, Debug)]
pub enum UserCommands {
    /// List console users
    List,

    /// Create a user
    New(NewArgs),

    /// Change a user's name, role, PIN or linked collaborator
    Edit(EditArgs),

    /// Delete a user (the built-in administrator cannot be deleted)
    Delete(IdArgs),
}

#[derive(clap::Args, Debug)]
pub struct IdArgs {
    /// User ID
    pub id: UserId,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Login name
    pub username: String,

    /// Display name
    #[arg(long, short = 'n')]
    pub name: String,

    #[arg(long, short = 'r', value_enum, default_value = "consultant")]
    pub role: Role,

    /// Four digit PIN (prompted when omitted)
    #[arg(long)]
    pub pin: Option<String>,

    /// Link the user to a collaborator
    #[arg(long)]
    pub collaborator: Option<CollaboratorId>,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// User ID
    pub id: UserId,

    #[arg(long)]
    pub username: Option<String>,

    #[arg(long, short = 'n')]
    pub name: Option<String>,

    #[arg(long, short = 'r', value_enum)]
    pub role: Option<Role>,

    #[arg(long)]
    pub pin: Option<String>,

    #[arg(long, conflicts_with = "unlink")]
    pub collaborator: Option<CollaboratorId>,

    /// Remove the collaborator link
    #[arg(long)]
    pub unlink: bool,

    /// Master code, needed to edit the built-in administrator from another account
    #[arg(long)]
    pub master_code: Option<String>,
}

/// Run a user subcommand
pub fn run(cmd: UserCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        UserCommands::List => run_list(global),
        UserCommands::New(args) => run_new(args, global),
        UserCommands::Edit(args) => run_edit(args, global),
        UserCommands::Delete(args) => run_delete(args, global),
    }
}

/// A user as listed; the PIN never leaves the store
#[derive(serde::Serialize)]
struct UserRow<'a> {
    id: UserId,
    username: &'a str,
    name: &'a str,
    role: Role,
    collaborator: Option<String>,
}

fn run_list(global: &GlobalOpts) -> Result<()> {
    let ctx = Context::open(global)?;
    ctx.require(Capability::ManageUsers)?;
    let data = ctx.store.data();

    let rows: Vec<UserRow> = data
        .users
        .iter()
        .map(|u| UserRow {
            id: u.id,
            username: &u.username,
            name: &u.name,
            role: u.role,
            collaborator: u
                .collaborator_id
                .map(|c| queries::collaborator_name(data, Some(c))),
        })
        .collect();

    match global.format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&rows).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(&rows).into_diagnostic()?;
            print!("{}", yaml);
        }
        OutputFormat::Id => {
            for r in &rows {
                println!("{}", r.id);
            }
        }
        _ => {
            println!(
                "{:<6} {:<16} {:<26} {:<12} {}",
                style("ID").bold(),
                style("USERNAME").bold(),
                style("NAME").bold(),
                style("ROLE").bold(),
                style("COLLABORATOR").bold()
            );
            println!("{}", "-".repeat(80));
            for r in &rows {
                let marker = if r.id == crate::entities::SUPER_ADMIN_ID { "*" } else { "" };
                println!(
                    "{:<6} {:<16} {:<26} {:<12} {}",
                    style(format!("{}{}", r.id, marker)).cyan(),
                    truncate_str(r.username, 16),
                    truncate_str(r.name, 26),
                    r.role,
                    r.collaborator.as_deref().unwrap_or("-")
                );
            }
            if !global.quiet {
                println!();
                println!("{} user(s) found.", style(rows.len()).cyan());
            }
        }
    }
    Ok(())
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let mut ctx = Context::open(global)?;
    ctx.require(Capability::ManageUsers)?;
    let pin = read_secret(args.pin, "PIN")?;

    let mut user = User::new(args.username, args.name, args.role, pin);
    user.collaborator_id = args.collaborator;
    validation::validate_user(ctx.store.data(), &user, false)?;

    let username = user.username.clone();
    let id = ctx.store.add_user(user).into_diagnostic()?;
    success(
        global,
        format!(
            "Created user {} {} ({})",
            style(id).cyan(),
            style(username).yellow(),
            args.role
        ),
    );
    Ok(())
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let mut ctx = Context::open(global)?;
    let mut user = ctx
        .store
        .data()
        .user(args.id)
        .cloned()
        .ok_or_else(|| miette::miette!("No user found with ID {}", args.id))?;

    let master = ctx.config.master_code.clone();
    let mut supplied = args.master_code;
    let mut check = ctx
        .session
        .authorize_user_edit(args.id, supplied.as_deref(), master.as_deref());
    if matches!(check, Err(AuthError::MasterCodeRequired)) {
        supplied = Some(read_secret(None, "Master code")?);
        check = ctx
            .session
            .authorize_user_edit(args.id, supplied.as_deref(), master.as_deref());
    }
    check.map_err(|e| miette::miette!("{}", e))?;

    if let Some(v) = args.username {
        user.username = v;
    }
    if let Some(v) = args.name {
        user.name = v;
    }
    if let Some(v) = args.role {
        if user.is_super_admin() && v != Role::Admin {
            return Err(miette::miette!("the built-in administrator must keep the Admin role"));
        }
        user.role = v;
    }
    if let Some(v) = args.pin {
        user.pin = v;
    }
    if args.unlink {
        user.collaborator_id = None;
    } else if args.collaborator.is_some() {
        user.collaborator_id = args.collaborator;
    }
    validation::validate_user(ctx.store.data(), &user, true)?;

    ctx.store.update_user(user).into_diagnostic()?;
    success(global, format!("Updated user {}", style(args.id).cyan()));
    Ok(())
}

fn run_delete(args: IdArgs, global: &GlobalOpts) -> Result<()> {
    let mut ctx = Context::open(global)?;
    ctx.require(Capability::ManageUsers)?;

    match ctx.store.delete_user(args.id).into_diagnostic()? {
        UserDeletion::Deleted => {
            success(global, format!("Deleted user {}", style(args.id).cyan()));
            Ok(())
        }
        UserDeletion::SuperAdminProtected => {
            warning(format!(
                "user {} is the built-in administrator and cannot be deleted",
                args.id
            ));
            Ok(())
        }
        UserDeletion::NotFound => Err(miette::miette!("No user found with ID {}", args.id)),
    }
}
