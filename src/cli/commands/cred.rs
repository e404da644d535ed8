//! `itam cred` command - Credential vault

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{or_dash, read_secret, success, truncate_str, Context};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::identity::{CollaboratorId, CredentialId, EquipmentId};
use crate::core::{queries, validation, AppData};
use crate::entities::{Capability, Credential, CredentialTarget};

#[derive(Subcommand, Debug)]
pub enum CredCommands {
    /// List credentials of the selected company
    List(ListArgs),

    /// Store a credential
    New(NewArgs),

    /// Change a credential's password, description or target
    Update(UpdateArgs),

    /// Delete a credential
    Delete(IdArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Print passwords in clear text (requires the view_sensitive capability)
    #[arg(long)]
    pub show_passwords: bool,
}

#[derive(clap::Args, Debug)]
pub struct IdArgs {
    /// Credential ID
    pub id: CredentialId,
}

#[derive(clap::Args, Debug)]
pub struct TargetArgs {
    /// Assign to a collaborator
    #[arg(long, conflicts_with = "equipment")]
    pub collaborator: Option<CollaboratorId>,

    /// Assign to a piece of equipment
    #[arg(long)]
    pub equipment: Option<EquipmentId>,
}

impl TargetArgs {
    fn target(&self) -> Option<CredentialTarget> {
        self.collaborator
            .map(CredentialTarget::Collaborator)
            .or(self.equipment.map(CredentialTarget::Equipment))
    }
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Service or system the credential opens
    #[arg(long, short = 's')]
    pub service: String,

    #[arg(long, short = 'u')]
    pub username: String,

    /// Password (prompted when omitted)
    #[arg(long)]
    pub password: Option<String>,

    #[arg(long, short = 'd', default_value = "")]
    pub description: String,

    #[command(flatten)]
    pub target: TargetArgs,
}

#[derive(clap::Args, Debug)]
pub struct UpdateArgs {
    pub id: CredentialId,

    #[arg(long)]
    pub password: Option<String>,

    #[arg(long, short = 'd')]
    pub description: Option<String>,

    #[command(flatten)]
    pub target: TargetArgs,

    /// Remove the assignment
    #[arg(long, conflicts_with_all = ["collaborator", "equipment"])]
    pub unassign: bool,
}

/// Run a credential subcommand
pub fn run(cmd: CredCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        CredCommands::List(args) => run_list(args, global),
        CredCommands::New(args) => run_new(args, global),
        CredCommands::Update(args) => run_update(args, global),
        CredCommands::Delete(args) => run_delete(args, global),
    }
}

fn target_label(data: &AppData, credential: &Credential) -> String {
    match credential.target() {
        Some(CredentialTarget::Collaborator(id)) => queries::collaborator_name(data, Some(id)),
        Some(CredentialTarget::Equipment(id)) => data
            .equipment(id)
            .map(|e| format!("{} ({})", e.display_name(), e.serial_number))
            .unwrap_or_else(|| "-".to_string()),
        None => "-".to_string(),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = Context::open(global)?;
    let show = if args.show_passwords {
        ctx.require(Capability::ViewSensitive)?;
        true
    } else {
        ctx.require_login()?;
        false
    };
    let company = ctx.company(global)?;
    let data = ctx.store.data();
    let credentials = queries::credentials_for_company(data, &company);

    if credentials.is_empty() {
        println!("No credentials found.");
        return Ok(());
    }

    let redacted: Vec<Credential> = credentials
        .iter()
        .map(|c| {
            let mut c = (*c).clone();
            if !show {
                c.password = c.masked_password();
            }
            c
        })
        .collect();

    match global.format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&redacted).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(&redacted).into_diagnostic()?;
            print!("{}", yaml);
        }
        OutputFormat::Id => {
            for c in &redacted {
                println!("{}", c.id);
            }
        }
        _ => {
            println!(
                "{:<6} {:<20} {:<18} {:<14} {}",
                style("ID").bold(),
                style("SERVICE").bold(),
                style("USERNAME").bold(),
                style("PASSWORD").bold(),
                style("ASSIGNED TO").bold()
            );
            println!("{}", "-".repeat(85));
            for c in &redacted {
                println!(
                    "{:<6} {:<20} {:<18} {:<14} {}",
                    style(c.id).cyan(),
                    truncate_str(&c.service, 20),
                    truncate_str(&c.username, 18),
                    c.password,
                    target_label(data, c)
                );
            }
            if !global.quiet {
                println!();
                println!("{} credential(s) found.", style(redacted.len()).cyan());
            }
        }
    }
    Ok(())
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let mut ctx = Context::open(global)?;
    ctx.require(Capability::Create)?;
    let company = ctx.company(global)?;
    let password = read_secret(args.password, "Password")?;

    let mut credential = Credential::new(company, args.service, args.username, password);
    credential.description = args.description;
    credential.assign(args.target.target());
    validation::validate_credential(ctx.store.data(), &credential)?;

    let label = target_label(ctx.store.data(), &credential);
    let id = ctx.store.add_credential(credential).into_diagnostic()?;
    success(
        global,
        format!("Stored credential {} (assigned to {})", style(id).cyan(), or_dash(&label)),
    );
    Ok(())
}

fn run_update(args: UpdateArgs, global: &GlobalOpts) -> Result<()> {
    let mut ctx = Context::open(global)?;
    ctx.require(Capability::Edit)?;
    let mut credential = ctx
        .store
        .data()
        .credential(args.id)
        .cloned()
        .ok_or_else(|| miette::miette!("No credential found with ID {}", args.id))?;

    if let Some(password) = args.password {
        credential.password = password;
    }
    if let Some(description) = args.description {
        credential.description = description;
    }
    if args.unassign {
        credential.assign(None);
    } else if let Some(target) = args.target.target() {
        credential.assign(Some(target));
    }
    validation::validate_credential(ctx.store.data(), &credential)?;

    ctx.store.update_credential(credential).into_diagnostic()?;
    success(global, format!("Updated credential {}", style(args.id).cyan()));
    Ok(())
}

fn run_delete(args: IdArgs, global: &GlobalOpts) -> Result<()> {
    let mut ctx = Context::open(global)?;
    ctx.require(Capability::Delete)?;

    if !ctx.store.delete_credential(args.id).into_diagnostic()? {
        return Err(miette::miette!("No credential found with ID {}", args.id));
    }
    success(global, format!("Deleted credential {}", style(args.id).cyan()));
    Ok(())
}
