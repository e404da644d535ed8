//! `itam collab` command - Collaborator management

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{escape_csv, or_dash, success, truncate_str, Context};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::identity::CollaboratorId;
use crate::core::{queries, validation};
use crate::entities::{Capability, Collaborator, Sex};

#[derive(Subcommand, Debug)]
pub enum CollabCommands {
    /// List collaborators of the selected company
    List(ListArgs),

    /// Add a collaborator
    New(NewArgs),

    /// Change a collaborator's details
    Update(UpdateArgs),

    /// Flip a collaborator between active and inactive
    Toggle(IdArgs),

    /// Delete a collaborator and release their equipment
    Delete(IdArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Include inactive collaborators
    #[arg(long, short = 'a')]
    pub all: bool,

    /// Search in name, email and area
    #[arg(long)]
    pub search: Option<String>,

    /// Show only count
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct IdArgs {
    /// Collaborator ID
    pub id: CollaboratorId,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    #[arg(long)]
    pub first_name: String,

    #[arg(long)]
    pub last_name: String,

    #[arg(long, short = 'e')]
    pub email: String,

    #[arg(long, default_value = "")]
    pub site: String,

    #[arg(long, default_value = "")]
    pub area: String,

    /// Job title
    #[arg(long, default_value = "")]
    pub cargo: String,

    /// m or f
    #[arg(long, default_value = "m")]
    pub sex: Sex,
}

#[derive(clap::Args, Debug)]
pub struct UpdateArgs {
    pub id: CollaboratorId,

    #[arg(long)]
    pub first_name: Option<String>,

    #[arg(long)]
    pub last_name: Option<String>,

    #[arg(long, short = 'e')]
    pub email: Option<String>,

    #[arg(long)]
    pub site: Option<String>,

    #[arg(long)]
    pub area: Option<String>,

    #[arg(long)]
    pub cargo: Option<String>,

    #[arg(long)]
    pub sex: Option<Sex>,
}

/// Run a collaborator subcommand
pub fn run(cmd: CollabCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        CollabCommands::List(args) => run_list(args, global),
        CollabCommands::New(args) => run_new(args, global),
        CollabCommands::Update(args) => run_update(args, global),
        CollabCommands::Toggle(args) => run_toggle(args, global),
        CollabCommands::Delete(args) => run_delete(args, global),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = Context::open(global)?;
    ctx.require_login()?;
    let company = ctx.company(global)?;
    let data = ctx.store.data();

    let search = args.search.map(|s| s.to_lowercase());
    let collaborators: Vec<&Collaborator> = data
        .collaborators
        .iter()
        .filter(|c| c.company_id == company)
        .filter(|c| args.all || c.is_active)
        .filter(|c| {
            search.as_ref().map_or(true, |term| {
                c.full_name().to_lowercase().contains(term)
                    || c.email.to_lowercase().contains(term)
                    || c.area.to_lowercase().contains(term)
            })
        })
        .collect();

    if args.count {
        println!("{}", collaborators.len());
        return Ok(());
    }

    if collaborators.is_empty() {
        println!("No collaborators found.");
        return Ok(());
    }

    let format = match global.format {
        OutputFormat::Auto => OutputFormat::Tsv,
        f => f,
    };

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&collaborators).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(&collaborators).into_diagnostic()?;
            print!("{}", yaml);
        }
        OutputFormat::Csv => {
            println!("id,first_name,last_name,email,area,cargo,active,equipment");
            for c in &collaborators {
                println!(
                    "{},{},{},{},{},{},{},{}",
                    c.id,
                    escape_csv(&c.first_name),
                    escape_csv(&c.last_name),
                    escape_csv(&c.email),
                    escape_csv(&c.area),
                    escape_csv(&c.cargo),
                    c.is_active,
                    queries::equipment_for_collaborator(data, c.id).len()
                );
            }
        }
        OutputFormat::Id => {
            for c in &collaborators {
                println!("{}", c.id);
            }
        }
        OutputFormat::Md => {
            println!("| ID | Name | Email | Area | Active |");
            println!("|---|---|---|---|---|");
            for c in &collaborators {
                println!(
                    "| {} | {} | {} | {} | {} |",
                    c.id,
                    c.full_name(),
                    c.email,
                    or_dash(&c.area),
                    if c.is_active { "yes" } else { "no" }
                );
            }
        }
        _ => {
            println!(
                "{:<6} {:<26} {:<28} {:<16} {:<8} {}",
                style("ID").bold(),
                style("NAME").bold(),
                style("EMAIL").bold(),
                style("AREA").bold(),
                style("ACTIVE").bold(),
                style("EQUIP").bold()
            );
            println!("{}", "-".repeat(95));
            for c in &collaborators {
                println!(
                    "{:<6} {:<26} {:<28} {:<16} {:<8} {}",
                    style(c.id).cyan(),
                    truncate_str(&c.full_name(), 26),
                    truncate_str(&c.email, 28),
                    truncate_str(or_dash(&c.area), 16),
                    if c.is_active { "yes" } else { "no" },
                    queries::equipment_for_collaborator(data, c.id).len()
                );
            }
            println!();
            println!("{} collaborator(s) found.", style(collaborators.len()).cyan());
        }
    }

    Ok(())
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let mut ctx = Context::open(global)?;
    ctx.require(Capability::Create)?;
    let company = ctx.company(global)?;

    let mut collaborator = Collaborator::new(company, args.first_name, args.last_name);
    collaborator.email = args.email;
    collaborator.site_id = args.site;
    collaborator.area = args.area;
    collaborator.cargo = args.cargo;
    collaborator.sex = args.sex;
    validation::validate_collaborator(&collaborator)?;

    let name = collaborator.full_name();
    let id = ctx.store.add_collaborator(collaborator).into_diagnostic()?;
    success(
        global,
        format!("Added collaborator {} {}", style(id).cyan(), style(name).yellow()),
    );
    Ok(())
}

fn run_update(args: UpdateArgs, global: &GlobalOpts) -> Result<()> {
    let mut ctx = Context::open(global)?;
    ctx.require(Capability::Edit)?;
    let mut collaborator = ctx
        .store
        .data()
        .collaborator(args.id)
        .cloned()
        .ok_or_else(|| miette::miette!("No collaborator found with ID {}", args.id))?;

    if let Some(v) = args.first_name {
        collaborator.first_name = v;
    }
    if let Some(v) = args.last_name {
        collaborator.last_name = v;
    }
    if let Some(v) = args.email {
        collaborator.email = v;
    }
    if let Some(v) = args.site {
        collaborator.site_id = v;
    }
    if let Some(v) = args.area {
        collaborator.area = v;
    }
    if let Some(v) = args.cargo {
        collaborator.cargo = v;
    }
    if let Some(v) = args.sex {
        collaborator.sex = v;
    }
    validation::validate_collaborator(&collaborator)?;

    ctx.store.update_collaborator(collaborator).into_diagnostic()?;
    success(global, format!("Updated collaborator {}", style(args.id).cyan()));
    Ok(())
}

fn run_toggle(args: IdArgs, global: &GlobalOpts) -> Result<()> {
    let mut ctx = Context::open(global)?;
    ctx.require(Capability::Edit)?;

    let active = ctx
        .store
        .toggle_collaborator_status(args.id)
        .into_diagnostic()?
        .ok_or_else(|| miette::miette!("No collaborator found with ID {}", args.id))?;
    success(
        global,
        format!(
            "Collaborator {} is now {}",
            style(args.id).cyan(),
            if active { "active" } else { "inactive" }
        ),
    );
    Ok(())
}

fn run_delete(args: IdArgs, global: &GlobalOpts) -> Result<()> {
    let mut ctx = Context::open(global)?;
    ctx.require(Capability::Delete)?;

    let released = queries::equipment_for_collaborator(ctx.store.data(), args.id).len();
    if !ctx.store.delete_collaborator(args.id).into_diagnostic()? {
        return Err(miette::miette!("No collaborator found with ID {}", args.id));
    }
    success(global, format!("Deleted collaborator {}", style(args.id).cyan()));
    if released > 0 && !global.quiet {
        println!("   {} piece(s) of equipment unassigned", style(released).yellow());
    }
    Ok(())
}
