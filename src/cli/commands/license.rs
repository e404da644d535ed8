//! `itam license` command - Software license management

use chrono::{Local, NaiveDate};
use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{escape_csv, or_dash, success, truncate_str, warning, Context};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::identity::{CollaboratorId, EquipmentId, LicenseId};
use crate::core::validation;
use crate::entities::{Capability, SoftwareLicense};

#[derive(Subcommand, Debug)]
pub enum LicenseCommands {
    /// List licenses of the selected company with slot usage
    List(ListArgs),

    /// Add a license
    New(NewArgs),

    /// Give seats to collaborators and/or equipment
    Assign(SeatArgs),

    /// Take seats back
    Unassign(SeatArgs),

    /// Delete a license
    Delete(IdArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Only licenses with more seats assigned than owned
    #[arg(long)]
    pub over_assigned: bool,

    /// Only licenses past their expiration date
    #[arg(long)]
    pub expired: bool,

    /// Show only count
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct IdArgs {
    /// License ID
    pub id: LicenseId,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    #[arg(long, short = 'n')]
    pub name: String,

    #[arg(long, default_value = "")]
    pub vendor: String,

    /// License key
    #[arg(long, default_value = "")]
    pub key: String,

    /// License type (Subscription, Perpetual, OEM, ...)
    #[arg(long = "type", default_value = "")]
    pub license_type: String,

    /// Number of seats owned
    #[arg(long, default_value_t = 1)]
    pub slots: u32,

    #[arg(long)]
    pub start: Option<NaiveDate>,

    #[arg(long)]
    pub expires: Option<NaiveDate>,
}

#[derive(clap::Args, Debug)]
pub struct SeatArgs {
    /// License ID
    pub id: LicenseId,

    /// Collaborator seat (repeatable)
    #[arg(long = "collaborator", short = 'p')]
    pub collaborators: Vec<CollaboratorId>,

    /// Equipment seat (repeatable)
    #[arg(long = "equipment", short = 'e')]
    pub equipment: Vec<EquipmentId>,
}

/// Run a license subcommand
pub fn run(cmd: LicenseCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        LicenseCommands::List(args) => run_list(args, global),
        LicenseCommands::New(args) => run_new(args, global),
        LicenseCommands::Assign(args) => run_seats(args, true, global),
        LicenseCommands::Unassign(args) => run_seats(args, false, global),
        LicenseCommands::Delete(args) => run_delete(args, global),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = Context::open(global)?;
    ctx.require_login()?;
    let company = ctx.company(global)?;
    let today = Local::now().date_naive();

    let licenses: Vec<&SoftwareLicense> = ctx
        .store
        .data()
        .licenses
        .iter()
        .filter(|l| l.company_id == company)
        .filter(|l| !args.over_assigned || l.is_over_assigned())
        .filter(|l| !args.expired || l.is_expired(today))
        .collect();

    if args.count {
        println!("{}", licenses.len());
        return Ok(());
    }

    if licenses.is_empty() {
        println!("No licenses found.");
        return Ok(());
    }

    let format = match global.format {
        OutputFormat::Auto => OutputFormat::Tsv,
        f => f,
    };

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&licenses).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(&licenses).into_diagnostic()?;
            print!("{}", yaml);
        }
        OutputFormat::Csv => {
            println!("id,name,vendor,type,used,total,expires");
            for l in &licenses {
                println!(
                    "{},{},{},{},{},{},{}",
                    l.id,
                    escape_csv(&l.name),
                    escape_csv(&l.vendor),
                    escape_csv(&l.license_type),
                    l.used_slots(),
                    l.total_slots,
                    l.expiration_date.map(|d| d.to_string()).unwrap_or_default()
                );
            }
        }
        OutputFormat::Id => {
            for l in &licenses {
                println!("{}", l.id);
            }
        }
        OutputFormat::Md => {
            println!("| ID | Name | Vendor | Slots | Expires |");
            println!("|---|---|---|---|---|");
            for l in &licenses {
                println!(
                    "| {} | {} | {} | {}/{} | {} |",
                    l.id,
                    l.name,
                    or_dash(&l.vendor),
                    l.used_slots(),
                    l.total_slots,
                    l.expiration_date.map(|d| d.to_string()).unwrap_or_else(|| "-".into())
                );
            }
        }
        _ => {
            println!(
                "{:<6} {:<28} {:<18} {:<10} {}",
                style("ID").bold(),
                style("NAME").bold(),
                style("VENDOR").bold(),
                style("SLOTS").bold(),
                style("EXPIRES").bold()
            );
            println!("{}", "-".repeat(80));
            for l in &licenses {
                let slots = format!("{}/{}", l.used_slots(), l.total_slots);
                let slots = if l.is_over_assigned() {
                    style(format!("{:<10}", slots)).red()
                } else {
                    style(format!("{:<10}", slots)).green()
                };
                let expires = match l.expiration_date {
                    Some(d) if l.is_expired(today) => style(d.to_string()).red().to_string(),
                    Some(d) => d.to_string(),
                    None => "-".to_string(),
                };
                println!(
                    "{:<6} {:<28} {:<18} {} {}",
                    style(l.id).cyan(),
                    truncate_str(&l.name, 28),
                    truncate_str(or_dash(&l.vendor), 18),
                    slots,
                    expires
                );
            }
            println!();
            println!("{} license(s) found.", style(licenses.len()).cyan());
        }
    }

    Ok(())
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let mut ctx = Context::open(global)?;
    ctx.require(Capability::Create)?;
    let company = ctx.company(global)?;

    let mut license = SoftwareLicense::new(company, args.name, args.slots);
    license.vendor = args.vendor;
    license.key = args.key;
    license.license_type = args.license_type;
    license.start_date = args.start;
    license.expiration_date = args.expires;
    validation::validate_license(ctx.store.data(), &license)?;

    let id = ctx.store.add_license(license).into_diagnostic()?;
    success(global, format!("Added license {}", style(id).cyan()));
    Ok(())
}

fn run_seats(args: SeatArgs, assign: bool, global: &GlobalOpts) -> Result<()> {
    let mut ctx = Context::open(global)?;
    ctx.require(Capability::Edit)?;
    if args.collaborators.is_empty() && args.equipment.is_empty() {
        return Err(miette::miette!("name at least one --collaborator or --equipment"));
    }

    let mut license = ctx
        .store
        .data()
        .license(args.id)
        .cloned()
        .ok_or_else(|| miette::miette!("No license found with ID {}", args.id))?;

    if assign {
        for c in args.collaborators {
            if !license.assigned_to.contains(&c) {
                license.assigned_to.push(c);
            }
        }
        for e in args.equipment {
            if !license.assigned_to_equipment.contains(&e) {
                license.assigned_to_equipment.push(e);
            }
        }
    } else {
        license.assigned_to.retain(|c| !args.collaborators.contains(c));
        license.assigned_to_equipment.retain(|e| !args.equipment.contains(e));
    }
    validation::validate_license(ctx.store.data(), &license)?;

    let over = validation::slot_warning(&license);
    let used = license.used_slots();
    let total = license.total_slots;
    ctx.store.update_license(license).into_diagnostic()?;

    if let Some(message) = over {
        warning(message);
    }
    success(
        global,
        format!("License {} now uses {}/{} slots", style(args.id).cyan(), used, total),
    );
    Ok(())
}

fn run_delete(args: IdArgs, global: &GlobalOpts) -> Result<()> {
    let mut ctx = Context::open(global)?;
    ctx.require(Capability::Delete)?;

    if !ctx.store.delete_license(args.id).into_diagnostic()? {
        return Err(miette::miette!("No license found with ID {}", args.id));
    }
    success(global, format!("Deleted license {}", style(args.id).cyan()));
    Ok(())
}
