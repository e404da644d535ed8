//! `itam equip` command - Equipment management

use chrono::NaiveDate;
use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{escape_csv, or_dash, success, truncate_str, warning, Context};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::identity::{CollaboratorId, EquipmentId, LicenseId};
use crate::core::queries::{self, EquipmentFilter};
use crate::core::validation;
use crate::core::AppData;
use crate::entities::{Capability, Equipment, EquipmentStatus};

#[derive(Subcommand, Debug)]
pub enum EquipCommands {
    /// List equipment of the selected company
    List(ListArgs),

    /// Show one piece of equipment with its licenses and tickets
    Show(ShowArgs),

    /// Register new equipment
    New(NewArgs),

    /// Change fields, assignment or installed licenses
    Update(UpdateArgs),

    /// Delete equipment and everything attached to it
    Delete(ShowArgs),

    /// Show the audit trail, newest first
    History(ShowArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Filter by status (active, maintenance, retired, lost)
    #[arg(long, short = 's')]
    pub status: Option<EquipmentStatus>,

    /// Filter by site
    #[arg(long)]
    pub site: Option<String>,

    /// Search in brand, model, serial number and type
    #[arg(long)]
    pub search: Option<String>,

    /// Only equipment assigned to this collaborator
    #[arg(long)]
    pub assigned_to: Option<CollaboratorId>,

    /// Limit number of results
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,

    /// Show only count
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Equipment ID (e.g. 12 or #12)
    pub id: EquipmentId,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Equipment type (Laptop, Desktop, Monitor, Peripheral, ...)
    #[arg(long = "type", short = 't')]
    pub equipment_type: String,

    #[arg(long, short = 'b')]
    pub brand: String,

    #[arg(long, short = 'm')]
    pub model: String,

    /// Serial number (unique across all companies)
    #[arg(long)]
    pub serial: String,

    #[arg(long, default_value = "")]
    pub site: String,

    #[arg(long, default_value = "")]
    pub location: String,

    #[arg(long, default_value = "active")]
    pub status: EquipmentStatus,

    /// Collaborator holding the equipment
    #[arg(long)]
    pub assign: Option<CollaboratorId>,

    /// Purchase date (YYYY-MM-DD)
    #[arg(long)]
    pub purchase_date: Option<NaiveDate>,

    #[command(flatten)]
    pub specs: SpecArgs,

    /// License installed on this equipment (repeatable)
    #[arg(long = "license", short = 'l')]
    pub licenses: Vec<LicenseId>,
}

#[derive(clap::Args, Debug, Default)]
pub struct SpecArgs {
    #[arg(long)]
    pub processor: Option<String>,

    #[arg(long)]
    pub ram: Option<String>,

    #[arg(long)]
    pub storage: Option<String>,

    #[arg(long)]
    pub os: Option<String>,

    /// Kind of peripheral (keyboard, mouse, headset, ...)
    #[arg(long)]
    pub peripheral_type: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct UpdateArgs {
    /// Equipment ID
    pub id: EquipmentId,

    #[arg(long = "type", short = 't')]
    pub equipment_type: Option<String>,

    #[arg(long, short = 'b')]
    pub brand: Option<String>,

    #[arg(long, short = 'm')]
    pub model: Option<String>,

    #[arg(long)]
    pub serial: Option<String>,

    #[arg(long)]
    pub site: Option<String>,

    #[arg(long)]
    pub location: Option<String>,

    #[arg(long)]
    pub status: Option<EquipmentStatus>,

    /// Assign to a collaborator
    #[arg(long, conflicts_with = "unassign")]
    pub assign: Option<CollaboratorId>,

    /// Remove the current assignment
    #[arg(long)]
    pub unassign: bool,

    #[arg(long)]
    pub purchase_date: Option<NaiveDate>,

    #[command(flatten)]
    pub specs: SpecArgs,

    /// Replace the installed licenses with these (repeatable)
    #[arg(long = "license", short = 'l', conflicts_with = "clear_licenses")]
    pub licenses: Vec<LicenseId>,

    /// Uninstall every license from this equipment
    #[arg(long)]
    pub clear_licenses: bool,
}

/// Run an equipment subcommand
pub fn run(cmd: EquipCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        EquipCommands::List(args) => run_list(args, global),
        EquipCommands::Show(args) => run_show(args, global),
        EquipCommands::New(args) => run_new(args, global),
        EquipCommands::Update(args) => run_update(args, global),
        EquipCommands::Delete(args) => run_delete(args, global),
        EquipCommands::History(args) => run_history(args, global),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = Context::open(global)?;
    ctx.require_login()?;
    let company = ctx.company(global)?;
    let data = ctx.store.data();

    let filter = EquipmentFilter {
        status: args.status,
        site_id: args.site,
        search: args.search,
    };
    let mut equipment: Vec<&Equipment> = queries::equipment_for_company(data, &company, &filter)
        .into_iter()
        .filter(|e| args.assigned_to.is_none() || e.assigned_to == args.assigned_to)
        .collect();
    equipment.sort_by_key(|e| e.id);

    if let Some(limit) = args.limit {
        equipment.truncate(limit);
    }

    if args.count {
        println!("{}", equipment.len());
        return Ok(());
    }

    if equipment.is_empty() {
        println!("No equipment found.");
        return Ok(());
    }

    let format = match global.format {
        OutputFormat::Auto => OutputFormat::Tsv,
        f => f,
    };

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&equipment).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(&equipment).into_diagnostic()?;
            print!("{}", yaml);
        }
        OutputFormat::Csv => {
            println!("id,type,brand,model,serial_number,status,site,assigned_to");
            for e in &equipment {
                println!(
                    "{},{},{},{},{},{},{},{}",
                    e.id,
                    escape_csv(&e.equipment_type),
                    escape_csv(&e.brand),
                    escape_csv(&e.model),
                    escape_csv(&e.serial_number),
                    e.status,
                    escape_csv(&e.site_id),
                    escape_csv(&queries::collaborator_name(data, e.assigned_to))
                );
            }
        }
        OutputFormat::Tsv => {
            println!(
                "{:<6} {:<12} {:<24} {:<16} {:<12} {:<20}",
                style("ID").bold(),
                style("TYPE").bold(),
                style("BRAND / MODEL").bold(),
                style("SERIAL").bold(),
                style("STATUS").bold(),
                style("ASSIGNED TO").bold()
            );
            println!("{}", "-".repeat(95));
            for e in &equipment {
                println!(
                    "{:<6} {:<12} {:<24} {:<16} {:<12} {:<20}",
                    style(e.id).cyan(),
                    truncate_str(&e.equipment_type, 12),
                    truncate_str(&e.display_name(), 24),
                    truncate_str(&e.serial_number, 16),
                    status_style(e.status),
                    truncate_str(&queries::collaborator_name(data, e.assigned_to), 20)
                );
            }
            println!();
            println!("{} item(s) found.", style(equipment.len()).cyan());
        }
        OutputFormat::Id => {
            for e in &equipment {
                println!("{}", e.id);
            }
        }
        OutputFormat::Md => {
            println!("| ID | Type | Brand / Model | Serial | Status | Assigned To |");
            println!("|---|---|---|---|---|---|");
            for e in &equipment {
                println!(
                    "| {} | {} | {} | {} | {} | {} |",
                    e.id,
                    e.equipment_type,
                    e.display_name(),
                    e.serial_number,
                    e.status,
                    queries::collaborator_name(data, e.assigned_to)
                );
            }
        }
        OutputFormat::Auto => unreachable!(),
    }

    Ok(())
}

fn status_style(status: EquipmentStatus) -> console::StyledObject<String> {
    let text = format!("{:<12}", status);
    match status {
        EquipmentStatus::Active => style(text).green(),
        EquipmentStatus::Maintenance => style(text).yellow(),
        EquipmentStatus::Retired => style(text).dim(),
        EquipmentStatus::Lost => style(text).red(),
    }
}

fn find(data: &AppData, id: EquipmentId) -> Result<&Equipment> {
    data.equipment(id)
        .ok_or_else(|| miette::miette!("No equipment found with ID {}", id))
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = Context::open(global)?;
    ctx.require_login()?;
    let data = ctx.store.data();
    let e = find(data, args.id)?;

    match global.format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(e).into_diagnostic()?;
            println!("{}", json);
            return Ok(());
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(e).into_diagnostic()?;
            print!("{}", yaml);
            return Ok(());
        }
        OutputFormat::Id => {
            println!("{}", e.id);
            return Ok(());
        }
        _ => {}
    }

    println!("{}", style("─".repeat(60)).dim());
    println!("{}: {}", style("ID").bold(), style(e.id).cyan());
    println!(
        "{}: {} {}",
        style("Equipment").bold(),
        e.equipment_type,
        style(e.display_name()).yellow()
    );
    println!("{}: {}", style("Serial").bold(), e.serial_number);
    println!("{}: {}", style("Status").bold(), e.status);
    println!("{}: {}", style("Company").bold(), e.company_id);
    println!("{}: {}", style("Site").bold(), or_dash(&e.site_id));
    println!("{}: {}", style("Location").bold(), or_dash(&e.location));
    println!(
        "{}: {}",
        style("Assigned to").bold(),
        queries::collaborator_name(data, e.assigned_to)
    );
    if let Some(date) = e.purchase_date {
        println!("{}: {}", style("Purchased").bold(), date);
    }
    let specs = e.specs();
    if !specs.is_empty() {
        println!("{}: {}", style("Specs").bold(), specs.summary());
    }
    if let Some(ref peripheral) = e.peripheral_type {
        println!("{}: {}", style("Peripheral").bold(), peripheral);
    }
    println!("{}", style("─".repeat(60)).dim());

    let licenses = queries::licenses_for_equipment(data, e.id);
    if !licenses.is_empty() {
        println!();
        println!("{} ({}):", style("Licenses").bold(), licenses.len());
        for l in licenses {
            println!("  • {} {}", style(l.id).cyan(), l.name);
        }
    }

    let tickets = queries::maintenance_for_equipment(data, e.id);
    if !tickets.is_empty() {
        println!();
        println!("{} ({}):", style("Maintenance").bold(), tickets.len());
        for t in tickets {
            println!(
                "  • {} {} {} [{}, {}]",
                style(t.id).cyan(),
                t.date,
                t.title,
                t.severity,
                t.status
            );
        }
    }

    Ok(())
}

fn check_licenses(data: &AppData, company: &str, ids: &[LicenseId]) -> Result<()> {
    for id in ids {
        let license = data
            .license(*id)
            .ok_or_else(|| miette::miette!("No license found with ID {}", id))?;
        if license.company_id != company {
            return Err(miette::miette!(
                "license {} belongs to company '{}', not '{}'",
                id,
                license.company_id,
                company
            ));
        }
    }
    Ok(())
}

fn warn_slots(data: &AppData, ids: &[LicenseId]) {
    for id in ids {
        if let Some(message) = data.license(*id).and_then(validation::slot_warning) {
            warning(message);
        }
    }
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let mut ctx = Context::open(global)?;
    let user = ctx.require(Capability::Create)?;
    let company = ctx.company(global)?;

    let mut equipment = Equipment::new(
        company.clone(),
        args.equipment_type,
        args.brand,
        args.model,
        args.serial.trim(),
    );
    equipment.site_id = args.site;
    equipment.location = args.location;
    equipment.status = args.status;
    equipment.assigned_to = args.assign;
    equipment.purchase_date = args.purchase_date;
    equipment.processor = args.specs.processor;
    equipment.ram = args.specs.ram;
    equipment.storage = args.specs.storage;
    equipment.os = args.specs.os;
    equipment.peripheral_type = args.specs.peripheral_type;

    validation::validate_equipment(ctx.store.data(), &equipment, false)?;
    check_licenses(ctx.store.data(), &company, &args.licenses)?;

    let id = if args.licenses.is_empty() {
        Some(ctx.store.add_equipment(equipment, &user.name).into_diagnostic()?)
    } else {
        ctx.store
            .save_equipment_with_licenses(equipment, &args.licenses, false, &user.name)
            .into_diagnostic()?
    };
    let id = id.ok_or_else(|| miette::miette!("equipment was not saved"))?;

    warn_slots(ctx.store.data(), &args.licenses);
    success(global, format!("Registered equipment {}", style(id).cyan()));
    Ok(())
}

fn run_update(args: UpdateArgs, global: &GlobalOpts) -> Result<()> {
    let mut ctx = Context::open(global)?;
    let user = ctx.require(Capability::Edit)?;
    let mut equipment = find(ctx.store.data(), args.id)?.clone();

    if let Some(v) = args.equipment_type {
        equipment.equipment_type = v;
    }
    if let Some(v) = args.brand {
        equipment.brand = v;
    }
    if let Some(v) = args.model {
        equipment.model = v;
    }
    if let Some(v) = args.serial {
        equipment.serial_number = v.trim().to_string();
    }
    if let Some(v) = args.site {
        equipment.site_id = v;
    }
    if let Some(v) = args.location {
        equipment.location = v;
    }
    if let Some(v) = args.status {
        equipment.status = v;
    }
    if args.assign.is_some() {
        equipment.assigned_to = args.assign;
    }
    if args.unassign {
        equipment.assigned_to = None;
    }
    if args.purchase_date.is_some() {
        equipment.purchase_date = args.purchase_date;
    }
    if args.specs.peripheral_type.is_some() {
        equipment.peripheral_type = args.specs.peripheral_type.clone();
    }
    equipment.merge_specs(&crate::entities::EquipmentSpecs {
        processor: args.specs.processor,
        ram: args.specs.ram,
        storage: args.specs.storage,
        os: args.specs.os,
    });

    validation::validate_equipment(ctx.store.data(), &equipment, true)?;

    let id = equipment.id;
    if !args.licenses.is_empty() || args.clear_licenses {
        check_licenses(ctx.store.data(), &equipment.company_id, &args.licenses)?;
        ctx.store
            .save_equipment_with_licenses(equipment, &args.licenses, true, &user.name)
            .into_diagnostic()?;
        warn_slots(ctx.store.data(), &args.licenses);
    } else {
        ctx.store
            .update_equipment(equipment, &user.name)
            .into_diagnostic()?;
    }

    success(global, format!("Updated equipment {}", style(id).cyan()));
    Ok(())
}

fn run_delete(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let mut ctx = Context::open(global)?;
    ctx.require(Capability::Delete)?;

    if !ctx.store.delete_equipment(args.id).into_diagnostic()? {
        return Err(miette::miette!("No equipment found with ID {}", args.id));
    }
    success(global, format!("Deleted equipment {}", style(args.id).cyan()));
    Ok(())
}

fn run_history(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = Context::open(global)?;
    ctx.require_login()?;
    let data = ctx.store.data();
    find(data, args.id)?;

    let rows = queries::history_for_equipment(data, args.id);
    match global.format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&rows).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(&rows).into_diagnostic()?;
            print!("{}", yaml);
        }
        _ => {
            if rows.is_empty() {
                println!("No history for equipment {}.", args.id);
                return Ok(());
            }
            for h in rows {
                println!(
                    "{}  {} {}  {}",
                    style(h.date.format("%Y-%m-%d %H:%M")).dim(),
                    style(format!("{:<14}", h.action_type.to_string())).yellow(),
                    h.description,
                    style(format!("({})", h.user)).dim()
                );
            }
        }
    }
    Ok(())
}
