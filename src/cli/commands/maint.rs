//! `itam maint` command - Maintenance tickets

use chrono::{Local, NaiveDate};
use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{escape_csv, success, truncate_str, Context};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::identity::{EquipmentId, MaintenanceId};
use crate::core::{validation, TicketResolution};
use crate::entities::{Capability, EquipmentSpecs, MaintenanceRecord, Severity, TicketStatus};

#[derive(Subcommand, Debug)]
pub enum MaintCommands {
    /// List tickets of the selected company
    List(ListArgs),

    /// Open a ticket for a piece of equipment
    Open(OpenArgs),

    /// Close a ticket with its resolution
    Resolve(ResolveArgs),

    /// Toggle whether a repaired item was handed back
    Deliver(IdArgs),

    /// Delete a ticket
    Delete(IdArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Only open tickets
    #[arg(long)]
    pub open: bool,

    /// Only tickets of this equipment
    #[arg(long, short = 'e')]
    pub equipment: Option<EquipmentId>,

    /// Show only count
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct IdArgs {
    /// Ticket ID
    pub id: MaintenanceId,
}

#[derive(clap::Args, Debug)]
pub struct OpenArgs {
    /// Equipment ID
    pub equipment: EquipmentId,

    #[arg(long, short = 't')]
    pub title: String,

    #[arg(long, short = 'd', default_value = "")]
    pub description: String,

    /// moderate, severe or total-loss
    #[arg(long, short = 's', default_value = "moderate")]
    pub severity: Severity,

    /// Ticket date (default: today)
    #[arg(long)]
    pub date: Option<NaiveDate>,
}

#[derive(clap::Args, Debug)]
pub struct ResolveArgs {
    /// Ticket ID
    pub id: MaintenanceId,

    /// What was done
    #[arg(long)]
    pub details: String,

    /// Resolution date (default: today)
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Equipment was already handed back
    #[arg(long)]
    pub delivered: bool,

    /// New processor after the repair
    #[arg(long)]
    pub processor: Option<String>,

    #[arg(long)]
    pub ram: Option<String>,

    #[arg(long)]
    pub storage: Option<String>,

    #[arg(long)]
    pub os: Option<String>,
}

/// Run a maintenance subcommand
pub fn run(cmd: MaintCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        MaintCommands::List(args) => run_list(args, global),
        MaintCommands::Open(args) => run_open(args, global),
        MaintCommands::Resolve(args) => run_resolve(args, global),
        MaintCommands::Deliver(args) => run_deliver(args, global),
        MaintCommands::Delete(args) => run_delete(args, global),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = Context::open(global)?;
    ctx.require_login()?;
    let company = ctx.company(global)?;
    let data = ctx.store.data();

    let mut tickets: Vec<&MaintenanceRecord> = data
        .maintenance
        .iter()
        .filter(|m| m.company_id == company)
        .filter(|m| !args.open || m.is_open())
        .filter(|m| args.equipment.map_or(true, |e| m.equipment_id == e))
        .collect();
    tickets.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));

    if args.count {
        println!("{}", tickets.len());
        return Ok(());
    }

    if tickets.is_empty() {
        println!("No maintenance tickets found.");
        return Ok(());
    }

    let format = match global.format {
        OutputFormat::Auto => OutputFormat::Tsv,
        f => f,
    };

    let equipment_label = |id: EquipmentId| {
        data.equipment(id)
            .map(|e| e.display_name())
            .unwrap_or_else(|| format!("#{}", id))
    };

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&tickets).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(&tickets).into_diagnostic()?;
            print!("{}", yaml);
        }
        OutputFormat::Csv => {
            println!("id,date,equipment,title,severity,status,delivery");
            for m in &tickets {
                println!(
                    "{},{},{},{},{},{},{}",
                    m.id,
                    m.date,
                    m.equipment_id,
                    escape_csv(&m.title),
                    m.severity,
                    m.status,
                    m.delivery_status.map(|d| d.to_string()).unwrap_or_default()
                );
            }
        }
        OutputFormat::Id => {
            for m in &tickets {
                println!("{}", m.id);
            }
        }
        OutputFormat::Md => {
            println!("| ID | Date | Equipment | Title | Severity | Status |");
            println!("|---|---|---|---|---|---|");
            for m in &tickets {
                println!(
                    "| {} | {} | {} | {} | {} | {} |",
                    m.id,
                    m.date,
                    equipment_label(m.equipment_id),
                    m.title,
                    m.severity,
                    m.status
                );
            }
        }
        _ => {
            println!(
                "{:<6} {:<11} {:<22} {:<28} {:<11} {}",
                style("ID").bold(),
                style("DATE").bold(),
                style("EQUIPMENT").bold(),
                style("TITLE").bold(),
                style("SEVERITY").bold(),
                style("STATUS").bold()
            );
            println!("{}", "-".repeat(95));
            for m in &tickets {
                let status = match (m.status, m.delivery_status) {
                    (TicketStatus::Open, _) => style("Open".to_string()).yellow(),
                    (TicketStatus::Closed, Some(d)) => style(format!("Closed ({})", d)).green(),
                    (TicketStatus::Closed, None) => style("Closed".to_string()).green(),
                };
                println!(
                    "{:<6} {:<11} {:<22} {:<28} {:<11} {}",
                    style(m.id).cyan(),
                    m.date,
                    truncate_str(&equipment_label(m.equipment_id), 22),
                    truncate_str(&m.title, 28),
                    m.severity,
                    status
                );
            }
            println!();
            println!("{} ticket(s) found.", style(tickets.len()).cyan());
        }
    }

    Ok(())
}

fn run_open(args: OpenArgs, global: &GlobalOpts) -> Result<()> {
    let mut ctx = Context::open(global)?;
    let user = ctx.require(Capability::Create)?;
    let company = ctx
        .store
        .data()
        .equipment(args.equipment)
        .map(|e| e.company_id.clone())
        .ok_or_else(|| miette::miette!("No equipment found with ID {}", args.equipment))?;

    let date = args.date.unwrap_or_else(|| Local::now().date_naive());
    let mut record = MaintenanceRecord::new(company, args.equipment, date, args.title, args.severity);
    record.description = args.description;
    validation::validate_maintenance(ctx.store.data(), &record)?;

    let id = ctx
        .store
        .add_maintenance_record(record, &user.name)
        .into_diagnostic()?;
    let status = ctx
        .store
        .data()
        .equipment(args.equipment)
        .map(|e| e.status.to_string())
        .unwrap_or_default();
    success(
        global,
        format!(
            "Opened ticket {} (equipment {} is now {})",
            style(id).cyan(),
            args.equipment,
            style(status).yellow()
        ),
    );
    Ok(())
}

fn run_resolve(args: ResolveArgs, global: &GlobalOpts) -> Result<()> {
    let mut ctx = Context::open(global)?;
    let user = ctx.require(Capability::Edit)?;

    let ticket = ctx
        .store
        .data()
        .maintenance_record(args.id)
        .ok_or_else(|| miette::miette!("No maintenance ticket found with ID {}", args.id))?;
    if !ticket.is_open() {
        return Err(miette::miette!("ticket {} is already closed", args.id));
    }

    let specs = EquipmentSpecs {
        processor: args.processor,
        ram: args.ram,
        storage: args.storage,
        os: args.os,
    };
    let resolution = TicketResolution {
        details: args.details,
        date: args.date.unwrap_or_else(|| Local::now().date_naive()),
        specs: (!specs.is_empty()).then_some(specs),
        mark_as_delivered: args.delivered,
    };

    ctx.store
        .resolve_ticket(args.id, resolution, &user.name)
        .into_diagnostic()?;
    success(global, format!("Resolved ticket {}", style(args.id).cyan()));
    Ok(())
}

fn run_deliver(args: IdArgs, global: &GlobalOpts) -> Result<()> {
    let mut ctx = Context::open(global)?;
    ctx.require(Capability::Edit)?;

    let status = ctx
        .store
        .toggle_maintenance_delivery(args.id)
        .into_diagnostic()?
        .ok_or_else(|| {
            miette::miette!("ticket {} does not exist or is still open", args.id)
        })?;
    success(
        global,
        format!("Ticket {} delivery: {}", style(args.id).cyan(), style(status).yellow()),
    );
    Ok(())
}

fn run_delete(args: IdArgs, global: &GlobalOpts) -> Result<()> {
    let mut ctx = Context::open(global)?;
    ctx.require(Capability::Delete)?;

    if !ctx.store.delete_maintenance_record(args.id).into_diagnostic()? {
        return Err(miette::miette!("No maintenance ticket found with ID {}", args.id));
    }
    success(global, format!("Deleted ticket {}", style(args.id).cyan()));
    Ok(())
}
