//! `itam report` command - CSV inventory reports and handover documents

use chrono::{Datelike, Local, NaiveDate};
use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use crate::cli::helpers::Context;
use crate::cli::GlobalOpts;
use crate::core::identity::{CollaboratorId, EquipmentId, LicenseId};
use crate::core::report::{self, HandoverSubject};

#[derive(Subcommand, Debug)]
pub enum ReportCommands {
    /// Equipment inventory of the selected company as CSV
    Equipment(EquipmentArgs),

    /// Maintenance tickets in a date range as CSV
    Maintenance(MaintenanceArgs),

    /// Handover document for an equipment assignment or a license
    Handover(HandoverArgs),
}

#[derive(clap::Args, Debug)]
pub struct EquipmentArgs {
    /// Output to file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct MaintenanceArgs {
    /// First day included (default: first day of the current month)
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Last day included (default: today)
    #[arg(long)]
    pub to: Option<NaiveDate>,

    /// Output to file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct HandoverArgs {
    /// Equipment being handed over
    #[arg(long, short = 'e', requires = "collaborator", conflicts_with = "license")]
    pub equipment: Option<EquipmentId>,

    /// Collaborator receiving the equipment
    #[arg(long, short = 'p')]
    pub collaborator: Option<CollaboratorId>,

    /// License whose seat holders sign the document
    #[arg(long, short = 'l')]
    pub license: Option<LicenseId>,

    /// Output to file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

pub fn run(cmd: ReportCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ReportCommands::Equipment(args) => run_equipment(args, global),
        ReportCommands::Maintenance(args) => run_maintenance(args, global),
        ReportCommands::Handover(args) => run_handover(args, global),
    }
}

fn run_equipment(args: EquipmentArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = Context::open(global)?;
    ctx.require_login()?;
    let company = ctx.company(global)?;

    let mut buffer = Vec::new();
    let rows = report::write_equipment_csv(ctx.store.data(), &company, &mut buffer)
        .map_err(|e| miette::miette!("{}", e))?;
    tracing::debug!(rows, %company, "equipment report built");
    write_output(&String::from_utf8_lossy(&buffer), args.output)
}

fn run_maintenance(args: MaintenanceArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = Context::open(global)?;
    ctx.require_login()?;
    let company = ctx.company(global)?;

    let today = Local::now().date_naive();
    let to = args.to.unwrap_or(today);
    let from = args.from.or_else(|| to.with_day(1)).unwrap_or(to);
    if from > to {
        return Err(miette::miette!("--from {} is after --to {}", from, to));
    }

    let mut buffer = Vec::new();
    let rows = report::write_maintenance_csv(ctx.store.data(), &company, from, to, &mut buffer)
        .map_err(|e| miette::miette!("{}", e))?;
    tracing::debug!(rows, %company, %from, %to, "maintenance report built");
    write_output(&String::from_utf8_lossy(&buffer), args.output)
}

fn run_handover(args: HandoverArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = Context::open(global)?;
    let user = ctx.require_login()?;

    let subject = match (args.equipment, args.collaborator, args.license) {
        (Some(equipment), Some(collaborator), None) => HandoverSubject::Equipment {
            equipment,
            collaborator,
        },
        (None, None, Some(license)) => HandoverSubject::License(license),
        _ => {
            return Err(miette::miette!(
                "pass --equipment with --collaborator, or --license"
            ))
        }
    };

    let document = report::render_handover(
        ctx.store.data(),
        subject,
        Local::now().date_naive(),
        &user.name,
    )
    .into_diagnostic()?;
    write_output(&document, args.output)
}

fn write_output(content: &str, output_path: Option<PathBuf>) -> Result<()> {
    if let Some(path) = output_path {
        let file = File::create(&path).into_diagnostic()?;
        let mut writer = BufWriter::new(file);
        writer.write_all(content.as_bytes()).into_diagnostic()?;
        writer.flush().into_diagnostic()?;
        println!("{} Report written to {}", style("✓").green(), style(path.display()).cyan());
    } else {
        print!("{}", content);
    }
    Ok(())
}
