//! `itam export` command - JSON backup of the whole inventory

use chrono::Local;
use console::style;
use miette::Result;
use std::path::PathBuf;

use crate::cli::helpers::{success, Context};
use crate::cli::GlobalOpts;
use crate::core::export_database;

#[derive(clap::Args, Debug)]
pub struct ExportArgs {
    /// Directory the backup file is written to
    #[arg(long, short = 'o', default_value = ".")]
    pub output_dir: PathBuf,
}

pub fn run(args: ExportArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = Context::open(global)?;
    ctx.require_login()?;

    let data = ctx.store.data();
    let path = export_database(data, &args.output_dir, Local::now().date_naive())
        .map_err(|e| miette::miette!("{}", e))?;
    success(
        global,
        format!(
            "Exported {} records to {}",
            data.record_count(),
            style(path.display()).cyan()
        ),
    );
    Ok(())
}
