//! `itam init` command - Initialize a new inventory workspace

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::core::seed::SUPER_ADMIN_USERNAME;
use crate::core::storage::DATA_KEY;
use crate::core::{Config, PersistentStore, Storage, Workspace, WorkspaceError};

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (default: current directory)
    #[arg(default_value = ".")]
    pub path: std::path::PathBuf,

    /// Rewrite .itam/config.yaml even if the workspace already exists
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: InitArgs) -> Result<()> {
    let path = if args.path.as_os_str() == "." {
        std::env::current_dir().into_diagnostic()?
    } else {
        args.path.clone()
    };

    if !path.exists() {
        std::fs::create_dir_all(&path).into_diagnostic()?;
        println!(
            "{} Created directory {}",
            style("✓").green(),
            style(path.display()).cyan()
        );
    }

    let workspace = match Workspace::init(&path, args.force) {
        Ok(workspace) => workspace,
        Err(WorkspaceError::AlreadyExists(path)) => {
            println!(
                "{} Workspace already exists at {}",
                style("!").yellow(),
                style(path.display()).cyan()
            );
            println!();
            println!("Use {} to rewrite its config", style("itam init --force").yellow());
            return Ok(());
        }
        Err(e) => return Err(miette::miette!("{}", e)),
    };

    // Materialize the seed document unless data is already stored
    let config = Config::load(Some(&workspace));
    let persistence =
        PersistentStore::new(workspace.storage()).with_bootstrap_pin(config.bootstrap_pin());
    if persistence.storage().read(DATA_KEY).into_diagnostic()?.is_none() {
        persistence.save(&persistence.load()).into_diagnostic()?;
    }

    println!(
        "{} Initialized inventory workspace at {}",
        style("✓").green(),
        style(workspace.root().display()).cyan()
    );
    println!("   {}", style(workspace.itam_dir().join("config.yaml").display()).dim());
    println!();
    println!("Next steps:");
    println!(
        "  {} Log in as the seeded administrator",
        style(format!("itam login {}", SUPER_ADMIN_USERNAME)).yellow()
    );
    println!(
        "  {} Change the administrator PIN",
        style("itam user edit 1 --pin NNNN").yellow()
    );
    println!(
        "  {} Register the first piece of equipment",
        style("itam equip new").yellow()
    );
    Ok(())
}
