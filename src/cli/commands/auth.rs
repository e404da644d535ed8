//! `itam login`, `logout`, `whoami` and `unlock` - session commands

use chrono::Utc;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{read_secret, success, Context};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::IdleLock;

#[derive(clap::Args, Debug)]
pub struct LoginArgs {
    /// Username (matched ignoring case)
    pub username: String,

    /// 4-digit PIN (prompted when omitted)
    #[arg(long, env = "ITAM_PIN", hide_env_values = true)]
    pub pin: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct UnlockArgs {
    /// Lock PIN (prompted when omitted)
    #[arg(long)]
    pub pin: Option<String>,
}

pub fn run_login(args: LoginArgs, global: &GlobalOpts) -> Result<()> {
    let mut ctx = Context::open(global)?;
    let pin = read_secret(args.pin, "PIN")?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .into_diagnostic()?;
    let users = ctx.store.data().users.clone();
    let ok = runtime
        .block_on(ctx.session.login(&users, &args.username, &pin))
        .into_diagnostic()?;

    if !ok {
        return Err(miette::miette!("invalid username or PIN"));
    }
    let user = ctx.require_login()?;
    success(
        global,
        format!(
            "Logged in as {} ({})",
            style(&user.name).cyan(),
            style(user.role).yellow()
        ),
    );
    Ok(())
}

pub fn run_logout(global: &GlobalOpts) -> Result<()> {
    let mut ctx = Context::open_unlocked(global)?;
    let was = ctx.session.current_user().map(|u| u.username.clone());
    ctx.session.logout().into_diagnostic()?;
    match was {
        Some(username) => success(global, format!("Logged out {}", style(username).cyan())),
        None => success(global, "No active session"),
    }
    Ok(())
}

pub fn run_whoami(global: &GlobalOpts) -> Result<()> {
    let ctx = Context::open(global)?;
    let user = ctx.require_login()?;

    let caps: Vec<String> = user.role.capabilities().iter().map(|c| c.to_string()).collect();
    let summary = serde_json::json!({
        "id": user.id,
        "username": user.username,
        "name": user.name,
        "role": user.role,
        "capabilities": caps,
    });

    match global.format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&summary).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(&summary).into_diagnostic()?;
            print!("{}", yaml);
        }
        OutputFormat::Id => println!("{}", user.id),
        _ => {
            println!("{}: {}", style("User").bold(), style(&user.username).cyan());
            println!("{}: {}", style("Name").bold(), user.name);
            println!("{}: {}", style("Role").bold(), style(user.role).yellow());
            println!(
                "{}: {}",
                style("Capabilities").bold(),
                if caps.is_empty() { "read-only".to_string() } else { caps.join(", ") }
            );
        }
    }
    Ok(())
}

pub fn run_unlock(args: UnlockArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = Context::open_unlocked(global)?;
    let Some(expected) = ctx.config.lock_pin.as_deref() else {
        success(global, "Inactivity lock is disabled (no lock_pin configured)");
        return Ok(());
    };

    let storage = ctx.workspace.storage();
    let now = Utc::now();
    let mut lock = IdleLock::load(&storage, now);
    if !lock.poll(now, ctx.config.idle_timeout()) {
        success(global, "Console is not locked");
        return Ok(());
    }

    let pin = read_secret(args.pin, "Lock PIN")?;
    if !lock.unlock(&pin, expected, now) {
        return Err(miette::miette!("wrong lock PIN"));
    }
    lock.save(&storage).into_diagnostic()?;
    success(global, "Console unlocked");
    Ok(())
}
