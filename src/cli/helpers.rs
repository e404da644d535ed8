//! Shared helper functions for CLI commands
//!
//! Opening the workspace, checking the session and the inactivity lock,
//! and the small formatting helpers used by every list command.

use chrono::Utc;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::GlobalOpts;
use crate::core::{
    Config, FileStorage, IdleLock, InventoryStore, PersistentStore, SessionManager, Workspace,
};
use crate::entities::{Capability, User};

/// Everything a command needs: the workspace, its config, the live
/// inventory and the session
pub struct Context {
    pub workspace: Workspace,
    pub config: Config,
    pub store: InventoryStore<FileStorage>,
    pub session: SessionManager<FileStorage>,
}

impl Context {
    /// Open the workspace and refuse to continue while the console is locked
    pub fn open(global: &GlobalOpts) -> Result<Self> {
        let ctx = Self::open_unlocked(global)?;
        ctx.check_idle_lock()?;
        Ok(ctx)
    }

    /// Open the workspace without consulting the inactivity lock
    pub fn open_unlocked(global: &GlobalOpts) -> Result<Self> {
        let workspace = match &global.workspace {
            Some(path) => Workspace::discover_from(path),
            None => Workspace::discover(),
        }
        .map_err(|e| miette::miette!("{}", e))?;

        let config = Config::load(Some(&workspace));
        let persistence =
            PersistentStore::new(workspace.storage()).with_bootstrap_pin(config.bootstrap_pin());
        let store = InventoryStore::open(persistence);
        let mut session = SessionManager::restore(workspace.storage(), config.login_delay());
        session.refresh(&store.data().users).into_diagnostic()?;

        Ok(Self {
            workspace,
            config,
            store,
            session,
        })
    }

    fn check_idle_lock(&self) -> Result<()> {
        if self.config.lock_pin.is_none() {
            return Ok(());
        }
        let storage = self.workspace.storage();
        let now = Utc::now();
        let mut lock = IdleLock::load(&storage, now);
        if lock.poll(now, self.config.idle_timeout()) {
            lock.save(&storage).into_diagnostic()?;
            return Err(miette::miette!(
                "console locked after inactivity. Run 'itam unlock' to continue."
            ));
        }
        lock.touch(now);
        lock.save(&storage).into_diagnostic()
    }

    /// The logged-in user
    pub fn require_login(&self) -> Result<User> {
        self.session
            .require_login()
            .cloned()
            .map_err(|e| miette::miette!("{}", e))
    }

    /// The logged-in user, if their role grants `capability`
    pub fn require(&self, capability: Capability) -> Result<User> {
        self.session
            .require(capability)
            .cloned()
            .map_err(|e| miette::miette!("{}", e))
    }

    /// Company from --company or the configured default
    pub fn company(&self, global: &GlobalOpts) -> Result<String> {
        self.config.company(global.company.as_deref()).ok_or_else(|| {
            miette::miette!(
                "no company selected. Pass --company or set default_company in .itam/config.yaml"
            )
        })
    }
}

/// Use `given`, or prompt without echo
pub fn read_secret(given: Option<String>, prompt: &str) -> Result<String> {
    match given {
        Some(value) => Ok(value),
        None => dialoguer::Password::new()
            .with_prompt(prompt)
            .interact()
            .into_diagnostic(),
    }
}

/// Print the standard success line
pub fn success(global: &GlobalOpts, message: impl std::fmt::Display) {
    if !global.quiet {
        println!("{} {}", style("✓").green(), message);
    }
}

/// Print a non-fatal warning to stderr
pub fn warning(message: impl std::fmt::Display) {
    eprintln!("{} {}", style("!").yellow(), message);
}

/// Truncate a string to max_len characters, adding "..." if truncated
///
/// Useful for table columns that need fixed-width output.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Escape a string for CSV output
///
/// Handles commas, quotes, and newlines according to RFC 4180.
pub fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// "-" for empty values in tables
pub fn or_dash(s: &str) -> &str {
    if s.trim().is_empty() {
        "-"
    } else {
        s
    }
}
