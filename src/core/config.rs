//! Configuration management with layered hierarchy

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::auth::DEFAULT_LOGIN_DELAY;
use crate::core::lock::DEFAULT_IDLE_TIMEOUT_MINUTES;
use crate::core::seed::DEFAULT_BOOTSTRAP_PIN;
use crate::core::Workspace;

/// Inventory configuration with layered hierarchy
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Company used when a command does not name one
    pub default_company: Option<String>,

    /// Code that lets another admin edit the super-admin
    pub master_code: Option<String>,

    /// PIN for the inactivity lock; no lock when unset
    pub lock_pin: Option<String>,

    pub idle_timeout_minutes: Option<i64>,

    pub login_delay_ms: Option<u64>,

    /// PIN of the seeded super-admin on first run
    pub bootstrap_pin: Option<String>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load(workspace: Option<&Workspace>) -> Self {
        let workspace_path = workspace.map(|w| w.itam_dir().join("config.yaml"));
        let mut config = Self::load_files(Self::global_config_path().as_deref(), workspace_path.as_deref());

        // Environment variables win over every file
        if let Ok(company) = std::env::var("ITAM_DEFAULT_COMPANY") {
            config.default_company = Some(company);
        }
        if let Ok(code) = std::env::var("ITAM_MASTER_CODE") {
            config.master_code = Some(code);
        }
        if let Ok(pin) = std::env::var("ITAM_LOCK_PIN") {
            config.lock_pin = Some(pin);
        }
        if let Some(minutes) = env_number("ITAM_IDLE_TIMEOUT_MINUTES") {
            config.idle_timeout_minutes = Some(minutes);
        }
        if let Some(ms) = env_number("ITAM_LOGIN_DELAY_MS") {
            config.login_delay_ms = Some(ms);
        }

        config
    }

    /// Defaults, then the global file, then the workspace file
    fn load_files(global: Option<&Path>, workspace: Option<&Path>) -> Self {
        let mut config = Config::default();
        for path in [global, workspace].into_iter().flatten() {
            if let Some(layer) = Self::read_file(path) {
                config.merge(layer);
            }
        }
        config
    }

    fn read_file(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                tracing::warn!("could not read {}: {}", path.display(), e);
                return None;
            }
        };
        let has_settings = contents
            .lines()
            .map(str::trim)
            .any(|line| !line.is_empty() && !line.starts_with('#') && line != "---");
        if !has_settings {
            return Some(Config::default());
        }
        match serde_yml::from_str::<Config>(&contents) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!("ignoring invalid config {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Get the path to the global config file
    fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "itam")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.default_company.is_some() {
            self.default_company = other.default_company;
        }
        if other.master_code.is_some() {
            self.master_code = other.master_code;
        }
        if other.lock_pin.is_some() {
            self.lock_pin = other.lock_pin;
        }
        if other.idle_timeout_minutes.is_some() {
            self.idle_timeout_minutes = other.idle_timeout_minutes;
        }
        if other.login_delay_ms.is_some() {
            self.login_delay_ms = other.login_delay_ms;
        }
        if other.bootstrap_pin.is_some() {
            self.bootstrap_pin = other.bootstrap_pin;
        }
    }

    pub fn bootstrap_pin(&self) -> &str {
        self.bootstrap_pin.as_deref().unwrap_or(DEFAULT_BOOTSTRAP_PIN)
    }

    pub fn login_delay(&self) -> Duration {
        self.login_delay_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_LOGIN_DELAY)
    }

    pub fn idle_timeout(&self) -> chrono::Duration {
        let default = chrono::Duration::minutes(DEFAULT_IDLE_TIMEOUT_MINUTES);
        match self.idle_timeout_minutes.filter(|m| *m > 0) {
            None => default,
            Some(minutes) => chrono::Duration::try_minutes(minutes).unwrap_or_else(|| {
                tracing::warn!(minutes, "idle timeout out of range, using the default");
                default
            }),
        }
    }

    /// The company to operate on: the explicit one, else the configured default
    pub fn company(&self, explicit: Option<&str>) -> Option<String> {
        explicit
            .map(str::to_string)
            .or_else(|| self.default_company.clone())
            .filter(|c| !c.trim().is_empty())
    }
}

fn env_number<T: std::str::FromStr>(name: &str) -> Option<T> {
    let value = std::env::var(name).ok()?;
    match value.trim().parse() {
        Ok(n) => Some(n),
        Err(_) => {
            tracing::warn!("ignoring non-numeric {}={}", name, value);
            None
        }
    }
}
