//! CLI command implementations

pub mod auth;
pub mod collab;
pub mod cred;
pub mod equip;
pub mod export;
pub mod init;
pub mod license;
pub mod maint;
pub mod report;
pub mod user;
