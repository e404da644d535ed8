//! itam: IT-asset inventory console
//!
//! Tracks equipment, collaborators, software licenses, maintenance tickets
//! and credentials for several companies in a local workspace, with an
//! audit trail for every equipment change.

pub mod cli;
pub mod core;
pub mod entities;
