//! Entity type definitions
//!
//! Every entity is a plain record keyed by an integer id that is unique
//! within its own collection, and (except users and history) belongs to a
//! company through `company_id`:
//!
//! - [`Equipment`] - hardware assets, optionally assigned to a collaborator
//! - [`Collaborator`] - people that hold equipment and license seats
//! - [`SoftwareLicense`] - licenses with collaborator and equipment seats
//! - [`MaintenanceRecord`] - repair tickets against equipment
//! - [`Credential`] - service accounts
//! - [`User`] - console operators
//! - [`HistoryEntry`] - append-only equipment audit log

pub mod collaborator;
pub mod credential;
pub mod equipment;
pub mod history;
pub mod license;
pub mod maintenance;
pub mod user;

pub use collaborator::{Collaborator, Sex};
pub use credential::{Credential, CredentialTarget};
pub use equipment::{Equipment, EquipmentSpecs, EquipmentStatus};
pub use history::{HistoryAction, HistoryEntry, SYSTEM_ACTOR};
pub use license::SoftwareLicense;
pub use maintenance::{DeliveryStatus, MaintenanceRecord, Severity, TicketStatus};
pub use user::{Capability, Role, User, SUPER_ADMIN_ID};
