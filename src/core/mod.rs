//! Core module - storage, mutation layer, sessions and the read side

pub mod auth;
pub mod config;
pub mod data;
pub mod export;
pub mod identity;
pub mod inventory;
pub mod lock;
pub mod queries;
pub mod report;
pub mod seed;
pub mod storage;
pub mod validation;
pub mod workspace;

pub use auth::{AuthError, SessionManager};
pub use config::Config;
pub use data::AppData;
pub use export::{export_database, ExportError};
pub use identity::{
    CollaboratorId, CredentialId, EntityId, EntityKind, EquipmentId, HistoryId, IdParseError,
    IdSequences, LicenseId, MaintenanceId, UserId,
};
pub use inventory::{InventoryStore, TicketResolution, UserDeletion};
pub use lock::IdleLock;
pub use report::{HandoverSubject, ReportError};
pub use storage::{FileStorage, MemoryStorage, PersistentStore, Storage, StorageError};
pub use validation::ValidationError;
pub use workspace::{Workspace, WorkspaceError};
