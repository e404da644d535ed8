//! Equipment history - the append-only audit log

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::identity::{EquipmentId, HistoryId};

/// Actor recorded for changes the store makes on its own (cascades)
pub const SYSTEM_ACTOR: &str = "System";

/// Kind of change a history entry records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HistoryAction {
    Creation,
    Assignment,
    Unassignment,
    StatusChange,
    Maintenance,
    Update,
}

impl std::fmt::Display for HistoryAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HistoryAction::Creation => write!(f, "CREATION"),
            HistoryAction::Assignment => write!(f, "ASSIGNMENT"),
            HistoryAction::Unassignment => write!(f, "UNASSIGNMENT"),
            HistoryAction::StatusChange => write!(f, "STATUS_CHANGE"),
            HistoryAction::Maintenance => write!(f, "MAINTENANCE"),
            HistoryAction::Update => write!(f, "UPDATE"),
        }
    }
}

/// One immutable audit row describing a change to one piece of equipment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: HistoryId,

    pub equipment_id: EquipmentId,

    pub date: DateTime<Utc>,

    pub action_type: HistoryAction,

    pub description: String,

    /// Who performed the change
    pub user: String,
}
