//! The `AppData` aggregate: every entity collection, persisted as one document

use serde::{Deserialize, Serialize};

use crate::core::identity::{
    CollaboratorId, CredentialId, EquipmentId, IdSequences, LicenseId, MaintenanceId, UserId,
};
use crate::entities::{
    Collaborator, Credential, Equipment, HistoryEntry, MaintenanceRecord, SoftwareLicense, User,
};

/// Aggregate root holding all collections.
///
/// Collections missing from an older document default to empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppData {
    #[serde(default)]
    pub equipment: Vec<Equipment>,

    #[serde(default)]
    pub collaborators: Vec<Collaborator>,

    #[serde(default)]
    pub licenses: Vec<SoftwareLicense>,

    #[serde(default)]
    pub maintenance: Vec<MaintenanceRecord>,

    #[serde(default)]
    pub credentials: Vec<Credential>,

    #[serde(default)]
    pub users: Vec<User>,

    #[serde(default)]
    pub history: Vec<HistoryEntry>,

    #[serde(default)]
    pub sequences: IdSequences,
}

impl AppData {
    pub fn equipment(&self, id: EquipmentId) -> Option<&Equipment> {
        self.equipment.iter().find(|e| e.id == id)
    }

    pub fn equipment_mut(&mut self, id: EquipmentId) -> Option<&mut Equipment> {
        self.equipment.iter_mut().find(|e| e.id == id)
    }

    pub fn collaborator(&self, id: CollaboratorId) -> Option<&Collaborator> {
        self.collaborators.iter().find(|c| c.id == id)
    }

    pub fn collaborator_mut(&mut self, id: CollaboratorId) -> Option<&mut Collaborator> {
        self.collaborators.iter_mut().find(|c| c.id == id)
    }

    pub fn license(&self, id: LicenseId) -> Option<&SoftwareLicense> {
        self.licenses.iter().find(|l| l.id == id)
    }

    pub fn license_mut(&mut self, id: LicenseId) -> Option<&mut SoftwareLicense> {
        self.licenses.iter_mut().find(|l| l.id == id)
    }

    pub fn maintenance_record(&self, id: MaintenanceId) -> Option<&MaintenanceRecord> {
        self.maintenance.iter().find(|m| m.id == id)
    }

    pub fn maintenance_record_mut(&mut self, id: MaintenanceId) -> Option<&mut MaintenanceRecord> {
        self.maintenance.iter_mut().find(|m| m.id == id)
    }

    pub fn credential(&self, id: CredentialId) -> Option<&Credential> {
        self.credentials.iter().find(|c| c.id == id)
    }

    pub fn user(&self, id: UserId) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    /// Case-insensitive username lookup
    pub fn user_by_username(&self, username: &str) -> Option<&User> {
        self.users
            .iter()
            .find(|u| u.username.eq_ignore_ascii_case(username.trim()))
    }

    /// Total number of records across all collections
    pub fn record_count(&self) -> usize {
        self.equipment.len()
            + self.collaborators.len()
            + self.licenses.len()
            + self.maintenance.len()
            + self.credentials.len()
            + self.users.len()
            + self.history.len()
    }
}
