//! Read-side filtering and joins over [`AppData`]

use crate::core::data::AppData;
use crate::core::identity::{CollaboratorId, EquipmentId};
use crate::entities::{
    Credential, Equipment, EquipmentStatus, HistoryEntry, MaintenanceRecord, SoftwareLicense,
};

/// Filters for [`equipment_for_company`]
#[derive(Debug, Clone, Default)]
pub struct EquipmentFilter {
    pub status: Option<EquipmentStatus>,
    pub site_id: Option<String>,
    /// Case-insensitive match against brand, model, serial number and type
    pub search: Option<String>,
}

impl EquipmentFilter {
    fn matches(&self, equipment: &Equipment) -> bool {
        if self.status.is_some_and(|s| s != equipment.status) {
            return false;
        }
        if let Some(site) = &self.site_id {
            if &equipment.site_id != site {
                return false;
            }
        }
        match &self.search {
            Some(term) if !term.trim().is_empty() => {
                let term = term.trim().to_lowercase();
                [
                    &equipment.brand,
                    &equipment.model,
                    &equipment.serial_number,
                    &equipment.equipment_type,
                ]
                .iter()
                .any(|field| field.to_lowercase().contains(&term))
            }
            _ => true,
        }
    }
}

pub fn equipment_for_company<'a>(
    data: &'a AppData,
    company_id: &str,
    filter: &EquipmentFilter,
) -> Vec<&'a Equipment> {
    data.equipment
        .iter()
        .filter(|e| e.company_id == company_id && filter.matches(e))
        .collect()
}

pub fn equipment_for_collaborator(data: &AppData, collaborator: CollaboratorId) -> Vec<&Equipment> {
    data.equipment
        .iter()
        .filter(|e| e.assigned_to == Some(collaborator))
        .collect()
}

pub fn licenses_for_equipment(data: &AppData, equipment: EquipmentId) -> Vec<&SoftwareLicense> {
    data.licenses
        .iter()
        .filter(|l| l.assigned_to_equipment.contains(&equipment))
        .collect()
}

pub fn licenses_for_collaborator(
    data: &AppData,
    collaborator: CollaboratorId,
) -> Vec<&SoftwareLicense> {
    data.licenses
        .iter()
        .filter(|l| l.assigned_to.contains(&collaborator))
        .collect()
}

/// Tickets of one equipment, newest first
pub fn maintenance_for_equipment(data: &AppData, equipment: EquipmentId) -> Vec<&MaintenanceRecord> {
    let mut records: Vec<_> = data
        .maintenance
        .iter()
        .filter(|m| m.equipment_id == equipment)
        .collect();
    records.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
    records
}

/// Audit trail of one equipment, newest first
pub fn history_for_equipment(data: &AppData, equipment: EquipmentId) -> Vec<&HistoryEntry> {
    let mut rows: Vec<_> = data
        .history
        .iter()
        .filter(|h| h.equipment_id == equipment)
        .collect();
    rows.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
    rows
}

/// Full name of the collaborator, or a dash for unassigned or dangling references
pub fn collaborator_name(data: &AppData, id: Option<CollaboratorId>) -> String {
    id.and_then(|id| data.collaborator(id))
        .map(|c| c.full_name())
        .unwrap_or_else(|| "-".to_string())
}

pub fn credentials_for_company<'a>(data: &'a AppData, company_id: &str) -> Vec<&'a Credential> {
    data.credentials
        .iter()
        .filter(|c| c.company_id == company_id)
        .collect()
}

/// Distinct company ids appearing anywhere in the data, sorted
pub fn companies(data: &AppData) -> Vec<String> {
    let mut ids: Vec<String> = data
        .equipment
        .iter()
        .map(|e| e.company_id.clone())
        .chain(data.collaborators.iter().map(|c| c.company_id.clone()))
        .chain(data.licenses.iter().map(|l| l.company_id.clone()))
        .collect();
    ids.sort();
    ids.dedup();
    ids
}
