//! Software license entity with collaborator and equipment seats

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::identity::{CollaboratorId, EquipmentId, LicenseId};

/// A software license owned by a company.
///
/// `total_slots` is advisory: assignments beyond it are stored as given and
/// only flagged through [`SoftwareLicense::is_over_assigned`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoftwareLicense {
    pub id: LicenseId,

    pub company_id: String,

    pub name: String,

    #[serde(default)]
    pub vendor: String,

    /// License key (stored as entered)
    #[serde(default)]
    pub key: String,

    /// License type, e.g. "Subscription", "Perpetual", "OEM"
    #[serde(default, rename = "type")]
    pub license_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<NaiveDate>,

    #[serde(default)]
    pub total_slots: u32,

    #[serde(default)]
    pub assigned_to: Vec<CollaboratorId>,

    #[serde(default)]
    pub assigned_to_equipment: Vec<EquipmentId>,
}

impl SoftwareLicense {
    /// Create an unassigned license; the store assigns the id
    pub fn new(company_id: impl Into<String>, name: impl Into<String>, total_slots: u32) -> Self {
        Self {
            id: LicenseId(0),
            company_id: company_id.into(),
            name: name.into(),
            vendor: String::new(),
            key: String::new(),
            license_type: String::new(),
            start_date: None,
            expiration_date: None,
            total_slots,
            assigned_to: Vec::new(),
            assigned_to_equipment: Vec::new(),
        }
    }

    /// Seats in use by collaborators and equipment together
    pub fn used_slots(&self) -> usize {
        self.assigned_to.len() + self.assigned_to_equipment.len()
    }

    pub fn available_slots(&self) -> i64 {
        self.total_slots as i64 - self.used_slots() as i64
    }

    pub fn is_over_assigned(&self) -> bool {
        self.used_slots() > self.total_slots as usize
    }

    /// Whether the license has expired as of `today`
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.expiration_date.is_some_and(|d| d < today)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_accounting_counts_both_assignee_kinds() {
        let mut lic = SoftwareLicense::new("acme", "Office 365", 1);
        lic.assigned_to.push(CollaboratorId(1));
        lic.assigned_to_equipment.push(EquipmentId(1));

        assert_eq!(lic.used_slots(), 2);
        assert_eq!(lic.available_slots(), -1);
        assert!(lic.is_over_assigned());
    }

    #[test]
    fn test_missing_assignment_lists_default_to_empty() {
        let json = r#"{"id":2,"companyId":"acme","name":"AutoCAD","totalSlots":3}"#;
        let lic: SoftwareLicense = serde_json::from_str(json).unwrap();
        assert!(lic.assigned_to.is_empty());
        assert!(lic.assigned_to_equipment.is_empty());
        assert!(!lic.is_over_assigned());
    }

    #[test]
    fn test_is_expired() {
        let mut lic = SoftwareLicense::new("acme", "Antivirus", 10);
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        assert!(!lic.is_expired(today));

        lic.expiration_date = NaiveDate::from_ymd_opt(2024, 5, 31);
        assert!(lic.is_expired(today));
    }
}
