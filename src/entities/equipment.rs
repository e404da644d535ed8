//! Equipment entity - a tracked hardware asset

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::identity::{CollaboratorId, EquipmentId};

/// Lifecycle status of a piece of equipment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum EquipmentStatus {
    #[default]
    Active,
    Maintenance,
    Retired,
    Lost,
}

impl std::fmt::Display for EquipmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EquipmentStatus::Active => write!(f, "Active"),
            EquipmentStatus::Maintenance => write!(f, "Maintenance"),
            EquipmentStatus::Retired => write!(f, "Retired"),
            EquipmentStatus::Lost => write!(f, "Lost"),
        }
    }
}

impl std::str::FromStr for EquipmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(EquipmentStatus::Active),
            "maintenance" => Ok(EquipmentStatus::Maintenance),
            "retired" => Ok(EquipmentStatus::Retired),
            "lost" => Ok(EquipmentStatus::Lost),
            _ => Err(format!(
                "Invalid equipment status: {}. Use active, maintenance, retired, or lost",
                s
            )),
        }
    }
}

/// Hardware specification fields that a repair may change
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentSpecs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processor: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ram: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os: Option<String>,
}

impl EquipmentSpecs {
    pub fn is_empty(&self) -> bool {
        self.processor.is_none() && self.ram.is_none() && self.storage.is_none() && self.os.is_none()
    }

    /// Human readable list of the fields that are set, e.g. "RAM: 16GB, OS: Linux"
    pub fn summary(&self) -> String {
        let parts: Vec<String> = [
            ("Processor", &self.processor),
            ("RAM", &self.ram),
            ("Storage", &self.storage),
            ("OS", &self.os),
        ]
        .iter()
        .filter_map(|(label, value)| value.as_ref().map(|v| format!("{}: {}", label, v)))
        .collect();
        parts.join(", ")
    }
}

/// A piece of equipment owned by a company
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Equipment {
    pub id: EquipmentId,

    pub company_id: String,

    #[serde(default)]
    pub site_id: String,

    /// Equipment type, e.g. "Laptop", "Monitor", "Peripheral"
    #[serde(rename = "type")]
    pub equipment_type: String,

    pub brand: String,

    pub model: String,

    /// Unique across every company
    pub serial_number: String,

    #[serde(default)]
    pub status: EquipmentStatus,

    #[serde(default)]
    pub location: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<CollaboratorId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processor: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ram: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peripheral_type: Option<String>,
}

impl Equipment {
    /// Create an unassigned, active piece of equipment.
    ///
    /// The id is a placeholder until the inventory store assigns one.
    pub fn new(
        company_id: impl Into<String>,
        equipment_type: impl Into<String>,
        brand: impl Into<String>,
        model: impl Into<String>,
        serial_number: impl Into<String>,
    ) -> Self {
        Self {
            id: EquipmentId(0),
            company_id: company_id.into(),
            site_id: String::new(),
            equipment_type: equipment_type.into(),
            brand: brand.into(),
            model: model.into(),
            serial_number: serial_number.into(),
            status: EquipmentStatus::Active,
            location: String::new(),
            assigned_to: None,
            purchase_date: None,
            processor: None,
            ram: None,
            storage: None,
            os: None,
            peripheral_type: None,
        }
    }

    /// "Brand Model" label used in listings and history text
    pub fn display_name(&self) -> String {
        format!("{} {}", self.brand, self.model).trim().to_string()
    }

    /// Current hardware specs
    pub fn specs(&self) -> EquipmentSpecs {
        EquipmentSpecs {
            processor: self.processor.clone(),
            ram: self.ram.clone(),
            storage: self.storage.clone(),
            os: self.os.clone(),
        }
    }

    /// Overwrite the spec fields that are set in `specs`, leaving the others
    pub fn merge_specs(&mut self, specs: &EquipmentSpecs) {
        if let Some(ref processor) = specs.processor {
            self.processor = Some(processor.clone());
        }
        if let Some(ref ram) = specs.ram {
            self.ram = Some(ram.clone());
        }
        if let Some(ref storage) = specs.storage {
            self.storage = Some(storage.clone());
        }
        if let Some(ref os) = specs.os {
            self.os = Some(os.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equipment_json_uses_camel_case() {
        let mut eq = Equipment::new("acme", "Laptop", "Dell", "Latitude 5440", "ABC123");
        eq.assigned_to = Some(CollaboratorId(4));

        let json = serde_json::to_value(&eq).unwrap();
        assert_eq!(json["companyId"], "acme");
        assert_eq!(json["serialNumber"], "ABC123");
        assert_eq!(json["type"], "Laptop");
        assert_eq!(json["assignedTo"], 4);
        assert_eq!(json["status"], "Active");
        assert!(json.get("processor").is_none());
    }

    #[test]
    fn test_equipment_missing_optional_fields_default() {
        let json = r#"{"id":3,"companyId":"acme","type":"Monitor","brand":"LG","model":"27UL","serialNumber":"S-1"}"#;
        let eq: Equipment = serde_json::from_str(json).unwrap();
        assert_eq!(eq.id, EquipmentId(3));
        assert_eq!(eq.status, EquipmentStatus::Active);
        assert_eq!(eq.site_id, "");
        assert!(eq.assigned_to.is_none());
    }

    #[test]
    fn test_merge_specs_only_overwrites_set_fields() {
        let mut eq = Equipment::new("acme", "Laptop", "Dell", "XPS", "X1");
        eq.ram = Some("8GB".to_string());
        eq.os = Some("Windows 10".to_string());

        eq.merge_specs(&EquipmentSpecs {
            ram: Some("16GB".to_string()),
            ..Default::default()
        });

        assert_eq!(eq.ram.as_deref(), Some("16GB"));
        assert_eq!(eq.os.as_deref(), Some("Windows 10"));
    }

    #[test]
    fn test_specs_summary() {
        let specs = EquipmentSpecs {
            ram: Some("16GB".to_string()),
            os: Some("Linux".to_string()),
            ..Default::default()
        };
        assert_eq!(specs.summary(), "RAM: 16GB, OS: Linux");
        assert!(EquipmentSpecs::default().is_empty());
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!("retired".parse::<EquipmentStatus>().unwrap(), EquipmentStatus::Retired);
        assert_eq!("LOST".parse::<EquipmentStatus>().unwrap(), EquipmentStatus::Lost);
        assert!("broken".parse::<EquipmentStatus>().is_err());
    }
}
