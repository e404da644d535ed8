//! Maintenance record entity - repair tickets raised against equipment

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::identity::{EquipmentId, MaintenanceId};

/// How badly the equipment is affected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Severity {
    #[default]
    Moderate,
    Severe,
    /// Unrecoverable; the equipment is retired when the ticket is opened
    TotalLoss,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Moderate => write!(f, "Moderate"),
            Severity::Severe => write!(f, "Severe"),
            Severity::TotalLoss => write!(f, "TotalLoss"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', '_', ' '], "").as_str() {
            "moderate" => Ok(Severity::Moderate),
            "severe" => Ok(Severity::Severe),
            "totalloss" => Ok(Severity::TotalLoss),
            _ => Err(format!(
                "Invalid severity: {}. Use moderate, severe, or total-loss",
                s
            )),
        }
    }
}

/// Ticket state. Open -> Closed only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TicketStatus {
    #[default]
    Open,
    Closed,
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TicketStatus::Open => write!(f, "Open"),
            TicketStatus::Closed => write!(f, "Closed"),
        }
    }
}

/// Whether repaired equipment went back to its holder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeliveryStatus {
    Pending,
    Delivered,
}

impl DeliveryStatus {
    pub fn toggled(self) -> Self {
        match self {
            DeliveryStatus::Pending => DeliveryStatus::Delivered,
            DeliveryStatus::Delivered => DeliveryStatus::Pending,
        }
    }
}

impl std::fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeliveryStatus::Pending => write!(f, "Pending"),
            DeliveryStatus::Delivered => write!(f, "Delivered"),
        }
    }
}

/// A maintenance ticket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceRecord {
    pub id: MaintenanceId,

    pub company_id: String,

    pub equipment_id: EquipmentId,

    /// Date the issue was reported
    pub date: NaiveDate,

    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub severity: Severity,

    #[serde(default)]
    pub status: TicketStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution_details: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution_date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_status: Option<DeliveryStatus>,

    /// File names or references attached to the ticket
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<String>,
}

impl MaintenanceRecord {
    /// Open a ticket; the store assigns the id
    pub fn new(
        company_id: impl Into<String>,
        equipment_id: EquipmentId,
        date: NaiveDate,
        title: impl Into<String>,
        severity: Severity,
    ) -> Self {
        Self {
            id: MaintenanceId(0),
            company_id: company_id.into(),
            equipment_id,
            date,
            title: title.into(),
            description: String::new(),
            severity,
            status: TicketStatus::Open,
            resolution_details: None,
            resolution_date: None,
            delivery_status: None,
            attachments: Vec::new(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.status == TicketStatus::Open
    }
}
