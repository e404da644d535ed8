//! Read-only reports: CSV workbooks and handover documents

use std::io::Write;

use chrono::NaiveDate;
use serde::Serialize;
use tera::Tera;
use thiserror::Error;

use crate::core::data::AppData;
use crate::core::identity::{CollaboratorId, EntityKind, EquipmentId, LicenseId};
use crate::core::queries;
use crate::entities::Collaborator;

const HANDOVER_TEMPLATE: &str = include_str!("templates/handover.md.tera");
const HANDOVER_NAME: &str = "handover.md";

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("{kind} #{id} does not exist")]
    NotFound { kind: EntityKind, id: u32 },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{kind} #{id} belongs to company '{found}', not '{expected}'")]
    CrossCompany {
        kind: EntityKind,
        id: u32,
        expected: String,
        found: String,
    },

    #[error("could not render handover document")]
    Render(#[from] tera::Error),
}

/// What a handover document is about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandoverSubject {
    /// One piece of equipment handed to one collaborator
    Equipment {
        equipment: EquipmentId,
        collaborator: CollaboratorId,
    },
    /// One license and everybody holding a seat
    License(LicenseId),
}

const EQUIPMENT_HEADERS: [&str; 14] = [
    "ID",
    "Type",
    "Brand",
    "Model",
    "Serial Number",
    "Status",
    "Site",
    "Location",
    "Assigned To",
    "Purchase Date",
    "Processor",
    "RAM",
    "Storage",
    "OS",
];

/// Equipment inventory of `company_id` as CSV, one row per asset
pub fn write_equipment_csv<W: Write>(
    data: &AppData,
    company_id: &str,
    writer: W,
) -> Result<usize, ReportError> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(EQUIPMENT_HEADERS)?;

    let rows = queries::equipment_for_company(data, company_id, &Default::default());
    for e in &rows {
        csv.write_record([
            e.id.to_string(),
            e.equipment_type.clone(),
            e.brand.clone(),
            e.model.clone(),
            e.serial_number.clone(),
            e.status.to_string(),
            e.site_id.clone(),
            e.location.clone(),
            queries::collaborator_name(data, e.assigned_to),
            e.purchase_date.map(|d| d.to_string()).unwrap_or_default(),
            e.processor.clone().unwrap_or_default(),
            e.ram.clone().unwrap_or_default(),
            e.storage.clone().unwrap_or_default(),
            e.os.clone().unwrap_or_default(),
        ])?;
    }
    csv.flush()?;
    Ok(rows.len())
}

/// Maintenance tickets of `company_id` dated within `from..=to`, oldest first
pub fn write_maintenance_csv<W: Write>(
    data: &AppData,
    company_id: &str,
    from: NaiveDate,
    to: NaiveDate,
    writer: W,
) -> Result<usize, ReportError> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record([
        "ID",
        "Date",
        "Equipment",
        "Serial Number",
        "Title",
        "Severity",
        "Status",
        "Resolution Date",
        "Resolution",
        "Delivery",
    ])?;

    let mut records: Vec<_> = data
        .maintenance
        .iter()
        .filter(|m| m.company_id == company_id && m.date >= from && m.date <= to)
        .collect();
    records.sort_by_key(|m| (m.date, m.id));

    for m in &records {
        let equipment = data.equipment(m.equipment_id);
        csv.write_record([
            m.id.to_string(),
            m.date.to_string(),
            equipment
                .map(|e| e.display_name())
                .unwrap_or_else(|| format!("#{}", m.equipment_id)),
            equipment.map(|e| e.serial_number.clone()).unwrap_or_default(),
            m.title.clone(),
            m.severity.to_string(),
            m.status.to_string(),
            m.resolution_date.map(|d| d.to_string()).unwrap_or_default(),
            m.resolution_details.clone().unwrap_or_default(),
            m.delivery_status.map(|d| d.to_string()).unwrap_or_default(),
        ])?;
    }
    csv.flush()?;
    Ok(records.len())
}

#[derive(Serialize)]
struct Recipient {
    name: String,
    email: String,
    cargo: String,
}

impl From<&Collaborator> for Recipient {
    fn from(c: &Collaborator) -> Self {
        Self {
            name: c.full_name(),
            email: c.email.clone(),
            cargo: c.cargo.clone(),
        }
    }
}

#[derive(Serialize)]
struct EquipmentSection {
    equipment_type: String,
    brand: String,
    model: String,
    serial_number: String,
    status: String,
    specs: String,
    licenses: Vec<String>,
}

#[derive(Serialize)]
struct LicenseSection {
    name: String,
    vendor: String,
    license_type: String,
    used: usize,
    total: u32,
    expiration: Option<String>,
    equipment: Vec<String>,
}

/// Render a handover document as Markdown
pub fn render_handover(
    data: &AppData,
    subject: HandoverSubject,
    date: NaiveDate,
    issued_by: &str,
) -> Result<String, ReportError> {
    let mut context = tera::Context::new();
    context.insert("date", &date.format("%Y-%m-%d").to_string());
    context.insert("issued_by", issued_by);

    match subject {
        HandoverSubject::Equipment {
            equipment,
            collaborator,
        } => {
            let eq = data.equipment(equipment).ok_or(ReportError::NotFound {
                kind: EntityKind::Equipment,
                id: equipment.0,
            })?;
            let person = data.collaborator(collaborator).ok_or(ReportError::NotFound {
                kind: EntityKind::Collaborator,
                id: collaborator.0,
            })?;
            if person.company_id != eq.company_id {
                return Err(ReportError::CrossCompany {
                    kind: EntityKind::Collaborator,
                    id: collaborator.0,
                    expected: eq.company_id.clone(),
                    found: person.company_id.clone(),
                });
            }
            let section = EquipmentSection {
                equipment_type: eq.equipment_type.clone(),
                brand: eq.brand.clone(),
                model: eq.model.clone(),
                serial_number: eq.serial_number.clone(),
                status: eq.status.to_string(),
                specs: eq.specs().summary(),
                licenses: queries::licenses_for_equipment(data, equipment)
                    .iter()
                    .map(|l| l.name.clone())
                    .collect(),
            };
            context.insert("title", "Equipment handover");
            context.insert("company", &eq.company_id);
            context.insert("equipment", &section);
            context.insert("license", &Option::<LicenseSection>::None);
            context.insert("recipients", &vec![Recipient::from(person)]);
        }
        HandoverSubject::License(id) => {
            let license = data.license(id).ok_or(ReportError::NotFound {
                kind: EntityKind::License,
                id: id.0,
            })?;
            let recipients: Vec<Recipient> = license
                .assigned_to
                .iter()
                .filter_map(|c| data.collaborator(*c))
                .map(Recipient::from)
                .collect();
            let section = LicenseSection {
                name: license.name.clone(),
                vendor: license.vendor.clone(),
                license_type: license.license_type.clone(),
                used: license.used_slots(),
                total: license.total_slots,
                expiration: license.expiration_date.map(|d| d.to_string()),
                equipment: license
                    .assigned_to_equipment
                    .iter()
                    .filter_map(|e| data.equipment(*e))
                    .map(|e| format!("{} (S/N {})", e.display_name(), e.serial_number))
                    .collect(),
            };
            context.insert("title", "Software license assignment");
            context.insert("company", &license.company_id);
            context.insert("equipment", &Option::<EquipmentSection>::None);
            context.insert("license", &section);
            context.insert("recipients", &recipients);
        }
    }

    let mut tera = Tera::default();
    tera.add_raw_template(HANDOVER_NAME, HANDOVER_TEMPLATE)?;
    Ok(tera.render(HANDOVER_NAME, &context)?)
}
