//! Input checks run before calling the inventory store
//!
//! The store accepts anything well-typed; these functions are where
//! duplicate serial numbers, duplicate usernames, missing fields and
//! cross-company references are caught.

use miette::Diagnostic;
use thiserror::Error;

use crate::core::data::AppData;
use crate::core::identity::{CollaboratorId, EntityKind, EquipmentId, UserId};
use crate::entities::{
    Collaborator, Credential, Equipment, MaintenanceRecord, SoftwareLicense, User,
};

#[derive(Debug, Error, Diagnostic)]
pub enum ValidationError {
    #[error("{entity} {field} is required")]
    #[diagnostic(code(itam::validation::missing_field))]
    MissingField {
        entity: &'static str,
        field: &'static str,
    },

    #[error("serial number '{serial}' is already registered (equipment #{existing})")]
    #[diagnostic(
        code(itam::validation::duplicate_serial),
        help("serial numbers are unique across every company")
    )]
    DuplicateSerial { serial: String, existing: EquipmentId },

    #[error("username '{username}' is already taken (user #{existing})")]
    #[diagnostic(code(itam::validation::duplicate_username))]
    DuplicateUsername { username: String, existing: UserId },

    #[error("PIN must be exactly 4 digits")]
    #[diagnostic(code(itam::validation::pin_format))]
    InvalidPin,

    #[error("{kind} #{id} does not exist")]
    #[diagnostic(code(itam::validation::unknown_reference))]
    UnknownReference { kind: EntityKind, id: u32 },

    #[error("{kind} #{id} belongs to company '{found}', not '{expected}'")]
    #[diagnostic(
        code(itam::validation::cross_company),
        help("records can only reference records of the same company")
    )]
    CrossCompany {
        kind: EntityKind,
        id: u32,
        expected: String,
        found: String,
    },

    #[error("a credential can be assigned to a collaborator or to equipment, not both")]
    #[diagnostic(code(itam::validation::credential_target))]
    ConflictingCredentialTarget,
}

fn require(value: &str, entity: &'static str, field: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::MissingField { entity, field })
    } else {
        Ok(())
    }
}

fn check_collaborator_ref(
    data: &AppData,
    company_id: &str,
    id: CollaboratorId,
) -> Result<(), ValidationError> {
    let collaborator = data.collaborator(id).ok_or(ValidationError::UnknownReference {
        kind: EntityKind::Collaborator,
        id: id.0,
    })?;
    same_company(EntityKind::Collaborator, id.0, company_id, &collaborator.company_id)
}

fn check_equipment_ref(
    data: &AppData,
    company_id: &str,
    id: EquipmentId,
) -> Result<(), ValidationError> {
    let equipment = data.equipment(id).ok_or(ValidationError::UnknownReference {
        kind: EntityKind::Equipment,
        id: id.0,
    })?;
    same_company(EntityKind::Equipment, id.0, company_id, &equipment.company_id)
}

fn same_company(kind: EntityKind, id: u32, expected: &str, found: &str) -> Result<(), ValidationError> {
    if expected == found {
        Ok(())
    } else {
        Err(ValidationError::CrossCompany {
            kind,
            id,
            expected: expected.to_string(),
            found: found.to_string(),
        })
    }
}

/// Equipment using `serial` other than `except`, compared trimmed and ignoring case
pub fn find_serial<'a>(
    data: &'a AppData,
    serial: &str,
    except: Option<EquipmentId>,
) -> Option<&'a Equipment> {
    let wanted = serial.trim();
    data.equipment
        .iter()
        .filter(|e| Some(e.id) != except)
        .find(|e| e.serial_number.trim().eq_ignore_ascii_case(wanted))
}

/// Check equipment before create (`is_editing == false`) or update
pub fn validate_equipment(
    data: &AppData,
    equipment: &Equipment,
    is_editing: bool,
) -> Result<(), ValidationError> {
    require(&equipment.company_id, "equipment", "company")?;
    require(&equipment.equipment_type, "equipment", "type")?;
    require(&equipment.brand, "equipment", "brand")?;
    require(&equipment.model, "equipment", "model")?;
    require(&equipment.serial_number, "equipment", "serial number")?;

    let except = is_editing.then_some(equipment.id);
    if let Some(existing) = find_serial(data, &equipment.serial_number, except) {
        return Err(ValidationError::DuplicateSerial {
            serial: equipment.serial_number.trim().to_string(),
            existing: existing.id,
        });
    }

    if let Some(collaborator) = equipment.assigned_to {
        check_collaborator_ref(data, &equipment.company_id, collaborator)?;
    }
    Ok(())
}

pub fn validate_collaborator(collaborator: &Collaborator) -> Result<(), ValidationError> {
    require(&collaborator.company_id, "collaborator", "company")?;
    require(&collaborator.first_name, "collaborator", "first name")?;
    require(&collaborator.last_name, "collaborator", "last name")?;
    require(&collaborator.email, "collaborator", "email")
}

/// Check a license and every seat it lists. Slot capacity is not checked here;
/// see [`slot_warning`].
pub fn validate_license(data: &AppData, license: &SoftwareLicense) -> Result<(), ValidationError> {
    require(&license.company_id, "license", "company")?;
    require(&license.name, "license", "name")?;
    for collaborator in &license.assigned_to {
        check_collaborator_ref(data, &license.company_id, *collaborator)?;
    }
    for equipment in &license.assigned_to_equipment {
        check_equipment_ref(data, &license.company_id, *equipment)?;
    }
    Ok(())
}

pub fn validate_maintenance(data: &AppData, record: &MaintenanceRecord) -> Result<(), ValidationError> {
    require(&record.title, "maintenance ticket", "title")?;
    check_equipment_ref(data, &record.company_id, record.equipment_id)
}

pub fn validate_credential(data: &AppData, credential: &Credential) -> Result<(), ValidationError> {
    require(&credential.company_id, "credential", "company")?;
    require(&credential.service, "credential", "service")?;
    require(&credential.username, "credential", "username")?;
    if credential.assigned_to.is_some() && credential.assigned_to_equipment.is_some() {
        return Err(ValidationError::ConflictingCredentialTarget);
    }
    if let Some(collaborator) = credential.assigned_to {
        check_collaborator_ref(data, &credential.company_id, collaborator)?;
    }
    if let Some(equipment) = credential.assigned_to_equipment {
        check_equipment_ref(data, &credential.company_id, equipment)?;
    }
    Ok(())
}

/// Check a user before create (`is_editing == false`) or update
pub fn validate_user(data: &AppData, user: &User, is_editing: bool) -> Result<(), ValidationError> {
    require(&user.username, "user", "username")?;
    require(&user.name, "user", "name")?;
    if user.pin.len() != 4 || !user.pin.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidPin);
    }
    if let Some(existing) = data.user_by_username(&user.username) {
        if !is_editing || existing.id != user.id {
            return Err(ValidationError::DuplicateUsername {
                username: user.username.trim().to_string(),
                existing: existing.id,
            });
        }
    }
    if let Some(collaborator) = user.collaborator_id {
        if data.collaborator(collaborator).is_none() {
            return Err(ValidationError::UnknownReference {
                kind: EntityKind::Collaborator,
                id: collaborator.0,
            });
        }
    }
    Ok(())
}

/// Non-blocking warning when a license has more seats assigned than it owns
pub fn slot_warning(license: &SoftwareLicense) -> Option<String> {
    license.is_over_assigned().then(|| {
        format!(
            "license '{}' uses {} of {} slots",
            license.name,
            license.used_slots(),
            license.total_slots
        )
    })
}
