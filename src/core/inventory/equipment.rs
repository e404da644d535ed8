//! Equipment mutations: create/update with history diffing, cascade delete,
//! and the combined equipment + license save

use super::{collaborator_label, record_history, InventoryStore};
use crate::core::data::AppData;
use crate::core::identity::{EquipmentId, LicenseId};
use crate::core::storage::{Storage, StorageError};
use crate::entities::{Equipment, HistoryAction};

impl<S: Storage> InventoryStore<S> {
    /// Register new equipment and write its CREATION history row.
    ///
    /// The `id` of `equipment` is ignored; a fresh one is assigned and returned.
    pub fn add_equipment(
        &mut self,
        equipment: Equipment,
        performed_by: &str,
    ) -> Result<EquipmentId, StorageError> {
        let id = self.commit(|data| insert_equipment(data, equipment, performed_by))?;
        tracing::info!(%id, "equipment created");
        Ok(id)
    }

    /// Replace the equipment with the same id, appending one history row per
    /// changed field among assignment, status and location.
    ///
    /// Returns `false` when no equipment has that id.
    pub fn update_equipment(
        &mut self,
        equipment: Equipment,
        performed_by: &str,
    ) -> Result<bool, StorageError> {
        let id = equipment.id;
        let updated = self
            .mutate(|data| replace_equipment(data, equipment, performed_by))?
            .is_some();
        if updated {
            tracing::info!(%id, "equipment updated");
        }
        Ok(updated)
    }

    /// Delete equipment with its maintenance records and history, and drop
    /// it from every license's equipment seats.
    pub fn delete_equipment(&mut self, id: EquipmentId) -> Result<bool, StorageError> {
        let deleted = self
            .mutate(|data| {
                let before = data.equipment.len();
                data.equipment.retain(|e| e.id != id);
                if data.equipment.len() == before {
                    return None;
                }
                data.maintenance.retain(|m| m.equipment_id != id);
                data.history.retain(|h| h.equipment_id != id);
                for license in &mut data.licenses {
                    license.assigned_to_equipment.retain(|eq| *eq != id);
                }
                Some(())
            })?
            .is_some();
        if deleted {
            tracing::info!(%id, "equipment deleted");
        }
        Ok(deleted)
    }

    /// Create or update equipment and set exactly which licenses hold a seat
    /// for it, as one state transition.
    ///
    /// When `is_editing` is true the equipment must already exist (otherwise
    /// nothing changes and `None` is returned). Every license whose id is in
    /// `license_ids` ends up with the equipment in `assigned_to_equipment`;
    /// every other license ends up without it.
    pub fn save_equipment_with_licenses(
        &mut self,
        equipment: Equipment,
        license_ids: &[LicenseId],
        is_editing: bool,
        performed_by: &str,
    ) -> Result<Option<EquipmentId>, StorageError> {
        let saved = self.mutate(|data| {
            let id = if is_editing {
                let id = equipment.id;
                replace_equipment(data, equipment, performed_by)?;
                id
            } else {
                insert_equipment(data, equipment, performed_by)
            };
            reconcile_license_seats(data, id, license_ids);
            Some(id)
        })?;
        if let Some(id) = saved {
            tracing::info!(%id, licenses = license_ids.len(), "equipment saved with licenses");
        }
        Ok(saved)
    }
}

fn insert_equipment(data: &mut AppData, mut equipment: Equipment, performed_by: &str) -> EquipmentId {
    let id = data.sequences.next(data.equipment.iter().map(|e| e.id));
    equipment.id = id;
    let description = format!(
        "Registered {} {} (S/N {})",
        equipment.equipment_type,
        equipment.display_name(),
        equipment.serial_number
    );
    data.equipment.push(equipment);
    record_history(data, id, HistoryAction::Creation, description, performed_by);
    id
}

fn replace_equipment(data: &mut AppData, equipment: Equipment, performed_by: &str) -> Option<()> {
    let previous = data.equipment(equipment.id)?.clone();
    record_equipment_diff(data, &previous, &equipment, performed_by);
    let slot = data.equipment_mut(equipment.id)?;
    *slot = equipment;
    Some(())
}

/// Append the history rows describing the change from `previous` to `next`
fn record_equipment_diff(
    data: &mut AppData,
    previous: &Equipment,
    next: &Equipment,
    performed_by: &str,
) {
    let id = previous.id;

    if previous.assigned_to != next.assigned_to {
        match next.assigned_to {
            Some(collaborator) => {
                let description = format!("Assigned to {}", collaborator_label(data, collaborator));
                record_history(data, id, HistoryAction::Assignment, description, performed_by);
            }
            None => {
                let description = match previous.assigned_to {
                    Some(old) => format!("Unassigned from {}", collaborator_label(data, old)),
                    None => "Unassigned".to_string(),
                };
                record_history(data, id, HistoryAction::Unassignment, description, performed_by);
            }
        }
    }

    if previous.status != next.status {
        let description = format!("Status changed from {} to {}", previous.status, next.status);
        record_history(data, id, HistoryAction::StatusChange, description, performed_by);
    }

    if previous.location != next.location {
        let description = format!(
            "Location changed from '{}' to '{}'",
            previous.location, next.location
        );
        record_history(data, id, HistoryAction::Update, description, performed_by);
    }
}

fn reconcile_license_seats(data: &mut AppData, id: EquipmentId, license_ids: &[LicenseId]) {
    for license in &mut data.licenses {
        let selected = license_ids.contains(&license.id);
        let holds_seat = license.assigned_to_equipment.contains(&id);
        if selected && !holds_seat {
            license.assigned_to_equipment.push(id);
        } else if !selected && holds_seat {
            license.assigned_to_equipment.retain(|eq| *eq != id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use crate::core::identity::EquipmentId;
    use crate::entities::{
        Equipment, EquipmentStatus, HistoryAction, MaintenanceRecord, Severity,
    };
    use chrono::NaiveDate;

    #[test]
    fn test_add_equipment_writes_single_creation_row() {
        let mut store = store();
        let mut eq = Equipment::new("acme", "Laptop", "Dell", "XPS 13", "ABC123");
        let collab = add_collaborator(&mut store, "Ana", "Ruiz");
        eq.assigned_to = Some(collab);

        let id = store.add_equipment(eq, ACTOR).unwrap();

        let history = history_for(&store, id);
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].action_type, HistoryAction::Creation);
        assert_eq!(history[0].user, ACTOR);
        assert!(history[0].description.contains("ABC123"));
    }

    #[test]
    fn test_ids_are_sequential_per_collection() {
        let mut store = store();
        let a = add_equipment(&mut store, "A");
        let b = add_equipment(&mut store, "B");
        assert_eq!(a, EquipmentId(1));
        assert_eq!(b, EquipmentId(2));
    }

    #[test]
    fn test_update_without_changes_writes_no_history() {
        let mut store = store();
        let id = add_equipment(&mut store, "A");
        let eq = store.data().equipment(id).unwrap().clone();

        assert!(store.update_equipment(eq, ACTOR).unwrap());
        assert_eq!(history_for(&store, id).len(), 1);
    }

    #[test]
    fn test_update_writes_one_row_per_changed_field() {
        let mut store = store();
        let collab = add_collaborator(&mut store, "Luis", "Paz");
        let id = add_equipment(&mut store, "A");

        let mut eq = store.data().equipment(id).unwrap().clone();
        eq.assigned_to = Some(collab);
        eq.status = EquipmentStatus::Lost;
        eq.location = "Warehouse".to_string();
        assert!(store.update_equipment(eq, ACTOR).unwrap());

        let actions: Vec<HistoryAction> =
            history_for(&store, id).iter().map(|h| h.action_type).collect();
        assert_eq!(
            actions,
            vec![
                HistoryAction::Creation,
                HistoryAction::Assignment,
                HistoryAction::StatusChange,
                HistoryAction::Update,
            ]
        );
        let history = history_for(&store, id);
        assert!(history[1].description.contains("Luis Paz"));
        assert!(history[2].description.contains("Active"));
        assert!(history[2].description.contains("Lost"));
    }

    #[test]
    fn test_clearing_assignment_writes_unassignment() {
        let mut store = store();
        let collab = add_collaborator(&mut store, "Ana", "Ruiz");
        let id = add_equipment(&mut store, "A");

        let mut eq = store.data().equipment(id).unwrap().clone();
        eq.assigned_to = Some(collab);
        store.update_equipment(eq.clone(), ACTOR).unwrap();
        eq.assigned_to = None;
        store.update_equipment(eq, ACTOR).unwrap();

        let last = history_for(&store, id).pop().unwrap();
        assert_eq!(last.action_type, HistoryAction::Unassignment);
        assert!(last.description.contains("Ana Ruiz"));
    }

    #[test]
    fn test_update_unknown_equipment_is_noop() {
        let mut store = store();
        let mut eq = Equipment::new("acme", "Laptop", "Dell", "XPS", "Z");
        eq.id = EquipmentId(42);
        assert!(!store.update_equipment(eq, ACTOR).unwrap());
        assert!(store.data().equipment.is_empty());
    }

    #[test]
    fn test_delete_equipment_cascades() {
        let mut store = store();
        let keep = add_equipment(&mut store, "KEEP");
        let gone = add_equipment(&mut store, "GONE");
        let license = add_license(&mut store, "Office", 5);
        let mut lic = store.data().license(license).unwrap().clone();
        lic.assigned_to_equipment = vec![keep, gone];
        store.update_license(lic).unwrap();

        let date = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        store
            .add_maintenance_record(
                MaintenanceRecord::new("acme", gone, date, "Screen", Severity::Moderate),
                ACTOR,
            )
            .unwrap();

        assert!(store.delete_equipment(gone).unwrap());

        let data = store.data();
        assert!(data.equipment(gone).is_none());
        assert!(data.maintenance.iter().all(|m| m.equipment_id != gone));
        assert!(data.history.iter().all(|h| h.equipment_id != gone));
        assert_eq!(data.license(license).unwrap().assigned_to_equipment, vec![keep]);
        assert_eq!(history_for(&store, keep).len(), 1);
    }

    #[test]
    fn test_save_with_licenses_creates_and_attaches() {
        let mut store = store();
        let l1 = add_license(&mut store, "Office", 5);
        let l2 = add_license(&mut store, "Antivirus", 5);

        let eq = Equipment::new("acme", "Laptop", "Lenovo", "T14", "T-1");
        let id = store
            .save_equipment_with_licenses(eq, &[l1], false, ACTOR)
            .unwrap()
            .unwrap();

        let data = store.data();
        assert!(data.equipment(id).is_some());
        assert_eq!(data.license(l1).unwrap().assigned_to_equipment, vec![id]);
        assert!(data.license(l2).unwrap().assigned_to_equipment.is_empty());
        assert_eq!(history_for(&store, id).len(), 1);
    }

    #[test]
    fn test_save_with_licenses_reconciles_selection() {
        let mut store = store();
        let l1 = add_license(&mut store, "Office", 5);
        let l2 = add_license(&mut store, "Antivirus", 5);
        let l3 = add_license(&mut store, "CAD", 5);
        let id = store
            .save_equipment_with_licenses(
                Equipment::new("acme", "Laptop", "Lenovo", "T14", "T-1"),
                &[l1, l2],
                false,
                ACTOR,
            )
            .unwrap()
            .unwrap();

        let mut eq = store.data().equipment(id).unwrap().clone();
        eq.status = EquipmentStatus::Maintenance;
        let saved = store
            .save_equipment_with_licenses(eq, &[l2, l3], true, ACTOR)
            .unwrap();
        assert_eq!(saved, Some(id));

        let data = store.data();
        assert!(data.license(l1).unwrap().assigned_to_equipment.is_empty());
        assert_eq!(data.license(l2).unwrap().assigned_to_equipment, vec![id]);
        assert_eq!(data.license(l3).unwrap().assigned_to_equipment, vec![id]);
        assert_eq!(data.equipment(id).unwrap().status, EquipmentStatus::Maintenance);

        let last = history_for(&store, id).pop().unwrap();
        assert_eq!(last.action_type, HistoryAction::StatusChange);
    }

    #[test]
    fn test_save_with_licenses_editing_missing_equipment_changes_nothing() {
        let mut store = store();
        let l1 = add_license(&mut store, "Office", 5);
        let before = store.snapshot();

        let mut eq = Equipment::new("acme", "Laptop", "Lenovo", "T14", "T-1");
        eq.id = EquipmentId(7);
        let saved = store
            .save_equipment_with_licenses(eq, &[l1], true, ACTOR)
            .unwrap();

        assert!(saved.is_none());
        assert_eq!(store.data(), &before);
    }
}
