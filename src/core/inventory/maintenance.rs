//! Maintenance ticket mutations and their effect on equipment status

use chrono::NaiveDate;

use super::{record_history, InventoryStore};
use crate::core::identity::MaintenanceId;
use crate::core::storage::{Storage, StorageError};
use crate::entities::{
    DeliveryStatus, EquipmentSpecs, EquipmentStatus, HistoryAction, MaintenanceRecord, Severity,
    TicketStatus,
};

/// How a ticket was closed
#[derive(Debug, Clone, PartialEq)]
pub struct TicketResolution {
    pub details: String,
    pub date: NaiveDate,
    /// Hardware changes made during the repair, merged into the equipment
    pub specs: Option<EquipmentSpecs>,
    /// Whether the equipment was already handed back
    pub mark_as_delivered: bool,
}

impl<S: Storage> InventoryStore<S> {
    /// Open a maintenance ticket; the `id` field is ignored.
    ///
    /// A total loss retires and unassigns the equipment with a STATUS_CHANGE
    /// row; any other severity puts it in maintenance with a MAINTENANCE row.
    pub fn add_maintenance_record(
        &mut self,
        mut record: MaintenanceRecord,
        performed_by: &str,
    ) -> Result<MaintenanceId, StorageError> {
        let id = self.commit(|data| {
            let id = data.sequences.next(data.maintenance.iter().map(|m| m.id));
            record.id = id;
            record.status = TicketStatus::Open;
            let equipment_id = record.equipment_id;
            let severity = record.severity;
            let title = record.title.clone();
            data.maintenance.push(record);

            let Some(equipment) = data.equipment_mut(equipment_id) else {
                tracing::warn!(%id, %equipment_id, "maintenance ticket references unknown equipment");
                return id;
            };
            let previous = equipment.status;
            if severity == Severity::TotalLoss {
                equipment.status = EquipmentStatus::Retired;
                equipment.assigned_to = None;
                let description = format!(
                    "Status changed from {} to {} (total loss, ticket #{}: {})",
                    previous,
                    EquipmentStatus::Retired,
                    id,
                    title
                );
                record_history(data, equipment_id, HistoryAction::StatusChange, description, performed_by);
            } else {
                equipment.status = EquipmentStatus::Maintenance;
                let description = format!("Maintenance ticket #{} opened ({}): {}", id, severity, title);
                record_history(data, equipment_id, HistoryAction::Maintenance, description, performed_by);
            }
            id
        })?;
        tracing::info!(%id, "maintenance ticket opened");
        Ok(id)
    }

    /// Close an open ticket.
    ///
    /// Writes a MAINTENANCE "finalized" row, returns equipment that is in
    /// maintenance to active (STATUS_CHANGE row), and merges `specs` into the
    /// equipment (UPDATE row). Returns `false` if the ticket does not exist or
    /// is already closed; closed tickets are never reopened.
    pub fn resolve_ticket(
        &mut self,
        id: MaintenanceId,
        resolution: TicketResolution,
        performed_by: &str,
    ) -> Result<bool, StorageError> {
        let resolved = self
            .mutate(|data| {
                let record = data.maintenance_record_mut(id)?;
                if record.status == TicketStatus::Closed {
                    return None;
                }
                record.status = TicketStatus::Closed;
                record.resolution_details = Some(resolution.details.clone());
                record.resolution_date = Some(resolution.date);
                record.delivery_status = Some(if resolution.mark_as_delivered {
                    DeliveryStatus::Delivered
                } else {
                    DeliveryStatus::Pending
                });
                let equipment_id = record.equipment_id;

                let description = format!("Maintenance ticket #{} finalized: {}", id, resolution.details);
                record_history(data, equipment_id, HistoryAction::Maintenance, description, performed_by);

                let Some(equipment) = data.equipment_mut(equipment_id) else {
                    return Some(());
                };
                let back_in_service = equipment.status == EquipmentStatus::Maintenance;
                if back_in_service {
                    equipment.status = EquipmentStatus::Active;
                }
                let specs = resolution.specs.filter(|s| !s.is_empty());
                if let Some(ref specs) = specs {
                    equipment.merge_specs(specs);
                }

                if back_in_service {
                    let description = format!(
                        "Status changed from {} to {}",
                        EquipmentStatus::Maintenance,
                        EquipmentStatus::Active
                    );
                    record_history(data, equipment_id, HistoryAction::StatusChange, description, performed_by);
                }
                if let Some(specs) = specs {
                    let description = format!("Specs updated during repair: {}", specs.summary());
                    record_history(data, equipment_id, HistoryAction::Update, description, performed_by);
                }
                Some(())
            })?
            .is_some();
        if resolved {
            tracing::info!(%id, "maintenance ticket resolved");
        }
        Ok(resolved)
    }

    /// Flip the delivery status of a closed ticket.
    ///
    /// Open tickets are left alone and `None` is returned.
    pub fn toggle_maintenance_delivery(
        &mut self,
        id: MaintenanceId,
    ) -> Result<Option<DeliveryStatus>, StorageError> {
        self.mutate(|data| {
            let record = data.maintenance_record_mut(id)?;
            if record.status != TicketStatus::Closed {
                return None;
            }
            let next = record.delivery_status.unwrap_or(DeliveryStatus::Pending).toggled();
            record.delivery_status = Some(next);
            Some(next)
        })
    }

    /// Remove a ticket. The equipment's status and history are kept.
    pub fn delete_maintenance_record(&mut self, id: MaintenanceId) -> Result<bool, StorageError> {
        let deleted = self
            .mutate(|data| {
                let before = data.maintenance.len();
                data.maintenance.retain(|m| m.id != id);
                (data.maintenance.len() != before).then_some(())
            })?
            .is_some();
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::TicketResolution;
    use crate::core::identity::{EquipmentId, MaintenanceId};
    use crate::entities::{
        DeliveryStatus, EquipmentSpecs, EquipmentStatus, HistoryAction, MaintenanceRecord,
        Severity, TicketStatus,
    };
    use chrono::NaiveDate;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, day).unwrap()
    }

    fn open_ticket(
        store: &mut crate::core::inventory::InventoryStore<crate::core::storage::MemoryStorage>,
        equipment: EquipmentId,
        severity: Severity,
    ) -> MaintenanceId {
        store
            .add_maintenance_record(
                MaintenanceRecord::new("acme", equipment, date(1), "Keyboard failure", severity),
                ACTOR,
            )
            .unwrap()
    }

    fn resolution(specs: Option<EquipmentSpecs>, delivered: bool) -> TicketResolution {
        TicketResolution {
            details: "Replaced keyboard".to_string(),
            date: date(3),
            specs,
            mark_as_delivered: delivered,
        }
    }

    #[test]
    fn test_moderate_ticket_puts_equipment_in_maintenance() {
        let mut store = store();
        let eq = add_equipment(&mut store, "A");

        open_ticket(&mut store, eq, Severity::Moderate);

        assert_eq!(store.data().equipment(eq).unwrap().status, EquipmentStatus::Maintenance);
        let last = history_for(&store, eq).pop().unwrap();
        assert_eq!(last.action_type, HistoryAction::Maintenance);
    }

    #[test]
    fn test_total_loss_retires_and_unassigns() {
        let mut store = store();
        let collab = add_collaborator(&mut store, "Ana", "Ruiz");
        let eq = add_equipment(&mut store, "E1");
        let mut record = store.data().equipment(eq).unwrap().clone();
        record.assigned_to = Some(collab);
        store.update_equipment(record, ACTOR).unwrap();

        open_ticket(&mut store, eq, Severity::TotalLoss);

        let equipment = store.data().equipment(eq).unwrap();
        assert_eq!(equipment.status, EquipmentStatus::Retired);
        assert!(equipment.assigned_to.is_none());
        let last = history_for(&store, eq).pop().unwrap();
        assert_eq!(last.action_type, HistoryAction::StatusChange);
        assert!(last.description.contains("Retired"));
    }

    #[test]
    fn test_resolve_closes_and_restores_active() {
        let mut store = store();
        let eq = add_equipment(&mut store, "A");
        let ticket = open_ticket(&mut store, eq, Severity::Severe);
        let rows_before = history_for(&store, eq).len();

        assert!(store.resolve_ticket(ticket, resolution(None, false), ACTOR).unwrap());

        let record = store.data().maintenance_record(ticket).unwrap();
        assert_eq!(record.status, TicketStatus::Closed);
        assert_eq!(record.resolution_details.as_deref(), Some("Replaced keyboard"));
        assert_eq!(record.resolution_date, Some(date(3)));
        assert_eq!(record.delivery_status, Some(DeliveryStatus::Pending));
        assert_eq!(store.data().equipment(eq).unwrap().status, EquipmentStatus::Active);

        let new_rows: Vec<HistoryAction> = history_for(&store, eq)[rows_before..]
            .iter()
            .map(|h| h.action_type)
            .collect();
        assert_eq!(new_rows, vec![HistoryAction::Maintenance, HistoryAction::StatusChange]);
    }

    #[test]
    fn test_resolve_merges_specs_with_update_row() {
        let mut store = store();
        let eq = add_equipment(&mut store, "A");
        let ticket = open_ticket(&mut store, eq, Severity::Moderate);
        let rows_before = history_for(&store, eq).len();
        let specs = EquipmentSpecs {
            ram: Some("32GB".to_string()),
            ..Default::default()
        };

        store.resolve_ticket(ticket, resolution(Some(specs), true), ACTOR).unwrap();

        let equipment = store.data().equipment(eq).unwrap();
        assert_eq!(equipment.ram.as_deref(), Some("32GB"));
        assert_eq!(
            store.data().maintenance_record(ticket).unwrap().delivery_status,
            Some(DeliveryStatus::Delivered)
        );
        let new_rows: Vec<HistoryAction> = history_for(&store, eq)[rows_before..]
            .iter()
            .map(|h| h.action_type)
            .collect();
        assert_eq!(
            new_rows,
            vec![HistoryAction::Maintenance, HistoryAction::StatusChange, HistoryAction::Update]
        );
    }

    #[test]
    fn test_resolve_leaves_retired_equipment_retired() {
        let mut store = store();
        let eq = add_equipment(&mut store, "A");
        let ticket = open_ticket(&mut store, eq, Severity::TotalLoss);

        store.resolve_ticket(ticket, resolution(None, false), ACTOR).unwrap();

        assert_eq!(store.data().equipment(eq).unwrap().status, EquipmentStatus::Retired);
    }

    #[test]
    fn test_resolved_ticket_stays_closed() {
        let mut store = store();
        let eq = add_equipment(&mut store, "A");
        let ticket = open_ticket(&mut store, eq, Severity::Moderate);
        store.resolve_ticket(ticket, resolution(None, false), ACTOR).unwrap();
        let snapshot = store.snapshot();

        assert!(!store.resolve_ticket(ticket, resolution(None, true), ACTOR).unwrap());
        assert_eq!(store.data(), &snapshot);
        assert_eq!(
            store.data().maintenance_record(ticket).unwrap().status,
            TicketStatus::Closed
        );
    }

    #[test]
    fn test_toggle_delivery_only_when_closed() {
        let mut store = store();
        let eq = add_equipment(&mut store, "A");
        let ticket = open_ticket(&mut store, eq, Severity::Moderate);

        assert_eq!(store.toggle_maintenance_delivery(ticket).unwrap(), None);
        assert!(store.data().maintenance_record(ticket).unwrap().delivery_status.is_none());

        store.resolve_ticket(ticket, resolution(None, false), ACTOR).unwrap();
        assert_eq!(
            store.toggle_maintenance_delivery(ticket).unwrap(),
            Some(DeliveryStatus::Delivered)
        );
        assert_eq!(
            store.toggle_maintenance_delivery(ticket).unwrap(),
            Some(DeliveryStatus::Pending)
        );
    }

    #[test]
    fn test_delete_maintenance_record() {
        let mut store = store();
        let eq = add_equipment(&mut store, "A");
        let ticket = open_ticket(&mut store, eq, Severity::Moderate);

        assert!(store.delete_maintenance_record(ticket).unwrap());
        assert!(store.data().maintenance.is_empty());
        assert_eq!(store.data().equipment(eq).unwrap().status, EquipmentStatus::Maintenance);
        assert!(!store.delete_maintenance_record(ticket).unwrap());
    }
}
