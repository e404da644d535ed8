//! Collaborator mutations

use super::{record_history, InventoryStore};
use crate::core::identity::CollaboratorId;
use crate::core::storage::{Storage, StorageError};
use crate::entities::{Collaborator, HistoryAction, SYSTEM_ACTOR};

impl<S: Storage> InventoryStore<S> {
    /// Add a collaborator; the `id` field is ignored and a fresh one returned
    pub fn add_collaborator(
        &mut self,
        mut collaborator: Collaborator,
    ) -> Result<CollaboratorId, StorageError> {
        let id = self.commit(|data| {
            let id = data.sequences.next(data.collaborators.iter().map(|c| c.id));
            collaborator.id = id;
            data.collaborators.push(collaborator);
            id
        })?;
        tracing::info!(%id, "collaborator created");
        Ok(id)
    }

    /// Replace the collaborator with the same id. No cascade.
    pub fn update_collaborator(&mut self, collaborator: Collaborator) -> Result<bool, StorageError> {
        let updated = self
            .mutate(|data| {
                let slot = data.collaborator_mut(collaborator.id)?;
                *slot = collaborator;
                Some(())
            })?
            .is_some();
        Ok(updated)
    }

    /// Flip `is_active` and return the new value.
    ///
    /// Equipment stays assigned to an inactive collaborator.
    pub fn toggle_collaborator_status(
        &mut self,
        id: CollaboratorId,
    ) -> Result<Option<bool>, StorageError> {
        let status = self.mutate(|data| {
            let collaborator = data.collaborator_mut(id)?;
            collaborator.is_active = !collaborator.is_active;
            Some(collaborator.is_active)
        })?;
        if let Some(active) = status {
            tracing::info!(%id, active, "collaborator status toggled");
        }
        Ok(status)
    }

    /// Delete a collaborator.
    ///
    /// Every equipment assigned to them becomes unassigned with an
    /// UNASSIGNMENT row attributed to [`SYSTEM_ACTOR`], and they lose every
    /// license seat.
    pub fn delete_collaborator(&mut self, id: CollaboratorId) -> Result<bool, StorageError> {
        let released = self.mutate(|data| {
            let index = data.collaborators.iter().position(|c| c.id == id)?;
            let removed = data.collaborators.remove(index);
            let name = removed.full_name();

            let mut released = Vec::new();
            for equipment in data.equipment.iter_mut().filter(|e| e.assigned_to == Some(id)) {
                equipment.assigned_to = None;
                released.push(equipment.id);
            }
            for equipment_id in &released {
                let description = format!("Unassigned automatically: collaborator {} was deleted", name);
                record_history(
                    data,
                    *equipment_id,
                    HistoryAction::Unassignment,
                    description,
                    SYSTEM_ACTOR,
                );
            }

            for license in &mut data.licenses {
                license.assigned_to.retain(|c| *c != id);
            }
            Some(released.len())
        })?;

        match released {
            Some(count) => {
                tracing::info!(%id, released_equipment = count, "collaborator deleted");
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use crate::core::identity::CollaboratorId;
    use crate::entities::{HistoryAction, SYSTEM_ACTOR};

    #[test]
    fn test_toggle_status_flips_without_cascade() {
        let mut store = store();
        let collab = add_collaborator(&mut store, "Ana", "Ruiz");
        let eq_id = add_equipment(&mut store, "A");
        let mut eq = store.data().equipment(eq_id).unwrap().clone();
        eq.assigned_to = Some(collab);
        store.update_equipment(eq, ACTOR).unwrap();
        let history_before = store.data().history.len();

        assert_eq!(store.toggle_collaborator_status(collab).unwrap(), Some(false));
        assert!(!store.data().collaborator(collab).unwrap().is_active);
        assert_eq!(store.data().equipment(eq_id).unwrap().assigned_to, Some(collab));
        assert_eq!(store.data().history.len(), history_before);

        assert_eq!(store.toggle_collaborator_status(collab).unwrap(), Some(true));
        assert_eq!(store.toggle_collaborator_status(CollaboratorId(99)).unwrap(), None);
    }

    #[test]
    fn test_delete_collaborator_unassigns_each_equipment() {
        let mut store = store();
        let collab = add_collaborator(&mut store, "Ana", "Ruiz");
        let other = add_collaborator(&mut store, "Luis", "Paz");
        let mut assigned = Vec::new();
        for serial in ["A", "B", "C"] {
            let id = add_equipment(&mut store, serial);
            let mut eq = store.data().equipment(id).unwrap().clone();
            eq.assigned_to = Some(collab);
            store.update_equipment(eq, ACTOR).unwrap();
            assigned.push(id);
        }
        let untouched = add_equipment(&mut store, "D");
        let mut eq = store.data().equipment(untouched).unwrap().clone();
        eq.assigned_to = Some(other);
        store.update_equipment(eq, ACTOR).unwrap();

        let unassignments_before = store
            .data()
            .history
            .iter()
            .filter(|h| h.action_type == HistoryAction::Unassignment)
            .count();

        assert!(store.delete_collaborator(collab).unwrap());

        let data = store.data();
        assert!(data.collaborator(collab).is_none());
        for id in &assigned {
            assert!(data.equipment(*id).unwrap().assigned_to.is_none());
        }
        assert_eq!(data.equipment(untouched).unwrap().assigned_to, Some(other));

        let system_rows: Vec<_> = data
            .history
            .iter()
            .filter(|h| h.action_type == HistoryAction::Unassignment)
            .collect();
        assert_eq!(system_rows.len() - unassignments_before, assigned.len());
        assert!(system_rows.iter().all(|h| h.user == SYSTEM_ACTOR));
    }

    #[test]
    fn test_delete_collaborator_releases_license_seats() {
        let mut store = store();
        let collab = add_collaborator(&mut store, "Ana", "Ruiz");
        let other = add_collaborator(&mut store, "Luis", "Paz");
        let license = add_license(&mut store, "Office", 2);
        let mut lic = store.data().license(license).unwrap().clone();
        lic.assigned_to = vec![collab, other];
        store.update_license(lic).unwrap();

        store.delete_collaborator(collab).unwrap();

        assert_eq!(store.data().license(license).unwrap().assigned_to, vec![other]);
    }

    #[test]
    fn test_assign_then_delete_collaborator_scenario() {
        let mut store = store();
        let c1 = add_collaborator(&mut store, "Carla", "Uno");
        let e1 = add_equipment(&mut store, "ABC123");

        let mut eq = store.data().equipment(e1).unwrap().clone();
        eq.assigned_to = Some(c1);
        store.update_equipment(eq, ACTOR).unwrap();

        let after_assign = history_for(&store, e1);
        let assignments: Vec<_> = after_assign
            .iter()
            .filter(|h| h.action_type == HistoryAction::Assignment)
            .collect();
        assert_eq!(assignments.len(), 1);
        assert!(assignments[0].description.contains("Carla Uno"));

        store.delete_collaborator(c1).unwrap();

        assert!(store.data().equipment(e1).unwrap().assigned_to.is_none());
        let rows: Vec<_> = history_for(&store, e1)
            .into_iter()
            .filter(|h| h.action_type != HistoryAction::Creation)
            .collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].action_type, HistoryAction::Assignment);
        assert_eq!(rows[1].action_type, HistoryAction::Unassignment);
        assert_eq!(rows[1].user, SYSTEM_ACTOR);
    }

    #[test]
    fn test_delete_unknown_collaborator_is_noop() {
        let mut store = store();
        assert!(!store.delete_collaborator(CollaboratorId(5)).unwrap());
    }
}
