//! Software license mutations

use super::InventoryStore;
use crate::core::identity::LicenseId;
use crate::core::storage::{Storage, StorageError};
use crate::entities::SoftwareLicense;

impl<S: Storage> InventoryStore<S> {
    /// Add a license; the `id` field is ignored and a fresh one returned.
    ///
    /// Seat lists are stored as given, even past `total_slots`.
    pub fn add_license(&mut self, mut license: SoftwareLicense) -> Result<LicenseId, StorageError> {
        let id = self.commit(|data| {
            let id = data.sequences.next(data.licenses.iter().map(|l| l.id));
            license.id = id;
            data.licenses.push(license);
            id
        })?;
        tracing::info!(%id, "license created");
        Ok(id)
    }

    /// Replace the license with the same id
    pub fn update_license(&mut self, license: SoftwareLicense) -> Result<bool, StorageError> {
        let over_assigned = license.is_over_assigned();
        let id = license.id;
        let updated = self
            .mutate(|data| {
                let slot = data.license_mut(license.id)?;
                *slot = license;
                Some(())
            })?
            .is_some();
        if updated && over_assigned {
            tracing::debug!(%id, "license stored with more seats assigned than available");
        }
        Ok(updated)
    }

    /// Delete a license. Nothing else references licenses.
    pub fn delete_license(&mut self, id: LicenseId) -> Result<bool, StorageError> {
        let deleted = self
            .mutate(|data| {
                let before = data.licenses.len();
                data.licenses.retain(|l| l.id != id);
                (data.licenses.len() != before).then_some(())
            })?
            .is_some();
        if deleted {
            tracing::info!(%id, "license deleted");
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use crate::core::identity::LicenseId;
    use crate::entities::SoftwareLicense;

    #[test]
    fn test_over_assignment_is_persisted_not_rejected() {
        let mut store = store();
        let c1 = add_collaborator(&mut store, "Ana", "Ruiz");
        let eq1 = add_equipment(&mut store, "EQ1");

        let mut lic = SoftwareLicense::new("acme", "L1", 1);
        lic.assigned_to.push(c1);
        lic.assigned_to_equipment.push(eq1);
        let id = store.add_license(lic).unwrap();

        let stored = store.data().license(id).unwrap();
        assert_eq!(stored.assigned_to, vec![c1]);
        assert_eq!(stored.assigned_to_equipment, vec![eq1]);
        assert!(stored.is_over_assigned());
    }

    #[test]
    fn test_update_and_delete_license() {
        let mut store = store();
        let id = add_license(&mut store, "Office", 3);

        let mut lic = store.data().license(id).unwrap().clone();
        lic.vendor = "Microsoft".to_string();
        assert!(store.update_license(lic).unwrap());
        assert_eq!(store.data().license(id).unwrap().vendor, "Microsoft");

        assert!(store.delete_license(id).unwrap());
        assert!(store.data().licenses.is_empty());
        assert!(!store.delete_license(id).unwrap());
    }

    #[test]
    fn test_license_ids_not_reused_after_delete() {
        let mut store = store();
        let first = add_license(&mut store, "A", 1);
        let second = add_license(&mut store, "B", 1);
        store.delete_license(second).unwrap();

        let third = add_license(&mut store, "C", 1);
        assert_eq!(first, LicenseId(1));
        assert_eq!(third, LicenseId(3));
    }
}
