//! Credential mutations

use super::InventoryStore;
use crate::core::identity::CredentialId;
use crate::core::storage::{Storage, StorageError};
use crate::entities::Credential;

impl<S: Storage> InventoryStore<S> {
    /// Add a credential; the `id` field is ignored and a fresh one returned
    pub fn add_credential(&mut self, mut credential: Credential) -> Result<CredentialId, StorageError> {
        let id = self.commit(|data| {
            let id = data.sequences.next(data.credentials.iter().map(|c| c.id));
            credential.id = id;
            data.credentials.push(credential);
            id
        })?;
        tracing::info!(%id, "credential created");
        Ok(id)
    }

    pub fn update_credential(&mut self, credential: Credential) -> Result<bool, StorageError> {
        let updated = self
            .mutate(|data| {
                let slot = data.credentials.iter_mut().find(|c| c.id == credential.id)?;
                *slot = credential;
                Some(())
            })?
            .is_some();
        Ok(updated)
    }

    pub fn delete_credential(&mut self, id: CredentialId) -> Result<bool, StorageError> {
        let deleted = self
            .mutate(|data| {
                let before = data.credentials.len();
                data.credentials.retain(|c| c.id != id);
                (data.credentials.len() != before).then_some(())
            })?
            .is_some();
        if deleted {
            tracing::info!(%id, "credential deleted");
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use crate::entities::{Credential, CredentialTarget};

    #[test]
    fn test_credential_lifecycle() {
        let mut store = store();
        let eq = add_equipment(&mut store, "A");
        let mut cred = Credential::new("acme", "BIOS", "admin", "hunter2");
        cred.assign(Some(CredentialTarget::Equipment(eq)));

        let id = store.add_credential(cred).unwrap();
        let stored = store.data().credential(id).unwrap().clone();
        assert_eq!(stored.password, "hunter2");
        assert_eq!(stored.target(), Some(CredentialTarget::Equipment(eq)));

        let mut edited = stored;
        edited.password = "changed".to_string();
        assert!(store.update_credential(edited).unwrap());
        assert_eq!(store.data().credential(id).unwrap().password, "changed");

        assert!(store.delete_credential(id).unwrap());
        assert!(store.data().credential(id).is_none());
    }
}
