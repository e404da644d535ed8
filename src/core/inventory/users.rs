//! User mutations, with the super-admin delete guard

use super::InventoryStore;
use crate::core::identity::UserId;
use crate::core::storage::{Storage, StorageError};
use crate::entities::{User, SUPER_ADMIN_ID};

/// Outcome of [`InventoryStore::delete_user`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserDeletion {
    Deleted,
    NotFound,
    /// The super-admin was targeted; nothing changed
    SuperAdminProtected,
}

impl<S: Storage> InventoryStore<S> {
    /// Add a user; the `id` field is ignored and a fresh one returned
    pub fn add_user(&mut self, mut user: User) -> Result<UserId, StorageError> {
        let id = self.commit(|data| {
            let id = data.sequences.next(data.users.iter().map(|u| u.id));
            user.id = id;
            data.users.push(user);
            id
        })?;
        tracing::info!(%id, "user created");
        Ok(id)
    }

    /// Replace the user with the same id.
    ///
    /// Edits to the super-admin are not challenged here; see
    /// [`crate::core::auth::SessionManager::authorize_user_edit`].
    pub fn update_user(&mut self, user: User) -> Result<bool, StorageError> {
        let updated = self
            .mutate(|data| {
                let slot = data.users.iter_mut().find(|u| u.id == user.id)?;
                *slot = user;
                Some(())
            })?
            .is_some();
        Ok(updated)
    }

    /// Delete a user. The super-admin is refused without any change.
    pub fn delete_user(&mut self, id: UserId) -> Result<UserDeletion, StorageError> {
        if id == SUPER_ADMIN_ID {
            tracing::warn!(%id, "refused to delete the super-admin user");
            return Ok(UserDeletion::SuperAdminProtected);
        }
        let deleted = self.mutate(|data| {
            let before = data.users.len();
            data.users.retain(|u| u.id != id);
            (data.users.len() != before).then_some(())
        })?;
        Ok(match deleted {
            Some(()) => {
                tracing::info!(%id, "user deleted");
                UserDeletion::Deleted
            }
            None => UserDeletion::NotFound,
        })
    }
}
