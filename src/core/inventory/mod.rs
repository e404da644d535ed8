//! Inventory store - the single point of mutation for every collection
//!
//! Each public operation computes the next [`AppData`] value from a copy of
//! the current one, persists it through the [`PersistentStore`], and only
//! then makes it current and notifies subscribers. A failed save leaves the
//! in-memory state untouched.
//!
//! The store does not validate input. Serial number uniqueness, license slot
//! capacity and required fields are checked by callers (see
//! [`crate::core::validation`]) before invoking an operation.

mod collaborators;
mod credentials;
mod equipment;
mod licenses;
mod maintenance;
mod users;

pub use maintenance::TicketResolution;
pub use users::UserDeletion;

use chrono::Utc;

use crate::core::data::AppData;
use crate::core::identity::{CollaboratorId, EquipmentId};
use crate::core::storage::{PersistentStore, Storage, StorageError};
use crate::entities::{HistoryAction, HistoryEntry};

type Subscriber = Box<dyn FnMut(&AppData)>;

/// Owner of the live [`AppData`] aggregate
pub struct InventoryStore<S: Storage> {
    persistence: PersistentStore<S>,
    data: AppData,
    subscribers: Vec<Subscriber>,
}

impl<S: Storage> InventoryStore<S> {
    /// Load the aggregate (or seed data) and take ownership of it
    pub fn open(persistence: PersistentStore<S>) -> Self {
        let data = persistence.load();
        tracing::debug!(records = data.record_count(), "inventory loaded");
        Self {
            persistence,
            data,
            subscribers: Vec::new(),
        }
    }

    /// Read-only view of the current state
    pub fn data(&self) -> &AppData {
        &self.data
    }

    /// Owned copy of the current state
    pub fn snapshot(&self) -> AppData {
        self.data.clone()
    }

    /// Register a callback invoked with the new state after every committed mutation
    pub fn subscribe(&mut self, subscriber: impl FnMut(&AppData) + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    /// Run `change` against a copy of the state and commit the copy.
    fn commit<T>(&mut self, change: impl FnOnce(&mut AppData) -> T) -> Result<T, StorageError> {
        let mut next = self.data.clone();
        let outcome = change(&mut next);
        self.publish(next)?;
        Ok(outcome)
    }

    /// Like [`Self::commit`], but `None` from `change` means nothing
    /// happened: the copy is dropped and nothing is written.
    fn mutate<T>(
        &mut self,
        change: impl FnOnce(&mut AppData) -> Option<T>,
    ) -> Result<Option<T>, StorageError> {
        let mut next = self.data.clone();
        let Some(outcome) = change(&mut next) else {
            return Ok(None);
        };
        self.publish(next)?;
        Ok(Some(outcome))
    }

    fn publish(&mut self, next: AppData) -> Result<(), StorageError> {
        self.persistence.save(&next)?;
        self.data = next;
        for subscriber in &mut self.subscribers {
            subscriber(&self.data);
        }
        Ok(())
    }
}

/// Append one audit row for `equipment_id`
fn record_history(
    data: &mut AppData,
    equipment_id: EquipmentId,
    action_type: HistoryAction,
    description: String,
    user: &str,
) {
    let id = data.sequences.next(data.history.iter().map(|h| h.id));
    tracing::debug!(%equipment_id, action = %action_type, "{}", description);
    data.history.push(HistoryEntry {
        id,
        equipment_id,
        date: Utc::now(),
        action_type,
        description,
        user: user.to_string(),
    });
}

/// Display name of a collaborator for history text
fn collaborator_label(data: &AppData, id: CollaboratorId) -> String {
    data.collaborator(id)
        .map(|c| c.full_name())
        .unwrap_or_else(|| format!("collaborator #{}", id))
}
