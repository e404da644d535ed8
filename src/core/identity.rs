//! Entity identity: per-collection integer ids and their allocation

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Entity collections held by the inventory aggregate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Equipment,
    Collaborator,
    License,
    Maintenance,
    Credential,
    User,
    History,
}

impl EntityKind {
    /// Get the string representation of the kind
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Equipment => "equipment",
            EntityKind::Collaborator => "collaborator",
            EntityKind::License => "license",
            EntityKind::Maintenance => "maintenance",
            EntityKind::Credential => "credential",
            EntityKind::User => "user",
            EntityKind::History => "history",
        }
    }

    /// Get all kinds
    pub fn all() -> &'static [EntityKind] {
        &[
            EntityKind::Equipment,
            EntityKind::Collaborator,
            EntityKind::License,
            EntityKind::Maintenance,
            EntityKind::Credential,
            EntityKind::User,
            EntityKind::History,
        ]
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors when parsing an id from user input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdParseError {
    #[error("invalid {kind} id '{input}': expected a positive integer")]
    NotANumber { kind: EntityKind, input: String },

    #[error("invalid {kind} id: ids start at 1")]
    Zero { kind: EntityKind },
}

/// Common surface of the integer id newtypes
pub trait EntityId: Copy + Eq + Ord + fmt::Display {
    const KIND: EntityKind;

    fn new(raw: u32) -> Self;

    fn get(self) -> u32;
}

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident => $kind:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl EntityId for $name {
            const KIND: EntityKind = $kind;

            fn new(raw: u32) -> Self {
                Self(raw)
            }

            fn get(self) -> u32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = IdParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim().trim_start_matches('#');
                let raw: u32 = trimmed.parse().map_err(|_| IdParseError::NotANumber {
                    kind: $kind,
                    input: s.to_string(),
                })?;
                if raw == 0 {
                    return Err(IdParseError::Zero { kind: $kind });
                }
                Ok(Self(raw))
            }
        }
    };
}

entity_id!(
    /// Id of an [`crate::entities::Equipment`]
    EquipmentId => EntityKind::Equipment
);
entity_id!(
    /// Id of a [`crate::entities::Collaborator`]
    CollaboratorId => EntityKind::Collaborator
);
entity_id!(
    /// Id of a [`crate::entities::SoftwareLicense`]
    LicenseId => EntityKind::License
);
entity_id!(
    /// Id of a [`crate::entities::MaintenanceRecord`]
    MaintenanceId => EntityKind::Maintenance
);
entity_id!(
    /// Id of a [`crate::entities::Credential`]
    CredentialId => EntityKind::Credential
);
entity_id!(
    /// Id of a [`crate::entities::User`]
    UserId => EntityKind::User
);
entity_id!(
    /// Id of an [`crate::entities::HistoryEntry`]
    HistoryId => EntityKind::History
);

/// Highest id ever handed out per collection.
///
/// Persisted alongside the collections so that deleting the newest record
/// does not make its id available again. Documents written before this
/// field existed load with zeroes and fall back to `max(existing) + 1`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IdSequences {
    pub equipment: u32,
    pub collaborators: u32,
    pub licenses: u32,
    pub maintenance: u32,
    pub credentials: u32,
    pub users: u32,
    pub history: u32,
}

impl IdSequences {
    fn slot(&mut self, kind: EntityKind) -> &mut u32 {
        match kind {
            EntityKind::Equipment => &mut self.equipment,
            EntityKind::Collaborator => &mut self.collaborators,
            EntityKind::License => &mut self.licenses,
            EntityKind::Maintenance => &mut self.maintenance,
            EntityKind::Credential => &mut self.credentials,
            EntityKind::User => &mut self.users,
            EntityKind::History => &mut self.history,
        }
    }

    /// Allocate the next id for a collection.
    ///
    /// The result is `max(existing ids, high-water mark) + 1`, so ids stay
    /// small and sequential per collection and an empty, never-used
    /// collection starts at 1. Once the top of the id range is taken, the
    /// lowest free id is handed out instead.
    pub fn next<I: EntityId>(&mut self, existing: impl IntoIterator<Item = I>) -> I {
        let used: BTreeSet<u32> = existing.into_iter().map(EntityId::get).collect();
        let max_existing = used.last().copied().unwrap_or(0);
        let slot = self.slot(I::KIND);
        match (*slot).max(max_existing).checked_add(1) {
            Some(next) => {
                *slot = next;
                I::new(next)
            }
            None => {
                *slot = u32::MAX;
                let free = (1..u32::MAX).find(|id| !used.contains(id)).unwrap_or(u32::MAX);
                tracing::warn!(kind = %I::KIND, id = free, "id range exhausted, reusing a free id");
                I::new(free)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_id_is_one() {
        let mut seq = IdSequences::default();
        let id: EquipmentId = seq.next(Vec::<EquipmentId>::new());
        assert_eq!(id, EquipmentId(1));
    }

    #[test]
    fn test_next_id_follows_max_existing() {
        let mut seq = IdSequences::default();
        let id: CollaboratorId = seq.next([CollaboratorId(3), CollaboratorId(9), CollaboratorId(4)]);
        assert_eq!(id, CollaboratorId(10));
    }

    #[test]
    fn test_deleted_top_id_is_not_reused() {
        let mut seq = IdSequences::default();
        let first: LicenseId = seq.next(Vec::<LicenseId>::new());
        let second: LicenseId = seq.next([first]);
        assert_eq!(second, LicenseId(2));

        // LicenseId(2) removed from the collection again
        let third: LicenseId = seq.next([first]);
        assert_eq!(third, LicenseId(3));
    }

    #[test]
    fn test_top_of_range_reuses_lowest_free_id() {
        let mut seq = IdSequences::default();
        let id: EquipmentId = seq.next([EquipmentId(1), EquipmentId(u32::MAX), EquipmentId(2)]);
        assert_eq!(id, EquipmentId(3));

        let again: EquipmentId =
            seq.next([EquipmentId(1), EquipmentId(2), EquipmentId(3), EquipmentId(u32::MAX)]);
        assert_eq!(again, EquipmentId(4));
    }

    #[test]
    fn test_sequences_are_per_collection() {
        let mut seq = IdSequences::default();
        let eq: EquipmentId = seq.next([EquipmentId(5)]);
        let user: UserId = seq.next(Vec::<UserId>::new());
        assert_eq!(eq, EquipmentId(6));
        assert_eq!(user, UserId(1));
    }

    #[test]
    fn test_id_from_str() {
        assert_eq!("7".parse::<EquipmentId>().unwrap(), EquipmentId(7));
        assert_eq!("#12".parse::<MaintenanceId>().unwrap(), MaintenanceId(12));
        assert!(matches!(
            "abc".parse::<UserId>(),
            Err(IdParseError::NotANumber { kind: EntityKind::User, .. })
        ));
        assert!(matches!("0".parse::<UserId>(), Err(IdParseError::Zero { .. })));
    }

    #[test]
    fn test_id_serializes_as_plain_number() {
        let json = serde_json::to_string(&EquipmentId(42)).unwrap();
        assert_eq!(json, "42");
    }
}
