//! Credential entity - service accounts and passwords kept for a company

use serde::{Deserialize, Serialize};

use crate::core::identity::{CollaboratorId, CredentialId, EquipmentId};

/// What a credential is attached to. A credential belongs to at most one target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialTarget {
    Collaborator(CollaboratorId),
    Equipment(EquipmentId),
}

/// A stored credential.
///
/// The password is kept in plaintext; callers decide who may see it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    pub id: CredentialId,

    pub company_id: String,

    pub service: String,

    pub username: String,

    #[serde(default)]
    pub password: String,

    #[serde(default)]
    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<CollaboratorId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to_equipment: Option<EquipmentId>,
}

impl Credential {
    /// Create an unassigned credential; the store assigns the id
    pub fn new(
        company_id: impl Into<String>,
        service: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            id: CredentialId(0),
            company_id: company_id.into(),
            service: service.into(),
            username: username.into(),
            password: password.into(),
            description: String::new(),
            assigned_to: None,
            assigned_to_equipment: None,
        }
    }

    /// The assignment target, preferring the collaborator when a hand-edited
    /// document sets both
    pub fn target(&self) -> Option<CredentialTarget> {
        self.assigned_to
            .map(CredentialTarget::Collaborator)
            .or(self.assigned_to_equipment.map(CredentialTarget::Equipment))
    }

    /// Attach to a single target, clearing the other kind
    pub fn assign(&mut self, target: Option<CredentialTarget>) {
        self.assigned_to = None;
        self.assigned_to_equipment = None;
        match target {
            Some(CredentialTarget::Collaborator(id)) => self.assigned_to = Some(id),
            Some(CredentialTarget::Equipment(id)) => self.assigned_to_equipment = Some(id),
            None => {}
        }
    }

    /// Password with every character replaced, for listings
    pub fn masked_password(&self) -> String {
        "•".repeat(self.password.chars().count().clamp(4, 12))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assign_is_mutually_exclusive() {
        let mut cred = Credential::new("acme", "VPN", "jdoe", "s3cret");
        cred.assign(Some(CredentialTarget::Collaborator(CollaboratorId(2))));
        assert_eq!(cred.target(), Some(CredentialTarget::Collaborator(CollaboratorId(2))));

        cred.assign(Some(CredentialTarget::Equipment(EquipmentId(5))));
        assert!(cred.assigned_to.is_none());
        assert_eq!(cred.target(), Some(CredentialTarget::Equipment(EquipmentId(5))));

        cred.assign(None);
        assert!(cred.target().is_none());
    }

    #[test]
    fn test_masked_password_hides_content() {
        let cred = Credential::new("acme", "Email", "ana", "pw");
        assert_eq!(cred.masked_password(), "••••");
        assert!(!cred.masked_password().contains("pw"));
    }
}
