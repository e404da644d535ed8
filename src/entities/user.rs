//! User entity - console operators and their roles

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::core::identity::{CollaboratorId, UserId};

/// Id of the built-in administrator that can never be deleted
pub const SUPER_ADMIN_ID: UserId = UserId(1);

/// An action a session may be allowed to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Create,
    Edit,
    Delete,
    /// Reveal stored credential passwords
    ViewSensitive,
    ManageUsers,
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Capability::Create => write!(f, "create"),
            Capability::Edit => write!(f, "edit"),
            Capability::Delete => write!(f, "delete"),
            Capability::ViewSensitive => write!(f, "view_sensitive"),
            Capability::ManageUsers => write!(f, "manage_users"),
        }
    }
}

/// User roles
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum, Default,
)]
pub enum Role {
    Admin,
    #[default]
    Consultant,
}

impl Role {
    /// Capabilities granted to the role.
    ///
    /// Admins hold every capability and consultants none; the table exists
    /// so finer-grained grants only need a change here.
    pub fn capabilities(self) -> &'static [Capability] {
        match self {
            Role::Admin => &[
                Capability::Create,
                Capability::Edit,
                Capability::Delete,
                Capability::ViewSensitive,
                Capability::ManageUsers,
            ],
            Role::Consultant => &[],
        }
    }

    pub fn grants(self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "Admin"),
            Role::Consultant => write!(f, "Consultant"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "consultant" => Ok(Role::Consultant),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

/// A console user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,

    /// Login name, unique ignoring case
    pub username: String,

    pub name: String,

    #[serde(default)]
    pub role: Role,

    /// Four digit PIN, compared verbatim
    pub pin: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collaborator_id: Option<CollaboratorId>,
}

impl User {
    /// Create a user; the store assigns the id
    pub fn new(
        username: impl Into<String>,
        name: impl Into<String>,
        role: Role,
        pin: impl Into<String>,
    ) -> Self {
        Self {
            id: UserId(0),
            username: username.into(),
            name: name.into(),
            role,
            pin: pin.into(),
            collaborator_id: None,
        }
    }

    pub fn is_super_admin(&self) -> bool {
        self.id == SUPER_ADMIN_ID
    }
}
