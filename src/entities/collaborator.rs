//! Collaborator entity - a person equipment and licenses are assigned to

use serde::{Deserialize, Serialize};

use crate::core::identity::CollaboratorId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Sex {
    #[default]
    Male,
    Female,
}

impl std::fmt::Display for Sex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sex::Male => write!(f, "Male"),
            Sex::Female => write!(f, "Female"),
        }
    }
}

impl std::str::FromStr for Sex {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "male" | "m" => Ok(Sex::Male),
            "female" | "f" => Ok(Sex::Female),
            _ => Err(format!("Invalid sex: {}. Use male or female", s)),
        }
    }
}

/// A collaborator (employee or contractor) of a company
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collaborator {
    pub id: CollaboratorId,

    pub company_id: String,

    #[serde(default)]
    pub site_id: String,

    pub first_name: String,

    pub last_name: String,

    #[serde(default)]
    pub email: String,

    /// Department
    #[serde(default)]
    pub area: String,

    /// Job title
    #[serde(default)]
    pub cargo: String,

    #[serde(default)]
    pub sex: Sex,

    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl Collaborator {
    /// Create an active collaborator; the store assigns the id
    pub fn new(
        company_id: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            id: CollaboratorId(0),
            company_id: company_id.into(),
            site_id: String::new(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: String::new(),
            area: String::new(),
            cargo: String::new(),
            sex: Sex::default(),
            is_active: true,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }
}
