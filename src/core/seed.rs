//! Default dataset used when no stored document exists

use crate::core::data::AppData;
use crate::core::identity::IdSequences;
use crate::entities::{Role, User, SUPER_ADMIN_ID};

/// PIN given to the seeded administrator when configuration sets none
pub const DEFAULT_BOOTSTRAP_PIN: &str = "0000";

/// Username of the seeded administrator
pub const SUPER_ADMIN_USERNAME: &str = "admin";

/// Fresh dataset: the super-admin and nothing else
pub fn default_data(bootstrap_pin: &str) -> AppData {
    let mut admin = User::new(SUPER_ADMIN_USERNAME, "Administrator", Role::Admin, bootstrap_pin);
    admin.id = SUPER_ADMIN_ID;

    AppData {
        users: vec![admin],
        sequences: IdSequences {
            users: SUPER_ADMIN_ID.0,
            ..Default::default()
        },
        ..Default::default()
    }
}
