//! Login sessions and role-based permission checks
//!
//! A session is the full [`User`] record of whoever logged in, persisted
//! under [`SESSION_KEY`] so it survives restarts. Permissions come from the
//! role's capability table ([`Role::capabilities`]).

use std::time::Duration;

use thiserror::Error;

use crate::core::identity::UserId;
use crate::core::storage::{Storage, StorageError, SESSION_KEY};
use crate::entities::{Capability, Role, User, SUPER_ADMIN_ID};

/// Default artificial delay before a login attempt resolves
pub const DEFAULT_LOGIN_DELAY: Duration = Duration::from_millis(800);

/// Errors from session checks
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("not logged in. Run 'itam login' first.")]
    NotLoggedIn,

    #[error("role {role} is not allowed to {capability}")]
    Forbidden { role: Role, capability: Capability },

    #[error("editing the super-admin requires the master code")]
    MasterCodeRequired,

    #[error("master code is incorrect")]
    MasterCodeMismatch,

    #[error("no master code is configured; only the super-admin can edit itself")]
    MasterCodeNotConfigured,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Holds the one active session
#[derive(Debug)]
pub struct SessionManager<S: Storage> {
    storage: S,
    current: Option<User>,
    login_delay: Duration,
}

impl<S: Storage> SessionManager<S> {
    /// Pick up a stored session if there is a readable one
    pub fn restore(storage: S, login_delay: Duration) -> Self {
        let current = match storage.read(SESSION_KEY) {
            Ok(Some(contents)) => match serde_json::from_str::<User>(&contents) {
                Ok(user) => Some(user),
                Err(e) => {
                    tracing::warn!("ignoring unreadable session document: {}", e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("could not read session document: {}", e);
                None
            }
        };
        Self {
            storage,
            current,
            login_delay,
        }
    }

    /// Authenticate against `users`.
    ///
    /// The username matches ignoring case, the PIN must match exactly. On
    /// success the user becomes the session and is persisted; on failure
    /// nothing changes and `false` is returned.
    pub async fn login(
        &mut self,
        users: &[User],
        username: &str,
        pin: &str,
    ) -> Result<bool, StorageError> {
        if !self.login_delay.is_zero() {
            tokio::time::sleep(self.login_delay).await;
        }

        let username = username.trim();
        let Some(user) = users
            .iter()
            .find(|u| u.username.eq_ignore_ascii_case(username) && u.pin == pin)
        else {
            tracing::warn!(username, "login failed");
            return Ok(false);
        };

        let document = serde_json::to_string_pretty(user).map_err(|source| {
            StorageError::Serialize {
                key: SESSION_KEY.to_string(),
                source,
            }
        })?;
        self.storage.write(SESSION_KEY, &document)?;
        self.current = Some(user.clone());
        tracing::info!(user = %user.username, role = %user.role, "logged in");
        Ok(true)
    }

    /// Re-resolve the session against the current `users`.
    ///
    /// A session whose user no longer exists is dropped; otherwise the
    /// stored snapshot is replaced by the live record so role changes apply
    /// at once.
    pub fn refresh(&mut self, users: &[User]) -> Result<(), StorageError> {
        let Some(session) = self.current.as_ref() else {
            return Ok(());
        };
        match users.iter().find(|u| u.id == session.id) {
            None => {
                tracing::warn!(user = %session.username, "session user no longer exists");
                self.storage.remove(SESSION_KEY)?;
                self.current = None;
            }
            Some(live) if live != session => {
                tracing::debug!(user = %live.username, role = %live.role, "session refreshed");
                let document = serde_json::to_string_pretty(live).map_err(|source| {
                    StorageError::Serialize {
                        key: SESSION_KEY.to_string(),
                        source,
                    }
                })?;
                self.storage.write(SESSION_KEY, &document)?;
                self.current = Some(live.clone());
            }
            Some(_) => {}
        }
        Ok(())
    }

    /// End the session and forget it on disk
    pub fn logout(&mut self) -> Result<(), StorageError> {
        self.storage.remove(SESSION_KEY)?;
        if let Some(user) = self.current.take() {
            tracing::info!(user = %user.username, "logged out");
        }
        Ok(())
    }

    pub fn current_user(&self) -> Option<&User> {
        self.current.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }

    /// Whether the session's role grants `capability`. False when logged out.
    pub fn has_permission(&self, capability: Capability) -> bool {
        self.current
            .as_ref()
            .is_some_and(|user| user.role.grants(capability))
    }

    /// The session user, if logged in
    pub fn require_login(&self) -> Result<&User, AuthError> {
        self.current.as_ref().ok_or(AuthError::NotLoggedIn)
    }

    /// The session user, if logged in and allowed to `capability`
    pub fn require(&self, capability: Capability) -> Result<&User, AuthError> {
        let user = self.require_login()?;
        if user.role.grants(capability) {
            Ok(user)
        } else {
            Err(AuthError::Forbidden {
                role: user.role,
                capability,
            })
        }
    }

    /// Challenge for editing `target`.
    ///
    /// Anyone allowed to manage users may edit ordinary users. The
    /// super-admin may edit itself; anybody else must present the
    /// configured master code.
    pub fn authorize_user_edit(
        &self,
        target: UserId,
        supplied_code: Option<&str>,
        configured_code: Option<&str>,
    ) -> Result<(), AuthError> {
        let actor = self.require(Capability::ManageUsers)?;
        if target != SUPER_ADMIN_ID || actor.id == SUPER_ADMIN_ID {
            return Ok(());
        }
        let Some(expected) = configured_code else {
            return Err(AuthError::MasterCodeNotConfigured);
        };
        match supplied_code {
            None => Err(AuthError::MasterCodeRequired),
            Some(code) if code == expected => Ok(()),
            Some(_) => {
                tracing::warn!(actor = %actor.username, "wrong master code for super-admin edit");
                Err(AuthError::MasterCodeMismatch)
            }
        }
    }
}
