//! Inactivity screen lock
//!
//! After a period without activity the console locks and asks for a fixed
//! PIN taken from configuration. The lock is independent of the logged-in
//! user: unlocking does not re-authenticate anybody.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::core::storage::{Storage, StorageError, LOCK_KEY};

/// Default idle time before the console locks
pub const DEFAULT_IDLE_TIMEOUT_MINUTES: i64 = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdleLock {
    pub last_activity: DateTime<Utc>,

    #[serde(default)]
    pub locked: bool,
}

impl IdleLock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            last_activity: now,
            locked: false,
        }
    }

    /// Load the stored lock state; missing or unreadable state starts unlocked at `now`
    pub fn load(storage: &impl Storage, now: DateTime<Utc>) -> Self {
        match storage.read(LOCK_KEY) {
            Ok(Some(contents)) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                tracing::warn!("ignoring unreadable lock state: {}", e);
                Self::new(now)
            }),
            Ok(None) => Self::new(now),
            Err(e) => {
                tracing::warn!("could not read lock state: {}", e);
                Self::new(now)
            }
        }
    }

    pub fn save(&self, storage: &impl Storage) -> Result<(), StorageError> {
        let document = serde_json::to_string(self).map_err(|source| StorageError::Serialize {
            key: LOCK_KEY.to_string(),
            source,
        })?;
        storage.write(LOCK_KEY, &document)
    }

    /// Lock if `timeout` has passed since the last activity; returns whether locked
    pub fn poll(&mut self, now: DateTime<Utc>, timeout: Duration) -> bool {
        if !self.locked && now - self.last_activity >= timeout {
            tracing::info!("console locked after inactivity");
            self.locked = true;
        }
        self.locked
    }

    /// Record activity. Has no effect while locked.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        if !self.locked {
            self.last_activity = now;
        }
    }

    /// Unlock when `pin` equals `expected`; returns whether the lock opened
    pub fn unlock(&mut self, pin: &str, expected: &str, now: DateTime<Utc>) -> bool {
        if pin != expected {
            tracing::warn!("wrong lock PIN");
            return false;
        }
        self.locked = false;
        self.last_activity = now;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::storage::MemoryStorage;
    use chrono::TimeZone;

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 9, minute, 0).unwrap()
    }

    fn timeout() -> Duration {
        Duration::minutes(DEFAULT_IDLE_TIMEOUT_MINUTES)
    }

    #[test]
    fn test_locks_after_timeout() {
        let mut lock = IdleLock::new(at(0));
        assert!(!lock.poll(at(19), timeout()));
        assert!(lock.poll(at(20), timeout()));
    }

    #[test]
    fn test_activity_postpones_lock() {
        let mut lock = IdleLock::new(at(0));
        lock.touch(at(15));
        assert!(!lock.poll(at(30), timeout()));
        assert!(lock.poll(at(35), timeout()));
    }

    #[test]
    fn test_touch_does_not_unlock() {
        let mut lock = IdleLock::new(at(0));
        lock.poll(at(25), timeout());
        lock.touch(at(26));
        assert!(lock.poll(at(26), timeout()));
    }

    #[test]
    fn test_unlock_requires_exact_pin() {
        let mut lock = IdleLock::new(at(0));
        lock.poll(at(30), timeout());

        assert!(!lock.unlock("1111", "2468", at(31)));
        assert!(lock.locked);
        assert!(lock.unlock("2468", "2468", at(31)));
        assert!(!lock.poll(at(40), timeout()));
    }

    #[test]
    fn test_state_roundtrips_through_storage() {
        let storage = MemoryStorage::new();
        let mut lock = IdleLock::new(at(0));
        lock.poll(at(45), timeout());
        lock.save(&storage).unwrap();

        assert_eq!(IdleLock::load(&storage, at(50)), lock);
        assert_eq!(IdleLock::load(&MemoryStorage::new(), at(50)), IdleLock::new(at(50)));
    }
}
