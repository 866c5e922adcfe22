//! Per-account brute-force lockout state.
//!
//! The state is derived from the persisted user record on every
//! authentication attempt; nothing ever "unlocks" an account except time.

use chrono::{DateTime, Duration, Utc};

use crate::domain::user::User;

pub const MAX_LOGIN_ATTEMPTS: u32 = 5;
pub const LOCKOUT_DURATION_MINUTES: i64 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockoutPolicy {
    pub max_attempts: u32,
    pub duration: Duration,
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_LOGIN_ATTEMPTS,
            duration: Duration::minutes(LOCKOUT_DURATION_MINUTES),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockState {
    Normal,
    Locked { until: DateTime<Utc> },
}

impl LockState {
    /// Locked while `now` has not passed `locked_until`.
    pub fn of(user: &User, now: DateTime<Utc>) -> Self {
        match user.locked_until {
            Some(until) if now <= until => LockState::Locked { until },
            _ => LockState::Normal,
        }
    }

    pub fn is_locked(&self) -> bool {
        matches!(self, LockState::Locked { .. })
    }
}

impl LockoutPolicy {
    /// Whether a failure count that has just been recorded trips the lock.
    pub fn should_lock(&self, attempts: u32) -> bool {
        attempts >= self.max_attempts
    }

    pub fn lock_until(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now + self.duration
    }
}
