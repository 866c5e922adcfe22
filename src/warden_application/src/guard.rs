use chrono::{DateTime, Utc};
use warden_core::{CredentialStore, LockState, LockoutPolicy, User};

use crate::error::{AuthError, messages};

/// Failed-attempt counting and time-boxed lockout on top of the credential store.
pub struct BruteForceGuard<'a, S>
where
    S: CredentialStore,
{
    store: &'a S,
    policy: LockoutPolicy,
}

impl<'a, S> BruteForceGuard<'a, S>
where
    S: CredentialStore,
{
    pub fn new(store: &'a S, policy: LockoutPolicy) -> Self {
        Self { store, policy }
    }

    /// Must run before the password is looked at, so a locked account never
    /// reveals whether the supplied password was right.
    pub fn ensure_unlocked(&self, user: &User, now: DateTime<Utc>) -> Result<(), AuthError> {
        match LockState::of(user, now) {
            LockState::Normal => Ok(()),
            LockState::Locked { .. } => {
                tracing::warn!(user_id = %user.id, "Authentication attempt on locked account");
                Err(AuthError::Forbidden(messages::ACCOUNT_LOCKED.to_owned()))
            }
        }
    }

    /// Counts a failed credential check and locks the account once the
    /// threshold is reached.
    pub async fn record_failure(
        &self,
        user: &User,
        now: DateTime<Utc>,
    ) -> Result<LockState, AuthError> {
        let attempts = self.store.increment_login_attempts(user.id).await?;

        if !self.policy.should_lock(attempts) {
            return Ok(LockState::Normal);
        }

        let until = self.policy.lock_until(now);
        self.store.lock_account(user.id, until).await?;
        tracing::warn!(user_id = %user.id, attempts, "Account locked after repeated failures");

        Ok(LockState::Locked { until })
    }

    /// Clears the counter after a successful credential check. Skips the
    /// write when there is nothing to clear.
    pub async fn record_success(&self, user: &User) -> Result<(), AuthError> {
        if user.login_attempts > 0 || user.locked_until.is_some() {
            self.store.reset_login_attempts(user.id).await?;
        }
        Ok(())
    }
}
