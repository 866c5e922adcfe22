use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{
    email::Email,
    password::PasswordDigest,
    refresh_token::RefreshToken,
    user::{User, UserId},
};

// CredentialStore port trait and errors
#[derive(Debug, Error)]
pub enum CredentialStoreError {
    #[error("User already exists")]
    UserAlreadyExists,
    #[error("User not found")]
    UserNotFound,
    #[error("Refresh token not found")]
    RefreshTokenNotFound,
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl CredentialStoreError {
    /// Only infrastructure faults are worth trying again.
    pub fn is_transient(&self) -> bool {
        matches!(self, CredentialStoreError::DatabaseError(_))
    }
}

impl PartialEq for CredentialStoreError {
    fn eq(&self, other: &Self) -> bool {
        matches!(
            (self, other),
            (Self::UserAlreadyExists, Self::UserAlreadyExists)
                | (Self::UserNotFound, Self::UserNotFound)
                | (Self::RefreshTokenNotFound, Self::RefreshTokenNotFound)
                | (Self::DatabaseError(_), Self::DatabaseError(_))
        )
    }
}

/// Persistence of users, refresh tokens and login-attempt state.
///
/// Implementations must get email uniqueness and the attempt counter
/// increment from the backing store itself; several service instances may
/// share one store.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Fails with `UserAlreadyExists` when the email is taken.
    async fn create_user(&self, user: &User) -> Result<(), CredentialStoreError>;
    async fn get_user_by_email(&self, email: &Email) -> Result<User, CredentialStoreError>;
    async fn get_user_by_id(&self, id: UserId) -> Result<User, CredentialStoreError>;
    async fn update_password(
        &self,
        id: UserId,
        digest: &PasswordDigest,
        changed_at: DateTime<Utc>,
    ) -> Result<(), CredentialStoreError>;
    async fn update_login_info(
        &self,
        id: UserId,
        ip_address: Option<&str>,
        at: DateTime<Utc>,
    ) -> Result<(), CredentialStoreError>;
    /// Atomically adds one failed attempt and returns the new count.
    async fn increment_login_attempts(&self, id: UserId) -> Result<u32, CredentialStoreError>;
    /// Zeroes the counter and clears any lock.
    async fn reset_login_attempts(&self, id: UserId) -> Result<(), CredentialStoreError>;
    async fn lock_account(
        &self,
        id: UserId,
        until: DateTime<Utc>,
    ) -> Result<(), CredentialStoreError>;

    async fn save_refresh_token(&self, token: &RefreshToken) -> Result<(), CredentialStoreError>;
    /// Fails with `RefreshTokenNotFound` for unknown values.
    async fn find_refresh_token(&self, value: &str) -> Result<RefreshToken, CredentialStoreError>;
    /// Flips `revoked` from false to true. Returns whether this call did the flip.
    async fn revoke_refresh_token(&self, id: Uuid) -> Result<bool, CredentialStoreError>;
    /// Revokes every live refresh token of a user, returning how many were revoked.
    async fn revoke_all_refresh_tokens(&self, user_id: UserId)
    -> Result<u64, CredentialStoreError>;
}

// TokenBlacklist port trait and errors
#[derive(Debug, Error)]
pub enum TokenBlacklistError {
    #[error("Database error: {0}")]
    DatabaseError(String),
}

/// Access tokens that were explicitly logged out before their expiry.
#[async_trait]
pub trait TokenBlacklist: Send + Sync {
    async fn blacklist(
        &self,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), TokenBlacklistError>;
    async fn is_blacklisted(&self, token: &str) -> Result<bool, TokenBlacklistError>;
}
