use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use secrecy::Secret;
use thiserror::Error;

use crate::domain::{
    email::Email,
    oauth::OAuthClaims,
    password::{Password, PasswordDigest},
    refresh_token::RefreshTokenValue,
    session::{AccessClaims, SignedAccessToken},
    user::{UserId, UserType},
};

// PasswordHasher port trait and errors
#[derive(Debug, Error)]
pub enum PasswordHasherError {
    #[error("Failed to hash password: {0}")]
    HashingFailed(String),
    #[error("Stored password digest is malformed: {0}")]
    MalformedDigest(String),
}

/// Adaptive one-way password hashing.
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    async fn hash(&self, password: &Password) -> Result<PasswordDigest, PasswordHasherError>;
    /// A mismatch is `Ok(false)`, never an error.
    async fn verify(
        &self,
        digest: &PasswordDigest,
        candidate: &Secret<String>,
    ) -> Result<bool, PasswordHasherError>;

    /// Spends the work of a failed `verify` when there is no stored digest
    /// to check, so a missing account costs as much as a wrong password.
    async fn verify_decoy(&self, _candidate: &Secret<String>) -> Result<(), PasswordHasherError> {
        Ok(())
    }
}

// TokenIssuer port trait and errors
#[derive(Debug, Error)]
pub enum TokenIssuerError {
    #[error("Invalid token: {0}")]
    InvalidToken(String),
    #[error("Token has expired")]
    Expired,
    #[error("Failed to sign token: {0}")]
    SigningFailed(String),
}

/// Signs short-lived access tokens and mints opaque refresh tokens.
pub trait TokenIssuer: Send + Sync {
    fn generate_access_token(
        &self,
        user_id: UserId,
        email: &Email,
        user_type: UserType,
    ) -> Result<SignedAccessToken, TokenIssuerError>;
    /// Signature and expiry only; never consults a store.
    fn validate_access_token(&self, token: &str) -> Result<AccessClaims, TokenIssuerError>;
    fn generate_refresh_token(&self) -> RefreshTokenValue;
    fn refresh_token_ttl(&self) -> Duration;
}

// OAuthProvider port trait and errors
#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("Provider rejected the token: {0}")]
    Rejected(String),
    #[error("Provider request failed: {0}")]
    Transport(String),
    #[error("Provider did not supply an email address")]
    MissingEmail,
}

/// Verifies an identity assertion issued by an external provider.
#[async_trait]
pub trait OAuthProvider: Send + Sync {
    fn name(&self) -> &'static str;
    async fn verify_id_token(&self, token: &str) -> Result<OAuthClaims, OAuthError>;
}

/// Providers available for federated login, keyed by lower-case name.
#[derive(Clone, Default)]
pub struct OAuthProviders {
    providers: HashMap<String, Arc<dyn OAuthProvider>>,
}

impl OAuthProviders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_provider(mut self, provider: Arc<dyn OAuthProvider>) -> Self {
        self.providers
            .insert(provider.name().to_ascii_lowercase(), provider);
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn OAuthProvider>> {
        self.providers
            .get(name.trim().to_ascii_lowercase().as_str())
            .cloned()
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.providers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl std::fmt::Debug for OAuthProviders {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthProviders")
            .field("providers", &self.names())
            .finish()
    }
}
