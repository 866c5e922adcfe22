use secrecy::{ExposeSecret, Secret};
use warden_core::{CredentialStore, CredentialStoreError, TokenBlacklist, TokenIssuer};

use crate::error::AuthError;

#[derive(Debug, Clone)]
pub struct LogoutInput {
    pub refresh_token: Secret<String>,
    /// When present and still valid, blacklisted until it expires.
    pub access_token: Option<Secret<String>>,
}

/// Logout use case - idempotent revocation of a session
pub struct LogoutUseCase<'a, S, I, B>
where
    S: CredentialStore,
    I: TokenIssuer,
    B: TokenBlacklist,
{
    store: &'a S,
    issuer: &'a I,
    blacklist: &'a B,
}

impl<'a, S, I, B> LogoutUseCase<'a, S, I, B>
where
    S: CredentialStore,
    I: TokenIssuer,
    B: TokenBlacklist,
{
    pub fn new(store: &'a S, issuer: &'a I, blacklist: &'a B) -> Self {
        Self {
            store,
            issuer,
            blacklist,
        }
    }

    /// Execute the logout use case
    ///
    /// Unknown and already revoked refresh tokens are not errors.
    #[tracing::instrument(name = "LogoutUseCase::execute", skip(self, input))]
    pub async fn execute(&self, input: LogoutInput) -> Result<(), AuthError> {
        match self
            .store
            .find_refresh_token(input.refresh_token.expose_secret())
            .await
        {
            Ok(token) => {
                if !self.store.revoke_refresh_token(token.id).await? {
                    tracing::debug!(token_id = %token.id, "Refresh token was already revoked");
                }
            }
            Err(CredentialStoreError::RefreshTokenNotFound) => {
                tracing::debug!("Logout with unknown refresh token");
            }
            Err(e) => return Err(e.into()),
        }

        if let Some(access_token) = input.access_token {
            self.blacklist_access_token(access_token.expose_secret())
                .await;
        }

        Ok(())
    }

    // Best effort: the refresh token is already gone, and the access token
    // dies on its own at expiry.
    async fn blacklist_access_token(&self, token: &str) {
        let Ok(claims) = self.issuer.validate_access_token(token) else {
            return;
        };
        let Some(expires_at) = claims.expires_at() else {
            return;
        };
        if let Err(e) = self.blacklist.blacklist(token, expires_at).await {
            tracing::warn!(error = %e, "Failed to blacklist access token on logout");
        }
    }
}
