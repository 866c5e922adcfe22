use secrecy::{ExposeSecret, Secret};
use warden_core::{
    AuthSession, Clock, CredentialStore, CredentialStoreError, RequestMetadata, TokenIssuer,
};

use crate::{
    error::{AuthError, messages},
    sessions::SessionIssuer,
};

#[derive(Debug, Clone)]
pub struct RefreshSessionInput {
    pub refresh_token: Secret<String>,
}

/// Refresh session use case - single-use rotation of a refresh token
pub struct RefreshSessionUseCase<'a, S, I>
where
    S: CredentialStore,
    I: TokenIssuer,
{
    store: &'a S,
    sessions: SessionIssuer<'a, S, I>,
    clock: &'a dyn Clock,
}

impl<'a, S, I> RefreshSessionUseCase<'a, S, I>
where
    S: CredentialStore,
    I: TokenIssuer,
{
    pub fn new(store: &'a S, issuer: &'a I, clock: &'a dyn Clock) -> Self {
        Self {
            store,
            sessions: SessionIssuer::new(store, issuer, clock),
            clock,
        }
    }

    /// Execute the refresh session use case
    ///
    /// The presented token is revoked with a compare-and-set before anything
    /// new is issued; of two concurrent callers only the one that flips the
    /// flag gets a replacement.
    #[tracing::instrument(name = "RefreshSessionUseCase::execute", skip(self, input))]
    pub async fn execute(
        &self,
        input: RefreshSessionInput,
        metadata: RequestMetadata,
    ) -> Result<AuthSession, AuthError> {
        let stored = self
            .store
            .find_refresh_token(input.refresh_token.expose_secret())
            .await
            .map_err(|e| match e {
                CredentialStoreError::RefreshTokenNotFound => {
                    AuthError::unauthorized(messages::REFRESH_NOT_FOUND)
                }
                other => other.into(),
            })?;

        if stored.revoked {
            tracing::warn!(token_id = %stored.id, user_id = %stored.user_id, "Revoked refresh token presented");
            return Err(AuthError::unauthorized(messages::REFRESH_REVOKED));
        }

        if stored.is_expired(self.clock.now()) {
            return Err(AuthError::unauthorized(messages::REFRESH_EXPIRED));
        }

        if !self.store.revoke_refresh_token(stored.id).await? {
            tracing::warn!(token_id = %stored.id, "Refresh token consumed concurrently");
            return Err(AuthError::unauthorized(messages::REFRESH_REVOKED));
        }

        let user = self.store.get_user_by_id(stored.user_id).await?;

        let metadata = stored.rotated_metadata(&metadata);
        let tokens = self.sessions.issue(&user, &metadata).await?;

        Ok(AuthSession {
            user: user.view(),
            tokens,
        })
    }
}
