use secrecy::{ExposeSecret, Secret};
use warden_core::{
    CredentialStore, CredentialStoreError, SessionValidity, TokenBlacklist, TokenIssuer,
};

use crate::error::{AuthError, messages};

#[derive(Debug, Clone)]
pub struct ValidateSessionInput {
    pub access_token: Secret<String>,
}

/// Validate session use case - signature and expiry check plus a live user lookup
pub struct ValidateSessionUseCase<'a, S, I, B>
where
    S: CredentialStore,
    I: TokenIssuer,
    B: TokenBlacklist,
{
    store: &'a S,
    issuer: &'a I,
    blacklist: &'a B,
}

impl<'a, S, I, B> ValidateSessionUseCase<'a, S, I, B>
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

    /// Execute the validate session use case
    ///
    /// Claims are a snapshot from issuance time; active/verified flags and
    /// the user type are always read from the current record.
    #[tracing::instrument(name = "ValidateSessionUseCase::execute", skip(self, input))]
    pub async fn execute(&self, input: ValidateSessionInput) -> Result<SessionValidity, AuthError> {
        let token = input.access_token.expose_secret();

        let claims = self
            .issuer
            .validate_access_token(token)
            .map_err(|_| AuthError::unauthorized(messages::INVALID_TOKEN))?;

        if self.blacklist.is_blacklisted(token).await? {
            return Err(AuthError::unauthorized(messages::TOKEN_REVOKED));
        }

        let expires_at = claims
            .expires_at()
            .ok_or_else(|| AuthError::unauthorized(messages::INVALID_TOKEN))?;

        let user = self
            .store
            .get_user_by_id(claims.sub)
            .await
            .map_err(|e| match e {
                CredentialStoreError::UserNotFound => {
                    AuthError::unauthorized(messages::INVALID_TOKEN)
                }
                other => other.into(),
            })?;

        Ok(SessionValidity {
            valid: user.is_active,
            user_id: user.id,
            email: user.email.as_str().to_owned(),
            user_type: user.user_type,
            is_active: user.is_active,
            is_verified: user.is_verified,
            expires_at,
        })
    }
}
