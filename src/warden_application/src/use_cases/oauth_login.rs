use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, Secret};
use warden_core::{
    AuthSession, Clock, CredentialStore, CredentialStoreError, OAuthClaims, OAuthProviders,
    RequestMetadata, TokenIssuer, User,
};

use crate::{
    error::{AuthError, messages},
    sessions::SessionIssuer,
};

#[derive(Debug, Clone)]
pub struct OAuthLoginInput {
    pub provider: String,
    pub token: Secret<String>,
}

/// OAuth login use case - federated sign-in with just-in-time provisioning
pub struct OAuthLoginUseCase<'a, S, I>
where
    S: CredentialStore,
    I: TokenIssuer,
{
    store: &'a S,
    providers: &'a OAuthProviders,
    sessions: SessionIssuer<'a, S, I>,
    clock: &'a dyn Clock,
}

impl<'a, S, I> OAuthLoginUseCase<'a, S, I>
where
    S: CredentialStore,
    I: TokenIssuer,
{
    pub fn new(
        store: &'a S,
        providers: &'a OAuthProviders,
        issuer: &'a I,
        clock: &'a dyn Clock,
    ) -> Self {
        Self {
            store,
            providers,
            sessions: SessionIssuer::new(store, issuer, clock),
            clock,
        }
    }

    #[tracing::instrument(name = "OAuthLoginUseCase::execute", skip(self, input), fields(provider = %input.provider))]
    pub async fn execute(
        &self,
        input: OAuthLoginInput,
        metadata: RequestMetadata,
    ) -> Result<AuthSession, AuthError> {
        let provider = self
            .providers
            .get(&input.provider)
            .ok_or_else(|| AuthError::internal(messages::UNSUPPORTED_PROVIDER, &input.provider))?;

        let claims = provider
            .verify_id_token(input.token.expose_secret())
            .await
            .map_err(|e| {
                tracing::warn!(provider = provider.name(), error = %e, "External token rejected");
                AuthError::unauthorized(messages::INVALID_OAUTH_TOKEN)
            })?;

        let now = self.clock.now();
        let mut user = match self.store.get_user_by_email(&claims.email).await {
            Ok(user) => {
                self.store.reset_login_attempts(user.id).await?;
                user
            }
            Err(CredentialStoreError::UserNotFound) => {
                self.provision(claims, provider.name(), now).await?
            }
            Err(e) => return Err(e.into()),
        };

        self.store
            .update_login_info(user.id, metadata.ip_address.as_deref(), now)
            .await?;

        let tokens = self.sessions.issue(&user, &metadata).await?;

        user.login_attempts = 0;
        user.locked_until = None;
        user.last_login_at = Some(now);
        user.last_login_ip = metadata.ip_address.clone();

        Ok(AuthSession {
            user: user.view(),
            tokens,
        })
    }

    /// Creates the local account. Losing a concurrent creation race is not an
    /// error: the winner's record is used instead.
    async fn provision(
        &self,
        claims: OAuthClaims,
        provider: &str,
        now: DateTime<Utc>,
    ) -> Result<User, AuthError> {
        let user = User::federated(
            claims.email,
            claims.first_name,
            claims.last_name,
            claims.avatar_url,
            provider,
            now,
        );

        match self.store.create_user(&user).await {
            Ok(()) => {
                tracing::info!(user_id = %user.id, provider, "Provisioned federated user");
                Ok(user)
            }
            Err(CredentialStoreError::UserAlreadyExists) => {
                Ok(self.store.get_user_by_email(&user.email).await?)
            }
            Err(e) => Err(e.into()),
        }
    }
}
