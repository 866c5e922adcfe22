use secrecy::Secret;
use warden_core::{
    Clock, CredentialStore, RefreshToken, RequestMetadata, TOKEN_TYPE, TokenBundle, TokenIssuer,
    User,
};

use crate::error::AuthError;

/// Issues an access/refresh pair for a user and persists the refresh half.
pub struct SessionIssuer<'a, S, I>
where
    S: CredentialStore,
    I: TokenIssuer,
{
    store: &'a S,
    issuer: &'a I,
    clock: &'a dyn Clock,
}

impl<'a, S, I> SessionIssuer<'a, S, I>
where
    S: CredentialStore,
    I: TokenIssuer,
{
    pub fn new(store: &'a S, issuer: &'a I, clock: &'a dyn Clock) -> Self {
        Self {
            store,
            issuer,
            clock,
        }
    }

    pub async fn issue(
        &self,
        user: &User,
        metadata: &RequestMetadata,
    ) -> Result<TokenBundle, AuthError> {
        let access = self
            .issuer
            .generate_access_token(user.id, &user.email, user.user_type)?;

        let refresh = RefreshToken::issue(
            user.id,
            self.issuer.generate_refresh_token(),
            self.issuer.refresh_token_ttl(),
            self.clock.now(),
            metadata,
        );
        self.store.save_refresh_token(&refresh).await?;

        Ok(TokenBundle {
            access_token: access.token,
            refresh_token: Secret::new(refresh.value.as_str().to_owned()),
            expires_at: access.expires_at,
            token_type: TOKEN_TYPE,
        })
    }
}
