use secrecy::Secret;
use warden_core::{
    AuthSession, Clock, CredentialStore, CredentialStoreError, Email, LockoutPolicy,
    PasswordHasher, RequestMetadata, TokenIssuer,
};

use crate::{
    error::{AuthError, messages},
    guard::BruteForceGuard,
    sessions::SessionIssuer,
};

#[derive(Debug, Clone)]
pub struct LoginInput {
    pub email: Secret<String>,
    pub password: Secret<String>,
}

/// Login use case - password authentication guarded by the lockout policy
pub struct LoginUseCase<'a, S, H, I>
where
    S: CredentialStore,
    H: PasswordHasher,
    I: TokenIssuer,
{
    store: &'a S,
    hasher: &'a H,
    guard: BruteForceGuard<'a, S>,
    sessions: SessionIssuer<'a, S, I>,
    clock: &'a dyn Clock,
}

impl<'a, S, H, I> LoginUseCase<'a, S, H, I>
where
    S: CredentialStore,
    H: PasswordHasher,
    I: TokenIssuer,
{
    pub fn new(
        store: &'a S,
        hasher: &'a H,
        issuer: &'a I,
        lockout: LockoutPolicy,
        clock: &'a dyn Clock,
    ) -> Self {
        Self {
            store,
            hasher,
            guard: BruteForceGuard::new(store, lockout),
            sessions: SessionIssuer::new(store, issuer, clock),
            clock,
        }
    }

    /// Execute the login use case
    ///
    /// An unknown email and a wrong password produce the same error.
    #[tracing::instrument(name = "LoginUseCase::execute", skip(self, input))]
    pub async fn execute(
        &self,
        input: LoginInput,
        metadata: RequestMetadata,
    ) -> Result<AuthSession, AuthError> {
        let Ok(email) = Email::try_from(input.email) else {
            return Err(self.reject_without_digest(&input.password).await);
        };

        let mut user = match self.store.get_user_by_email(&email).await {
            Ok(user) => user,
            Err(CredentialStoreError::UserNotFound) => {
                return Err(self.reject_without_digest(&input.password).await);
            }
            Err(e) => return Err(e.into()),
        };

        let now = self.clock.now();
        self.guard.ensure_unlocked(&user, now)?;

        let password_matches = match &user.password_digest {
            Some(digest) => self.hasher.verify(digest, &input.password).await?,
            None => {
                self.spend_decoy_work(&input.password).await;
                false
            }
        };

        if !password_matches {
            self.guard.record_failure(&user, now).await?;
            tracing::warn!(user_id = %user.id, "Failed login attempt");
            return Err(invalid_credentials());
        }

        self.guard.record_success(&user).await?;
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

    async fn reject_without_digest(&self, candidate: &Secret<String>) -> AuthError {
        self.spend_decoy_work(candidate).await;
        invalid_credentials()
    }

    async fn spend_decoy_work(&self, candidate: &Secret<String>) {
        if let Err(e) = self.hasher.verify_decoy(candidate).await {
            tracing::warn!(error = %e, "Decoy password verification failed");
        }
    }
}

fn invalid_credentials() -> AuthError {
    AuthError::unauthorized(messages::INVALID_CREDENTIALS)
}
