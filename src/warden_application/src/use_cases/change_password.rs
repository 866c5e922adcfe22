use secrecy::Secret;
use warden_core::{Clock, CredentialStore, Password, PasswordHasher, UserId};

use crate::error::{AuthError, messages};

#[derive(Debug, Clone)]
pub struct ChangePasswordInput {
    pub user_id: String,
    pub old_password: Secret<String>,
    pub new_password: Secret<String>,
}

/// Change password use case - re-verifies the old password, stores the new
/// digest and signs the user out everywhere
pub struct ChangePasswordUseCase<'a, S, H>
where
    S: CredentialStore,
    H: PasswordHasher,
{
    store: &'a S,
    hasher: &'a H,
    clock: &'a dyn Clock,
}

impl<'a, S, H> ChangePasswordUseCase<'a, S, H>
where
    S: CredentialStore,
    H: PasswordHasher,
{
    pub fn new(store: &'a S, hasher: &'a H, clock: &'a dyn Clock) -> Self {
        Self {
            store,
            hasher,
            clock,
        }
    }

    #[tracing::instrument(name = "ChangePasswordUseCase::execute", skip(self, input), fields(user_id = %input.user_id))]
    pub async fn execute(&self, input: ChangePasswordInput) -> Result<(), AuthError> {
        let user_id = input
            .user_id
            .parse::<UserId>()
            .map_err(|e| AuthError::Validation(e.to_string()))?;
        let new_password = Password::try_from(input.new_password)
            .map_err(|e| AuthError::Validation(e.to_string()))?;

        let user = self.store.get_user_by_id(user_id).await?;

        let old_password_matches = match &user.password_digest {
            Some(digest) => self.hasher.verify(digest, &input.old_password).await?,
            None => false,
        };
        if !old_password_matches {
            tracing::warn!(user_id = %user.id, "Password change with wrong old password");
            return Err(AuthError::unauthorized(messages::WRONG_OLD_PASSWORD));
        }

        let digest = self.hasher.hash(&new_password).await?;
        self.store
            .update_password(user.id, &digest, self.clock.now())
            .await?;

        let revoked = self.store.revoke_all_refresh_tokens(user.id).await?;
        tracing::info!(user_id = %user.id, revoked, "Password changed");

        Ok(())
    }
}
