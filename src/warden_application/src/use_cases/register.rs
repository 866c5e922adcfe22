use warden_core::{
    AuthSession, Clock, CredentialStore, CredentialStoreError, PasswordHasher, Registration,
    RegistrationForm, RequestMetadata, TokenIssuer, User,
};

use crate::{
    error::{AuthError, messages},
    retry::RetryPolicy,
    sessions::SessionIssuer,
};

/// Register use case - self-service account creation
pub struct RegisterUseCase<'a, S, H, I>
where
    S: CredentialStore,
    H: PasswordHasher,
    I: TokenIssuer,
{
    store: &'a S,
    hasher: &'a H,
    sessions: SessionIssuer<'a, S, I>,
    retry: &'a RetryPolicy,
    clock: &'a dyn Clock,
}

impl<'a, S, H, I> RegisterUseCase<'a, S, H, I>
where
    S: CredentialStore,
    H: PasswordHasher,
    I: TokenIssuer,
{
    pub fn new(
        store: &'a S,
        hasher: &'a H,
        issuer: &'a I,
        retry: &'a RetryPolicy,
        clock: &'a dyn Clock,
    ) -> Self {
        Self {
            store,
            hasher,
            sessions: SessionIssuer::new(store, issuer, clock),
            retry,
            clock,
        }
    }

    /// Execute the register use case
    ///
    /// The pre-check on the email only produces a friendlier early answer;
    /// the store's unique constraint is what actually decides a race.
    #[tracing::instrument(name = "RegisterUseCase::execute", skip(self, form))]
    pub async fn execute(
        &self,
        form: RegistrationForm,
        metadata: RequestMetadata,
    ) -> Result<AuthSession, AuthError> {
        let registration = Registration::try_from(form)
            .map_err(|errors| AuthError::Validation(errors.message()))?;

        match self.store.get_user_by_email(&registration.email).await {
            Ok(_) => return Err(AuthError::Conflict(messages::USER_EXISTS.to_owned())),
            Err(CredentialStoreError::UserNotFound) => {}
            Err(e) => return Err(e.into()),
        }

        let digest = self.hasher.hash(&registration.password).await?;

        let user = User::registered(
            registration.email,
            digest,
            registration.first_name,
            registration.last_name,
            registration.phone,
            registration.user_type,
            self.clock.now(),
        );

        self.retry
            .run(
                "create user",
                || self.store.create_user(&user),
                CredentialStoreError::is_transient,
            )
            .await?;

        tracing::info!(user_id = %user.id, user_type = %user.user_type, "User registered");

        let tokens = self.sessions.issue(&user, &metadata).await?;

        Ok(AuthSession {
            user: user.view(),
            tokens,
        })
    }
}
