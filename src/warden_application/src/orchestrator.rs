use std::sync::Arc;

use async_trait::async_trait;
use warden_core::{
    AuthSession, Clock, CredentialStore, LockoutPolicy, OAuthProviders, PasswordHasher,
    RegistrationForm, RequestMetadata, SessionValidity, SystemClock, TokenBlacklist, TokenIssuer,
};

use crate::{
    error::AuthError,
    retry::RetryPolicy,
    use_cases::{
        change_password::{ChangePasswordInput, ChangePasswordUseCase},
        login::{LoginInput, LoginUseCase},
        logout::{LogoutInput, LogoutUseCase},
        oauth_login::{OAuthLoginInput, OAuthLoginUseCase},
        refresh_session::{RefreshSessionInput, RefreshSessionUseCase},
        register::RegisterUseCase,
        validate_session::{ValidateSessionInput, ValidateSessionUseCase},
    },
};

/// Every operation the transport can invoke.
#[async_trait]
pub trait AuthUseCases: Clone + Send + Sync + 'static {
    async fn register(
        &self,
        form: RegistrationForm,
        metadata: RequestMetadata,
    ) -> Result<AuthSession, AuthError>;

    async fn login(
        &self,
        input: LoginInput,
        metadata: RequestMetadata,
    ) -> Result<AuthSession, AuthError>;

    async fn oauth_login(
        &self,
        input: OAuthLoginInput,
        metadata: RequestMetadata,
    ) -> Result<AuthSession, AuthError>;

    async fn refresh_session(
        &self,
        input: RefreshSessionInput,
        metadata: RequestMetadata,
    ) -> Result<AuthSession, AuthError>;

    async fn validate_session(
        &self,
        input: ValidateSessionInput,
    ) -> Result<SessionValidity, AuthError>;

    async fn change_password(&self, input: ChangePasswordInput) -> Result<(), AuthError>;

    async fn logout(&self, input: LogoutInput) -> Result<(), AuthError>;
}

/// Composes the store, hasher, token issuer, blacklist and OAuth providers
/// into the authentication use cases.
///
/// Holds no request-scoped state; clones share the same collaborators.
#[derive(Clone)]
pub struct AuthOrchestrator<S, H, I, B> {
    store: S,
    hasher: H,
    issuer: I,
    blacklist: B,
    providers: OAuthProviders,
    lockout: LockoutPolicy,
    retry: RetryPolicy,
    clock: Arc<dyn Clock>,
}

impl<S, H, I, B> AuthOrchestrator<S, H, I, B>
where
    S: CredentialStore,
    H: PasswordHasher,
    I: TokenIssuer,
    B: TokenBlacklist,
{
    pub fn new(store: S, hasher: H, issuer: I, blacklist: B) -> Self {
        Self {
            store,
            hasher,
            issuer,
            blacklist,
            providers: OAuthProviders::default(),
            lockout: LockoutPolicy::default(),
            retry: RetryPolicy::default(),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_oauth_providers(mut self, providers: OAuthProviders) -> Self {
        self.providers = providers;
        self
    }

    pub fn with_lockout_policy(mut self, lockout: LockoutPolicy) -> Self {
        self.lockout = lockout;
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

#[async_trait]
impl<S, H, I, B> AuthUseCases for AuthOrchestrator<S, H, I, B>
where
    S: CredentialStore + Clone + 'static,
    H: PasswordHasher + Clone + 'static,
    I: TokenIssuer + Clone + 'static,
    B: TokenBlacklist + Clone + 'static,
{
    async fn register(
        &self,
        form: RegistrationForm,
        metadata: RequestMetadata,
    ) -> Result<AuthSession, AuthError> {
        RegisterUseCase::new(
            &self.store,
            &self.hasher,
            &self.issuer,
            &self.retry,
            self.clock.as_ref(),
        )
        .execute(form, metadata)
        .await
    }

    async fn login(
        &self,
        input: LoginInput,
        metadata: RequestMetadata,
    ) -> Result<AuthSession, AuthError> {
        LoginUseCase::new(
            &self.store,
            &self.hasher,
            &self.issuer,
            self.lockout,
            self.clock.as_ref(),
        )
        .execute(input, metadata)
        .await
    }

    async fn oauth_login(
        &self,
        input: OAuthLoginInput,
        metadata: RequestMetadata,
    ) -> Result<AuthSession, AuthError> {
        OAuthLoginUseCase::new(
            &self.store,
            &self.providers,
            &self.issuer,
            self.clock.as_ref(),
        )
        .execute(input, metadata)
        .await
    }

    async fn refresh_session(
        &self,
        input: RefreshSessionInput,
        metadata: RequestMetadata,
    ) -> Result<AuthSession, AuthError> {
        RefreshSessionUseCase::new(&self.store, &self.issuer, self.clock.as_ref())
            .execute(input, metadata)
            .await
    }

    async fn validate_session(
        &self,
        input: ValidateSessionInput,
    ) -> Result<SessionValidity, AuthError> {
        ValidateSessionUseCase::new(&self.store, &self.issuer, &self.blacklist)
            .execute(input)
            .await
    }

    async fn change_password(&self, input: ChangePasswordInput) -> Result<(), AuthError> {
        ChangePasswordUseCase::new(&self.store, &self.hasher, self.clock.as_ref())
            .execute(input)
            .await
    }

    async fn logout(&self, input: LogoutInput) -> Result<(), AuthError> {
        LogoutUseCase::new(&self.store, &self.issuer, &self.blacklist)
            .execute(input)
            .await
    }
}
