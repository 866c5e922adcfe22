//! Hand-written collaborators for the use-case tests.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use secrecy::{ExposeSecret, Secret};
use tokio::sync::RwLock;
use uuid::Uuid;
use warden_core::{
    AccessClaims, Clock, CredentialStore, CredentialStoreError, Email, ManualClock, OAuthClaims,
    OAuthError, OAuthProvider, OAuthProviders, Password, PasswordDigest, PasswordHasher,
    PasswordHasherError, RefreshToken, RefreshTokenValue, RegistrationForm, RequestMetadata,
    SignedAccessToken, TokenBlacklist, TokenBlacklistError, TokenIssuer, TokenIssuerError, User,
    UserId, UserType,
};

use crate::{
    orchestrator::AuthOrchestrator,
    retry::RetryPolicy,
    use_cases::{login::LoginInput, oauth_login::OAuthLoginInput},
};

#[derive(Default)]
struct StoreState {
    users: HashMap<UserId, User>,
    tokens: HashMap<String, RefreshToken>,
}

#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<StoreState>>,
    transient_create_failures: Arc<AtomicU32>,
    create_calls: Arc<AtomicU32>,
}

impl InMemoryStore {
    pub fn failing_creates(failures: u32) -> Self {
        let store = Self::default();
        store
            .transient_create_failures
            .store(failures, Ordering::SeqCst);
        store
    }

    pub fn create_calls(&self) -> u32 {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub async fn insert(&self, user: User) {
        self.state.write().await.users.insert(user.id, user);
    }

    pub async fn user(&self, id: UserId) -> User {
        self.state.read().await.users[&id].clone()
    }

    pub async fn update_user(&self, id: UserId, change: impl FnOnce(&mut User)) {
        if let Some(user) = self.state.write().await.users.get_mut(&id) {
            change(user);
        }
    }

    pub async fn remove_user(&self, id: UserId) {
        self.state.write().await.users.remove(&id);
    }

    pub async fn token(&self, value: &str) -> RefreshToken {
        self.state.read().await.tokens[value].clone()
    }

    async fn with_user<T>(
        &self,
        id: UserId,
        change: impl FnOnce(&mut User) -> T,
    ) -> Result<T, CredentialStoreError> {
        let mut state = self.state.write().await;
        let user = state
            .users
            .get_mut(&id)
            .ok_or(CredentialStoreError::UserNotFound)?;
        Ok(change(user))
    }
}

#[async_trait]
impl CredentialStore for InMemoryStore {
    async fn create_user(&self, user: &User) -> Result<(), CredentialStoreError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        let injected = self
            .transient_create_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        if injected.is_ok() {
            return Err(CredentialStoreError::DatabaseError(
                "injected failure".into(),
            ));
        }

        let mut state = self.state.write().await;
        if state.users.values().any(|u| u.email == user.email) {
            return Err(CredentialStoreError::UserAlreadyExists);
        }
        state.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn get_user_by_email(&self, email: &Email) -> Result<User, CredentialStoreError> {
        self.state
            .read()
            .await
            .users
            .values()
            .find(|u| &u.email == email)
            .cloned()
            .ok_or(CredentialStoreError::UserNotFound)
    }

    async fn get_user_by_id(&self, id: UserId) -> Result<User, CredentialStoreError> {
        self.state
            .read()
            .await
            .users
            .get(&id)
            .cloned()
            .ok_or(CredentialStoreError::UserNotFound)
    }

    async fn update_password(
        &self,
        id: UserId,
        digest: &PasswordDigest,
        changed_at: DateTime<Utc>,
    ) -> Result<(), CredentialStoreError> {
        self.with_user(id, |user| {
            user.password_digest = Some(digest.clone());
            user.password_changed_at = Some(changed_at);
        })
        .await
    }

    async fn update_login_info(
        &self,
        id: UserId,
        ip_address: Option<&str>,
        at: DateTime<Utc>,
    ) -> Result<(), CredentialStoreError> {
        self.with_user(id, |user| {
            user.last_login_at = Some(at);
            user.last_login_ip = ip_address.map(str::to_owned);
        })
        .await
    }

    async fn increment_login_attempts(&self, id: UserId) -> Result<u32, CredentialStoreError> {
        self.with_user(id, |user| {
            user.login_attempts += 1;
            user.login_attempts
        })
        .await
    }

    async fn reset_login_attempts(&self, id: UserId) -> Result<(), CredentialStoreError> {
        self.with_user(id, |user| {
            user.login_attempts = 0;
            user.locked_until = None;
        })
        .await
    }

    async fn lock_account(
        &self,
        id: UserId,
        until: DateTime<Utc>,
    ) -> Result<(), CredentialStoreError> {
        self.with_user(id, |user| user.locked_until = Some(until))
            .await
    }

    async fn save_refresh_token(&self, token: &RefreshToken) -> Result<(), CredentialStoreError> {
        self.state
            .write()
            .await
            .tokens
            .insert(token.value.as_str().to_owned(), token.clone());
        Ok(())
    }

    async fn find_refresh_token(&self, value: &str) -> Result<RefreshToken, CredentialStoreError> {
        self.state
            .read()
            .await
            .tokens
            .get(value)
            .cloned()
            .ok_or(CredentialStoreError::RefreshTokenNotFound)
    }

    async fn revoke_refresh_token(&self, id: Uuid) -> Result<bool, CredentialStoreError> {
        let mut state = self.state.write().await;
        Ok(state
            .tokens
            .values_mut()
            .find(|t| t.id == id && !t.revoked)
            .map(|t| t.revoked = true)
            .is_some())
    }

    async fn revoke_all_refresh_tokens(
        &self,
        user_id: UserId,
    ) -> Result<u64, CredentialStoreError> {
        let mut state = self.state.write().await;
        let mut revoked = 0;
        for token in state
            .tokens
            .values_mut()
            .filter(|t| t.user_id == user_id && !t.revoked)
        {
            token.revoked = true;
            revoked += 1;
        }
        Ok(revoked)
    }
}

/// Stores passwords behind a marker prefix; only equality matters here.
#[derive(Clone, Default)]
pub struct PlainHasher {
    decoys: Arc<AtomicUsize>,
}

impl PlainHasher {
    pub fn decoy_checks(&self) -> usize {
        self.decoys.load(Ordering::SeqCst)
    }
}

const PLAIN_PREFIX: &str = "plain$";

#[async_trait]
impl PasswordHasher for PlainHasher {
    async fn hash(&self, password: &Password) -> Result<PasswordDigest, PasswordHasherError> {
        Ok(PasswordDigest::new(format!(
            "{PLAIN_PREFIX}{}",
            password.expose()
        )))
    }

    async fn verify(
        &self,
        digest: &PasswordDigest,
        candidate: &Secret<String>,
    ) -> Result<bool, PasswordHasherError> {
        Ok(digest.as_str() == format!("{PLAIN_PREFIX}{}", candidate.expose_secret()))
    }

    async fn verify_decoy(&self, _candidate: &Secret<String>) -> Result<(), PasswordHasherError> {
        self.decoys.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Hands out random access tokens and remembers their claims.
#[derive(Clone)]
pub struct FakeIssuer {
    clock: ManualClock,
    issued: Arc<std::sync::Mutex<HashMap<String, AccessClaims>>>,
}

const ACCESS_TTL_MINUTES: i64 = 15;
const REFRESH_TTL_HOURS: i64 = 24;

impl TokenIssuer for FakeIssuer {
    fn generate_access_token(
        &self,
        user_id: UserId,
        email: &Email,
        user_type: UserType,
    ) -> Result<SignedAccessToken, TokenIssuerError> {
        let now = self.clock.now();
        let expires_at = now + Duration::minutes(ACCESS_TTL_MINUTES);
        let claims = AccessClaims {
            sub: user_id,
            email: Secret::new(email.as_str().to_owned()),
            user_type,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            iss: None,
        };
        let token = format!("access-{}", Uuid::new_v4());
        self.issued
            .lock()
            .map_err(|e| TokenIssuerError::SigningFailed(e.to_string()))?
            .insert(token.clone(), claims);

        Ok(SignedAccessToken {
            token: Secret::new(token),
            expires_at,
        })
    }

    fn validate_access_token(&self, token: &str) -> Result<AccessClaims, TokenIssuerError> {
        let claims = self
            .issued
            .lock()
            .map_err(|e| TokenIssuerError::InvalidToken(e.to_string()))?
            .get(token)
            .cloned()
            .ok_or_else(|| TokenIssuerError::InvalidToken("unknown token".into()))?;

        if self.clock.now().timestamp() >= claims.exp {
            return Err(TokenIssuerError::Expired);
        }
        Ok(claims)
    }

    fn generate_refresh_token(&self) -> RefreshTokenValue {
        RefreshTokenValue::new(Uuid::new_v4().simple().to_string())
    }

    fn refresh_token_ttl(&self) -> Duration {
        Duration::hours(REFRESH_TTL_HOURS)
    }
}

#[derive(Clone, Default)]
pub struct MemoryBlacklist {
    tokens: Arc<RwLock<HashSet<String>>>,
}

#[async_trait]
impl TokenBlacklist for MemoryBlacklist {
    async fn blacklist(
        &self,
        token: &str,
        _expires_at: DateTime<Utc>,
    ) -> Result<(), TokenBlacklistError> {
        self.tokens.write().await.insert(token.to_owned());
        Ok(())
    }

    async fn is_blacklisted(&self, token: &str) -> Result<bool, TokenBlacklistError> {
        Ok(self.tokens.read().await.contains(token))
    }
}

pub const GOOGLE_TOKEN: &str = "valid-google-token";

/// Accepts exactly one token and asserts a fixed identity for it.
pub struct StaticGoogle;

#[async_trait]
impl OAuthProvider for StaticGoogle {
    fn name(&self) -> &'static str {
        "google"
    }

    async fn verify_id_token(&self, token: &str) -> Result<OAuthClaims, OAuthError> {
        if token != GOOGLE_TOKEN {
            return Err(OAuthError::Rejected("bad signature".into()));
        }
        Ok(OAuthClaims {
            email: Email::try_from("Federated@Example.com")
                .map_err(|e| OAuthError::Rejected(e.to_string()))?,
            first_name: "Fed".into(),
            last_name: "Erated".into(),
            avatar_url: Some("https://example.com/a.png".into()),
        })
    }
}

pub type TestOrchestrator = AuthOrchestrator<InMemoryStore, PlainHasher, FakeIssuer, MemoryBlacklist>;

pub struct Harness {
    pub orchestrator: TestOrchestrator,
    pub store: InMemoryStore,
    pub hasher: PlainHasher,
    pub clock: ManualClock,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_store(InMemoryStore::default())
    }

    pub fn with_failing_creates(failures: u32) -> Self {
        Self::with_store(InMemoryStore::failing_creates(failures))
    }

    fn with_store(store: InMemoryStore) -> Self {
        // Whole seconds keep token expiry and clock comparisons exact.
        let start = Utc
            .timestamp_opt(1_700_000_000, 0)
            .single()
            .unwrap_or_else(Utc::now);
        let clock = ManualClock::new(start);
        let issuer = FakeIssuer {
            clock: clock.clone(),
            issued: Arc::default(),
        };

        let hasher = PlainHasher::default();
        let orchestrator = AuthOrchestrator::new(
            store.clone(),
            hasher.clone(),
            issuer,
            MemoryBlacklist::default(),
        )
                .with_oauth_providers(OAuthProviders::new().with_provider(Arc::new(StaticGoogle)))
                .with_retry_policy(RetryPolicy::new(
                    3,
                    StdDuration::from_millis(1),
                    StdDuration::from_millis(5),
                ))
                .with_clock(Arc::new(clock.clone()));

        Self {
            orchestrator,
            store,
            hasher,
            clock,
        }
    }
}

pub fn registered_user(email: &str, password: &str) -> User {
    User::registered(
        Email::try_from(email).unwrap(),
        PasswordDigest::new(format!("{PLAIN_PREFIX}{password}")),
        "Test".into(),
        "User".into(),
        None,
        UserType::Client,
        Utc::now(),
    )
}

pub fn registration_form(email: &str) -> RegistrationForm {
    RegistrationForm {
        email: Secret::new(email.to_owned()),
        password: Secret::new("Passw0rd!".to_owned()),
        first_name: "Ada".to_owned(),
        last_name: "Lovelace".to_owned(),
        phone: Some("5551234".to_owned()),
        user_type: "client".to_owned(),
    }
}

pub fn login(email: &str, password: &str) -> LoginInput {
    LoginInput {
        email: Secret::new(email.to_owned()),
        password: Secret::new(password.to_owned()),
    }
}

pub fn google_login() -> OAuthLoginInput {
    OAuthLoginInput {
        provider: "google".to_owned(),
        token: Secret::new(GOOGLE_TOKEN.to_owned()),
    }
}

pub fn metadata() -> RequestMetadata {
    RequestMetadata {
        user_agent: Some("test-agent".to_owned()),
        ip_address: Some("203.0.113.7".to_owned()),
        device_id: Some("device-1".to_owned()),
    }
}
