use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;
use warden_core::{
    CredentialStore, CredentialStoreError, Email, PasswordDigest, RefreshToken, User, UserId,
};

#[derive(Default)]
struct State {
    users: HashMap<UserId, User>,
    emails: HashMap<Email, UserId>,
    refresh_tokens: HashMap<Uuid, RefreshToken>,
    refresh_token_values: HashMap<String, Uuid>,
}

impl State {
    fn user_mut(&mut self, id: UserId) -> Result<&mut User, CredentialStoreError> {
        self.users
            .get_mut(&id)
            .ok_or(CredentialStoreError::UserNotFound)
    }
}

/// Process-local credential store. One lock guards every map, so the
/// uniqueness check and the insert, or the read and the flip of a revoke,
/// happen as one step.
#[derive(Default, Clone)]
pub struct HashMapCredentialStore {
    state: Arc<RwLock<State>>,
}

impl HashMapCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl CredentialStore for HashMapCredentialStore {
    async fn create_user(&self, user: &User) -> Result<(), CredentialStoreError> {
        let mut state = self.state.write().await;
        if state.emails.contains_key(&user.email) || state.users.contains_key(&user.id) {
            return Err(CredentialStoreError::UserAlreadyExists);
        }
        state.emails.insert(user.email.clone(), user.id);
        state.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn get_user_by_email(&self, email: &Email) -> Result<User, CredentialStoreError> {
        let state = self.state.read().await;
        state
            .emails
            .get(email)
            .and_then(|id| state.users.get(id))
            .cloned()
            .ok_or(CredentialStoreError::UserNotFound)
    }

    async fn get_user_by_id(&self, id: UserId) -> Result<User, CredentialStoreError> {
        let state = self.state.read().await;
        state
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
        let mut state = self.state.write().await;
        let user = state.user_mut(id)?;
        user.password_digest = Some(digest.clone());
        user.password_changed_at = Some(changed_at);
        user.updated_at = changed_at;
        Ok(())
    }

    async fn update_login_info(
        &self,
        id: UserId,
        ip_address: Option<&str>,
        at: DateTime<Utc>,
    ) -> Result<(), CredentialStoreError> {
        let mut state = self.state.write().await;
        let user = state.user_mut(id)?;
        user.last_login_at = Some(at);
        user.last_login_ip = ip_address.map(str::to_owned);
        user.updated_at = at;
        Ok(())
    }

    async fn increment_login_attempts(&self, id: UserId) -> Result<u32, CredentialStoreError> {
        let mut state = self.state.write().await;
        let user = state.user_mut(id)?;
        user.login_attempts = user.login_attempts.saturating_add(1);
        Ok(user.login_attempts)
    }

    async fn reset_login_attempts(&self, id: UserId) -> Result<(), CredentialStoreError> {
        let mut state = self.state.write().await;
        let user = state.user_mut(id)?;
        user.login_attempts = 0;
        user.locked_until = None;
        Ok(())
    }

    async fn lock_account(
        &self,
        id: UserId,
        until: DateTime<Utc>,
    ) -> Result<(), CredentialStoreError> {
        let mut state = self.state.write().await;
        state.user_mut(id)?.locked_until = Some(until);
        Ok(())
    }

    async fn save_refresh_token(&self, token: &RefreshToken) -> Result<(), CredentialStoreError> {
        let mut state = self.state.write().await;
        if !state.users.contains_key(&token.user_id) {
            return Err(CredentialStoreError::UserNotFound);
        }
        if state.refresh_token_values.contains_key(token.value.as_str()) {
            return Err(CredentialStoreError::DatabaseError(
                "duplicate refresh token value".to_owned(),
            ));
        }
        state
            .refresh_token_values
            .insert(token.value.as_str().to_owned(), token.id);
        state.refresh_tokens.insert(token.id, token.clone());
        Ok(())
    }

    async fn find_refresh_token(&self, value: &str) -> Result<RefreshToken, CredentialStoreError> {
        let state = self.state.read().await;
        state
            .refresh_token_values
            .get(value)
            .and_then(|id| state.refresh_tokens.get(id))
            .cloned()
            .ok_or(CredentialStoreError::RefreshTokenNotFound)
    }

    async fn revoke_refresh_token(&self, id: Uuid) -> Result<bool, CredentialStoreError> {
        let mut state = self.state.write().await;
        let token = state
            .refresh_tokens
            .get_mut(&id)
            .ok_or(CredentialStoreError::RefreshTokenNotFound)?;
        if token.revoked {
            return Ok(false);
        }
        token.revoked = true;
        Ok(true)
    }

    async fn revoke_all_refresh_tokens(
        &self,
        user_id: UserId,
    ) -> Result<u64, CredentialStoreError> {
        let mut state = self.state.write().await;
        let mut revoked = 0;
        for token in state
            .refresh_tokens
            .values_mut()
            .filter(|token| token.user_id == user_id && !token.revoked)
        {
            token.revoked = true;
            revoked += 1;
        }
        Ok(revoked)
    }
}
