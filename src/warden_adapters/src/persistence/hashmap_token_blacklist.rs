use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use warden_core::{Clock, SystemClock, TokenBlacklist, TokenBlacklistError};

/// In-memory blacklist. Entries are dropped lazily once their token would
/// have expired anyway.
#[derive(Clone)]
pub struct HashMapTokenBlacklist {
    tokens: Arc<DashMap<String, DateTime<Utc>>>,
    clock: Arc<dyn Clock>,
}

impl Default for HashMapTokenBlacklist {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl HashMapTokenBlacklist {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            tokens: Arc::new(DashMap::new()),
            clock,
        }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[async_trait::async_trait]
impl TokenBlacklist for HashMapTokenBlacklist {
    async fn blacklist(
        &self,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), TokenBlacklistError> {
        if expires_at > self.clock.now() {
            self.tokens.insert(token.to_owned(), expires_at);
        }
        Ok(())
    }

    async fn is_blacklisted(&self, token: &str) -> Result<bool, TokenBlacklistError> {
        let now = self.clock.now();
        let expired = match self.tokens.get(token) {
            None => return Ok(false),
            Some(expires_at) => *expires_at <= now,
        };
        if expired {
            self.tokens.remove(token);
            return Ok(false);
        }
        Ok(true)
    }
}
