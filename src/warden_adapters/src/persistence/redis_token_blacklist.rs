use std::sync::Arc;

use chrono::{DateTime, Utc};
use redis::{AsyncCommands, aio::MultiplexedConnection};
use warden_core::{Clock, SystemClock, TokenBlacklist, TokenBlacklistError};

/// Blacklist shared by every service instance. Each key lives exactly as
/// long as the token it names.
#[derive(Clone)]
pub struct RedisTokenBlacklist {
    conn: MultiplexedConnection,
    clock: Arc<dyn Clock>,
}

impl RedisTokenBlacklist {
    pub fn new(conn: MultiplexedConnection) -> Self {
        Self {
            conn,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

#[async_trait::async_trait]
impl TokenBlacklist for RedisTokenBlacklist {
    #[tracing::instrument(name = "Blacklisting token in Redis", skip_all)]
    async fn blacklist(
        &self,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), TokenBlacklistError> {
        let Some(ttl) = ttl_seconds(expires_at, self.clock.now()) else {
            return Ok(());
        };

        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(get_key(token), true, ttl)
            .await
            .map_err(|e| TokenBlacklistError::DatabaseError(e.to_string()))
    }

    #[tracing::instrument(name = "Checking token blacklist in Redis", skip_all)]
    async fn is_blacklisted(&self, token: &str) -> Result<bool, TokenBlacklistError> {
        let mut conn = self.conn.clone();
        conn.exists(get_key(token))
            .await
            .map_err(|e| TokenBlacklistError::DatabaseError(e.to_string()))
    }
}

const BLACKLIST_KEY_PREFIX: &str = "blacklist:token:";

fn get_key(token: &str) -> String {
    format!("{}{}", BLACKLIST_KEY_PREFIX, token)
}

/// Remaining lifetime in whole seconds, rounded up. `None` once expired.
fn ttl_seconds(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> Option<u64> {
    let remaining = (expires_at - now).num_milliseconds();
    if remaining <= 0 {
        return None;
    }
    u64::try_from(remaining).ok().map(|ms| ms.div_ceil(1000))
}
