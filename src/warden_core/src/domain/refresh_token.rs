use chrono::{DateTime, Duration, Utc};
use secrecy::{ExposeSecret, Secret};
use uuid::Uuid;

use super::{session::RequestMetadata, user::UserId};

/// Opaque refresh-token value handed to the client.
#[derive(Debug, Clone)]
pub struct RefreshTokenValue(Secret<String>);

impl RefreshTokenValue {
    pub fn new(value: String) -> Self {
        Self(Secret::new(value))
    }

    pub fn as_str(&self) -> &str {
        self.0.expose_secret()
    }
}

/// Server-side record backing a refresh token.
#[derive(Debug, Clone)]
pub struct RefreshToken {
    pub id: Uuid,
    pub user_id: UserId,
    pub value: RefreshTokenValue,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub revoked: bool,
    pub device_id: Option<String>,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
}

impl RefreshToken {
    pub fn issue(
        user_id: UserId,
        value: RefreshTokenValue,
        ttl: Duration,
        now: DateTime<Utc>,
        metadata: &RequestMetadata,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            value,
            expires_at: now + ttl,
            created_at: now,
            revoked: false,
            device_id: metadata.device_id.clone(),
            user_agent: metadata.user_agent.clone(),
            ip_address: metadata.ip_address.clone(),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Metadata for a replacement token: the device stays the same, the
    /// client details come from the current request when it has them.
    pub fn rotated_metadata(&self, current: &RequestMetadata) -> RequestMetadata {
        RequestMetadata {
            user_agent: current
                .user_agent
                .clone()
                .or_else(|| self.user_agent.clone()),
            ip_address: current
                .ip_address
                .clone()
                .or_else(|| self.ip_address.clone()),
            device_id: self.device_id.clone().or_else(|| current.device_id.clone()),
        }
    }
}
