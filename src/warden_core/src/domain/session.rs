use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize, ser::SerializeStruct};

use super::user::{UserId, UserType, UserView};

pub const TOKEN_TYPE: &str = "Bearer";

/// Where a request came from. Every field is best effort.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestMetadata {
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
    pub device_id: Option<String>,
}

/// Claims carried by a signed access token.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessClaims {
    pub sub: UserId,
    pub email: Secret<String>,
    pub user_type: UserType,
    pub iat: i64,
    pub exp: i64,
    #[serde(default)]
    pub iss: Option<String>,
}

impl AccessClaims {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}

impl Serialize for AccessClaims {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("AccessClaims", 6)?;
        state.serialize_field("sub", &self.sub)?;
        state.serialize_field("email", self.email.expose_secret())?;
        state.serialize_field("user_type", &self.user_type)?;
        state.serialize_field("iat", &self.iat)?;
        state.serialize_field("exp", &self.exp)?;
        state.serialize_field("iss", &self.iss)?;
        state.end()
    }
}

/// A freshly signed access token together with its expiry.
#[derive(Debug, Clone)]
pub struct SignedAccessToken {
    pub token: Secret<String>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct TokenBundle {
    pub access_token: Secret<String>,
    pub refresh_token: Secret<String>,
    pub expires_at: DateTime<Utc>,
    pub token_type: &'static str,
}

/// Result of every successful authentication event.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: UserView,
    pub tokens: TokenBundle,
}

/// Liveness-augmented answer to "is this access token good right now".
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionValidity {
    pub valid: bool,
    pub user_id: UserId,
    pub email: String,
    pub user_type: UserType,
    pub is_active: bool,
    pub is_verified: bool,
    pub expires_at: DateTime<Utc>,
}
