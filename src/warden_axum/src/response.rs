use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use warden_core::{AuthSession, SessionValidity, UserView};

/// Body returned by every route that authenticates a user.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub success: bool,
    pub message: &'static str,
    pub user: UserView,
    pub access_token: String,
    pub refresh_token: String,
    /// Unix seconds.
    pub expires_at: i64,
    pub token_type: &'static str,
}

impl SessionResponse {
    pub fn new(session: AuthSession, message: &'static str) -> Self {
        Self {
            success: true,
            message,
            user: session.user,
            access_token: session.tokens.access_token.expose_secret().clone(),
            refresh_token: session.tokens.refresh_token.expose_secret().clone(),
            expires_at: session.tokens.expires_at.timestamp(),
            token_type: session.tokens.token_type,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ValidityResponse {
    pub success: bool,
    #[serde(flatten)]
    pub validity: SessionValidity,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
    pub message: String,
}

impl SuccessResponse {
    pub fn new(message: &str) -> Self {
        Self {
            success: true,
            message: message.to_owned(),
        }
    }
}
