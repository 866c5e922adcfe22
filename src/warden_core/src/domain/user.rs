use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::{email::Email, password::PasswordDigest};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserError {
    #[error("invalid email format")]
    InvalidEmail,
    #[error("password must be at least 8 characters")]
    PasswordTooShort,
    #[error("password must be at most 128 characters")]
    PasswordTooLong,
    #[error("{0} must be between 2 and 50 characters")]
    InvalidName(&'static str),
    #[error("invalid phone number")]
    InvalidPhone,
    #[error("user type must be client or master")]
    InvalidUserType,
    #[error("invalid user id")]
    InvalidUserId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(Uuid);

impl UserId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for UserId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl FromStr for UserId {
    type Err = UserError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_| UserError::InvalidUserId)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    Client,
    Master,
    Admin,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Client => "client",
            UserType::Master => "master",
            UserType::Admin => "admin",
        }
    }

    /// Whether an account of this type may be created through self-registration.
    pub fn is_self_registrable(&self) -> bool {
        matches!(self, UserType::Client | UserType::Master)
    }
}

impl FromStr for UserType {
    type Err = UserError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "client" => Ok(UserType::Client),
            "master" | "provider" => Ok(UserType::Master),
            "admin" => Ok(UserType::Admin),
            _ => Err(UserError::InvalidUserType),
        }
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persisted identity record.
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    /// `None` for accounts that only ever signed in through an external provider.
    pub password_digest: Option<PasswordDigest>,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub user_type: UserType,
    pub auth_provider: Option<String>,
    pub avatar_url: Option<String>,
    pub is_active: bool,
    pub is_verified: bool,
    pub login_attempts: u32,
    pub last_login_at: Option<DateTime<Utc>>,
    pub last_login_ip: Option<String>,
    pub locked_until: Option<DateTime<Utc>>,
    pub password_changed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Account created through self-registration: active, not yet verified.
    pub fn registered(
        email: Email,
        password_digest: PasswordDigest,
        first_name: String,
        last_name: String,
        phone: Option<String>,
        user_type: UserType,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: UserId::new(),
            email,
            password_digest: Some(password_digest),
            first_name,
            last_name,
            phone,
            user_type,
            auth_provider: None,
            avatar_url: None,
            is_active: true,
            is_verified: false,
            login_attempts: 0,
            last_login_at: None,
            last_login_ip: None,
            locked_until: None,
            password_changed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Account provisioned on first external-provider login. The provider has
    /// already vouched for the email, so the account starts verified.
    pub fn federated(
        email: Email,
        first_name: String,
        last_name: String,
        avatar_url: Option<String>,
        provider: &str,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: UserId::new(),
            email,
            password_digest: None,
            first_name,
            last_name,
            phone: None,
            user_type: UserType::Client,
            auth_provider: Some(provider.to_owned()),
            avatar_url,
            is_active: true,
            is_verified: true,
            login_attempts: 0,
            last_login_at: None,
            last_login_ip: None,
            locked_until: None,
            password_changed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn has_password(&self) -> bool {
        self.password_digest.is_some()
    }

    pub fn view(&self) -> UserView {
        UserView {
            id: self.id,
            email: self.email.as_str().to_owned(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            phone: self.phone.clone(),
            user_type: self.user_type,
            avatar_url: self.avatar_url.clone(),
            is_active: self.is_active,
            is_verified: self.is_verified,
            created_at: self.created_at,
            last_login_at: self.last_login_at,
        }
    }
}

/// The part of a user record that may leave the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserView {
    pub id: UserId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub user_type: UserType,
    pub avatar_url: Option<String>,
    pub is_active: bool,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}
