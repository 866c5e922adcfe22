use std::fmt::Display;

use thiserror::Error;
use warden_core::{
    CredentialStoreError, PasswordHasherError, TokenBlacklistError, TokenIssuerError,
};

/// User-visible failure messages shared across use cases.
pub mod messages {
    pub const INVALID_CREDENTIALS: &str = "invalid email or password";
    pub const ACCOUNT_LOCKED: &str = "account is locked, please try again later";
    pub const USER_EXISTS: &str = "user with this email already exists";
    pub const USER_NOT_FOUND: &str = "user not found";
    pub const INVALID_TOKEN: &str = "invalid or expired token";
    pub const TOKEN_REVOKED: &str = "token has been revoked";
    pub const REFRESH_NOT_FOUND: &str = "refresh token not found";
    pub const REFRESH_REVOKED: &str = "refresh token has been revoked";
    pub const REFRESH_EXPIRED: &str = "refresh token has expired";
    pub const WRONG_OLD_PASSWORD: &str = "old password is incorrect";
    pub const INVALID_OAUTH_TOKEN: &str = "invalid oauth token";
    pub const UNSUPPORTED_PROVIDER: &str = "unsupported oauth provider";
    pub const DATABASE_FAILURE: &str = "database operation failed";
    pub const PASSWORD_PROCESSING_FAILURE: &str = "failed to process password";
    pub const TOKEN_GENERATION_FAILURE: &str = "failed to generate tokens";
}

/// Failure category of an [`AuthError`]; the transport maps each one to a
/// fixed status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    Conflict,
    Unauthorized,
    Forbidden,
    NotFound,
    Database,
    Internal,
}

impl ErrorKind {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "VALIDATION_ERROR",
            ErrorKind::Conflict => "CONFLICT_ERROR",
            ErrorKind::Unauthorized => "UNAUTHORIZED",
            ErrorKind::Forbidden => "FORBIDDEN",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::Database => "DATABASE_ERROR",
            ErrorKind::Internal => "INTERNAL_ERROR",
        }
    }

    /// Database and internal faults are unexpected; everything else is a
    /// normal business outcome.
    pub fn is_fault(&self) -> bool {
        matches!(self, ErrorKind::Database | ErrorKind::Internal)
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{message}")]
    Database { message: &'static str, cause: String },
    #[error("{message}")]
    Internal { message: &'static str, cause: String },
}

impl AuthError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::Validation(_) => ErrorKind::Validation,
            AuthError::Conflict(_) => ErrorKind::Conflict,
            AuthError::Unauthorized(_) => ErrorKind::Unauthorized,
            AuthError::Forbidden(_) => ErrorKind::Forbidden,
            AuthError::NotFound(_) => ErrorKind::NotFound,
            AuthError::Database { .. } => ErrorKind::Database,
            AuthError::Internal { .. } => ErrorKind::Internal,
        }
    }

    pub fn code(&self) -> &'static str {
        self.kind().code()
    }

    /// Underlying cause for faults; never shown to callers.
    pub fn cause(&self) -> Option<&str> {
        match self {
            AuthError::Database { cause, .. } | AuthError::Internal { cause, .. } => Some(cause),
            _ => None,
        }
    }

    pub fn unauthorized(message: &str) -> Self {
        AuthError::Unauthorized(message.to_owned())
    }

    pub fn database(message: &'static str, cause: impl Display) -> Self {
        AuthError::Database {
            message,
            cause: cause.to_string(),
        }
    }

    pub fn internal(message: &'static str, cause: impl Display) -> Self {
        AuthError::Internal {
            message,
            cause: cause.to_string(),
        }
    }
}

impl From<CredentialStoreError> for AuthError {
    fn from(error: CredentialStoreError) -> Self {
        match error {
            CredentialStoreError::UserAlreadyExists => {
                AuthError::Conflict(messages::USER_EXISTS.to_owned())
            }
            CredentialStoreError::UserNotFound => {
                AuthError::NotFound(messages::USER_NOT_FOUND.to_owned())
            }
            CredentialStoreError::RefreshTokenNotFound => {
                AuthError::unauthorized(messages::REFRESH_NOT_FOUND)
            }
            CredentialStoreError::DatabaseError(cause) => {
                AuthError::database(messages::DATABASE_FAILURE, cause)
            }
        }
    }
}

impl From<PasswordHasherError> for AuthError {
    fn from(error: PasswordHasherError) -> Self {
        AuthError::internal(messages::PASSWORD_PROCESSING_FAILURE, error)
    }
}

impl From<TokenIssuerError> for AuthError {
    fn from(error: TokenIssuerError) -> Self {
        match error {
            TokenIssuerError::InvalidToken(_) | TokenIssuerError::Expired => {
                AuthError::unauthorized(messages::INVALID_TOKEN)
            }
            TokenIssuerError::SigningFailed(_) => {
                AuthError::internal(messages::TOKEN_GENERATION_FAILURE, error)
            }
        }
    }
}

impl From<TokenBlacklistError> for AuthError {
    fn from(error: TokenBlacklistError) -> Self {
        AuthError::database(messages::DATABASE_FAILURE, error)
    }
}
