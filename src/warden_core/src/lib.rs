pub mod clock;
pub mod domain;
pub mod lockout;
pub mod ports;

// Re-export commonly used types for convenience
pub use clock::{Clock, ManualClock, SystemClock};

pub use domain::{
    email::Email,
    oauth::{OAuthClaims, split_full_name},
    password::{MIN_PASSWORD_LENGTH, Password, PasswordDigest},
    refresh_token::{RefreshToken, RefreshTokenValue},
    registration::{Registration, RegistrationErrors, RegistrationForm},
    session::{
        AccessClaims, AuthSession, RequestMetadata, SessionValidity, SignedAccessToken,
        TOKEN_TYPE, TokenBundle,
    },
    user::{User, UserError, UserId, UserType, UserView},
};

pub use lockout::{LOCKOUT_DURATION_MINUTES, LockState, LockoutPolicy, MAX_LOGIN_ATTEMPTS};

pub use ports::{
    repositories::{CredentialStore, CredentialStoreError, TokenBlacklist, TokenBlacklistError},
    services::{
        OAuthError, OAuthProvider, OAuthProviders, PasswordHasher, PasswordHasherError,
        TokenIssuer, TokenIssuerError,
    },
};
