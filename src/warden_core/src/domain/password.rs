use secrecy::{ExposeSecret, Secret};

use super::user::UserError;

pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// A password that satisfies the account password policy.
///
/// Only passwords that are about to be stored go through this type. Login
/// candidates stay plain `Secret<String>` so a short wrong password is
/// reported as a credential failure.
#[derive(Debug, Clone)]
pub struct Password(Secret<String>);

impl Password {
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl AsRef<Secret<String>> for Password {
    fn as_ref(&self) -> &Secret<String> {
        &self.0
    }
}

impl TryFrom<Secret<String>> for Password {
    type Error = UserError;

    fn try_from(value: Secret<String>) -> Result<Self, Self::Error> {
        let length = value.expose_secret().chars().count();
        if length < MIN_PASSWORD_LENGTH {
            return Err(UserError::PasswordTooShort);
        }
        if length > MAX_PASSWORD_LENGTH {
            return Err(UserError::PasswordTooLong);
        }
        Ok(Self(value))
    }
}

/// Encoded one-way digest of a password, as produced by the hasher.
#[derive(Debug, Clone)]
pub struct PasswordDigest(Secret<String>);

impl PasswordDigest {
    pub fn new(encoded: String) -> Self {
        Self(Secret::new(encoded))
    }

    pub fn as_str(&self) -> &str {
        self.0.expose_secret()
    }
}
