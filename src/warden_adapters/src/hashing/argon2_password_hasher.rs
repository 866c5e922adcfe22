use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordVerifier, Version,
    password_hash::{self, PasswordHasher as _, SaltString, rand_core},
};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use warden_core::{Password, PasswordDigest, PasswordHasher, PasswordHasherError};

// Work factor for newly computed digests. Existing digests carry their own
// parameters, so raising these never breaks verification.
pub const HASH_MEMORY_KIB: u32 = 15000;
pub const HASH_ITERATIONS: u32 = 2;
pub const HASH_PARALLELISM: u32 = 1;

// Fixed salt and all-zero output; no password hashes to it.
const DECOY_SALT: &str = "d2FyZGVuLWRlY295LXNhbHQ";
const DECOY_OUTPUT: &str = "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Argon2Cost {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for Argon2Cost {
    fn default() -> Self {
        Self {
            memory_kib: HASH_MEMORY_KIB,
            iterations: HASH_ITERATIONS,
            parallelism: HASH_PARALLELISM,
        }
    }
}

impl Argon2Cost {
    fn hasher(&self) -> Result<Argon2<'static>, PasswordHasherError> {
        let params = Params::new(self.memory_kib, self.iterations, self.parallelism, None)
            .map_err(|e| PasswordHasherError::HashingFailed(e.to_string()))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }

    /// A well-formed digest at this cost that never verifies.
    fn decoy_digest(&self) -> PasswordDigest {
        PasswordDigest::new(format!(
            "$argon2id$v=19$m={},t={},p={}${DECOY_SALT}${DECOY_OUTPUT}",
            self.memory_kib, self.iterations, self.parallelism
        ))
    }
}

/// Argon2id hashing on the blocking thread pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2PasswordHasher {
    cost: Argon2Cost,
}

impl Argon2PasswordHasher {
    pub fn new(cost: Argon2Cost) -> Self {
        Self { cost }
    }
}

#[async_trait::async_trait]
impl PasswordHasher for Argon2PasswordHasher {
    #[tracing::instrument(name = "Computing password hash", skip_all)]
    async fn hash(&self, password: &Password) -> Result<PasswordDigest, PasswordHasherError> {
        let current_span: tracing::Span = tracing::Span::current();
        let password = password.clone();
        let cost = self.cost;

        tokio::task::spawn_blocking(move || {
            current_span.in_scope(move || {
                let salt = SaltString::generate(rand_core::OsRng);
                cost.hasher()?
                    .hash_password(password.expose().as_bytes(), &salt)
                    .map(|hash| PasswordDigest::new(hash.to_string()))
                    .map_err(|e| PasswordHasherError::HashingFailed(e.to_string()))
            })
        })
        .await
        .map_err(|e| PasswordHasherError::HashingFailed(e.to_string()))?
    }

    #[tracing::instrument(name = "Verify password hash", skip_all)]
    async fn verify(
        &self,
        digest: &PasswordDigest,
        candidate: &Secret<String>,
    ) -> Result<bool, PasswordHasherError> {
        let current_span: tracing::Span = tracing::Span::current();
        let digest = digest.clone();
        let candidate = candidate.clone();
        let cost = self.cost;

        tokio::task::spawn_blocking(move || {
            current_span.in_scope(move || {
                let expected = PasswordHash::new(digest.as_str())
                    .map_err(|e| PasswordHasherError::MalformedDigest(e.to_string()))?;

                match cost
                    .hasher()?
                    .verify_password(candidate.expose_secret().as_bytes(), &expected)
                {
                    Ok(()) => Ok(true),
                    Err(password_hash::Error::Password) => Ok(false),
                    Err(e) => Err(PasswordHasherError::HashingFailed(e.to_string())),
                }
            })
        })
        .await
        .map_err(|e| PasswordHasherError::HashingFailed(e.to_string()))?
    }

    async fn verify_decoy(&self, candidate: &Secret<String>) -> Result<(), PasswordHasherError> {
        self.verify(&self.cost.decoy_digest(), candidate)
            .await
            .map(|_| ())
    }
}
