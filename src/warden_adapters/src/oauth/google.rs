use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwapOption;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header, jwk::JwkSet};
use serde::Deserialize;
use warden_core::{Email, OAuthClaims, OAuthError, OAuthProvider, split_full_name};

pub const GOOGLE_JWKS_URL: &str = "https://www.googleapis.com/oauth2/v3/certs";
pub const GOOGLE_ISSUERS: [&str; 2] = ["accounts.google.com", "https://accounts.google.com"];
pub const DEFAULT_JWKS_CACHE_TTL_SECONDS: u64 = 60 * 60;
pub const DEFAULT_JWKS_MIN_REFRESH_SECONDS: u64 = 60;

#[derive(Debug, Clone, Deserialize)]
pub struct GoogleConfig {
    pub client_id: String,
    #[serde(default = "default_jwks_url")]
    pub jwks_url: String,
    #[serde(default = "default_jwks_cache_ttl_seconds")]
    pub jwks_cache_ttl_seconds: u64,
    /// Minimum age of the cached key set before an unknown `kid` may
    /// trigger another fetch.
    #[serde(default = "default_jwks_min_refresh_seconds")]
    pub jwks_min_refresh_seconds: u64,
}

fn default_jwks_url() -> String {
    GOOGLE_JWKS_URL.to_owned()
}

fn default_jwks_cache_ttl_seconds() -> u64 {
    DEFAULT_JWKS_CACHE_TTL_SECONDS
}

fn default_jwks_min_refresh_seconds() -> u64 {
    DEFAULT_JWKS_MIN_REFRESH_SECONDS
}

impl GoogleConfig {
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            jwks_url: default_jwks_url(),
            jwks_cache_ttl_seconds: DEFAULT_JWKS_CACHE_TTL_SECONDS,
            jwks_min_refresh_seconds: DEFAULT_JWKS_MIN_REFRESH_SECONDS,
        }
    }
}

struct CachedKeys {
    keys: JwkSet,
    fetched_at: Instant,
}

/// Verifies Google ID tokens against Google's published signing keys.
pub struct GoogleOAuthProvider {
    client: reqwest::Client,
    config: GoogleConfig,
    keys: ArcSwapOption<CachedKeys>,
    refresh: tokio::sync::Mutex<()>,
}

#[derive(Debug, Deserialize)]
struct GoogleIdClaims {
    email: Option<String>,
    #[serde(default)]
    email_verified: Option<serde_json::Value>,
    name: Option<String>,
    given_name: Option<String>,
    family_name: Option<String>,
    picture: Option<String>,
}

impl GoogleIdClaims {
    // Google sends a JSON bool, some older tokens carry the string form.
    fn email_unverified(&self) -> bool {
        match &self.email_verified {
            Some(serde_json::Value::Bool(verified)) => !verified,
            Some(serde_json::Value::String(verified)) => verified.eq_ignore_ascii_case("false"),
            _ => false,
        }
    }

    fn names(&self) -> (String, String) {
        match (&self.given_name, &self.family_name) {
            (Some(first), last) if !first.trim().is_empty() => (
                first.trim().to_owned(),
                last.as_deref().unwrap_or_default().trim().to_owned(),
            ),
            _ => split_full_name(self.name.as_deref().unwrap_or_default()),
        }
    }
}

impl GoogleOAuthProvider {
    pub fn new(client: reqwest::Client, config: GoogleConfig) -> Self {
        Self {
            client,
            config,
            keys: ArcSwapOption::empty(),
            refresh: tokio::sync::Mutex::new(()),
        }
    }

    fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.config.jwks_cache_ttl_seconds)
    }

    fn min_refresh_interval(&self) -> Duration {
        Duration::from_secs(self.config.jwks_min_refresh_seconds)
    }

    fn fresh_keys(&self) -> Option<Arc<CachedKeys>> {
        self.keys
            .load_full()
            .filter(|cached| cached.fetched_at.elapsed() < self.cache_ttl())
    }

    /// Returns cached keys while they are fresh, otherwise fetches. `force`
    /// skips the cache, used when a token names a key we have not seen.
    async fn signing_keys(&self, force: bool) -> Result<Arc<CachedKeys>, OAuthError> {
        let stale = self.keys.load_full();
        if !force {
            if let Some(cached) = self.fresh_keys() {
                return Ok(cached);
            }
        }

        let _guard = self.refresh.lock().await;

        // Another task may have refreshed while we waited for the lock.
        let current = self.keys.load_full();
        let refreshed_meanwhile = match (&stale, &current) {
            (Some(before), Some(now)) => !Arc::ptr_eq(before, now),
            (None, Some(_)) => true,
            _ => false,
        };
        if refreshed_meanwhile {
            if let Some(cached) = current {
                return Ok(cached);
            }
        }

        tracing::debug!(url = %self.config.jwks_url, "Fetching Google signing keys");
        let response = self
            .client
            .get(&self.config.jwks_url)
            .send()
            .await
            .map_err(|e| OAuthError::Transport(e.to_string()))?;
        if !response.status().is_success() {
            return Err(OAuthError::Transport(format!(
                "key set request failed with status {}",
                response.status()
            )));
        }
        let keys = response
            .json::<JwkSet>()
            .await
            .map_err(|e| OAuthError::Transport(e.to_string()))?;

        let cached = Arc::new(CachedKeys {
            keys,
            fetched_at: Instant::now(),
        });
        self.keys.store(Some(cached.clone()));
        Ok(cached)
    }

    async fn decoding_key(&self, kid: &str) -> Result<DecodingKey, OAuthError> {
        let mut cached = self.signing_keys(false).await?;
        if cached.keys.find(kid).is_none() {
            if cached.fetched_at.elapsed() < self.min_refresh_interval() {
                tracing::debug!(kid, "Unknown signing key, key set too recent to refetch");
            } else {
                cached = self.signing_keys(true).await?;
            }
        }

        let jwk = cached
            .keys
            .find(kid)
            .ok_or_else(|| OAuthError::Rejected(format!("unknown signing key {kid}")))?;
        DecodingKey::from_jwk(jwk).map_err(|e| OAuthError::Rejected(e.to_string()))
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[&self.config.client_id]);
        validation.set_issuer(&GOOGLE_ISSUERS);
        validation.set_required_spec_claims(&["exp", "aud", "iss"]);
        validation
    }
}

#[async_trait::async_trait]
impl OAuthProvider for GoogleOAuthProvider {
    fn name(&self) -> &'static str {
        "google"
    }

    #[tracing::instrument(name = "Verifying Google ID token", skip_all)]
    async fn verify_id_token(&self, token: &str) -> Result<OAuthClaims, OAuthError> {
        let header = decode_header(token).map_err(|e| OAuthError::Rejected(e.to_string()))?;
        if header.alg != Algorithm::RS256 {
            return Err(OAuthError::Rejected(format!(
                "unexpected algorithm {:?}",
                header.alg
            )));
        }
        let kid = header
            .kid
            .ok_or_else(|| OAuthError::Rejected("token has no key id".to_owned()))?;

        let key = self.decoding_key(&kid).await?;
        let claims = decode::<GoogleIdClaims>(token, &key, &self.validation())
            .map(|data| data.claims)
            .map_err(|e| OAuthError::Rejected(e.to_string()))?;

        if claims.email_unverified() {
            return Err(OAuthError::Rejected("email is not verified".to_owned()));
        }
        let email = claims
            .email
            .as_deref()
            .filter(|email| !email.trim().is_empty())
            .ok_or(OAuthError::MissingEmail)?;
        let email = Email::try_from(email).map_err(|e| OAuthError::Rejected(e.to_string()))?;
        let (first_name, last_name) = claims.names();

        Ok(OAuthClaims {
            email,
            first_name,
            last_name,
            avatar_url: claims.picture.filter(|url| !url.is_empty()),
        })
    }
}
