use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use rand::Rng;
use secrecy::{ExposeSecret, Secret};
use warden_core::{
    AccessClaims, Clock, Email, RefreshTokenValue, SignedAccessToken, SystemClock, TokenIssuer,
    TokenIssuerError, UserId, UserType,
};

pub const ACCESS_TOKEN_TTL_SECONDS: i64 = 15 * 60;
pub const REFRESH_TOKEN_TTL_SECONDS: i64 = 24 * 60 * 60;
const REFRESH_TOKEN_BYTES: usize = 32;

#[derive(Clone)]
pub struct JwtConfig {
    pub secret: Secret<String>,
    pub access_token_ttl: Duration,
    pub refresh_token_ttl: Duration,
    pub issuer: Option<String>,
}

impl JwtConfig {
    pub fn new(secret: Secret<String>) -> Self {
        Self {
            secret,
            access_token_ttl: Duration::seconds(ACCESS_TOKEN_TTL_SECONDS),
            refresh_token_ttl: Duration::seconds(REFRESH_TOKEN_TTL_SECONDS),
            issuer: None,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.secret.expose_secret().as_bytes()
    }
}

/// HS256 access tokens plus random hex refresh tokens.
///
/// Expiry is checked against the injected clock with no leeway: a token is
/// valid strictly before its `exp` second.
#[derive(Clone)]
pub struct JwtTokenIssuer {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    clock: Arc<dyn Clock>,
}

impl JwtTokenIssuer {
    pub fn new(config: JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "iat", "sub"]);
        if let Some(issuer) = &config.issuer {
            validation.set_issuer(&[issuer]);
        }

        Self {
            encoding_key: EncodingKey::from_secret(config.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.as_bytes()),
            validation,
            config,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

impl TokenIssuer for JwtTokenIssuer {
    fn generate_access_token(
        &self,
        user_id: UserId,
        email: &Email,
        user_type: UserType,
    ) -> Result<SignedAccessToken, TokenIssuerError> {
        let now = self.clock.now();
        // `exp` has whole-second precision, so the advertised expiry is
        // truncated to match what validation will enforce.
        let expires_at = now
            .checked_add_signed(self.config.access_token_ttl)
            .and_then(|at| DateTime::<Utc>::from_timestamp(at.timestamp(), 0))
            .ok_or_else(|| TokenIssuerError::SigningFailed("Duration out of range".to_owned()))?;

        let claims = AccessClaims {
            sub: user_id,
            email: email.as_ref().clone(),
            user_type,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            iss: self.config.issuer.clone(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenIssuerError::SigningFailed(e.to_string()))?;

        Ok(SignedAccessToken {
            token: Secret::new(token),
            expires_at,
        })
    }

    fn validate_access_token(&self, token: &str) -> Result<AccessClaims, TokenIssuerError> {
        let claims = decode::<AccessClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenIssuerError::Expired,
                _ => TokenIssuerError::InvalidToken(e.to_string()),
            })?;

        if self.clock.now().timestamp() >= claims.exp {
            return Err(TokenIssuerError::Expired);
        }

        Ok(claims)
    }

    fn generate_refresh_token(&self) -> RefreshTokenValue {
        let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
        rand::rng().fill(&mut bytes);
        RefreshTokenValue::new(hex::encode(bytes))
    }

    fn refresh_token_ttl(&self) -> Duration {
        self.config.refresh_token_ttl
    }
}
