pub mod config;
pub mod hashing;
pub mod oauth;
pub mod persistence;
pub mod tokens;

pub use crate::config::{Settings, StorageBackend};
pub use hashing::argon2_password_hasher::{Argon2Cost, Argon2PasswordHasher};
pub use oauth::{
    OAuthSettings, build_oauth_providers,
    facebook::{FacebookConfig, FacebookOAuthProvider},
    google::{GoogleConfig, GoogleOAuthProvider},
};
pub use persistence::{
    hashmap_credential_store::HashMapCredentialStore,
    hashmap_token_blacklist::HashMapTokenBlacklist,
    postgres_credential_store::{PostgresCredentialStore, migrate},
    redis_token_blacklist::RedisTokenBlacklist,
};
pub use tokens::jwt_token_issuer::{JwtConfig, JwtTokenIssuer};
