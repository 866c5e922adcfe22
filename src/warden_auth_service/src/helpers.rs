use color_eyre::eyre::{Result, eyre};
use redis::{RedisResult, aio::MultiplexedConnection};
use secrecy::ExposeSecret;
use sqlx::{PgPool, postgres::PgPoolOptions};
use warden_adapters::{
    Argon2PasswordHasher, HashMapCredentialStore, HashMapTokenBlacklist, JwtTokenIssuer,
    PostgresCredentialStore, RedisTokenBlacklist, Settings, StorageBackend, build_oauth_providers,
    config::{PostgresSettings, RedisSettings},
    migrate,
};
use warden_application::AuthOrchestrator;
use warden_core::{CredentialStore, OAuthProviders, TokenBlacklist};

use crate::auth_service::AuthService;

pub async fn get_postgres_pool(url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(url)
        .await
}

pub async fn get_redis_connection(redis_hostname: &str) -> RedisResult<MultiplexedConnection> {
    let redis_url = format!("redis://{}/", redis_hostname);
    redis::Client::open(redis_url)?
        .get_multiplexed_async_connection()
        .await
}

/// Connects to Postgres and applies pending migrations.
pub async fn configure_postgresql(settings: &PostgresSettings) -> Result<PgPool> {
    let pool = get_postgres_pool(settings.url.expose_secret(), settings.max_connections).await?;
    migrate(&pool).await?;
    Ok(pool)
}

pub async fn configure_redis(settings: &RedisSettings) -> Result<MultiplexedConnection> {
    Ok(get_redis_connection(&settings.host_name).await?)
}

/// Wires the adapters named by `settings` into an [`AuthService`].
///
/// With `storage = "postgres"` the token blacklist lives in Redis when a
/// `redis` section is present and in process memory otherwise.
#[tracing::instrument(name = "Build auth service", skip_all, fields(storage = ?settings.storage))]
pub async fn build_auth_service(settings: &Settings) -> Result<AuthService> {
    let providers = build_oauth_providers(&settings.oauth)?;

    let service = match settings.storage {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage, state is lost on restart");
            auth_service(
                settings,
                HashMapCredentialStore::new(),
                HashMapTokenBlacklist::default(),
                providers,
            )
        }
        StorageBackend::Postgres => {
            let postgres = settings
                .postgres
                .as_ref()
                .ok_or_else(|| eyre!("a postgres section is required when storage is postgres"))?;
            let store = PostgresCredentialStore::new(configure_postgresql(postgres).await?);

            match &settings.redis {
                Some(redis) => {
                    let blacklist = RedisTokenBlacklist::new(configure_redis(redis).await?);
                    auth_service(settings, store, blacklist, providers)
                }
                None => {
                    tracing::warn!("No redis configured, token blacklist is process-local");
                    auth_service(settings, store, HashMapTokenBlacklist::default(), providers)
                }
            }
        }
    };

    Ok(service.with_request_timeout(settings.server.request_timeout()))
}

fn auth_service<S, B>(
    settings: &Settings,
    store: S,
    blacklist: B,
    providers: OAuthProviders,
) -> AuthService
where
    S: CredentialStore + Clone + 'static,
    B: TokenBlacklist + Clone + 'static,
{
    let orchestrator = AuthOrchestrator::new(
        store,
        Argon2PasswordHasher::new(settings.auth.password_hashing),
        JwtTokenIssuer::new(settings.auth.jwt.jwt_config()),
        blacklist,
    )
    .with_oauth_providers(providers)
    .with_lockout_policy(settings.auth.lockout.policy())
    .with_retry_policy(settings.auth.retry.policy());

    AuthService::new(orchestrator)
}
