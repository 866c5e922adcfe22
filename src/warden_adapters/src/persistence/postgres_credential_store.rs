use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, Secret};
use sqlx::{FromRow, PgPool, Pool, Postgres, migrate::MigrateError};
use uuid::Uuid;
use warden_core::{
    CredentialStore, CredentialStoreError, Email, PasswordDigest, RefreshToken, RefreshTokenValue,
    User, UserId, UserType,
};

const UNIQUE_VIOLATION: &str = "23505";
const USERS_EMAIL_CONSTRAINT: &str = "users_email_key";

/// Applies the bundled schema migrations.
pub async fn migrate(pool: &PgPool) -> Result<(), MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

#[derive(Clone)]
pub struct PostgresCredentialStore {
    pool: PgPool,
}

impl PostgresCredentialStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        PostgresCredentialStore { pool }
    }
}

#[derive(FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    password_hash: Option<String>,
    first_name: String,
    last_name: String,
    phone: Option<String>,
    user_type: String,
    auth_provider: Option<String>,
    avatar_url: Option<String>,
    is_active: bool,
    is_verified: bool,
    login_attempts: i32,
    last_login_at: Option<DateTime<Utc>>,
    last_login_ip: Option<String>,
    locked_until: Option<DateTime<Utc>>,
    password_changed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = CredentialStoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::try_from(Secret::new(row.email))
            .map_err(|e| CredentialStoreError::DatabaseError(e.to_string()))?;
        let user_type = row
            .user_type
            .parse::<UserType>()
            .map_err(|e| CredentialStoreError::DatabaseError(e.to_string()))?;

        Ok(User {
            id: UserId::from(row.id),
            email,
            password_digest: row.password_hash.map(PasswordDigest::new),
            first_name: row.first_name,
            last_name: row.last_name,
            phone: row.phone,
            user_type,
            auth_provider: row.auth_provider,
            avatar_url: row.avatar_url,
            is_active: row.is_active,
            is_verified: row.is_verified,
            login_attempts: u32::try_from(row.login_attempts).unwrap_or_default(),
            last_login_at: row.last_login_at,
            last_login_ip: row.last_login_ip,
            locked_until: row.locked_until,
            password_changed_at: row.password_changed_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
struct RefreshTokenRow {
    id: Uuid,
    user_id: Uuid,
    token: String,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
    revoked: bool,
    device_id: Option<String>,
    user_agent: Option<String>,
    ip_address: Option<String>,
}

impl From<RefreshTokenRow> for RefreshToken {
    fn from(row: RefreshTokenRow) -> Self {
        RefreshToken {
            id: row.id,
            user_id: UserId::from(row.user_id),
            value: RefreshTokenValue::new(row.token),
            expires_at: row.expires_at,
            created_at: row.created_at,
            revoked: row.revoked,
            device_id: row.device_id,
            user_agent: row.user_agent,
            ip_address: row.ip_address,
        }
    }
}

const USER_COLUMNS: &str = r#"
    id, email, password_hash, first_name, last_name, phone, user_type,
    auth_provider, avatar_url, is_active, is_verified, login_attempts,
    last_login_at, last_login_ip, locked_until, password_changed_at,
    created_at, updated_at
"#;

fn database_error(e: sqlx::Error) -> CredentialStoreError {
    CredentialStoreError::DatabaseError(e.to_string())
}

fn row_updated(rows_affected: u64) -> Result<(), CredentialStoreError> {
    if rows_affected == 0 {
        return Err(CredentialStoreError::UserNotFound);
    }
    Ok(())
}

#[async_trait::async_trait]
impl CredentialStore for PostgresCredentialStore {
    #[tracing::instrument(name = "Adding user to PostgreSQL", skip_all)]
    async fn create_user(&self, user: &User) -> Result<(), CredentialStoreError> {
        let query = sqlx::query(
            r#"
                INSERT INTO users (
                    id, email, password_hash, first_name, last_name, phone, user_type,
                    auth_provider, avatar_url, is_active, is_verified, login_attempts,
                    created_at, updated_at
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(user.email.as_ref().expose_secret())
        .bind(user.password_digest.as_ref().map(PasswordDigest::as_str))
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.phone.as_deref())
        .bind(user.user_type.as_str())
        .bind(user.auth_provider.as_deref())
        .bind(user.avatar_url.as_deref())
        .bind(user.is_active)
        .bind(user.is_verified)
        .bind(i32::try_from(user.login_attempts).unwrap_or(i32::MAX))
        .bind(user.created_at)
        .bind(user.updated_at);

        query.execute(&self.pool).await.map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                let is_unique_violation = db_err.code().as_deref() == Some(UNIQUE_VIOLATION);
                if is_unique_violation
                    || db_err.constraint() == Some(USERS_EMAIL_CONSTRAINT)
                {
                    return CredentialStoreError::UserAlreadyExists;
                }
            }
            CredentialStoreError::DatabaseError(e.to_string())
        })?;

        Ok(())
    }

    #[tracing::instrument(name = "Retrieving user by email from PostgreSQL", skip_all)]
    async fn get_user_by_email(&self, email: &Email) -> Result<User, CredentialStoreError> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
                .bind(email.as_ref().expose_secret())
                .fetch_optional(&self.pool)
                .await
                .map_err(database_error)?;

        let Some(row) = row else {
            return Err(CredentialStoreError::UserNotFound);
        };
        User::try_from(row)
    }

    #[tracing::instrument(name = "Retrieving user by id from PostgreSQL", skip_all)]
    async fn get_user_by_id(&self, id: UserId) -> Result<User, CredentialStoreError> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(database_error)?;

        let Some(row) = row else {
            return Err(CredentialStoreError::UserNotFound);
        };
        User::try_from(row)
    }

    #[tracing::instrument(name = "Set new password", skip_all)]
    async fn update_password(
        &self,
        id: UserId,
        digest: &PasswordDigest,
        changed_at: DateTime<Utc>,
    ) -> Result<(), CredentialStoreError> {
        let result = sqlx::query(
            r#"
                UPDATE users
                SET password_hash = $1, password_changed_at = $2, updated_at = $2
                WHERE id = $3
            "#,
        )
        .bind(digest.as_str())
        .bind(changed_at)
        .bind(id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        row_updated(result.rows_affected())
    }

    #[tracing::instrument(name = "Recording login in PostgreSQL", skip_all)]
    async fn update_login_info(
        &self,
        id: UserId,
        ip_address: Option<&str>,
        at: DateTime<Utc>,
    ) -> Result<(), CredentialStoreError> {
        let result = sqlx::query(
            r#"
                UPDATE users
                SET last_login_at = $1, last_login_ip = $2, updated_at = $1
                WHERE id = $3
            "#,
        )
        .bind(at)
        .bind(ip_address)
        .bind(id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        row_updated(result.rows_affected())
    }

    #[tracing::instrument(name = "Incrementing login attempts in PostgreSQL", skip_all)]
    async fn increment_login_attempts(&self, id: UserId) -> Result<u32, CredentialStoreError> {
        let attempts: Option<i32> = sqlx::query_scalar(
            r#"
                UPDATE users
                SET login_attempts = login_attempts + 1
                WHERE id = $1
                RETURNING login_attempts
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        let attempts = attempts.ok_or(CredentialStoreError::UserNotFound)?;
        Ok(u32::try_from(attempts).unwrap_or_default())
    }

    #[tracing::instrument(name = "Resetting login attempts in PostgreSQL", skip_all)]
    async fn reset_login_attempts(&self, id: UserId) -> Result<(), CredentialStoreError> {
        let result = sqlx::query(
            r#"
                UPDATE users
                SET login_attempts = 0, locked_until = NULL
                WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        row_updated(result.rows_affected())
    }

    #[tracing::instrument(name = "Locking account in PostgreSQL", skip_all)]
    async fn lock_account(
        &self,
        id: UserId,
        until: DateTime<Utc>,
    ) -> Result<(), CredentialStoreError> {
        let result = sqlx::query("UPDATE users SET locked_until = $1 WHERE id = $2")
            .bind(until)
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(database_error)?;

        row_updated(result.rows_affected())
    }

    #[tracing::instrument(name = "Saving refresh token to PostgreSQL", skip_all)]
    async fn save_refresh_token(&self, token: &RefreshToken) -> Result<(), CredentialStoreError> {
        sqlx::query(
            r#"
                INSERT INTO refresh_tokens (
                    id, user_id, token, expires_at, created_at, revoked,
                    device_id, user_agent, ip_address
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(token.id)
        .bind(token.user_id.as_uuid())
        .bind(token.value.as_str())
        .bind(token.expires_at)
        .bind(token.created_at)
        .bind(token.revoked)
        .bind(token.device_id.as_deref())
        .bind(token.user_agent.as_deref())
        .bind(token.ip_address.as_deref())
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(())
    }

    #[tracing::instrument(name = "Retrieving refresh token from PostgreSQL", skip_all)]
    async fn find_refresh_token(&self, value: &str) -> Result<RefreshToken, CredentialStoreError> {
        let row: Option<RefreshTokenRow> = sqlx::query_as(
            r#"
                SELECT id, user_id, token, expires_at, created_at, revoked,
                       device_id, user_agent, ip_address
                FROM refresh_tokens
                WHERE token = $1
            "#,
        )
        .bind(value)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        row.map(RefreshToken::from)
            .ok_or(CredentialStoreError::RefreshTokenNotFound)
    }

    #[tracing::instrument(name = "Revoking refresh token in PostgreSQL", skip_all)]
    async fn revoke_refresh_token(&self, id: Uuid) -> Result<bool, CredentialStoreError> {
        // The `revoked = FALSE` guard makes concurrent revokes race on the row
        // lock; only one of them sees an affected row.
        let result = sqlx::query(
            r#"
                UPDATE refresh_tokens
                SET revoked = TRUE
                WHERE id = $1 AND revoked = FALSE
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        if result.rows_affected() == 1 {
            return Ok(true);
        }

        let exists: Option<bool> =
            sqlx::query_scalar("SELECT revoked FROM refresh_tokens WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(database_error)?;

        match exists {
            Some(_) => Ok(false),
            None => Err(CredentialStoreError::RefreshTokenNotFound),
        }
    }

    #[tracing::instrument(name = "Revoking all refresh tokens in PostgreSQL", skip_all)]
    async fn revoke_all_refresh_tokens(
        &self,
        user_id: UserId,
    ) -> Result<u64, CredentialStoreError> {
        let result = sqlx::query(
            r#"
                UPDATE refresh_tokens
                SET revoked = TRUE
                WHERE user_id = $1 AND revoked = FALSE
            "#,
        )
        .bind(user_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(result.rows_affected())
    }
}
