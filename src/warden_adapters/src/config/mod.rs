pub mod constants;
pub mod settings;

pub use constants::*;
pub use settings::{
    AuthSettings, JwtSettings, LockoutSettings, PostgresSettings, RedisSettings, RetrySettings,
    ServerSettings, Settings, StorageBackend,
};
