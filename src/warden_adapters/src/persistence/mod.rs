pub mod hashmap_credential_store;
pub mod hashmap_token_blacklist;
pub mod postgres_credential_store;
pub mod redis_token_blacklist;
