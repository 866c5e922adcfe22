//! HTTP service hosting the warden authentication core.
//!
//! [`AuthService`] mounts the `warden_axum` handlers on a router with request
//! tracing, a request deadline and optional CORS. [`build_auth_service`] wires
//! the adapters selected by [`warden_adapters::Settings`].

pub mod auth_service;
pub mod helpers;
pub mod telemetry;
pub mod tracing;

pub use auth_service::{AllowedOrigins, AuthService};
pub use helpers::{
    build_auth_service, configure_postgresql, configure_redis, get_postgres_pool,
    get_redis_connection,
};
pub use telemetry::init_tracing;
