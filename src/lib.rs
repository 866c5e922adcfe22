//! # Warden - Authentication and Session Core
//!
//! Facade crate re-exporting the public APIs of the warden workspace.
//!
//! ## Structure
//!
//! - **Core domain types**: `Email`, `Password`, `User`, `RefreshToken`, etc.
//! - **Ports**: `CredentialStore`, `TokenBlacklist`, `PasswordHasher`, `TokenIssuer`, `OAuthProvider`
//! - **Use cases**: `LoginUseCase`, `RefreshSessionUseCase`, etc., composed by `AuthOrchestrator`
//! - **Adapters**: `PostgresCredentialStore`, `RedisTokenBlacklist`, `JwtTokenIssuer`, `GoogleOAuthProvider`, etc.
//! - **Service**: `AuthService`, the HTTP entry point

// ============================================================================
// Core Domain Types
// ============================================================================

/// Core domain types and value objects
pub mod core {
    pub use warden_core::*;
}

pub use warden_core::{
    AuthSession, Email, Password, RefreshToken, RegistrationForm, RequestMetadata,
    SessionValidity, TokenBundle, User, UserError, UserId, UserType, UserView,
};

// ============================================================================
// Ports
// ============================================================================

/// Capability traits implemented by the adapters
pub mod ports {
    pub use warden_core::{
        Clock, CredentialStore, CredentialStoreError, OAuthError, OAuthProvider, OAuthProviders,
        PasswordHasher, PasswordHasherError, TokenBlacklist, TokenBlacklistError, TokenIssuer,
        TokenIssuerError,
    };
}

// ============================================================================
// Use Cases (Application Layer)
// ============================================================================

/// Application use cases
pub mod use_cases {
    pub use warden_application::*;
}

pub use warden_application::{AuthError, AuthOrchestrator, AuthUseCases, ErrorKind};

// ============================================================================
// Adapters (Infrastructure)
// ============================================================================

/// Infrastructure adapters
pub mod adapters {
    /// HTTP handlers and the error-to-status mapping
    pub mod http {
        pub use warden_axum::*;
    }

    /// Persistence implementations
    pub mod persistence {
        pub use warden_adapters::persistence::*;
    }

    /// Identity provider verification
    pub mod oauth {
        pub use warden_adapters::oauth::*;
    }

    /// Configuration
    pub mod config {
        pub use warden_adapters::config::*;
    }
}

pub use warden_adapters::{
    Argon2PasswordHasher, FacebookOAuthProvider, GoogleOAuthProvider, HashMapCredentialStore,
    HashMapTokenBlacklist, JwtTokenIssuer, PostgresCredentialStore, RedisTokenBlacklist, Settings,
};

// ============================================================================
// Auth Service (Main Entry Point)
// ============================================================================

pub use warden_auth_service::{
    AllowedOrigins, AuthService, build_auth_service, configure_postgresql, configure_redis,
    init_tracing,
};

// ============================================================================
// Re-export common external dependencies
// ============================================================================

/// Re-export async-trait for implementing the port traits
pub use async_trait::async_trait;

/// Re-export secrecy for working with secrets
pub use secrecy::{ExposeSecret, Secret};

pub use http;
