//! Axum route handlers, one per authentication use case.
//!
//! Handlers only translate between the wire and [`AuthUseCases`]; every
//! decision is made by the orchestrator.
//!
//! [`AuthUseCases`]: warden_application::AuthUseCases

pub mod change_password;
pub mod health;
pub mod login;
pub mod logout;
pub mod oauth_login;
pub mod refresh;
pub mod register;
pub mod validate;

pub use change_password::change_password;
pub use health::health;
pub use login::login;
pub use logout::logout;
pub use oauth_login::oauth_login;
pub use refresh::refresh;
pub use register::register;
pub use validate::validate;
