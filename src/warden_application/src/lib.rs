pub mod error;
pub mod guard;
pub mod orchestrator;
pub mod retry;
pub mod sessions;
pub mod use_cases;

#[cfg(test)]
mod test_support;

pub use error::{AuthError, ErrorKind, messages};
pub use guard::BruteForceGuard;
pub use orchestrator::{AuthOrchestrator, AuthUseCases};
pub use retry::RetryPolicy;
pub use sessions::SessionIssuer;
pub use use_cases::{
    change_password::{ChangePasswordInput, ChangePasswordUseCase},
    login::{LoginInput, LoginUseCase},
    logout::{LogoutInput, LogoutUseCase},
    oauth_login::{OAuthLoginInput, OAuthLoginUseCase},
    refresh_session::{RefreshSessionInput, RefreshSessionUseCase},
    register::RegisterUseCase,
    validate_session::{ValidateSessionInput, ValidateSessionUseCase},
};
