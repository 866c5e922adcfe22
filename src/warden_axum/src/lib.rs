//! Axum transport for the warden authentication core.
//!
//! ```ignore
//! use warden_axum::routes;
//!
//! let app = Router::new()
//!     .route("/login", post(routes::login::<Auth>))
//!     .route("/logout", post(routes::logout::<Auth>))
//!     .with_state(auth);
//! ```

pub mod error;
pub mod extract;
pub mod response;
pub mod routes;

pub use error::{
    ApiError, ErrorResponse, REQUEST_TIMEOUT_CODE, REQUEST_TIMEOUT_MESSAGE, status_for,
    timeout_error_body,
};
pub use extract::{BearerToken, ClientMetadata, JsonBody};
pub use response::{SessionResponse, SuccessResponse, ValidityResponse};
