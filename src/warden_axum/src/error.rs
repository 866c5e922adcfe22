use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use warden_application::{AuthError, ErrorKind};

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub code: String,
}

pub const REQUEST_TIMEOUT_CODE: &str = "REQUEST_TIMEOUT";
pub const REQUEST_TIMEOUT_MESSAGE: &str = "request timed out";

/// Wire form of an [`AuthError`].
#[derive(Debug)]
pub struct ApiError(pub AuthError);

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorKind::Forbidden => StatusCode::FORBIDDEN,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Database | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<AuthError> for ApiError {
    fn from(error: AuthError) -> Self {
        ApiError(error)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError(AuthError::Validation(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.0.kind();

        // Causes are logged here and nowhere else; the body only carries the
        // fixed message.
        if kind.is_fault() {
            tracing::error!(
                code = kind.code(),
                cause = self.0.cause().unwrap_or_default(),
                "{}",
                self.0
            );
        } else {
            tracing::warn!(code = kind.code(), "{}", self.0);
        }

        let body = Json(ErrorResponse {
            success: false,
            error: self.0.to_string(),
            code: kind.code().to_owned(),
        });

        (status_for(kind), body).into_response()
    }
}

/// Gives the bare 408 emitted by a request deadline the same error body as
/// every other failure. Other responses pass through untouched.
pub async fn timeout_error_body(response: Response) -> Response {
    if response.status() != StatusCode::REQUEST_TIMEOUT {
        return response;
    }

    tracing::warn!(code = REQUEST_TIMEOUT_CODE, "Request exceeded its deadline");
    let body = Json(ErrorResponse {
        success: false,
        error: REQUEST_TIMEOUT_MESSAGE.to_owned(),
        code: REQUEST_TIMEOUT_CODE.to_owned(),
    });
    (StatusCode::REQUEST_TIMEOUT, body).into_response()
}
