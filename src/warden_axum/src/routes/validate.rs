use axum::{Json, body::Bytes, extract::State, response::IntoResponse};
use secrecy::Secret;
use serde::Deserialize;
use warden_application::{AuthError, AuthUseCases, ValidateSessionInput};

use crate::{error::ApiError, extract::BearerToken, response::ValidityResponse};

#[derive(Debug, Default, Deserialize)]
pub struct ValidateRequest {
    pub access_token: Option<Secret<String>>,
}

/// Accepts the token from the `Authorization` header or, failing that, from
/// an `{"access_token": ...}` body.
#[tracing::instrument(name = "Validate session", skip_all)]
pub async fn validate<A: AuthUseCases>(
    State(auth): State<A>,
    BearerToken(bearer): BearerToken,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let access_token = match bearer {
        Some(token) => token,
        None => body_token(&body)?,
    };

    let validity = auth
        .validate_session(ValidateSessionInput { access_token })
        .await?;

    Ok(Json(ValidityResponse {
        success: true,
        validity,
    }))
}

fn body_token(body: &[u8]) -> Result<Secret<String>, ApiError> {
    let missing = || ApiError(AuthError::Validation("access token is required".to_owned()));
    if body.is_empty() {
        return Err(missing());
    }

    let request: ValidateRequest = serde_json::from_slice(body)
        .map_err(|e| ApiError(AuthError::Validation(e.to_string())))?;
    request.access_token.ok_or_else(missing)
}
