use axum::{Json, extract::State, response::IntoResponse};
use secrecy::Secret;
use serde::Deserialize;
use warden_application::{AuthUseCases, LogoutInput};

use crate::{
    error::ApiError,
    extract::{BearerToken, JsonBody},
    response::SuccessResponse,
};

#[derive(Debug, Deserialize)]
pub struct LogoutRequest {
    pub refresh_token: Secret<String>,
    #[serde(default)]
    pub access_token: Option<Secret<String>>,
}

#[tracing::instrument(name = "Logout", skip_all)]
pub async fn logout<A: AuthUseCases>(
    State(auth): State<A>,
    BearerToken(bearer): BearerToken,
    JsonBody(request): JsonBody<LogoutRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let input = LogoutInput {
        refresh_token: request.refresh_token,
        access_token: bearer.or(request.access_token),
    };
    auth.logout(input).await?;

    Ok(Json(SuccessResponse::new("logged out successfully")))
}
