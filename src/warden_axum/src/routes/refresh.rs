use axum::{Json, extract::State, response::IntoResponse};
use secrecy::Secret;
use serde::Deserialize;
use warden_application::{AuthUseCases, RefreshSessionInput};

use crate::{
    error::ApiError,
    extract::{ClientMetadata, JsonBody},
    response::SessionResponse,
};

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: Secret<String>,
}

#[tracing::instrument(name = "Refresh session", skip_all)]
pub async fn refresh<A: AuthUseCases>(
    State(auth): State<A>,
    ClientMetadata(metadata): ClientMetadata,
    JsonBody(request): JsonBody<RefreshRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let input = RefreshSessionInput {
        refresh_token: request.refresh_token,
    };
    let session = auth.refresh_session(input, metadata).await?;

    Ok(Json(SessionResponse::new(session, "token refreshed")))
}
