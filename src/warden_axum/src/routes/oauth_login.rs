use axum::{Json, extract::State, response::IntoResponse};
use secrecy::Secret;
use serde::Deserialize;
use warden_application::{AuthUseCases, OAuthLoginInput};

use crate::{
    error::ApiError,
    extract::{ClientMetadata, JsonBody},
    response::SessionResponse,
};

#[derive(Debug, Deserialize)]
pub struct OAuthLoginRequest {
    pub provider: String,
    #[serde(alias = "id_token")]
    pub token: Secret<String>,
}

#[tracing::instrument(name = "OAuth login", skip_all)]
pub async fn oauth_login<A: AuthUseCases>(
    State(auth): State<A>,
    ClientMetadata(metadata): ClientMetadata,
    JsonBody(request): JsonBody<OAuthLoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let input = OAuthLoginInput {
        provider: request.provider,
        token: request.token,
    };
    let session = auth.oauth_login(input, metadata).await?;

    Ok(Json(SessionResponse::new(session, "login successful")))
}
