use axum::{Json, extract::State, response::IntoResponse};
use secrecy::Secret;
use serde::Deserialize;
use warden_application::{AuthUseCases, LoginInput};

use crate::{
    error::ApiError,
    extract::{ClientMetadata, JsonBody},
    response::SessionResponse,
};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Secret<String>,
    pub password: Secret<String>,
}

#[tracing::instrument(name = "Login", skip_all)]
pub async fn login<A: AuthUseCases>(
    State(auth): State<A>,
    ClientMetadata(metadata): ClientMetadata,
    JsonBody(request): JsonBody<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let input = LoginInput {
        email: request.email,
        password: request.password,
    };
    let session = auth.login(input, metadata).await?;

    Ok(Json(SessionResponse::new(session, "login successful")))
}
