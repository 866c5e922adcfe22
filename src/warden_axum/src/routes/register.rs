use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use secrecy::Secret;
use serde::Deserialize;
use warden_application::AuthUseCases;
use warden_core::RegistrationForm;

use crate::{
    error::ApiError,
    extract::{ClientMetadata, JsonBody},
    response::SessionResponse,
};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: Secret<String>,
    pub password: Secret<String>,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub user_type: String,
}

impl From<RegisterRequest> for RegistrationForm {
    fn from(request: RegisterRequest) -> Self {
        RegistrationForm {
            email: request.email,
            password: request.password,
            first_name: request.first_name,
            last_name: request.last_name,
            phone: request.phone,
            user_type: request.user_type,
        }
    }
}

#[tracing::instrument(name = "Register", skip_all)]
pub async fn register<A: AuthUseCases>(
    State(auth): State<A>,
    ClientMetadata(metadata): ClientMetadata,
    JsonBody(request): JsonBody<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let session = auth.register(request.into(), metadata).await?;

    Ok((
        StatusCode::CREATED,
        Json(SessionResponse::new(session, "user registered successfully")),
    ))
}
