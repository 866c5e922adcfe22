use axum::{Json, extract::State, response::IntoResponse};
use secrecy::Secret;
use serde::Deserialize;
use warden_application::{AuthUseCases, ChangePasswordInput};

use crate::{error::ApiError, extract::JsonBody, response::SuccessResponse};

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub user_id: String,
    pub old_password: Secret<String>,
    pub new_password: Secret<String>,
}

#[tracing::instrument(name = "Change password", skip_all)]
pub async fn change_password<A: AuthUseCases>(
    State(auth): State<A>,
    JsonBody(request): JsonBody<ChangePasswordRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let input = ChangePasswordInput {
        user_id: request.user_id,
        old_password: request.old_password,
        new_password: request.new_password,
    };
    auth.change_password(input).await?;

    Ok(Json(SuccessResponse::new("password changed successfully")))
}
