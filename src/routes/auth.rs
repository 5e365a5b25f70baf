use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::services::{accounts, sessions};
use crate::services::sessions::SessionTokens;
use crate::state::SharedState;
use crate::validation::{Validate, ValidJson};

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl Validate for LoginRequest {}

#[derive(Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

impl Validate for RefreshRequest {}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

pub async fn login(
    State(state): State<SharedState>,
    ValidJson(req): ValidJson<LoginRequest>,
) -> Result<Json<SessionTokens>, AppError> {
    if state.login_limiter.check(&req.username).is_err() {
        return Err(AppError::RateLimited(
            "Too many login attempts. Please try again later.".to_string(),
        ));
    }

    let user = match accounts::authenticate(state.users.as_ref(), &req.username, &req.password).await {
        Ok(user) => user,
        Err(AppError::Unauthorized(msg)) => {
            state.login_limiter.record_failure(&req.username);
            tracing::warn!(username = %req.username, "Failed login attempt");
            return Err(AppError::Unauthorized(msg));
        }
        Err(e) => return Err(e),
    };

    let tokens = sessions::issue(state.sessions.as_ref(), &state.config, &user).await?;
    tracing::info!(user_id = user.id, "User logged in");
    Ok(Json(tokens))
}

pub async fn refresh(
    State(state): State<SharedState>,
    ValidJson(req): ValidJson<RefreshRequest>,
) -> Result<Json<SessionTokens>, AppError> {
    let tokens = sessions::refresh(
        state.users.as_ref(),
        state.sessions.as_ref(),
        &state.config,
        &req.refresh_token,
    )
    .await?;
    Ok(Json(tokens))
}

pub async fn logout(
    State(state): State<SharedState>,
    ValidJson(req): ValidJson<RefreshRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    sessions::logout(state.sessions.as_ref(), &req.refresh_token).await?;
    Ok(Json(MessageResponse {
        message: "Logged out successfully".to_string(),
    }))
}
