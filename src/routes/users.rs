use axum::Json;
use axum::extract::State;
use serde::Deserialize;

use crate::auth::extractor::AuthUser;
use crate::error::AppError;
use crate::models::User;
use crate::roles::Role;
use crate::routes::auth::MessageResponse;
use crate::services::accounts;
use crate::state::SharedState;
use crate::validation::{self, Validate, ValidJson, ValidationError};

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub r_password: String,
}

impl Validate for RegisterRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        validation::min_chars("username", &self.username, 3)?;
        validation::max_chars("username", &self.username, 80)?;
        validation::min_chars("password", &self.password, 8)?;
        Ok(())
    }
}

#[derive(Deserialize)]
pub struct UnregisterRequest {
    pub username: String,
}

impl Validate for UnregisterRequest {}

pub async fn register(
    auth: AuthUser,
    State(state): State<SharedState>,
    ValidJson(req): ValidJson<RegisterRequest>,
) -> Result<Json<User>, AppError> {
    auth.require_role(Role::Admin)?;

    let user =
        accounts::register(state.users.as_ref(), &req.username, &req.password, &req.r_password)
            .await?;
    Ok(Json(user))
}

pub async fn unregister(
    auth: AuthUser,
    State(state): State<SharedState>,
    ValidJson(req): ValidJson<UnregisterRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    auth.require_role(Role::Admin)?;

    accounts::unregister(state.users.as_ref(), state.sessions.as_ref(), &req.username).await?;
    Ok(Json(MessageResponse {
        message: "User deleted successfully".to_string(),
    }))
}
