use axum::RequestPartsExt;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::TypedHeader;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;

use crate::auth::jwt;
use crate::error::AppError;
use crate::roles::{Role, RoleSet};
use crate::state::SharedState;

/// The caller behind a valid bearer token. Roles come from the stored user,
/// so a deactivated or demoted account loses access immediately.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i64,
    pub roles: RoleSet,
}

impl AuthUser {
    pub fn require_role(&self, role: Role) -> Result<(), AppError> {
        if self.roles.contains(role) {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!("Role '{role}' required")))
        }
    }

    pub fn require_any(&self, roles: &[Role]) -> Result<(), AppError> {
        if self.roles.contains_any(roles) {
            Ok(())
        } else {
            Err(AppError::Forbidden("Insufficient role".to_string()))
        }
    }
}

impl FromRequestParts<SharedState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| AppError::Unauthorized("Missing authentication token".to_string()))?;

        let claims = jwt::decode_token(bearer.token(), &state.config.jwt_secret)
            .map_err(|_| AppError::Unauthorized("Invalid or expired token".to_string()))?;

        let user_id = claims
            .user_id()
            .ok_or_else(|| AppError::Unauthorized("Invalid or expired token".to_string()))?;

        let user = state
            .users
            .find_user_by_id(user_id)
            .await?
            .filter(|u| u.is_active)
            .ok_or_else(|| AppError::Unauthorized("Account is not active".to_string()))?;

        Ok(AuthUser {
            user_id: user.id,
            roles: user.roles,
        })
    }
}
