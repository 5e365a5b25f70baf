use chrono::Utc;
use serde::Serialize;

use crate::auth::jwt::{Claims, encode_token};
use crate::auth::tokens::{generate_refresh_token, hash_token};
use crate::config::Config;
use crate::error::AppError;
use crate::models::User;
use crate::repo::{SessionRepository, UserRepository};

#[derive(Debug, Serialize)]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
}

fn access_token(config: &Config, user: &User) -> Result<String, AppError> {
    let claims = Claims::new(user.id, user.roles.clone(), config.access_token_ttl);
    encode_token(&claims, &config.jwt_secret).map_err(AppError::Internal)
}

fn tokens(config: &Config, access_token: String, refresh_token: String) -> SessionTokens {
    SessionTokens {
        access_token,
        refresh_token,
        token_type: "Bearer",
        expires_in: config.access_token_ttl.num_seconds(),
    }
}

/// Start a session for an authenticated user.
pub async fn issue(
    sessions: &dyn SessionRepository,
    config: &Config,
    user: &User,
) -> Result<SessionTokens, AppError> {
    let access = access_token(config, user)?;

    let refresh = generate_refresh_token();
    sessions
        .create_session(
            user.id,
            &hash_token(&refresh),
            Utc::now() + config.refresh_token_ttl,
        )
        .await?;

    Ok(tokens(config, access, refresh))
}

/// Trade a refresh token for a new pair. Presenting a token twice revokes
/// every session of its user.
pub async fn refresh(
    users: &dyn UserRepository,
    sessions: &dyn SessionRepository,
    config: &Config,
    refresh_token: &str,
) -> Result<SessionTokens, AppError> {
    let stored = sessions
        .find_session(&hash_token(refresh_token))
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid refresh token".to_string()))?;

    if stored.used {
        return Err(revoke_on_reuse(sessions, stored.user_id).await);
    }

    if stored.expires_at < Utc::now() {
        return Err(AppError::Unauthorized("Refresh token expired".to_string()));
    }

    let user = users
        .find_user_by_id(stored.user_id)
        .await?
        .filter(|u| u.is_active)
        .ok_or_else(|| AppError::Unauthorized("Account is not active".to_string()))?;

    let new_refresh = generate_refresh_token();
    let rotated = sessions
        .rotate_session(
            stored.id,
            user.id,
            &hash_token(&new_refresh),
            Utc::now() + config.refresh_token_ttl,
        )
        .await?;

    // Lost a race with a concurrent refresh of the same token.
    if rotated.is_none() {
        return Err(revoke_on_reuse(sessions, user.id).await);
    }

    let access = access_token(config, &user)?;
    Ok(tokens(config, access, new_refresh))
}

async fn revoke_on_reuse(sessions: &dyn SessionRepository, user_id: i64) -> AppError {
    tracing::warn!(user_id, "Refresh token reuse detected. Revoking all sessions.");
    if let Err(e) = sessions.revoke_sessions(user_id).await {
        return e.into();
    }
    AppError::Unauthorized("Refresh token reuse detected. All sessions revoked.".to_string())
}

pub async fn logout(sessions: &dyn SessionRepository, refresh_token: &str) -> Result<(), AppError> {
    sessions.delete_session(&hash_token(refresh_token)).await?;
    Ok(())
}
