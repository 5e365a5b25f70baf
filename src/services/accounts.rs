use crate::auth::password;
use crate::config::AdminCredentials;
use crate::error::AppError;
use crate::models::User;
use crate::repo::{SessionRepository, UserRepository};
use crate::roles::{Role, RoleSet};

/// Create a user with the `user` role. The duplicate check runs before the
/// confirmation check.
pub async fn register(
    users: &dyn UserRepository,
    username: &str,
    password: &str,
    r_password: &str,
) -> Result<User, AppError> {
    if users.find_user_by_username(username).await?.is_some() {
        return Err(AppError::Conflict("Username already exists".to_string()));
    }

    if password != r_password {
        return Err(AppError::BadRequest("Passwords don't match".to_string()));
    }

    let pw_hash = password::hash(password).map_err(AppError::Internal)?;
    let user = users
        .create_user(username, &pw_hash, &RoleSet::single(Role::User))
        .await?;

    tracing::info!(user_id = user.id, "User registered");
    Ok(user)
}

/// Soft-deactivate a user and revoke their refresh tokens.
pub async fn unregister(
    users: &dyn UserRepository,
    sessions: &dyn SessionRepository,
    username: &str,
) -> Result<User, AppError> {
    let mut user = users
        .find_user_by_username(username)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    users.deactivate_user(user.id).await?;
    sessions.revoke_sessions(user.id).await?;
    user.is_active = false;

    tracing::info!(user_id = user.id, "User deactivated");
    Ok(user)
}

/// Check credentials. Unknown, inactive and mismatched all look the same.
pub async fn authenticate(
    users: &dyn UserRepository,
    username: &str,
    password: &str,
) -> Result<User, AppError> {
    let invalid = || AppError::Unauthorized("Invalid credentials".to_string());

    let Some(user) = users.find_user_by_username(username).await? else {
        password::verify_dummy(password);
        return Err(invalid());
    };

    let valid = password::verify(password, &user.password_hash).map_err(AppError::Internal)?;
    if !valid || !user.is_active {
        return Err(invalid());
    }

    Ok(user)
}

/// Create the configured admin account if no user holds that name. Returns
/// whether an account was created.
pub async fn ensure_default_admin(
    users: &dyn UserRepository,
    creds: &AdminCredentials,
) -> Result<bool, AppError> {
    if users.find_user_by_username(&creds.username).await?.is_some() {
        return Ok(false);
    }

    let pw_hash = password::hash(&creds.password).map_err(AppError::Internal)?;
    let user = users
        .create_user(&creds.username, &pw_hash, &RoleSet::single(Role::Admin))
        .await?;

    tracing::info!(user_id = user.id, username = %user.username, "Default admin created");
    Ok(true)
}
