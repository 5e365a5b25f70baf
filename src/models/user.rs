use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::roles::RoleSet;

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[sqlx(try_from = "String")]
    pub roles: RoleSet,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}
