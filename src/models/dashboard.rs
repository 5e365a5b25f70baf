use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Dashboard {
    pub id: i64,
    pub title: String,
    pub user_id: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}
