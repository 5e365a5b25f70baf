use sqlx::PgPool;

use crate::models::Dashboard;

/// Insert a dashboard for `user_id`, or reuse the one it already owns under
/// `title`. Returns `None` when the title belongs to another user.
pub async fn upsert_for_owner<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    user_id: i64,
    title: &str,
) -> Result<Option<Dashboard>, sqlx::Error> {
    sqlx::query_as::<_, Dashboard>(
        "INSERT INTO dashboards (title, user_id) VALUES ($1, $2)
         ON CONFLICT (title) DO UPDATE SET is_active = true
         WHERE dashboards.user_id = EXCLUDED.user_id
         RETURNING *",
    )
    .bind(title)
    .bind(user_id)
    .fetch_optional(executor)
    .await
}

pub async fn find_active_by_title(
    pool: &PgPool,
    user_id: i64,
    title: &str,
) -> Result<Option<Dashboard>, sqlx::Error> {
    sqlx::query_as::<_, Dashboard>(
        "SELECT * FROM dashboards WHERE title = $1 AND user_id = $2 AND is_active",
    )
    .bind(title)
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

pub async fn list_active(pool: &PgPool, user_id: i64) -> Result<Vec<Dashboard>, sqlx::Error> {
    sqlx::query_as::<_, Dashboard>(
        "SELECT * FROM dashboards WHERE user_id = $1 AND is_active ORDER BY id",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}
