use sqlx::PgPool;

use crate::models::{Note, OwnedNote};

pub async fn create<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    dashboard_id: i64,
    text: &str,
) -> Result<Note, sqlx::Error> {
    sqlx::query_as::<_, Note>(
        "INSERT INTO notes (dashboard_id, text) VALUES ($1, $2) RETURNING *",
    )
    .bind(dashboard_id)
    .bind(text)
    .fetch_one(executor)
    .await
}

pub async fn list_active(pool: &PgPool, dashboard_ids: &[i64]) -> Result<Vec<Note>, sqlx::Error> {
    sqlx::query_as::<_, Note>(
        "SELECT * FROM notes WHERE dashboard_id = ANY($1) AND is_active ORDER BY id",
    )
    .bind(dashboard_ids)
    .fetch_all(pool)
    .await
}

pub async fn find_with_owner(pool: &PgPool, id: i64) -> Result<Option<OwnedNote>, sqlx::Error> {
    sqlx::query_as::<_, OwnedNote>(
        "SELECT n.*, d.user_id AS owner_id
         FROM notes n JOIN dashboards d ON d.id = n.dashboard_id
         WHERE n.id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn update_text(pool: &PgPool, id: i64, text: &str) -> Result<Note, sqlx::Error> {
    sqlx::query_as::<_, Note>(
        "UPDATE notes SET text = $2, date_edit = now() WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(text)
    .fetch_one(pool)
    .await
}

pub async fn deactivate(pool: &PgPool, id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE notes SET is_active = false, date_edit = now() WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}
