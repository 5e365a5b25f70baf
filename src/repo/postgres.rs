use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::db;
use crate::models::{Dashboard, Note, OwnedNote, RefreshToken, User};
use crate::repo::{NoteRepository, SessionRepository, StoreError, UserRepository};
use crate::roles::RoleSet;

#[derive(Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgRepository {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(db::users::find_by_username(&self.pool, username).await?)
    }

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        Ok(db::users::find_by_id(&self.pool, id).await?)
    }

    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        roles: &RoleSet,
    ) -> Result<User, StoreError> {
        db::users::create(&self.pool, username, password_hash, &roles.to_string())
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                    StoreError::Conflict("Username already exists".to_string())
                }
                _ => StoreError::Database(e),
            })
    }

    async fn deactivate_user(&self, id: i64) -> Result<(), StoreError> {
        Ok(db::users::deactivate(&self.pool, id).await?)
    }
}

#[async_trait]
impl NoteRepository for PgRepository {
    async fn find_active_dashboard(
        &self,
        owner_id: i64,
        title: &str,
    ) -> Result<Option<Dashboard>, StoreError> {
        Ok(db::dashboards::find_active_by_title(&self.pool, owner_id, title).await?)
    }

    async fn list_active_dashboards(&self, owner_id: i64) -> Result<Vec<Dashboard>, StoreError> {
        Ok(db::dashboards::list_active(&self.pool, owner_id).await?)
    }

    async fn list_active_notes(&self, dashboard_ids: &[i64]) -> Result<Vec<Note>, StoreError> {
        if dashboard_ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(db::notes::list_active(&self.pool, dashboard_ids).await?)
    }

    async fn append_notes(
        &self,
        owner_id: i64,
        title: &str,
        texts: &[String],
    ) -> Result<(Dashboard, Vec<Note>), StoreError> {
        let mut tx = self.pool.begin().await?;

        let dashboard = db::dashboards::upsert_for_owner(&mut *tx, owner_id, title)
            .await?
            .ok_or_else(|| {
                StoreError::Conflict("Dashboard title is already taken".to_string())
            })?;

        let mut notes = Vec::with_capacity(texts.len());
        for text in texts {
            notes.push(db::notes::create(&mut *tx, dashboard.id, text).await?);
        }

        tx.commit().await?;
        Ok((dashboard, notes))
    }

    async fn find_note(&self, id: i64) -> Result<Option<OwnedNote>, StoreError> {
        Ok(db::notes::find_with_owner(&self.pool, id).await?)
    }

    async fn update_note_text(&self, id: i64, text: &str) -> Result<Note, StoreError> {
        Ok(db::notes::update_text(&self.pool, id, text).await?)
    }

    async fn deactivate_note(&self, id: i64) -> Result<(), StoreError> {
        Ok(db::notes::deactivate(&self.pool, id).await?)
    }
}

#[async_trait]
impl SessionRepository for PgRepository {
    async fn create_session(
        &self,
        user_id: i64,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<RefreshToken, StoreError> {
        Ok(db::refresh_tokens::create(&self.pool, user_id, token_hash, expires_at).await?)
    }

    async fn find_session(&self, token_hash: &str) -> Result<Option<RefreshToken>, StoreError> {
        Ok(db::refresh_tokens::find_by_hash(&self.pool, token_hash).await?)
    }

    async fn rotate_session(
        &self,
        old_id: i64,
        user_id: i64,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<Option<RefreshToken>, StoreError> {
        let mut tx = self.pool.begin().await?;

        if !db::refresh_tokens::mark_used(&mut *tx, old_id).await? {
            return Ok(None);
        }
        let token = db::refresh_tokens::create(&mut *tx, user_id, token_hash, expires_at).await?;

        tx.commit().await?;
        Ok(Some(token))
    }

    async fn delete_session(&self, token_hash: &str) -> Result<(), StoreError> {
        Ok(db::refresh_tokens::delete_by_hash(&self.pool, token_hash).await?)
    }

    async fn revoke_sessions(&self, user_id: i64) -> Result<(), StoreError> {
        Ok(db::refresh_tokens::delete_all_for_user(&self.pool, user_id).await?)
    }
}
