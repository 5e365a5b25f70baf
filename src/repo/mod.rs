//! Storage seams.
//!
//! Handlers and services only see these traits. [`PgRepository`] is the
//! production implementation; tests substitute an in-memory one.

pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::{Dashboard, Note, OwnedNote, RefreshToken, User};
use crate::roles::RoleSet;

pub use postgres::PgRepository;

#[derive(Debug)]
pub enum StoreError {
    /// A uniqueness rule rejected the write.
    Conflict(String),
    Database(sqlx::Error),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Conflict(msg) => write!(f, "Conflict: {msg}"),
            StoreError::Database(err) => write!(f, "Database Error: {err}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Database(err)
    }
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, StoreError>;

    /// Fails with [`StoreError::Conflict`] when the username is taken.
    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        roles: &RoleSet,
    ) -> Result<User, StoreError>;

    async fn deactivate_user(&self, id: i64) -> Result<(), StoreError>;
}

#[async_trait]
pub trait NoteRepository: Send + Sync {
    async fn find_active_dashboard(
        &self,
        owner_id: i64,
        title: &str,
    ) -> Result<Option<Dashboard>, StoreError>;

    async fn list_active_dashboards(&self, owner_id: i64) -> Result<Vec<Dashboard>, StoreError>;

    /// Active notes of the given dashboards, ordered by id.
    async fn list_active_notes(&self, dashboard_ids: &[i64]) -> Result<Vec<Note>, StoreError>;

    /// Upsert the owner's dashboard named `title` and append one note per
    /// entry of `texts`, atomically. Fails with [`StoreError::Conflict`] when
    /// another user owns the title.
    async fn append_notes(
        &self,
        owner_id: i64,
        title: &str,
        texts: &[String],
    ) -> Result<(Dashboard, Vec<Note>), StoreError>;

    async fn find_note(&self, id: i64) -> Result<Option<OwnedNote>, StoreError>;

    async fn update_note_text(&self, id: i64, text: &str) -> Result<Note, StoreError>;

    async fn deactivate_note(&self, id: i64) -> Result<(), StoreError>;
}

#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn create_session(
        &self,
        user_id: i64,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<RefreshToken, StoreError>;

    async fn find_session(&self, token_hash: &str) -> Result<Option<RefreshToken>, StoreError>;

    /// Mark `old_id` used and store its replacement in one step. Returns
    /// `None` if `old_id` had already been used.
    async fn rotate_session(
        &self,
        old_id: i64,
        user_id: i64,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<Option<RefreshToken>, StoreError>;

    async fn delete_session(&self, token_hash: &str) -> Result<(), StoreError>;

    async fn revoke_sessions(&self, user_id: i64) -> Result<(), StoreError>;
}
