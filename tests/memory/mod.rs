//! In-memory implementation of the repository traits, for exercising the
//! service layer without a database.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use notedesk::models::{Dashboard, Note, OwnedNote, RefreshToken, User};
use notedesk::repo::{NoteRepository, SessionRepository, StoreError, UserRepository};
use notedesk::roles::RoleSet;

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    dashboards: Vec<Dashboard>,
    notes: Vec<Note>,
    sessions: Vec<RefreshToken>,
}

#[derive(Default)]
pub struct MemoryRepository {
    tables: Mutex<Tables>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a user directly, bypassing password hashing.
    pub fn seed_user(&self, username: &str, roles: RoleSet) -> User {
        let mut t = self.tables.lock().unwrap();
        let user = User {
            id: t.users.len() as i64 + 1,
            username: username.to_string(),
            password_hash: String::new(),
            roles,
            is_active: true,
            created_at: Utc::now(),
        };
        t.users.push(user.clone());
        user
    }

    pub fn session_count(&self, user_id: i64) -> usize {
        let t = self.tables.lock().unwrap();
        t.sessions.iter().filter(|s| s.user_id == user_id).count()
    }

    pub fn expire_sessions(&self, user_id: i64) {
        let mut t = self.tables.lock().unwrap();
        for s in t.sessions.iter_mut().filter(|s| s.user_id == user_id) {
            s.expires_at = Utc::now() - chrono::Duration::minutes(1);
        }
    }

    pub fn note(&self, id: i64) -> Option<Note> {
        let t = self.tables.lock().unwrap();
        t.notes.iter().find(|n| n.id == id).cloned()
    }
}

#[async_trait]
impl UserRepository for MemoryRepository {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let t = self.tables.lock().unwrap();
        Ok(t.users.iter().find(|u| u.username == username).cloned())
    }

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        let t = self.tables.lock().unwrap();
        Ok(t.users.iter().find(|u| u.id == id).cloned())
    }

    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        roles: &RoleSet,
    ) -> Result<User, StoreError> {
        let mut t = self.tables.lock().unwrap();
        if t.users.iter().any(|u| u.username == username) {
            return Err(StoreError::Conflict("Username already exists".to_string()));
        }
        let user = User {
            id: t.users.len() as i64 + 1,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            roles: roles.clone(),
            is_active: true,
            created_at: Utc::now(),
        };
        t.users.push(user.clone());
        Ok(user)
    }

    async fn deactivate_user(&self, id: i64) -> Result<(), StoreError> {
        let mut t = self.tables.lock().unwrap();
        if let Some(u) = t.users.iter_mut().find(|u| u.id == id) {
            u.is_active = false;
        }
        Ok(())
    }
}

#[async_trait]
impl NoteRepository for MemoryRepository {
    async fn find_active_dashboard(
        &self,
        owner_id: i64,
        title: &str,
    ) -> Result<Option<Dashboard>, StoreError> {
        let t = self.tables.lock().unwrap();
        Ok(t.dashboards
            .iter()
            .find(|d| d.user_id == owner_id && d.title == title && d.is_active)
            .cloned())
    }

    async fn list_active_dashboards(&self, owner_id: i64) -> Result<Vec<Dashboard>, StoreError> {
        let t = self.tables.lock().unwrap();
        Ok(t.dashboards
            .iter()
            .filter(|d| d.user_id == owner_id && d.is_active)
            .cloned()
            .collect())
    }

    async fn list_active_notes(&self, dashboard_ids: &[i64]) -> Result<Vec<Note>, StoreError> {
        let t = self.tables.lock().unwrap();
        Ok(t.notes
            .iter()
            .filter(|n| n.is_active && dashboard_ids.contains(&n.dashboard_id))
            .cloned()
            .collect())
    }

    async fn append_notes(
        &self,
        owner_id: i64,
        title: &str,
        texts: &[String],
    ) -> Result<(Dashboard, Vec<Note>), StoreError> {
        let mut t = self.tables.lock().unwrap();

        let existing = t.dashboards.iter().position(|d| d.title == title);
        let dashboard = match existing {
            Some(i) if t.dashboards[i].user_id != owner_id => {
                return Err(StoreError::Conflict(
                    "Dashboard title is already taken".to_string(),
                ));
            }
            Some(i) => {
                t.dashboards[i].is_active = true;
                t.dashboards[i].clone()
            }
            None => {
                let d = Dashboard {
                    id: t.dashboards.len() as i64 + 1,
                    title: title.to_string(),
                    user_id: owner_id,
                    is_active: true,
                    created_at: Utc::now(),
                };
                t.dashboards.push(d.clone());
                d
            }
        };

        let mut created = Vec::with_capacity(texts.len());
        for text in texts {
            let now = Utc::now();
            let note = Note {
                id: t.notes.len() as i64 + 1,
                text: text.clone(),
                date_create: now,
                date_edit: now,
                dashboard_id: dashboard.id,
                is_active: true,
            };
            t.notes.push(note.clone());
            created.push(note);
        }

        Ok((dashboard, created))
    }

    async fn find_note(&self, id: i64) -> Result<Option<OwnedNote>, StoreError> {
        let t = self.tables.lock().unwrap();
        let Some(note) = t.notes.iter().find(|n| n.id == id) else {
            return Ok(None);
        };
        let owner_id = t
            .dashboards
            .iter()
            .find(|d| d.id == note.dashboard_id)
            .map(|d| d.user_id)
            .expect("note without dashboard");
        Ok(Some(OwnedNote {
            note: note.clone(),
            owner_id,
        }))
    }

    async fn update_note_text(&self, id: i64, text: &str) -> Result<Note, StoreError> {
        let mut t = self.tables.lock().unwrap();
        let note = t
            .notes
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or(StoreError::Database(sqlx::Error::RowNotFound))?;
        note.text = text.to_string();
        note.date_edit = Utc::now();
        Ok(note.clone())
    }

    async fn deactivate_note(&self, id: i64) -> Result<(), StoreError> {
        let mut t = self.tables.lock().unwrap();
        if let Some(n) = t.notes.iter_mut().find(|n| n.id == id) {
            n.is_active = false;
            n.date_edit = Utc::now();
        }
        Ok(())
    }
}

#[async_trait]
impl SessionRepository for MemoryRepository {
    async fn create_session(
        &self,
        user_id: i64,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<RefreshToken, StoreError> {
        let mut t = self.tables.lock().unwrap();
        let token = RefreshToken {
            id: t.sessions.len() as i64 + 1,
            user_id,
            token_hash: token_hash.to_string(),
            expires_at,
            used: false,
            created_at: Utc::now(),
        };
        t.sessions.push(token.clone());
        Ok(token)
    }

    async fn find_session(&self, token_hash: &str) -> Result<Option<RefreshToken>, StoreError> {
        let t = self.tables.lock().unwrap();
        Ok(t.sessions.iter().find(|s| s.token_hash == token_hash).cloned())
    }

    async fn rotate_session(
        &self,
        old_id: i64,
        user_id: i64,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<Option<RefreshToken>, StoreError> {
        {
            let mut t = self.tables.lock().unwrap();
            match t.sessions.iter_mut().find(|s| s.id == old_id) {
                Some(s) if !s.used => s.used = true,
                _ => return Ok(None),
            }
        }
        self.create_session(user_id, token_hash, expires_at)
            .await
            .map(Some)
    }

    async fn delete_session(&self, token_hash: &str) -> Result<(), StoreError> {
        let mut t = self.tables.lock().unwrap();
        t.sessions.retain(|s| s.token_hash != token_hash);
        Ok(())
    }

    async fn revoke_sessions(&self, user_id: i64) -> Result<(), StoreError> {
        let mut t = self.tables.lock().unwrap();
        t.sessions.retain(|s| s.user_id != user_id);
        Ok(())
    }
}
