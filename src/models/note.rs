use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Note {
    pub id: i64,
    pub text: String,
    pub date_create: DateTime<Utc>,
    pub date_edit: DateTime<Utc>,
    pub dashboard_id: i64,
    pub is_active: bool,
}

/// A note joined with the user that owns its dashboard.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OwnedNote {
    #[sqlx(flatten)]
    pub note: Note,
    pub owner_id: i64,
}

/// Wire shape of a note in list and edit responses.
#[derive(Debug, Clone, Serialize)]
pub struct NoteView {
    pub id: i64,
    pub text: String,
    pub date_create: DateTime<Utc>,
    pub date_edit: DateTime<Utc>,
}

impl From<Note> for NoteView {
    fn from(note: Note) -> Self {
        Self {
            id: note.id,
            text: note.text,
            date_create: note.date_create,
            date_edit: note.date_edit,
        }
    }
}
