use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::AppError;
use crate::models::{Note, NoteView, OwnedNote};
use crate::repo::NoteRepository;

/// Reserved dashboard title that selects every dashboard of the caller.
pub const ALL_DASHBOARDS: &str = "all";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardSelector {
    All,
    Title(String),
}

impl DashboardSelector {
    pub fn parse(raw: &str) -> Self {
        if raw == ALL_DASHBOARDS {
            DashboardSelector::All
        } else {
            DashboardSelector::Title(raw.to_string())
        }
    }
}

/// Active notes keyed by dashboard title.
pub type NotesByDashboard = BTreeMap<String, Vec<NoteView>>;

#[derive(Debug, Serialize)]
pub struct CreatedNotes {
    pub dashboard_title: String,
    pub notes: Vec<NoteView>,
}

pub async fn list_notes(
    repo: &dyn NoteRepository,
    owner_id: i64,
    selector: &DashboardSelector,
) -> Result<NotesByDashboard, AppError> {
    let dashboards = match selector {
        DashboardSelector::All => repo.list_active_dashboards(owner_id).await?,
        DashboardSelector::Title(title) => {
            let dashboard = repo
                .find_active_dashboard(owner_id, title)
                .await?
                .ok_or_else(|| AppError::NotFound("Dashboard not found".to_string()))?;
            vec![dashboard]
        }
    };

    let ids: Vec<i64> = dashboards.iter().map(|d| d.id).collect();
    let notes = repo.list_active_notes(&ids).await?;

    let mut titles: BTreeMap<i64, String> = BTreeMap::new();
    let mut grouped = NotesByDashboard::new();
    for dashboard in dashboards {
        grouped.insert(dashboard.title.clone(), Vec::new());
        titles.insert(dashboard.id, dashboard.title);
    }

    for note in notes.into_iter().filter(|n| n.is_active) {
        if let Some(bucket) = titles
            .get(&note.dashboard_id)
            .and_then(|title| grouped.get_mut(title))
        {
            bucket.push(note.into());
        }
    }

    Ok(grouped)
}

pub async fn create_notes(
    repo: &dyn NoteRepository,
    owner_id: i64,
    dashboard_title: &str,
    texts: &[String],
) -> Result<CreatedNotes, AppError> {
    let (dashboard, notes) = repo.append_notes(owner_id, dashboard_title, texts).await?;

    tracing::info!(
        user_id = owner_id,
        dashboard_id = dashboard.id,
        count = notes.len(),
        "Notes created"
    );

    Ok(CreatedNotes {
        dashboard_title: dashboard.title,
        notes: notes.into_iter().map(NoteView::from).collect(),
    })
}

pub async fn edit_note(
    repo: &dyn NoteRepository,
    owner_id: i64,
    note_id: i64,
    new_text: &str,
) -> Result<NoteView, AppError> {
    let found = repo.find_note(note_id).await?;
    let note = owned_by(found, owner_id, "edit")?;

    let updated = repo.update_note_text(note.id, new_text).await?;
    tracing::info!(user_id = owner_id, note_id, "Note updated");
    Ok(updated.into())
}

pub async fn delete_note(
    repo: &dyn NoteRepository,
    owner_id: i64,
    note_id: i64,
) -> Result<(), AppError> {
    let found = repo.find_note(note_id).await?;
    let note = owned_by(found, owner_id, "delete")?;

    repo.deactivate_note(note.id).await?;
    tracing::info!(user_id = owner_id, note_id, "Note deleted");
    Ok(())
}

/// Existence is checked before ownership. Soft-deleted notes count as
/// missing.
fn owned_by(found: Option<OwnedNote>, owner_id: i64, action: &str) -> Result<Note, AppError> {
    let owned = found
        .filter(|o| o.note.is_active)
        .ok_or_else(|| AppError::NotFound("Note not found".to_string()))?;

    if owned.owner_id != owner_id {
        tracing::warn!(user_id = owner_id, note_id = owned.note.id, "Note ownership check failed");
        return Err(AppError::Forbidden(format!(
            "You don't have permission to {action} this note"
        )));
    }

    Ok(owned.note)
}
