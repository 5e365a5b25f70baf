use axum::Json;
use axum::extract::{RawQuery, State};
use bytes::Bytes;
use serde::Deserialize;

use crate::auth::extractor::AuthUser;
use crate::error::AppError;
use crate::models::NoteView;
use crate::roles::Role;
use crate::routes::auth::MessageResponse;
use crate::services::notes::{
    self as note_service, ALL_DASHBOARDS, CreatedNotes, DashboardSelector, NotesByDashboard,
};
use crate::state::SharedState;
use crate::validation::{self, Validate, ValidJson, ValidationError};

const NOTE_ROLES: &[Role] = &[Role::User, Role::Admin];

#[derive(Deserialize)]
pub struct GetNotesRequest {
    pub dashboard_title: String,
}

impl Validate for GetNotesRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        validation::min_chars("dashboard_title", &self.dashboard_title, 1)?;
        validation::max_chars("dashboard_title", &self.dashboard_title, 80)
    }
}

#[derive(Deserialize)]
pub struct CreateNotesRequest {
    pub dashboard_title: String,
    pub notes: Vec<String>,
}

impl Validate for CreateNotesRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        validation::min_chars("dashboard_title", &self.dashboard_title, 1)?;
        validation::max_chars("dashboard_title", &self.dashboard_title, 80)?;
        if self.dashboard_title == ALL_DASHBOARDS {
            return Err(ValidationError::new(
                "value_error",
                "dashboard_title",
                format!("'{ALL_DASHBOARDS}' is reserved"),
            ));
        }
        Ok(())
    }
}

#[derive(Deserialize)]
pub struct EditNoteRequest {
    pub note_id: i64,
    pub note_new_text: String,
}

impl Validate for EditNoteRequest {}

#[derive(Deserialize)]
pub struct DeleteNoteRequest {
    pub note_id: i64,
}

impl Validate for DeleteNoteRequest {}

/// `dashboard_title` may arrive in the query string or, for older clients,
/// as a JSON body on the GET.
pub async fn list(
    auth: AuthUser,
    State(state): State<SharedState>,
    RawQuery(query): RawQuery,
    body: Bytes,
) -> Result<Json<NotesByDashboard>, AppError> {
    auth.require_any(NOTE_ROLES)?;

    // Unrelated query parameters must not hide a JSON body.
    let req: GetNotesRequest = match query.as_deref() {
        Some(q) if form_urlencoded::parse(q.as_bytes()).any(|(k, _)| k == "dashboard_title") => {
            validation::parse_query(q)?
        }
        _ => validation::parse_json(&body)?,
    };

    let selector = DashboardSelector::parse(&req.dashboard_title);
    let notes = note_service::list_notes(state.notes.as_ref(), auth.user_id, &selector).await?;
    Ok(Json(notes))
}

pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    ValidJson(req): ValidJson<CreateNotesRequest>,
) -> Result<Json<CreatedNotes>, AppError> {
    auth.require_any(NOTE_ROLES)?;

    let created = note_service::create_notes(
        state.notes.as_ref(),
        auth.user_id,
        &req.dashboard_title,
        &req.notes,
    )
    .await?;
    Ok(Json(created))
}

pub async fn edit(
    auth: AuthUser,
    State(state): State<SharedState>,
    ValidJson(req): ValidJson<EditNoteRequest>,
) -> Result<Json<NoteView>, AppError> {
    auth.require_any(NOTE_ROLES)?;

    let note = note_service::edit_note(
        state.notes.as_ref(),
        auth.user_id,
        req.note_id,
        &req.note_new_text,
    )
    .await?;
    Ok(Json(note))
}

pub async fn delete(
    auth: AuthUser,
    State(state): State<SharedState>,
    ValidJson(req): ValidJson<DeleteNoteRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    auth.require_any(NOTE_ROLES)?;

    note_service::delete_note(state.notes.as_ref(), auth.user_id, req.note_id).await?;
    Ok(Json(MessageResponse {
        message: "Note deleted successfully".to_string(),
    }))
}
