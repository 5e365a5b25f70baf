pub mod auth;
pub mod notes;
pub mod users;

use axum::Router;
use axum::routing::{get, post};

use crate::state::SharedState;

pub fn api_routes() -> Router<SharedState> {
    Router::new()
        // Sessions
        .route("/login", post(auth::login))
        .route("/refresh", post(auth::refresh))
        .route("/logout", post(auth::logout))
        // Users (admin)
        .route("/reg-user", post(users::register))
        .route("/unreg-user", post(users::unregister))
        // Notes
        .route("/get-notes", get(notes::list))
        .route("/create-notes", post(notes::create))
        .route("/edit-notes", post(notes::edit))
        .route("/delete-notes", post(notes::delete))
}
