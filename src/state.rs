use std::sync::Arc;

use crate::config::Config;
use crate::rate_limit::LoginRateLimiter;
use crate::repo::{NoteRepository, SessionRepository, UserRepository};

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub config: Config,
    pub users: Arc<dyn UserRepository>,
    pub notes: Arc<dyn NoteRepository>,
    pub sessions: Arc<dyn SessionRepository>,
    pub login_limiter: LoginRateLimiter,
}
