pub mod dashboards;
pub mod notes;
pub mod refresh_tokens;
pub mod users;
