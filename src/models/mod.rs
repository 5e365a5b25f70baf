pub mod dashboard;
pub mod note;
pub mod refresh_token;
pub mod user;

pub use dashboard::Dashboard;
pub use note::{Note, NoteView, OwnedNote};
pub use refresh_token::RefreshToken;
pub use user::User;
