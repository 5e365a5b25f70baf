//! Domain rules, written against the repository traits only.

pub mod accounts;
pub mod notes;
pub mod sessions;
