// Storage layer for Solace (Postgres via sqlx)
//
// Repositories own the SQL; the SessionStore trait implementation maps
// rows to the core domain types so the pipeline stays DB-agnostic.

pub mod models;
pub mod repositories;
pub mod session_store;

pub use models::{CreateMood, MessageRow, MoodRow, NewMessageRow, SessionRow};
pub use repositories::Database;
pub use session_store::PgSessionStore;
