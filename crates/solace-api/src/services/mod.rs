// Service layer between HTTP routes and the core/storage crates

pub mod chat;
pub mod mood;

pub use chat::ChatService;
pub use mood::{InMemoryMoodStore, MoodStore};
