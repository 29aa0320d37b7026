pub mod config;
pub mod database;
pub mod error;
pub mod export;
pub mod models;

pub use config::AppConfig;
pub use database::{CardStore, SqliteCardStore};
pub use error::{StoreError, StudyError};
pub use models::{Flashcard, Rating, SrsState, StudySession};
