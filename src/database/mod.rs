pub mod db;
pub mod document;
pub mod save_queue;
pub mod store;

pub use document::CardDocument;
pub use save_queue::{PersistenceFailure, SaveJob, SaveQueue};
pub use store::{CardStore, CardsChanged, ChangeKind, SqliteCardStore};
