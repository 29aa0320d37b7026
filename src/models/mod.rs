pub mod deck;
pub mod flashcard;
pub mod rating;
pub mod session_queue;
pub mod sm2;
pub mod srs_state;
pub mod stats;
pub mod study_session;

pub use deck::{Deck, DeckExport, ExportedCard};
pub use flashcard::Flashcard;
pub use rating::Rating;
pub use session_queue::SessionLimits;
pub use sm2::SrsPolicy;
pub use srs_state::SrsState;
pub use stats::{DeckStats, SessionSummary};
pub use study_session::StudySession;
