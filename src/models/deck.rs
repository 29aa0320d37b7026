//! Deck is a named set of flashcards
use super::SrsState;
use serde::{Deserialize, Serialize};

/// A deck as stored: cards reference it by id.
#[derive(Clone, Debug, PartialEq)]
pub struct Deck {
    pub id: String,
    pub name: String,
}

/// Portable form of a deck used by JSON import/export.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeckExport {
    pub name: String,
    pub flashcards: Vec<ExportedCard>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExportedCard {
    pub front: String,
    pub back: String,
    /// Absent on hand-written files; the card then starts fresh.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub srs: Option<SrsState>,
}
