//! Database operations for the flashcard store
//!
//! Handles SQLite schema initialization, CRUD operations for decks and flashcards,
//! and persistence of each card's spaced repetition state.

use super::document::{CardDocument, SrsDocument};
use crate::error::StoreError;
use crate::models::{Deck, SrsState};
use log::{info, warn};
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;
use uuid::Uuid;

type Result<T> = std::result::Result<T, StoreError>;

/// Opens (or creates) the SQLite database at `path` and makes sure the schema exists.
pub fn init_database(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)?;
    init_schema(&conn)?;
    info!("Card database ready at {}", path.display());
    Ok(conn)
}

/// Creates tables for decks and flashcards.
///
/// The review state lives in the `srs` column as a JSON document and may be
/// NULL for cards that were never scheduled.
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "PRAGMA foreign_keys = ON;
        CREATE TABLE IF NOT EXISTS decks (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            name TEXT NOT NULL,
            UNIQUE(user_id, name)
        );
        CREATE TABLE IF NOT EXISTS flashcards (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            deck_id TEXT NOT NULL,
            front TEXT NOT NULL,
            back TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            srs TEXT,
            FOREIGN KEY (deck_id) REFERENCES decks(id) ON DELETE CASCADE
        );
        CREATE INDEX IF NOT EXISTS flashcards_by_user ON flashcards(user_id);",
    )?;
    Ok(())
}

/// Creates a new deck and returns its id
pub fn new_deck(conn: &Connection, user_id: &str, name: &str) -> Result<String> {
    let id = Uuid::new_v4().to_string();
    conn.execute(
        "INSERT INTO decks (id, user_id, name) VALUES (?1, ?2, ?3)",
        params![id, user_id, name],
    )?;
    info!("Deck '{}' created", name);
    Ok(id)
}

/// Finds a deck by name for one user
pub fn find_deck_by_name(conn: &Connection, user_id: &str, name: &str) -> Result<Option<Deck>> {
    let deck = conn
        .query_row(
            "SELECT id, name FROM decks WHERE user_id = ?1 AND name = ?2",
            params![user_id, name],
            |row| {
                Ok(Deck {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            },
        )
        .optional()?;
    Ok(deck)
}

/// Retrieves all decks of a user, ordered by name
pub fn get_decks(conn: &Connection, user_id: &str) -> Result<Vec<Deck>> {
    let mut stmt = conn.prepare("SELECT id, name FROM decks WHERE user_id = ?1 ORDER BY name")?;
    let decks = stmt
        .query_map(params![user_id], |row| {
            Ok(Deck {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<Deck>>>()?;
    Ok(decks)
}

/// Adds a flashcard to a deck and returns the new card id.
///
/// `srs` is stored as given; `None` leaves the column empty so the card loads as new.
pub fn add_flashcard(
    conn: &Connection,
    user_id: &str,
    deck_id: &str,
    front: &str,
    back: &str,
    created_at: i64,
    srs: Option<&SrsState>,
) -> Result<String> {
    let deck_exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM decks WHERE id = ?1 AND user_id = ?2)",
        params![deck_id, user_id],
        |row| row.get(0),
    )?;
    if !deck_exists {
        return Err(StoreError::DeckNotFound(deck_id.to_string()));
    }

    let id = Uuid::new_v4().to_string();
    let srs_json = srs.map(serde_json::to_string).transpose()?;
    conn.execute(
        "INSERT INTO flashcards (id, user_id, deck_id, front, back, created_at, srs)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![id, user_id, deck_id, front, back, created_at, srs_json],
    )?;
    Ok(id)
}

/// Deletes one flashcard together with its review state
pub fn delete_flashcard(conn: &Connection, user_id: &str, card_id: &str) -> Result<()> {
    let deleted = conn.execute(
        "DELETE FROM flashcards WHERE id = ?1 AND user_id = ?2",
        params![card_id, user_id],
    )?;
    if deleted == 0 {
        return Err(StoreError::CardNotFound(card_id.to_string()));
    }
    Ok(())
}

/// Reads every card of a user as a raw document, oldest first
pub fn load_card_documents(conn: &Connection, user_id: &str) -> Result<Vec<CardDocument>> {
    let mut stmt = conn.prepare(
        "SELECT id, deck_id, front, back, created_at, srs
         FROM flashcards
         WHERE user_id = ?1
         ORDER BY created_at ASC, id ASC",
    )?;

    let rows = stmt
        .query_map(params![user_id], |row| {
            Ok((
                CardDocument {
                    id: row.get(0)?,
                    deck_id: row.get(1)?,
                    front: row.get(2)?,
                    back: row.get(3)?,
                    srs: None,
                    created_at: row.get(4)?,
                },
                row.get::<_, Option<String>>(5)?,
            ))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let documents = rows
        .into_iter()
        .map(|(mut doc, srs_json)| {
            doc.srs = srs_json.and_then(|raw| match serde_json::from_str::<SrsDocument>(&raw) {
                Ok(srs) => Some(srs),
                Err(e) => {
                    warn!("Ignoring unreadable review state of card {:?}: {}", doc.id, e);
                    None
                }
            });
            doc
        })
        .collect();

    Ok(documents)
}

/// Overwrites the review state of one card
pub fn update_card_state(
    conn: &Connection,
    user_id: &str,
    card_id: &str,
    state: &SrsState,
) -> Result<()> {
    let srs_json = serde_json::to_string(state)?;
    let updated = conn.execute(
        "UPDATE flashcards SET srs = ?1 WHERE id = ?2 AND user_id = ?3",
        params![srs_json, card_id, user_id],
    )?;
    if updated == 0 {
        return Err(StoreError::CardNotFound(card_id.to_string()));
    }
    Ok(())
}
