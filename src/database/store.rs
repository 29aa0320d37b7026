//! The card store boundary used by study sessions, and its SQLite implementation.

use super::db;
use super::document::{CardDocument, normalize_state};
use crate::error::StoreError;
use crate::models::{Deck, DeckExport, ExportedCard, Flashcard, SrsPolicy, SrsState};
use log::{debug, warn};
use rusqlite::Connection;
use std::path::Path;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Mutex, MutexGuard};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    StateUpdated,
    Removed,
}

/// Notification emitted after a user's card collection changed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CardsChanged {
    pub user_id: String,
    pub card_id: String,
    pub kind: ChangeKind,
}

/// Persistence of flashcards and their review state, keyed by user and card id.
pub trait CardStore: Send + Sync {
    /// Reads all flashcards of a user.
    fn load_cards(&self, user_id: &str) -> Result<Vec<Flashcard>, StoreError>;

    /// Persists the review state of one card. Saving the same state twice is harmless.
    fn save_card_state(
        &self,
        user_id: &str,
        card_id: &str,
        state: &SrsState,
    ) -> Result<(), StoreError>;

    /// Subscribes to changes of a user's cards. Dropping the receiver unsubscribes.
    fn on_cards_changed(&self, user_id: &str) -> Receiver<CardsChanged>;
}

/// Card store backed by a single SQLite connection.
pub struct SqliteCardStore {
    conn: Mutex<Connection>,
    policy: SrsPolicy,
    subscribers: Mutex<Vec<(String, Sender<CardsChanged>)>>,
}

impl SqliteCardStore {
    pub fn open(path: &Path, policy: SrsPolicy) -> Result<Self, StoreError> {
        Ok(Self::with_connection(db::init_database(path)?, policy))
    }

    pub fn in_memory(policy: SrsPolicy) -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        db::init_schema(&conn)?;
        Ok(Self::with_connection(conn, policy))
    }

    fn with_connection(conn: Connection, policy: SrsPolicy) -> Self {
        Self {
            conn: Mutex::new(conn),
            policy,
            subscribers: Mutex::new(Vec::new()),
        }
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    fn notify(&self, user_id: &str, card_id: &str, kind: ChangeKind) {
        let Ok(mut subscribers) = self.subscribers.lock() else {
            warn!("Change subscribers lock poisoned, dropping {:?} event", kind);
            return;
        };
        let event = CardsChanged {
            user_id: user_id.to_string(),
            card_id: card_id.to_string(),
            kind,
        };
        // Disconnected receivers are pruned as a side effect
        subscribers.retain(|(uid, tx)| uid != user_id || tx.send(event.clone()).is_ok());
    }

    pub fn create_deck(&self, user_id: &str, name: &str) -> Result<Deck, StoreError> {
        let id = db::new_deck(&*self.conn()?, user_id, name)?;
        Ok(Deck {
            id,
            name: name.to_string(),
        })
    }

    pub fn list_decks(&self, user_id: &str) -> Result<Vec<Deck>, StoreError> {
        db::get_decks(&*self.conn()?, user_id)
    }

    /// Authors a new card, due immediately.
    pub fn add_flashcard(
        &self,
        user_id: &str,
        deck_id: &str,
        front: &str,
        back: &str,
        now: i64,
    ) -> Result<Flashcard, StoreError> {
        let srs = SrsState::new(now, &self.policy);
        let id = db::add_flashcard(&*self.conn()?, user_id, deck_id, front, back, now, Some(&srs))?;
        self.notify(user_id, &id, ChangeKind::Added);
        Ok(Flashcard {
            id,
            deck_id: deck_id.to_string(),
            front: front.to_string(),
            back: back.to_string(),
            srs,
            created_at: now,
        })
    }

    pub fn delete_flashcard(&self, user_id: &str, card_id: &str) -> Result<(), StoreError> {
        db::delete_flashcard(&*self.conn()?, user_id, card_id)?;
        self.notify(user_id, card_id, ChangeKind::Removed);
        Ok(())
    }

    /// Creates a deck from an exported file. Fails if a deck with that name exists.
    pub fn import_deck(&self, user_id: &str, export: &DeckExport, now: i64) -> Result<Deck, StoreError> {
        let added = {
            let mut conn = self.conn()?;
            if db::find_deck_by_name(&conn, user_id, &export.name)?.is_some() {
                return Err(StoreError::DeckExists(export.name.clone()));
            }
            let tx = conn.transaction()?;
            let deck_id = db::new_deck(&tx, user_id, &export.name)?;
            let mut added = Vec::with_capacity(export.flashcards.len());
            for card in &export.flashcards {
                let srs = match &card.srs {
                    Some(state) => normalize_state(state.clone(), &self.policy),
                    None => SrsState::new(now, &self.policy),
                };
                added.push(db::add_flashcard(
                    &tx,
                    user_id,
                    &deck_id,
                    &card.front,
                    &card.back,
                    now,
                    Some(&srs),
                )?);
            }
            tx.commit()?;
            (deck_id, added)
        };

        let (deck_id, card_ids) = added;
        for card_id in &card_ids {
            self.notify(user_id, card_id, ChangeKind::Added);
        }
        Ok(Deck {
            id: deck_id,
            name: export.name.clone(),
        })
    }

    /// Builds the portable form of one deck.
    pub fn export_deck(&self, user_id: &str, deck: &Deck) -> Result<DeckExport, StoreError> {
        let flashcards = self
            .load_cards(user_id)?
            .into_iter()
            .filter(|card| card.deck_id == deck.id)
            .map(|card| ExportedCard {
                front: card.front,
                back: card.back,
                srs: Some(card.srs),
            })
            .collect();
        Ok(DeckExport {
            name: deck.name.clone(),
            flashcards,
        })
    }
}

impl CardStore for SqliteCardStore {
    fn load_cards(&self, user_id: &str) -> Result<Vec<Flashcard>, StoreError> {
        let documents = db::load_card_documents(&*self.conn()?, user_id)?;
        let cards = documents
            .into_iter()
            .filter_map(|doc: CardDocument| match doc.into_flashcard(&self.policy) {
                Ok(card) => Some(card),
                Err(e) => {
                    warn!("Skipping card document for user {}: {}", user_id, e);
                    None
                }
            })
            .collect::<Vec<_>>();
        debug!("Loaded {} cards for user {}", cards.len(), user_id);
        Ok(cards)
    }

    fn save_card_state(
        &self,
        user_id: &str,
        card_id: &str,
        state: &SrsState,
    ) -> Result<(), StoreError> {
        db::update_card_state(&*self.conn()?, user_id, card_id, state)?;
        self.notify(user_id, card_id, ChangeKind::StateUpdated);
        Ok(())
    }

    fn on_cards_changed(&self, user_id: &str) -> Receiver<CardsChanged> {
        let (tx, rx) = mpsc::channel();
        match self.subscribers.lock() {
            Ok(mut subscribers) => subscribers.push((user_id.to_string(), tx)),
            Err(_) => warn!("Change subscribers lock poisoned, subscription inert"),
        }
        rx
    }
}
