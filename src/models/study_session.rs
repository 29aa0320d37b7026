//! Study session management for spaced repetition practice.
//! Shows a frozen queue of cards one at a time, schedules each with SM-2 after it
//! is rated and hands the result to the background writer.

use super::session_queue::{SessionLimits, build_session_queue};
use super::sm2::{SrsPolicy, calculate_next_review, preview_intervals};
use super::stats::SessionSummary;
use super::{Flashcard, Rating, SrsState};
use crate::database::{CardStore, PersistenceFailure, SaveJob, SaveQueue};
use crate::error::StudyError;
use log::info;
use rand::Rng;
use std::sync::Arc;

/// One pass over a session queue.
///
/// The queue is captured when the session starts; changes to the card
/// collection made afterwards (by this session's own writes or anyone else)
/// never reorder or remove cards from it.
pub struct StudySession {
    user_id: String,
    queue: Vec<Flashcard>,
    current_index: usize,
    show_answer: bool,
    policy: SrsPolicy,
    writer: SaveQueue,
    summary: SessionSummary,
}

impl StudySession {
    pub fn start<R: Rng + ?Sized>(
        user_id: &str,
        cards: &[Flashcard],
        now: i64,
        limits: &SessionLimits,
        policy: SrsPolicy,
        store: Arc<dyn CardStore>,
        rng: &mut R,
    ) -> Self {
        let queue = build_session_queue(cards, now, limits, rng);
        info!(
            "Study session started for {} with {} cards",
            user_id,
            queue.len()
        );
        Self {
            user_id: user_id.to_string(),
            queue,
            current_index: 0,
            show_answer: false,
            policy,
            writer: SaveQueue::spawn(store),
            summary: SessionSummary::default(),
        }
    }

    pub fn current_card(&self) -> Option<&Flashcard> {
        self.queue.get(self.current_index)
    }

    pub fn queue(&self) -> &[Flashcard] {
        &self.queue
    }

    /// Shows the back of the current card; ratings are accepted afterwards.
    pub fn reveal(&mut self) {
        if !self.is_finished() {
            self.show_answer = true;
        }
    }

    pub fn is_revealed(&self) -> bool {
        self.show_answer
    }

    /// Schedules the current card, queues the write and advances to the next card.
    pub fn rate(&mut self, rating: Rating, now: i64) -> Result<SrsState, StudyError> {
        let card = self
            .queue
            .get_mut(self.current_index)
            .ok_or(StudyError::SessionFinished)?;
        if !self.show_answer {
            return Err(StudyError::AnswerNotRevealed);
        }

        let next = calculate_next_review(&card.srs, rating, now, &self.policy);
        card.srs = next.clone();

        self.writer.submit(SaveJob {
            user_id: self.user_id.clone(),
            card_id: card.id.clone(),
            state: next.clone(),
        });
        self.summary.record(rating);

        self.current_index += 1;
        self.show_answer = false;
        Ok(next)
    }

    /// Keyboard entry point: space reveals, `1`-`4` rate.
    ///
    /// Returns the new state when the key rated the card.
    pub fn handle_key(&mut self, key: char, now: i64) -> Result<Option<SrsState>, StudyError> {
        if key == ' ' {
            self.reveal();
            return Ok(None);
        }
        let rating = Rating::from_key(key)?;
        self.rate(rating, now).map(Some)
    }

    /// Interval each rating would give the current card.
    pub fn preview_intervals(&self) -> Option<[u32; 4]> {
        self.current_card()
            .map(|card| preview_intervals(&card.srs, &self.policy))
    }

    pub fn reviewed_count(&self) -> usize {
        self.current_index
    }

    pub fn total_count(&self) -> usize {
        self.queue.len()
    }

    pub fn remaining_count(&self) -> usize {
        self.total_count() - self.reviewed_count()
    }

    pub fn is_finished(&self) -> bool {
        self.current_index >= self.queue.len()
    }

    pub fn summary(&self) -> &SessionSummary {
        &self.summary
    }

    /// Persistence failures reported since the last call, for non-blocking notification.
    pub fn take_failures(&self) -> Vec<PersistenceFailure> {
        self.writer.take_failures()
    }

    /// Ends the session once all queued writes completed.
    pub fn finish(self) -> (SessionSummary, Vec<PersistenceFailure>) {
        let failures = self.writer.close();
        info!(
            "Study session of {} finished: {} reviewed, {} failed writes",
            self.user_id,
            self.summary.reviewed,
            failures.len()
        );
        (self.summary, failures)
    }

    pub fn progress(&self) -> String {
        if self.is_finished() {
            format!("Done: {} cards reviewed", self.reviewed_count())
        } else {
            format!(
                "Card {} of {} ({} remaining)",
                self.current_index + 1,
                self.total_count(),
                self.remaining_count()
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::SqliteCardStore;
    use crate::error::StoreError;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::sync::mpsc::{self, Receiver};

    const NOW: i64 = 1_700_000_000_000;
    const DAY: i64 = 86_400_000;

    struct FailingStore;

    impl CardStore for FailingStore {
        fn load_cards(&self, _user_id: &str) -> Result<Vec<Flashcard>, StoreError> {
            Ok(Vec::new())
        }

        fn save_card_state(
            &self,
            _user_id: &str,
            _card_id: &str,
            _state: &SrsState,
        ) -> Result<(), StoreError> {
            Err(StoreError::Poisoned)
        }

        fn on_cards_changed(&self, _user_id: &str) -> Receiver<crate::database::CardsChanged> {
            mpsc::channel().1
        }
    }

    fn seeded_store(due: usize) -> Arc<SqliteCardStore> {
        let store = Arc::new(SqliteCardStore::in_memory(SrsPolicy::default()).unwrap());
        let deck = store.create_deck("alice", "Maths").unwrap();
        for i in 0..due {
            let front = format!("{} + {}", i, i);
            let back = (2 * i).to_string();
            store
                .add_flashcard("alice", &deck.id, &front, &back, NOW - 1_000 + i as i64)
                .unwrap();
        }
        store
    }

    fn start(store: Arc<dyn CardStore>) -> StudySession {
        let cards = store.load_cards("alice").unwrap();
        StudySession::start(
            "alice",
            &cards,
            NOW,
            &SessionLimits::default(),
            SrsPolicy::default(),
            store,
            &mut StdRng::seed_from_u64(1),
        )
    }

    #[test]
    fn test_rating_requires_reveal() {
        let mut session = start(seeded_store(2));
        assert!(matches!(
            session.rate(Rating::Good, NOW),
            Err(StudyError::AnswerNotRevealed)
        ));
        assert_eq!(session.reviewed_count(), 0);

        session.reveal();
        assert!(session.is_revealed());
        let state = session.rate(Rating::Good, NOW).unwrap();
        assert_eq!(state.repetition, 1);
        assert_eq!(state.next_review, NOW + DAY);
        assert!(!session.is_revealed());
    }

    #[test]
    fn test_full_session_persists_every_rating() {
        let store = seeded_store(3);
        let mut session = start(store.clone());
        assert_eq!(session.total_count(), 3);

        let order: Vec<String> = session.queue().iter().map(|c| c.id.clone()).collect();
        for key in ['3', '4', '1'] {
            session.handle_key(' ', NOW).unwrap();
            assert!(session.handle_key(key, NOW).unwrap().is_some());
        }
        assert!(session.is_finished());
        assert!(matches!(
            session.rate(Rating::Good, NOW),
            Err(StudyError::SessionFinished)
        ));

        let (summary, failures) = session.finish();
        assert!(failures.is_empty());
        assert_eq!(summary.reviewed, 3);
        assert_eq!(summary.count(Rating::Again), 1);

        let saved = store.load_cards("alice").unwrap();
        let find = |id: &str| saved.iter().find(|c| c.id == id).unwrap().srs.clone();
        assert_eq!(find(&order[0]).repetition, 1);
        assert!((find(&order[1]).ease_factor - 2.65).abs() < 1e-9);
        assert_eq!(find(&order[2]).repetition, 0);
        assert!((find(&order[2]).ease_factor - 2.3).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_key_is_rejected_without_advancing() {
        let mut session = start(seeded_store(1));
        session.reveal();
        assert!(matches!(
            session.handle_key('9', NOW),
            Err(StudyError::InvalidRating(_))
        ));
        assert_eq!(session.reviewed_count(), 0);
        assert!(session.is_revealed());
    }

    #[test]
    fn test_queue_is_frozen_against_store_changes() {
        let store = seeded_store(3);
        let mut session = start(store.clone());
        let before: Vec<String> = session.queue().iter().map(|c| c.id.clone()).collect();

        let deck = store.list_decks("alice").unwrap().remove(0);
        store.add_flashcard("alice", &deck.id, "new", "card", NOW - 10_000).unwrap();
        store.delete_flashcard("alice", &before[2]).unwrap();

        let after: Vec<String> = session.queue().iter().map(|c| c.id.clone()).collect();
        assert_eq!(before, after);

        // The deleted card can still be rated; its write fails without blocking the session
        for _ in 0..3 {
            session.reveal();
            session.rate(Rating::Good, NOW).unwrap();
        }
        let (_, failures) = session.finish();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].card_id, before[2]);
    }

    #[test]
    fn test_persistence_failure_does_not_block() {
        let cards = seeded_store(2).load_cards("alice").unwrap();
        let mut session = StudySession::start(
            "alice",
            &cards,
            NOW,
            &SessionLimits::default(),
            SrsPolicy::default(),
            Arc::new(FailingStore),
            &mut StdRng::seed_from_u64(1),
        );

        session.reveal();
        session.rate(Rating::Easy, NOW).unwrap();
        session.reveal();
        session.rate(Rating::Hard, NOW).unwrap();
        assert!(session.is_finished());

        let (summary, failures) = session.finish();
        assert_eq!(summary.reviewed, 2);
        assert_eq!(failures.len(), 2);
    }

    #[test]
    fn test_preview_and_progress() {
        let mut session = start(seeded_store(2));
        assert_eq!(session.preview_intervals(), Some([1, 1, 1, 1]));
        assert_eq!(session.progress(), "Card 1 of 2 (2 remaining)");

        session.reveal();
        session.rate(Rating::Good, NOW).unwrap();
        session.reveal();
        session.rate(Rating::Good, NOW).unwrap();
        assert_eq!(session.preview_intervals(), None);
        assert_eq!(session.progress(), "Done: 2 cards reviewed");
    }

    #[test]
    fn test_empty_session_is_finished() {
        let store = Arc::new(SqliteCardStore::in_memory(SrsPolicy::default()).unwrap());
        let mut session = start(store);
        assert!(session.is_finished());
        session.reveal();
        assert!(!session.is_revealed());
    }
}
