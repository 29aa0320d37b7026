//! Selection of the cards studied in one session.
//!
//! Due cards come first, oldest due date first. When too few cards are due the
//! queue is topped up with a random sample of cards that are not due yet, so a
//! session always has something to practise.

use super::Flashcard;
use log::debug;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// Size limits of a study session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionLimits {
    /// Backfill kicks in below this many due cards.
    pub min_due: usize,
    /// Queue length reached by backfilling.
    pub target_size: usize,
    /// Hard cap on the queue length.
    pub max_size: usize,
}

impl Default for SessionLimits {
    fn default() -> Self {
        Self {
            min_due: 5,
            target_size: 10,
            max_size: 20,
        }
    }
}

/// Builds the queue for a session starting at `now`.
///
/// The returned cards are owned copies: later changes to `cards` never reach the queue.
pub fn build_session_queue<R: Rng + ?Sized>(
    cards: &[Flashcard],
    now: i64,
    limits: &SessionLimits,
    rng: &mut R,
) -> Vec<Flashcard> {
    let (mut due, mut not_due): (Vec<&Flashcard>, Vec<&Flashcard>) =
        cards.iter().partition(|card| card.is_due(now));

    due.sort_by(|a, b| {
        a.srs
            .next_review
            .cmp(&b.srs.next_review)
            .then(a.created_at.cmp(&b.created_at))
            .then_with(|| a.id.cmp(&b.id))
    });

    let mut queue: Vec<Flashcard> = due
        .iter()
        .take(limits.max_size)
        .map(|card| (*card).clone())
        .collect();

    if due.len() < limits.min_due {
        let wanted = limits
            .target_size
            .min(limits.max_size)
            .saturating_sub(queue.len());
        not_due.shuffle(rng);
        queue.extend(not_due.into_iter().take(wanted).cloned());
    }

    debug!(
        "Session queue: {} cards ({} due) out of {}",
        queue.len(),
        due.len().min(limits.max_size),
        cards.len()
    );
    queue
}
