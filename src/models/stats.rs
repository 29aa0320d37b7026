//! Aggregates over a user's cards and over a finished study session.
use super::{Flashcard, Rating, srs_state::MILLIS_PER_DAY};

/// Interval (days) from which a card counts as mature.
pub const MATURE_INTERVAL: u32 = 21;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DeckStats {
    pub total: usize,
    pub due: usize,
    /// Never successfully reviewed.
    pub new_cards: usize,
    pub young: usize,
    pub mature: usize,
    pub average_ease: f64,
}

impl DeckStats {
    pub fn compute<'a, I>(cards: I, now: i64) -> Self
    where
        I: IntoIterator<Item = &'a Flashcard>,
    {
        let mut stats = DeckStats::default();
        let mut ease_sum = 0.0;
        for card in cards {
            stats.total += 1;
            ease_sum += card.srs.ease_factor;
            if card.is_due(now) {
                stats.due += 1;
            }
            match card.srs.interval {
                _ if card.srs.is_new() => stats.new_cards += 1,
                i if i >= MATURE_INTERVAL => stats.mature += 1,
                _ => stats.young += 1,
            }
        }
        if stats.total > 0 {
            stats.average_ease = ease_sum / stats.total as f64;
        }
        stats
    }
}

/// Number of cards becoming due on each of the next `days` days.
///
/// Slot 0 also holds every card that is already overdue.
pub fn due_forecast<'a, I>(cards: I, now: i64, days: usize) -> Vec<usize>
where
    I: IntoIterator<Item = &'a Flashcard>,
{
    let mut forecast = vec![0; days];
    if days == 0 {
        return forecast;
    }
    for card in cards {
        let offset = (card.srs.next_review - now).max(0) / MILLIS_PER_DAY;
        if let Some(slot) = usize::try_from(offset).ok().and_then(|o| forecast.get_mut(o)) {
            *slot += 1;
        }
    }
    forecast
}

/// Ratings given during one study session.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionSummary {
    pub reviewed: usize,
    by_rating: [usize; 4],
}

impl SessionSummary {
    pub fn record(&mut self, rating: Rating) {
        self.reviewed += 1;
        self.by_rating[rating.index()] += 1;
    }

    pub fn count(&self, rating: Rating) -> usize {
        self.by_rating[rating.index()]
    }

    /// Share of reviews that were not rated Again; `None` before the first review.
    pub fn recall_rate(&self) -> Option<f64> {
        if self.reviewed == 0 {
            return None;
        }
        let recalled = self.reviewed - self.count(Rating::Again);
        Some(recalled as f64 / self.reviewed as f64)
    }
}
