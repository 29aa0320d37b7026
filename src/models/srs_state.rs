//! Spaced repetition state attached to every flashcard.
use super::sm2::SrsPolicy;
use serde::{Deserialize, Serialize};

pub const MILLIS_PER_DAY: i64 = 86_400_000;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SrsState {
    /// Consecutive successful reviews since the last lapse.
    pub repetition: u32,
    /// Days until the next review.
    pub interval: u32,
    pub ease_factor: f64,
    /// Epoch millis at which the card becomes due.
    pub next_review: i64,
}

impl SrsState {
    /// State of a freshly authored card: immediately due.
    pub fn new(created_at: i64, policy: &SrsPolicy) -> Self {
        Self {
            repetition: 0,
            interval: 0,
            ease_factor: policy.initial_ease,
            next_review: created_at,
        }
    }

    pub fn is_due(&self, now: i64) -> bool {
        self.next_review <= now
    }

    pub fn is_new(&self) -> bool {
        self.repetition == 0 && self.interval == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_is_due_at_creation() {
        let state = SrsState::new(1_000, &SrsPolicy::default());
        assert_eq!(state.repetition, 0);
        assert_eq!(state.interval, 0);
        assert_eq!(state.ease_factor, 2.5);
        assert!(state.is_due(1_000));
        assert!(!state.is_due(999));
        assert!(state.is_new());
    }

    #[test]
    fn test_serializes_camel_case() {
        let state = SrsState::new(42, &SrsPolicy::default());
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["easeFactor"], 2.5);
        assert_eq!(json["nextReview"], 42);
    }
}
