//! Lenient decoding of stored card documents.
//!
//! Documents written by older versions or by hand may lack fields. Everything
//! except the card id has a sensible default, so a partially filled document
//! still yields a usable [`Flashcard`].

use crate::error::StoreError;
use crate::models::{Flashcard, SrsPolicy, SrsState};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardDocument {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub deck_id: Option<String>,
    #[serde(default)]
    pub front: Option<String>,
    #[serde(default)]
    pub back: Option<String>,
    #[serde(default)]
    pub srs: Option<SrsDocument>,
    #[serde(default)]
    pub created_at: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SrsDocument {
    #[serde(default)]
    pub repetition: Option<i64>,
    #[serde(default)]
    pub interval: Option<i64>,
    #[serde(default)]
    pub ease_factor: Option<f64>,
    #[serde(default)]
    pub next_review: Option<i64>,
}

impl CardDocument {
    /// Validates the document and fills in defaults for missing fields.
    pub fn into_flashcard(self, policy: &SrsPolicy) -> Result<Flashcard, StoreError> {
        let id = self
            .id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| StoreError::MalformedDocument("card without id".to_string()))?;
        let created_at = self.created_at.unwrap_or(0);

        let srs = match self.srs {
            Some(doc) => doc.into_state(created_at, policy),
            None => SrsState::new(created_at, policy),
        };

        Ok(Flashcard {
            id,
            deck_id: self.deck_id.unwrap_or_default(),
            front: self.front.unwrap_or_default(),
            back: self.back.unwrap_or_default(),
            srs,
            created_at,
        })
    }
}

impl SrsDocument {
    fn into_state(self, created_at: i64, policy: &SrsPolicy) -> SrsState {
        let initial = SrsState::new(created_at, policy);
        let state = SrsState {
            repetition: self
                .repetition
                .map_or(initial.repetition, |r| r.clamp(0, i64::from(u32::MAX)) as u32),
            interval: self
                .interval
                .map_or(initial.interval, |i| i.clamp(0, i64::from(u32::MAX)) as u32),
            ease_factor: self.ease_factor.unwrap_or(initial.ease_factor),
            next_review: self.next_review.unwrap_or(initial.next_review),
        };
        normalize_state(state, policy)
    }
}

/// Brings a stored or imported state back within the policy's bounds.
///
/// The ease factor is clamped to `[min_ease, max_ease]` (non-finite values
/// restart at `initial_ease`) and a reviewed card gets at least `min_interval`.
pub fn normalize_state(mut state: SrsState, policy: &SrsPolicy) -> SrsState {
    state.ease_factor = if state.ease_factor.is_finite() {
        state.ease_factor.clamp(policy.min_ease, policy.max_ease)
    } else {
        policy.initial_ease
    };
    if state.repetition > 0 {
        state.interval = state.interval.max(policy.min_interval);
    }
    state
}
