//! Flashcard is a pair <front, back> belonging to a deck, plus its review state.
use super::SrsState;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flashcard {
    pub id: String,
    pub deck_id: String,
    pub front: String,
    pub back: String,
    pub srs: SrsState,
    /// Epoch millis.
    pub created_at: i64,
}

impl Flashcard {
    pub fn is_due(&self, now: i64) -> bool {
        self.srs.is_due(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SrsPolicy;

    #[test]
    fn test_flashcard_document_shape() {
        let card = Flashcard {
            id: "c1".to_string(),
            deck_id: "d1".to_string(),
            front: "hello".to_string(),
            back: "cześć".to_string(),
            srs: SrsState::new(5, &SrsPolicy::default()),
            created_at: 5,
        };

        let json = serde_json::to_value(&card).unwrap();
        assert_eq!(json["deckId"], "d1");
        assert_eq!(json["createdAt"], 5);
        assert_eq!(json["srs"]["repetition"], 0);
        assert!(card.is_due(5));
    }
}
