//! Recall quality reported by the user after revealing a card.
use crate::error::StudyError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ordered from worst to best recall.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rating {
    Again,
    Hard,
    Good,
    Easy,
}

impl Rating {
    pub const ALL: [Rating; 4] = [Rating::Again, Rating::Hard, Rating::Good, Rating::Easy];

    /// Keyboard mapping of the study screen: `1`..`4`.
    pub fn from_key(key: char) -> Result<Self, StudyError> {
        match key {
            '1' => Ok(Rating::Again),
            '2' => Ok(Rating::Hard),
            '3' => Ok(Rating::Good),
            '4' => Ok(Rating::Easy),
            other => Err(StudyError::InvalidRating(format!("key '{}'", other))),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Rating::Again => "Again",
            Rating::Hard => "Hard",
            Rating::Good => "Good",
            Rating::Easy => "Easy",
        }
    }

    /// Position in [`Rating::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }
}

impl TryFrom<u8> for Rating {
    type Error = StudyError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Rating::Again),
            2 => Ok(Rating::Hard),
            3 => Ok(Rating::Good),
            4 => Ok(Rating::Easy),
            other => Err(StudyError::InvalidRating(other.to_string())),
        }
    }
}

impl FromStr for Rating {
    type Err = StudyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "again" => Ok(Rating::Again),
            "hard" => Ok(Rating::Hard),
            "good" => Ok(Rating::Good),
            "easy" => Ok(Rating::Easy),
            _ => Err(StudyError::InvalidRating(s.to_string())),
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratings_are_ordered_worst_to_best() {
        assert!(Rating::Again < Rating::Hard);
        assert!(Rating::Hard < Rating::Good);
        assert!(Rating::Good < Rating::Easy);
    }

    #[test]
    fn test_keyboard_mapping() {
        assert_eq!(Rating::from_key('1').unwrap(), Rating::Again);
        assert_eq!(Rating::from_key('2').unwrap(), Rating::Hard);
        assert_eq!(Rating::from_key('3').unwrap(), Rating::Good);
        assert_eq!(Rating::from_key('4').unwrap(), Rating::Easy);
        assert!(matches!(
            Rating::from_key('5'),
            Err(StudyError::InvalidRating(_))
        ));
    }

    #[test]
    fn test_numeric_boundary_rejects_out_of_range() {
        assert_eq!(Rating::try_from(3).unwrap(), Rating::Good);
        assert!(matches!(Rating::try_from(0), Err(StudyError::InvalidRating(_))));
        assert!(matches!(Rating::try_from(5), Err(StudyError::InvalidRating(_))));
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("Easy".parse::<Rating>().unwrap(), Rating::Easy);
        assert_eq!(" again ".parse::<Rating>().unwrap(), Rating::Again);
        assert!("perfect".parse::<Rating>().is_err());
    }
}
