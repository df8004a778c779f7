use serde::{Deserialize, Serialize};

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 10;

/// A user's star rating for a movie, always within 1..=10.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(into = "u8", try_from = "i64")]
pub struct UserRating(u8);

impl UserRating {
    /// Clamp any requested value into range. Out-of-range input is never an error.
    pub fn clamped(value: i32) -> Self {
        Self(value.clamp(MIN_RATING, MAX_RATING) as u8)
    }

    /// The API reports "not rated" as 0 (or omits the field).
    pub fn from_wire(value: i64) -> Option<Self> {
        if value <= 0 {
            None
        } else {
            Some(Self::clamped(value.min(i64::from(MAX_RATING)) as i32))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Ten-star bar, e.g. `★★★★★★★☆☆☆` for 7.
    pub fn stars(self) -> String {
        let filled = usize::from(self.0);
        format!("{}{}", "★".repeat(filled), "☆".repeat(MAX_RATING as usize - filled))
    }
}

impl From<UserRating> for u8 {
    fn from(rating: UserRating) -> Self {
        rating.0
    }
}

impl TryFrom<i64> for UserRating {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if (i64::from(MIN_RATING)..=i64::from(MAX_RATING)).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(format!("rating {} is outside {}..={}", value, MIN_RATING, MAX_RATING))
        }
    }
}

impl std::fmt::Display for UserRating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/10", self.0)
    }
}
