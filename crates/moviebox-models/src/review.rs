use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::movie::MovieIdentity;
use crate::rating::UserRating;

/// A public review, annotated with the viewer's like state when fetched
/// through the authenticated endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Review {
    pub id: String,
    pub username: String,
    pub text: String,
    pub review_year: i32,
    pub review_month: u32,
    pub review_day: u32,
    /// The author's own rating of the movie, 0 when unrated.
    #[serde(default)]
    pub user_rating: i64,
    #[serde(default)]
    pub is_liked: bool,
    #[serde(default)]
    pub likes: u32,
}

impl Review {
    pub fn author_rating(&self) -> Option<UserRating> {
        UserRating::from_wire(self.user_rating)
    }

    pub fn written_on(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.review_year, self.review_month, self.review_day)
    }
}

/// The current user's own review of a movie.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MyReview {
    #[serde(default)]
    pub id: String,
    pub text: String,
    pub review_year: i32,
    pub review_month: u32,
    pub review_day: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SaveReviewRequest {
    pub text: String,
    pub review_year: i32,
    pub review_month: u32,
    pub review_day: u32,
    pub movie_info: MovieIdentity,
}

impl SaveReviewRequest {
    pub fn new(movie: MovieIdentity, text: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            text: text.into(),
            review_year: date.year(),
            review_month: date.month(),
            review_day: date.day(),
            movie_info: movie,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ReviewsResponse {
    #[serde(default)]
    pub reviews: Option<Vec<Review>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewLikeRequest {
    pub review_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryResponse {
    pub summary: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_review_defaults_for_public_listing() {
        let review: Review = serde_json::from_value(json!({
            "id": "r1",
            "username": "ana",
            "text": "Loved it",
            "review_year": 2024,
            "review_month": 2,
            "review_day": 29
        }))
        .unwrap();
        assert!(!review.is_liked);
        assert_eq!(review.likes, 0);
        assert_eq!(review.author_rating(), None);
        assert_eq!(review.written_on(), NaiveDate::from_ymd_opt(2024, 2, 29));
    }

    #[test]
    fn test_save_request_shape() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let request = SaveReviewRequest::new(MovieIdentity::new("Up", 2009, 5, 29), "Sweet", date);
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "text": "Sweet",
                "review_year": 2025,
                "review_month": 3,
                "review_day": 1,
                "movie_info": {"title": "Up", "year": 2009, "month": 5, "day": 29}
            })
        );
    }
}
