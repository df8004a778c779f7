use chrono::NaiveDate;
use moviebox_models::{
    MovieIdentity, MyReview, Review, ReviewLikeRequest, ReviewsResponse, SaveReviewRequest,
    SummaryResponse,
};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::fetch::{AuthFetch, Request};

const MY_REVIEW_PATH: &str = "/api/user/movie/review";
const PUBLIC_REVIEWS_PATH: &str = "/api/movie/review/all";
const USER_REVIEWS_PATH: &str = "/api/movie/review/user/all";
const LIKE_PATH: &str = "/api/movie/review/like";
const UNLIKE_PATH: &str = "/api/movie/review/unlike";
const SUMMARY_PATH: &str = "/api/movie/summary";

#[derive(Clone)]
pub struct ReviewClient {
    fetch: AuthFetch,
}

impl ReviewClient {
    pub fn new(fetch: AuthFetch) -> Self {
        Self { fetch }
    }

    pub fn is_authenticated(&self) -> bool {
        self.fetch.session().is_authenticated()
    }

    /// The user's own review; `None` when they have not written one.
    pub async fn get_my_review(&self, movie: &MovieIdentity) -> Result<Option<MyReview>, ApiError> {
        let request = Request::get(MY_REVIEW_PATH)
            .authenticated()
            .query_pairs(movie.query_pairs());
        match self.fetch.send_json(request).await {
            Ok(review) => Ok(Some(review)),
            Err(ApiError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn list_reviews(&self, movie: &MovieIdentity) -> Result<Vec<Review>, ApiError> {
        let request = Request::get(PUBLIC_REVIEWS_PATH).query_pairs(movie.query_pairs());
        let response: ReviewsResponse = self.fetch.send_json(request).await?;
        Ok(response.reviews.unwrap_or_default())
    }

    /// Reviews annotated with the user's like state. Falls back to the public
    /// listing when logged out.
    pub async fn list_reviews_for_user(&self, movie: &MovieIdentity) -> Result<Vec<Review>, ApiError> {
        if !self.is_authenticated() {
            return self.list_reviews(movie).await;
        }
        let request = Request::get(USER_REVIEWS_PATH)
            .authenticated()
            .query_pairs(movie.query_pairs());
        let response: ReviewsResponse = self.fetch.send_json(request).await?;
        Ok(response.reviews.unwrap_or_default())
    }

    /// Create or replace the user's review, dated `date`.
    pub async fn save_review(&self, movie: &MovieIdentity, text: &str, date: NaiveDate) -> Result<(), ApiError> {
        if text.trim().is_empty() {
            return Err(ApiError::InvalidInput("Review text cannot be empty".to_string()));
        }
        info!("Saving review for movie: {}", movie.title);
        let request = Request::put(MY_REVIEW_PATH)
            .authenticated()
            .json(&SaveReviewRequest::new(movie.clone(), text, date))?;
        self.fetch.send_empty(request).await
    }

    pub async fn delete_review(&self, movie: &MovieIdentity) -> Result<(), ApiError> {
        info!("Deleting review for movie: {}", movie.title);
        let request = Request::delete(MY_REVIEW_PATH).authenticated().json(movie)?;
        self.fetch.send_empty(request).await
    }

    pub async fn like_review(&self, review_id: &str) -> Result<(), ApiError> {
        self.send_like(LIKE_PATH, review_id).await
    }

    pub async fn unlike_review(&self, review_id: &str) -> Result<(), ApiError> {
        self.send_like(UNLIKE_PATH, review_id).await
    }

    async fn send_like(&self, path: &str, review_id: &str) -> Result<(), ApiError> {
        let request = Request::post(path).authenticated().json(&ReviewLikeRequest {
            review_id: review_id.to_string(),
        })?;
        self.fetch.send_empty(request).await
    }

    /// AI summary of all reviews. A 404 surfaces as `NoReviewsToSummarize` so
    /// callers can tell "nothing to summarize" from "failed to load".
    pub async fn get_summary(&self, movie: &MovieIdentity) -> Result<String, ApiError> {
        debug!("Fetching summary for: {}", movie.title);
        let request = Request::get(SUMMARY_PATH).query_pairs(movie.query_pairs());
        match self.fetch.send_json::<SummaryResponse>(request).await {
            Ok(response) => Ok(response.summary),
            Err(ApiError::NotFound) => Err(ApiError::NoReviewsToSummarize),
            Err(e) => Err(e),
        }
    }
}
