use chrono::{Datelike, Local};
use moviebox_models::{MovieIdentity, MyReview, Review};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;

use super::{Liveness, ViewError};
use crate::error::ApiError;
use crate::reviews::ReviewClient;

#[derive(Debug, Clone, Default, Serialize)]
pub struct ReviewsState {
    pub reviews: Vec<Review>,
    pub my_review: Option<MyReview>,
    pub draft: String,
    pub loading: bool,
    /// A save or delete of the user's own review is in flight.
    pub saving: bool,
    pub error: Option<String>,
    /// Reviews with a like/unlike in flight.
    pub liking: HashSet<String>,
}

/// The reviews section of a movie's detail view.
pub struct ReviewsView {
    reviews: ReviewClient,
    movie: MovieIdentity,
    state: Mutex<ReviewsState>,
    liveness: Liveness,
}

impl ReviewsView {
    pub fn new(reviews: ReviewClient, movie: MovieIdentity) -> Self {
        Self {
            reviews,
            movie,
            state: Mutex::new(ReviewsState::default()),
            liveness: Liveness::new(),
        }
    }

    pub fn snapshot(&self) -> ReviewsState {
        self.state.lock().clone()
    }

    pub fn unmount(&self) {
        self.liveness.unmount();
    }

    pub fn set_draft(&self, text: impl Into<String>) {
        self.state.lock().draft = text.into();
    }

    /// Fetch all reviews, plus the user's own when logged in.
    pub async fn load(&self) -> Result<(), ViewError> {
        let ticket = self.liveness.begin();
        {
            let mut state = self.state.lock();
            state.loading = true;
            state.error = None;
        }

        let result = self.fetch_all().await;

        if !self.liveness.is_current(ticket) {
            debug!("Discarding stale reviews for {}", self.movie.title);
            return Err(ViewError::Discarded);
        }

        let mut state = self.state.lock();
        state.loading = false;
        match result {
            Ok((reviews, mine)) => {
                state.reviews = reviews;
                if let Some(mine) = &mine {
                    state.draft = mine.text.clone();
                }
                state.my_review = mine;
                Ok(())
            }
            Err(e) => {
                state.error = Some(e.to_string());
                Err(e.into())
            }
        }
    }

    async fn fetch_all(&self) -> Result<(Vec<Review>, Option<MyReview>), ApiError> {
        if !self.reviews.is_authenticated() {
            return Ok((self.reviews.list_reviews(&self.movie).await?, None));
        }
        let reviews = self.reviews.list_reviews_for_user(&self.movie).await?;
        let mine = self.reviews.get_my_review(&self.movie).await?;
        Ok((reviews, mine))
    }

    /// Like or unlike `review_id`.
    ///
    /// The flip is shown before the server answers; on failure the review
    /// returns to its exact prior like state and count.
    pub async fn toggle_like(&self, review_id: &str) -> Result<bool, ViewError> {
        if !self.reviews.is_authenticated() {
            self.state.lock().error = Some("Please login to like reviews".to_string());
            return Err(ApiError::NotAuthenticated.into());
        }

        let (was_liked, previous_likes) = {
            let mut state = self.state.lock();
            if state.liking.contains(review_id) {
                return Err(ViewError::ControlBusy);
            }
            let review = state
                .reviews
                .iter_mut()
                .find(|r| r.id == review_id)
                .ok_or_else(|| ViewError::UnknownReview(review_id.to_string()))?;
            let prior = (review.is_liked, review.likes);
            if review.is_liked {
                review.is_liked = false;
                review.likes = review.likes.saturating_sub(1);
            } else {
                review.is_liked = true;
                review.likes += 1;
            }
            state.liking.insert(review_id.to_string());
            state.error = None;
            prior
        };

        let result = if was_liked {
            self.reviews.unlike_review(review_id).await
        } else {
            self.reviews.like_review(review_id).await
        };

        if !self.liveness.is_mounted() {
            debug!("Discarding like response for unmounted view");
            return Err(ViewError::Discarded);
        }

        let mut state = self.state.lock();
        state.liking.remove(review_id);
        match result {
            Ok(()) => Ok(!was_liked),
            Err(e) => {
                if let Some(review) = state.reviews.iter_mut().find(|r| r.id == review_id) {
                    review.is_liked = was_liked;
                    review.likes = previous_likes;
                }
                state.error = Some(e.to_string());
                Err(e.into())
            }
        }
    }

    /// Save `text` as the user's review, dated today, then reload.
    ///
    /// Once the server has stored the review this succeeds; a failing reload
    /// only shows up in the state's `error`.
    pub async fn save(&self, text: &str) -> Result<(), ViewError> {
        if text.trim().is_empty() {
            let message = "Review text cannot be empty".to_string();
            self.state.lock().error = Some(message.clone());
            return Err(ApiError::InvalidInput(message).into());
        }

        let today = Local::now().date_naive();
        self.begin_write(Some(text))?;

        let result = self.reviews.save_review(&self.movie, text, today).await;
        self.finish_write(result)?;

        {
            let mut state = self.state.lock();
            let id = state.my_review.as_ref().map(|r| r.id.clone()).unwrap_or_default();
            state.my_review = Some(MyReview {
                id,
                text: text.to_string(),
                review_year: today.year(),
                review_month: today.month(),
                review_day: today.day(),
            });
        }
        self.reload_after_write().await;
        Ok(())
    }

    pub async fn delete(&self) -> Result<(), ViewError> {
        self.begin_write(None)?;

        let result = self.reviews.delete_review(&self.movie).await;
        self.finish_write(result)?;

        {
            let mut state = self.state.lock();
            state.my_review = None;
            state.draft.clear();
        }
        self.reload_after_write().await;
        Ok(())
    }

    fn begin_write(&self, draft: Option<&str>) -> Result<(), ViewError> {
        let mut state = self.state.lock();
        if state.saving {
            return Err(ViewError::ControlBusy);
        }
        state.saving = true;
        state.error = None;
        if let Some(draft) = draft {
            state.draft = draft.to_string();
        }
        Ok(())
    }

    fn finish_write(&self, result: Result<(), ApiError>) -> Result<(), ViewError> {
        let mut state = self.state.lock();
        state.saving = false;
        if !self.liveness.is_mounted() {
            debug!("Discarding review write response for unmounted view");
            return Err(ViewError::Discarded);
        }
        result.map_err(|e| {
            state.error = Some(e.to_string());
            e.into()
        })
    }

    async fn reload_after_write(&self) {
        if let Err(e) = self.load().await {
            debug!("Reload after review write failed: {}", e);
        }
    }
}
