use moviebox_models::MovieIdentity;
use parking_lot::Mutex;
use serde::Serialize;
use tracing::debug;

use super::Liveness;
use crate::error::ApiError;
use crate::reviews::ReviewClient;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "detail", rename_all = "snake_case")]
pub enum SummaryState {
    Idle,
    Loading,
    Loaded(String),
    /// No reviews exist yet, so there is nothing to summarize.
    Empty,
    /// Anything else went wrong; offer a retry.
    Failed(String),
}

pub struct SummaryView {
    reviews: ReviewClient,
    movie: MovieIdentity,
    state: Mutex<SummaryState>,
    liveness: Liveness,
}

impl SummaryView {
    pub fn new(reviews: ReviewClient, movie: MovieIdentity) -> Self {
        Self {
            reviews,
            movie,
            state: Mutex::new(SummaryState::Idle),
            liveness: Liveness::new(),
        }
    }

    pub fn state(&self) -> SummaryState {
        self.state.lock().clone()
    }

    pub fn unmount(&self) {
        self.liveness.unmount();
    }

    /// Also serves as "try again".
    pub async fn load(&self) -> SummaryState {
        let ticket = self.liveness.begin();
        *self.state.lock() = SummaryState::Loading;

        let next = match self.reviews.get_summary(&self.movie).await {
            Ok(text) => SummaryState::Loaded(text),
            Err(ApiError::NoReviewsToSummarize) => SummaryState::Empty,
            Err(e) => SummaryState::Failed(e.to_string()),
        };

        if !self.liveness.is_current(ticket) {
            debug!("Discarding stale summary for {}", self.movie.title);
            return self.state();
        }
        *self.state.lock() = next.clone();
        next
    }
}
