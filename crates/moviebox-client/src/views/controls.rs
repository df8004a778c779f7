use moviebox_models::{CatalogEntry, ListMembership, MovieIdentity, UserRating};
use parking_lot::Mutex;
use serde::Serialize;
use tracing::debug;

use super::{Liveness, ViewError};
use crate::movies::MovieClient;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ControlsState {
    pub membership: ListMembership,
    pub user_rating: Option<UserRating>,
    pub rating_pending: bool,
    pub membership_pending: bool,
    pub error: Option<String>,
}

/// Rating and list controls for one movie.
///
/// The two controls are independent: each has its own pending flag, and
/// neither blocks the other.
pub struct MovieControls {
    movies: MovieClient,
    movie: MovieIdentity,
    state: Mutex<ControlsState>,
    liveness: Liveness,
}

impl MovieControls {
    pub fn new(movies: MovieClient, movie: MovieIdentity, membership: ListMembership, user_rating: Option<UserRating>) -> Self {
        Self {
            movies,
            movie,
            state: Mutex::new(ControlsState {
                membership,
                user_rating,
                ..ControlsState::default()
            }),
            liveness: Liveness::new(),
        }
    }

    pub fn from_entry(movies: MovieClient, entry: &CatalogEntry) -> Self {
        Self::new(movies, entry.identity(), entry.membership(), entry.user_rating())
    }

    pub fn movie(&self) -> &MovieIdentity {
        &self.movie
    }

    pub fn snapshot(&self) -> ControlsState {
        self.state.lock().clone()
    }

    pub fn unmount(&self) {
        self.liveness.unmount();
    }

    pub async fn set_rating(&self, rating: i32) -> Result<UserRating, ViewError> {
        let optimistic = UserRating::clamped(rating);
        let previous = {
            let mut state = self.state.lock();
            if state.rating_pending {
                return Err(ViewError::ControlBusy);
            }
            state.rating_pending = true;
            state.error = None;
            state.user_rating.replace(optimistic)
        };

        let result = self.movies.set_rating(&self.movie, rating).await;

        if !self.liveness.is_mounted() {
            debug!("Discarding rating response for unmounted {}", self.movie.title);
            return Err(ViewError::Discarded);
        }

        let mut state = self.state.lock();
        state.rating_pending = false;
        match result {
            Ok(sent) => {
                state.user_rating = Some(sent);
                Ok(sent)
            }
            Err(e) => {
                state.user_rating = previous;
                state.error = Some(e.to_string());
                Err(e.into())
            }
        }
    }

    /// Put the movie on `membership`, clearing any other list.
    pub async fn set_membership(&self, membership: ListMembership) -> Result<(), ViewError> {
        let previous = {
            let mut state = self.state.lock();
            if state.membership_pending {
                return Err(ViewError::ControlBusy);
            }
            state.membership_pending = true;
            state.error = None;
            std::mem::replace(&mut state.membership, membership)
        };

        let result = self.movies.set_list_membership(&self.movie, membership).await;

        if !self.liveness.is_mounted() {
            debug!("Discarding list response for unmounted {}", self.movie.title);
            return Err(ViewError::Discarded);
        }

        let mut state = self.state.lock();
        state.membership_pending = false;
        match result {
            Ok(()) => Ok(()),
            Err(e) => {
                state.membership = previous;
                state.error = Some(e.to_string());
                Err(e.into())
            }
        }
    }

    /// The list button behavior: pressing the active list removes the movie
    /// from it, pressing the other one moves it there.
    pub async fn toggle_membership(&self, membership: ListMembership) -> Result<ListMembership, ViewError> {
        let current = self.state.lock().membership;
        let target = if current == membership {
            ListMembership::None
        } else {
            membership
        };
        self.set_membership(target).await?;
        Ok(target)
    }
}
