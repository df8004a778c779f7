use moviebox_models::{CatalogEntry, CatalogFilter};
use parking_lot::Mutex;
use serde::Serialize;
use tracing::debug;

use super::{Liveness, ViewError};
use crate::movies::MovieClient;

#[derive(Debug, Clone, Default, Serialize)]
pub struct CatalogState {
    pub filter: CatalogFilter,
    pub entries: Vec<CatalogEntry>,
    pub loading: bool,
    pub error: Option<String>,
}

/// The movie list page: one tab selected, its entries, and load status.
pub struct CatalogView {
    movies: MovieClient,
    state: Mutex<CatalogState>,
    liveness: Liveness,
}

impl CatalogView {
    pub fn new(movies: MovieClient, filter: CatalogFilter) -> Self {
        Self {
            movies,
            state: Mutex::new(CatalogState {
                filter,
                ..CatalogState::default()
            }),
            liveness: Liveness::new(),
        }
    }

    pub fn snapshot(&self) -> CatalogState {
        self.state.lock().clone()
    }

    /// Switch tabs. The caller reloads afterwards.
    pub fn set_filter(&self, filter: CatalogFilter) {
        self.state.lock().filter = filter;
    }

    pub fn unmount(&self) {
        self.liveness.unmount();
    }

    /// Fetch the current tab. A load that was superseded by a newer one, or
    /// that lands after unmount, is discarded.
    pub async fn load(&self) -> Result<usize, ViewError> {
        let ticket = self.liveness.begin();
        let filter = {
            let mut state = self.state.lock();
            state.loading = true;
            state.error = None;
            state.filter
        };

        let result = self.movies.load_catalog(filter).await;

        if !self.liveness.is_current(ticket) {
            debug!("Discarding stale catalog response for {}", filter);
            return Err(ViewError::Discarded);
        }

        let mut state = self.state.lock();
        state.loading = false;
        match result {
            Ok(entries) => {
                let count = entries.len();
                state.entries = entries;
                Ok(count)
            }
            Err(e) => {
                state.entries.clear();
                state.error = Some(e.to_string());
                Err(e.into())
            }
        }
    }

    /// Look an entry up by title, case-insensitively.
    pub fn find(&self, title: &str) -> Option<CatalogEntry> {
        self.state
            .lock()
            .entries
            .iter()
            .find(|e| e.title().eq_ignore_ascii_case(title.trim()))
            .cloned()
    }

    /// Message for an empty, settled list; `None` while loading or non-empty.
    pub fn empty_message(&self) -> Option<String> {
        let state = self.state.lock();
        if state.loading || !state.entries.is_empty() {
            return None;
        }
        Some(match state.filter {
            CatalogFilter::All => "There are no movies available at the moment.".to_string(),
            filter if self.movies.is_authenticated() => {
                format!("Your {} is empty. Add some movies!", filter)
            }
            _ => "Please login to see your personal lists".to_string(),
        })
    }
}
