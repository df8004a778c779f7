//! Per-view state holders that sit between the resource clients and whatever
//! renders them.
//!
//! Each view keeps its state behind a lock so methods take `&self`; two
//! controls of the same movie can be driven concurrently and the last
//! response to land wins. Mutations are applied optimistically and rolled back
//! on failure. A control with a request in flight rejects further use with
//! [`ViewError::ControlBusy`]. Once a view is unmounted, late responses are
//! dropped instead of applied.

mod catalog;
mod controls;
mod liveness;
mod reviews;
mod summary;

pub use catalog::{CatalogState, CatalogView};
pub use controls::{ControlsState, MovieControls};
pub use liveness::{Liveness, Ticket};
pub use reviews::{ReviewsState, ReviewsView};
pub use summary::{SummaryState, SummaryView};

use thiserror::Error;

use crate::error::ApiError;

#[derive(Debug, Error)]
pub enum ViewError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Another update for this control is still in progress")]
    ControlBusy,

    /// The view was unmounted, or a newer load superseded this one.
    #[error("Response discarded")]
    Discarded,

    #[error("Unknown review: {0}")]
    UnknownReview(String),
}
