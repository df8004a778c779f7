pub mod auth;
pub mod client;
pub mod error;
pub mod fetch;
pub mod movies;
pub mod reviews;
pub mod session;
pub mod views;

pub use auth::AuthClient;
pub use client::Moviebox;
pub use error::ApiError;
pub use fetch::{Auth, AuthFetch, Request};
pub use movies::MovieClient;
pub use reviews::ReviewClient;
pub use session::{AuthError, SessionStore};
pub use views::{CatalogView, MovieControls, ReviewsView, SummaryState, SummaryView, ViewError};
