pub mod auth;
pub mod membership;
pub mod movie;
pub mod rating;
pub mod review;

pub use auth::{AuthResponse, Identity, LoginRequest, RegisterRequest, RegisterResponse, Session};
pub use membership::{CatalogFilter, ListMembership};
pub use movie::{poster_path, CatalogEntry, MovieIdentity, PublicMovie, UserMovie};
pub use rating::UserRating;
pub use review::{MyReview, Review, ReviewLikeRequest, ReviewsResponse, SaveReviewRequest, SummaryResponse};
