pub mod auth;
pub mod movies;
pub mod prompts;
pub mod reviews;
