use moviebox_models::{
    CatalogEntry, CatalogFilter, ListMembership, MovieIdentity, PublicMovie, UserMovie, UserRating,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::fetch::{AuthFetch, Request};

const PUBLIC_CATALOG_PATH: &str = "/api/movie/all";
const USER_CATALOG_PATH: &str = "/api/user/movie/all";
const RATING_PATH: &str = "/api/user/movie/rating";
const LIST_PATH: &str = "/api/user/movie/list";

#[derive(Debug, Deserialize)]
struct CatalogResponse {
    #[serde(rename = "Movies", default)]
    movies: Option<Vec<PublicMovie>>,
}

#[derive(Debug, Deserialize)]
struct UserCatalogResponse {
    #[serde(rename = "userMovies", default)]
    user_movies: Option<Vec<UserMovie>>,
}

#[derive(Debug, Serialize)]
struct SaveRatingRequest<'a> {
    movie_info: &'a MovieIdentity,
    rating: UserRating,
}

#[derive(Debug, Serialize)]
struct SaveListTypeRequest<'a> {
    movie_info: &'a MovieIdentity,
    list_type: ListMembership,
}

#[derive(Clone)]
pub struct MovieClient {
    fetch: AuthFetch,
}

impl MovieClient {
    pub fn new(fetch: AuthFetch) -> Self {
        Self { fetch }
    }

    pub fn is_authenticated(&self) -> bool {
        self.fetch.session().is_authenticated()
    }

    /// Whole catalog as a guest sees it. Never sends a credential.
    pub async fn list_public_catalog(&self) -> Result<Vec<PublicMovie>, ApiError> {
        let response: CatalogResponse = self.fetch.send_json(Request::get(PUBLIC_CATALOG_PATH)).await?;
        Ok(response.movies.unwrap_or_default())
    }

    /// Catalog annotated with the user's lists and ratings. `All` sends no
    /// `listType` parameter.
    pub async fn list_user_catalog(&self, filter: CatalogFilter) -> Result<Vec<UserMovie>, ApiError> {
        let mut request = Request::get(USER_CATALOG_PATH).authenticated();
        if let Some(list_type) = filter.list_type() {
            request = request.query("listType", list_type);
        }
        let response: UserCatalogResponse = self.fetch.send_json(request).await?;
        let movies = response.user_movies.unwrap_or_default();
        debug!("Fetched {} user movies ({})", movies.len(), filter);
        Ok(movies)
    }

    /// What the catalog page shows for `filter` given the current session.
    ///
    /// Guests get the public catalog on `All` and an empty list for personal
    /// lists, without a network call.
    pub async fn load_catalog(&self, filter: CatalogFilter) -> Result<Vec<CatalogEntry>, ApiError> {
        if self.is_authenticated() {
            let movies = self.list_user_catalog(filter).await?;
            return Ok(movies.into_iter().map(CatalogEntry::User).collect());
        }
        match filter {
            CatalogFilter::All => {
                let movies = self.list_public_catalog().await?;
                Ok(movies.into_iter().map(CatalogEntry::Public).collect())
            }
            _ => {
                debug!("Not authenticated, {} list is empty", filter);
                Ok(Vec::new())
            }
        }
    }

    /// Save a rating, clamped into 1..=10 first. Returns the value actually sent.
    pub async fn set_rating(&self, movie: &MovieIdentity, rating: i32) -> Result<UserRating, ApiError> {
        let rating = UserRating::clamped(rating);
        info!("Saving rating {} for movie: {}", rating, movie.title);
        let request = Request::patch(RATING_PATH)
            .authenticated()
            .json(&SaveRatingRequest {
                movie_info: movie,
                rating,
            })?;
        self.fetch.send_empty(request).await?;
        Ok(rating)
    }

    /// Move the movie onto a list; `ListMembership::None` removes it from any list.
    pub async fn set_list_membership(
        &self,
        movie: &MovieIdentity,
        membership: ListMembership,
    ) -> Result<(), ApiError> {
        info!("Saving to list {:?}: {}", membership.as_wire(), movie.title);
        let request = Request::patch(LIST_PATH)
            .authenticated()
            .json(&SaveListTypeRequest {
                movie_info: movie,
                list_type: membership,
            })?;
        self.fetch.send_empty(request).await
    }
}
