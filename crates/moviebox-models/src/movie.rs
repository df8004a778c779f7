use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};

use crate::membership::ListMembership;
use crate::rating::UserRating;

/// Natural key for a movie across rating, list, review and summary endpoints.
///
/// Serializes as the `movie_info` body object: `{title, year, month, day}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct MovieIdentity {
    pub title: String,
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl MovieIdentity {
    pub fn new(title: impl Into<String>, year: i32, month: u32, day: u32) -> Self {
        Self {
            title: title.into(),
            year,
            month,
            day,
        }
    }

    /// Build from the combined `release_date` string user movies carry
    /// (`YYYY-MM-DD`, optionally followed by a time part).
    pub fn from_release_date(title: impl Into<String>, release_date: &str) -> Result<Self, String> {
        let date = release_date
            .get(..10)
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
            .ok_or_else(|| format!("Invalid release date: {:?}", release_date))?;
        Ok(Self::new(title, date.year(), date.month(), date.day()))
    }

    /// Query parameters used by the GET review/summary endpoints.
    pub fn query_pairs(&self) -> [(&'static str, String); 4] {
        [
            ("title", self.title.clone()),
            ("year", self.year.to_string()),
            ("month", self.month.to_string()),
            ("day", self.day.to_string()),
        ]
    }

    pub fn release_date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)
    }

    /// "July 16, 2010" style, falling back to the raw parts for impossible dates.
    pub fn release_date_label(&self) -> String {
        match self.release_date() {
            Some(date) => date.format("%B %-d, %Y").to_string(),
            None => format!("{}-{:02}-{:02}", self.year, self.month, self.day),
        }
    }
}

/// A catalog entry as seen by a guest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PublicMovie {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub year: i32,
    pub month: u32,
    pub day: u32,
    #[serde(default)]
    pub director: String,
    #[serde(default)]
    pub actors: Vec<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub rating: f64,
}

impl PublicMovie {
    pub fn identity(&self) -> MovieIdentity {
        MovieIdentity::new(self.title.clone(), self.year, self.month, self.day)
    }
}

#[derive(Deserialize)]
struct UserMovieWire {
    title: String,
    #[serde(default)]
    description: String,
    release_date: String,
    #[serde(default)]
    director: String,
    #[serde(default)]
    actors: Vec<String>,
    #[serde(default)]
    genres: Vec<String>,
    #[serde(default)]
    rating: f64,
    #[serde(default)]
    list_type: ListMembership,
    #[serde(default)]
    user_rating: i64,
}

/// A catalog entry annotated with the current user's list and rating.
///
/// The release date is normalized into a [`MovieIdentity`] while decoding,
/// so a malformed date is rejected up front rather than at request time.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UserMovie {
    pub title: String,
    pub description: String,
    pub release_date: String,
    pub director: String,
    pub actors: Vec<String>,
    pub genres: Vec<String>,
    pub rating: f64,
    pub list_type: ListMembership,
    pub user_rating: Option<UserRating>,
    #[serde(skip_serializing)]
    identity: MovieIdentity,
}

impl<'de> Deserialize<'de> for UserMovie {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = UserMovieWire::deserialize(deserializer)?;
        let identity = MovieIdentity::from_release_date(wire.title.clone(), &wire.release_date)
            .map_err(serde::de::Error::custom)?;
        Ok(Self {
            title: wire.title,
            description: wire.description,
            release_date: wire.release_date,
            director: wire.director,
            actors: wire.actors,
            genres: wire.genres,
            rating: wire.rating,
            list_type: wire.list_type,
            user_rating: UserRating::from_wire(wire.user_rating),
            identity,
        })
    }
}

impl UserMovie {
    pub fn identity(&self) -> &MovieIdentity {
        &self.identity
    }
}

/// One row of the catalog. Which variant is decided by the endpoint that
/// produced it, never by inspecting fields.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CatalogEntry {
    Public(PublicMovie),
    User(UserMovie),
}

impl CatalogEntry {
    pub fn title(&self) -> &str {
        match self {
            CatalogEntry::Public(m) => &m.title,
            CatalogEntry::User(m) => &m.title,
        }
    }

    pub fn identity(&self) -> MovieIdentity {
        match self {
            CatalogEntry::Public(m) => m.identity(),
            CatalogEntry::User(m) => m.identity().clone(),
        }
    }

    pub fn description(&self) -> &str {
        match self {
            CatalogEntry::Public(m) => &m.description,
            CatalogEntry::User(m) => &m.description,
        }
    }

    pub fn director(&self) -> &str {
        match self {
            CatalogEntry::Public(m) => &m.director,
            CatalogEntry::User(m) => &m.director,
        }
    }

    pub fn actors(&self) -> &[String] {
        match self {
            CatalogEntry::Public(m) => &m.actors,
            CatalogEntry::User(m) => &m.actors,
        }
    }

    pub fn genres(&self) -> &[String] {
        match self {
            CatalogEntry::Public(m) => &m.genres,
            CatalogEntry::User(m) => &m.genres,
        }
    }

    /// Catalog-wide average rating.
    pub fn rating(&self) -> f64 {
        match self {
            CatalogEntry::Public(m) => m.rating,
            CatalogEntry::User(m) => m.rating,
        }
    }

    /// Only user entries carry a membership; guests always see `None`.
    pub fn membership(&self) -> ListMembership {
        match self {
            CatalogEntry::Public(_) => ListMembership::None,
            CatalogEntry::User(m) => m.list_type,
        }
    }

    pub fn user_rating(&self) -> Option<UserRating> {
        match self {
            CatalogEntry::Public(_) => None,
            CatalogEntry::User(m) => m.user_rating,
        }
    }

    pub fn poster_path(&self) -> String {
        poster_path(self.title())
    }
}

/// Static poster location: lowercase title with anything outside `[a-z0-9]`
/// replaced by `-`.
pub fn poster_path(title: &str) -> String {
    let slug: String = title
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_lowercase() || c.is_ascii_digit() { c } else { '-' })
        .collect();
    format!("/images/movies/{}.jpg", slug)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_user_movie_normalizes_release_date() {
        let movie: UserMovie = serde_json::from_value(json!({
            "title": "Inception",
            "description": "Dreams",
            "release_date": "2010-07-16T00:00:00Z",
            "director": "Christopher Nolan",
            "actors": ["Leonardo DiCaprio"],
            "genres": ["Sci-Fi"],
            "rating": 8.8,
            "list_type": "favorite",
            "user_rating": 9
        }))
        .unwrap();

        assert_eq!(movie.identity(), &MovieIdentity::new("Inception", 2010, 7, 16));
        assert_eq!(movie.list_type, ListMembership::Favorite);
        assert_eq!(movie.user_rating.map(UserRating::value), Some(9));
    }

    #[test]
    fn test_user_movie_unrated_and_unlisted() {
        let movie: UserMovie = serde_json::from_value(json!({
            "title": "Heat",
            "release_date": "1995-12-15",
            "list_type": "",
            "user_rating": 0
        }))
        .unwrap();
        let entry = CatalogEntry::User(movie);
        assert_eq!(entry.membership(), ListMembership::None);
        assert_eq!(entry.user_rating(), None);
    }

    #[test]
    fn test_user_movie_rejects_bad_date() {
        let result = serde_json::from_value::<UserMovie>(json!({
            "title": "Broken",
            "release_date": "someday"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_public_and_user_identities_agree() {
        let public: PublicMovie = serde_json::from_value(json!({
            "title": "Alien", "year": 1979, "month": 5, "day": 25
        }))
        .unwrap();
        let user: UserMovie = serde_json::from_value(json!({
            "title": "Alien", "release_date": "1979-05-25"
        }))
        .unwrap();
        assert_eq!(
            CatalogEntry::Public(public).identity(),
            CatalogEntry::User(user).identity()
        );
    }

    #[test]
    fn test_identity_body_and_query_shape() {
        let id = MovieIdentity::new("Up", 2009, 5, 29);
        assert_eq!(
            serde_json::to_value(&id).unwrap(),
            json!({"title": "Up", "year": 2009, "month": 5, "day": 29})
        );
        let pairs = id.query_pairs();
        assert_eq!(pairs[0], ("title", "Up".to_string()));
        assert_eq!(pairs[3], ("day", "29".to_string()));
        assert_eq!(id.release_date_label(), "May 29, 2009");
    }

    #[test]
    fn test_poster_path() {
        assert_eq!(poster_path("The Matrix: Reloaded"), "/images/movies/the-matrix--reloaded.jpg");
    }
}
