use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which personal list a movie is on. The lists are mutually exclusive.
///
/// On the wire `None` is the empty string, which the API treats as
/// "remove from any list".
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum ListMembership {
    #[serde(rename = "watchlist")]
    Watchlist,
    #[serde(rename = "favorite")]
    Favorite,
    #[default]
    #[serde(rename = "")]
    None,
}

impl ListMembership {
    pub fn as_wire(self) -> &'static str {
        match self {
            ListMembership::Watchlist => "watchlist",
            ListMembership::Favorite => "favorite",
            ListMembership::None => "",
        }
    }

    pub fn is_listed(self) -> bool {
        self != ListMembership::None
    }
}

impl fmt::Display for ListMembership {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListMembership::None => write!(f, "none"),
            other => write!(f, "{}", other.as_wire()),
        }
    }
}

impl FromStr for ListMembership {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "watchlist" => Ok(ListMembership::Watchlist),
            "favorite" | "favourite" => Ok(ListMembership::Favorite),
            "" | "none" | "remove" => Ok(ListMembership::None),
            _ => Err(format!("Invalid list: {}. Use 'watchlist', 'favorite', or 'none'", s)),
        }
    }
}

/// Which slice of the catalog to show: everything, or one personal list.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum CatalogFilter {
    #[default]
    All,
    Watchlist,
    Favorite,
}

impl CatalogFilter {
    /// Value for the `listType` query parameter. `All` sends no parameter.
    pub fn list_type(self) -> Option<&'static str> {
        match self {
            CatalogFilter::All => None,
            CatalogFilter::Watchlist => Some("watchlist"),
            CatalogFilter::Favorite => Some("favorite"),
        }
    }
}

impl fmt::Display for CatalogFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.list_type().unwrap_or("all"))
    }
}

impl FromStr for CatalogFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(CatalogFilter::All),
            "watchlist" => Ok(CatalogFilter::Watchlist),
            "favorite" | "favourite" => Ok(CatalogFilter::Favorite),
            _ => Err(format!("Invalid list: {}. Use 'all', 'watchlist', or 'favorite'", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_membership_wire_values() {
        assert_eq!(serde_json::to_string(&ListMembership::None).unwrap(), "\"\"");
        assert_eq!(serde_json::to_string(&ListMembership::Favorite).unwrap(), "\"favorite\"");
        let parsed: ListMembership = serde_json::from_str("\"watchlist\"").unwrap();
        assert_eq!(parsed, ListMembership::Watchlist);
        let parsed: ListMembership = serde_json::from_str("\"\"").unwrap();
        assert_eq!(parsed, ListMembership::None);
    }

    #[test]
    fn test_filter_list_type() {
        assert_eq!(CatalogFilter::All.list_type(), None);
        assert_eq!(CatalogFilter::Favorite.list_type(), Some("favorite"));
        assert_eq!("Watchlist".parse::<CatalogFilter>(), Ok(CatalogFilter::Watchlist));
        assert!("later".parse::<CatalogFilter>().is_err());
    }
}
