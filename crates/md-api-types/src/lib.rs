use serde::{Deserialize, Deserializer, Serialize};

pub type MovieId = u64;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Movie {
    pub id: MovieId,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_title: Option<String>,
    /// Relative image path; upstream sends `null` for movies without art.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub poster_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backdrop_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vote_average: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
}

impl Movie {
    pub fn has_poster(&self) -> bool {
        !self.poster_path.is_empty()
    }
}

/// One page of a catalog listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MoviePage {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub results: Vec<Movie>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Genre {
    pub id: u32,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieDetail {
    #[serde(flatten)]
    pub movie: Movie,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub tagline: Option<String>,
}

/// Entry of the locally registered user list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserRecord {
    pub id: String,
    pub password: String,
}

/// Marker persisted for the signed-in identity. The password is never kept here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionRecord {
    pub id: String,
}

/// Filters for `/discover/movie`, forwarded to the catalog unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiscoverParams {
    pub with_genres: Option<u32>,
    pub vote_average_gte: Option<f64>,
    pub sort_by: Option<String>,
    pub release_date_lte: Option<String>,
    pub page: Option<u32>,
    pub extra: Vec<(String, String)>,
}

impl DiscoverParams {
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if let Some(genre) = self.with_genres {
            query.push(("with_genres".to_owned(), genre.to_string()));
        }
        if let Some(rating) = self.vote_average_gte {
            query.push(("vote_average.gte".to_owned(), rating.to_string()));
        }
        if let Some(sort_by) = &self.sort_by {
            query.push(("sort_by".to_owned(), sort_by.clone()));
        }
        if let Some(date) = &self.release_date_lte {
            query.push(("primary_release_date.lte".to_owned(), date.clone()));
        }
        if let Some(page) = self.page {
            query.push(("page".to_owned(), page.to_string()));
        }
        query.extend(self.extra.iter().cloned());
        query
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    SignIn,
    Popular,
    Search,
    Wishlist,
}

impl Route {
    pub const ALL: [Route; 5] = [
        Route::Home,
        Route::SignIn,
        Route::Popular,
        Route::Search,
        Route::Wishlist,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::SignIn => "/signin",
            Route::Popular => "/popular",
            Route::Search => "/search",
            Route::Wishlist => "/wishlist",
        }
    }

    pub fn from_path(path: &str) -> Option<Route> {
        Route::ALL.into_iter().find(|route| route.path() == path)
    }

    pub fn is_public(self) -> bool {
        matches!(self, Route::SignIn)
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
