use async_trait::async_trait;
use md_api_types::{DiscoverParams, Movie, MovieDetail, MovieId, MoviePage};
use md_storage::{Scope, ScopedStorage, keys};
use tracing::debug;

pub const IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p";
pub const DEFAULT_IMAGE_SIZE: &str = "w500";
pub const PLACEHOLDER_IMAGE_URL: &str =
    "https://placehold.co/500x750/000000/FFFFFF/png?text=No+Image";
pub const FALLBACK_API_KEY: &str = "eb89fc38dfc6118d58aecf5d55e658ad";

pub const GENRE_ACTION: u32 = 28;
pub const GENRE_COMEDY: u32 = 35;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog request failed: {0}")]
    Transport(String),
    #[error("catalog returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("catalog response could not be decoded: {0}")]
    Decode(String),
    #[error("catalog credentials unavailable: {0}")]
    Credentials(String),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Read side of the movie catalog.
///
/// Listing calls never return movies without a poster; implementations run
/// [`retain_with_posters`] before handing a page back.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    async fn fetch_popular(&self, page: u32) -> CatalogResult<MoviePage>;
    async fn fetch_now_playing(&self, page: u32) -> CatalogResult<MoviePage>;
    async fn fetch_top_rated(&self, page: u32) -> CatalogResult<MoviePage>;
    async fn fetch_by_genre(&self, genre_id: u32, page: u32) -> CatalogResult<MoviePage>;
    async fn search(&self, query: &str, page: u32) -> CatalogResult<MoviePage>;
    async fn discover(&self, params: &DiscoverParams) -> CatalogResult<MoviePage>;
    async fn fetch_detail(&self, id: MovieId) -> CatalogResult<MovieDetail>;

    async fn fetch_action(&self, page: u32) -> CatalogResult<MoviePage> {
        self.fetch_by_genre(GENRE_ACTION, page).await
    }

    async fn fetch_comedy(&self, page: u32) -> CatalogResult<MoviePage> {
        self.fetch_by_genre(GENRE_COMEDY, page).await
    }
}

/// Drops poster-less entries, keeping the order of the rest.
pub fn retain_with_posters(mut page: MoviePage) -> MoviePage {
    page.results.retain(Movie::has_poster);
    page
}

/// Fully-qualified image URL for a relative `path`, or the placeholder when
/// there is nothing to show.
pub fn image_url(path: &str, size: &str) -> String {
    if path.is_empty() {
        return PLACEHOLDER_IMAGE_URL.to_owned();
    }
    format!("{IMAGE_BASE_URL}/{size}{path}")
}

pub fn image_url_w500(path: &str) -> String {
    image_url(path, DEFAULT_IMAGE_SIZE)
}

/// Looks up the catalog key on every call so a new login is picked up
/// without rebuilding the client.
#[derive(Clone)]
pub struct ApiKeyResolver {
    storage: ScopedStorage,
    fallback: String,
}

impl ApiKeyResolver {
    pub fn new(storage: ScopedStorage, fallback: Option<String>) -> Self {
        Self {
            storage,
            fallback: fallback
                .filter(|key| !key.trim().is_empty())
                .unwrap_or_else(|| FALLBACK_API_KEY.to_owned()),
        }
    }

    /// Stored key from the durable scope, else the session scope, else the
    /// fallback. Empty stored values are skipped.
    pub fn resolve(&self) -> anyhow::Result<String> {
        for scope in Scope::LOOKUP_ORDER {
            let stored = self.storage.get(scope, keys::API_KEY)?;
            if let Some(key) = stored.filter(|key| !key.is_empty()) {
                debug!(?scope, "using stored catalog key");
                return Ok(key);
            }
        }
        Ok(self.fallback.clone())
    }
}
