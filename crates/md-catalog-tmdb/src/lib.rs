use async_trait::async_trait;
use md_api_types::{DiscoverParams, MovieDetail, MovieId, MoviePage};
use md_catalog_client::{
    ApiKeyResolver, CatalogClient, CatalogError, CatalogResult, retain_with_posters,
};
use serde::de::DeserializeOwned;
use tracing::debug;

pub const TMDB_API_URL: &str = "https://api.themoviedb.org/3";
pub const DEFAULT_LANGUAGE: &str = "ko-KR";

/// HTTP adapter for the TMDB v3 REST API.
///
/// The API key is not fixed at construction: every request asks the
/// [`ApiKeyResolver`] again.
pub struct TmdbCatalog {
    endpoint: String,
    language: String,
    keys: ApiKeyResolver,
    http: reqwest::Client,
}

impl TmdbCatalog {
    pub fn new(endpoint: Option<String>, language: Option<String>, keys: ApiKeyResolver) -> Self {
        let endpoint = endpoint.unwrap_or_else(|| TMDB_API_URL.to_string());
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            language: language.unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
            keys,
            http: reqwest::Client::new(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> CatalogResult<T> {
        let api_key = self
            .keys
            .resolve()
            .map_err(|err| CatalogError::Credentials(err.to_string()))?;
        let url = format!("{}{}", self.endpoint, path);
        debug!(path, "catalog request");

        let response = self
            .http
            .get(&url)
            .query(&[("api_key", api_key.as_str()), ("language", self.language.as_str())])
            .query(query)
            .send()
            .await
            .map_err(|err| CatalogError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|err| CatalogError::Decode(err.to_string()))
    }

    async fn listing(&self, path: &str, query: Vec<(String, String)>) -> CatalogResult<MoviePage> {
        let page: MoviePage = self.get_json(path, &query).await?;
        Ok(retain_with_posters(page))
    }
}

fn page_query(page: u32) -> Vec<(String, String)> {
    vec![("page".to_owned(), page.to_string())]
}

#[async_trait]
impl CatalogClient for TmdbCatalog {
    async fn fetch_popular(&self, page: u32) -> CatalogResult<MoviePage> {
        self.listing("/movie/popular", page_query(page)).await
    }

    async fn fetch_now_playing(&self, page: u32) -> CatalogResult<MoviePage> {
        self.listing("/movie/now_playing", page_query(page)).await
    }

    async fn fetch_top_rated(&self, page: u32) -> CatalogResult<MoviePage> {
        self.listing("/movie/top_rated", page_query(page)).await
    }

    async fn fetch_by_genre(&self, genre_id: u32, page: u32) -> CatalogResult<MoviePage> {
        let mut query = vec![("with_genres".to_owned(), genre_id.to_string())];
        query.extend(page_query(page));
        self.listing("/discover/movie", query).await
    }

    async fn search(&self, query: &str, page: u32) -> CatalogResult<MoviePage> {
        let mut params = vec![("query".to_owned(), query.to_owned())];
        params.extend(page_query(page));
        self.listing("/search/movie", params).await
    }

    async fn discover(&self, params: &DiscoverParams) -> CatalogResult<MoviePage> {
        self.listing("/discover/movie", params.to_query()).await
    }

    async fn fetch_detail(&self, id: MovieId) -> CatalogResult<MovieDetail> {
        self.get_json(&format!("/movie/{id}"), &[]).await
    }
}
