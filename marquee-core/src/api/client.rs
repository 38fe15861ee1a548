use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use futures::future::try_join_all;
use marquee_model::{
    Credentials, MovieDetail, MovieId, MovieSummary, PageIndex, PageResponse,
    Pagination, PersonDetail, PersonId, Registration, Session, UserProfile,
};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use url::Url;

use super::routes::{self, utils::replace_param};
use crate::config::ClientConfig;
use crate::error::{ApiError, Result};
use crate::feeds::Feed;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Whether a request rides on the signed-in session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    Public,
    Session,
}

/// Favorites come back either as a bare array (the whole collection) or as
/// a regular paged envelope.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FavoritesPayload {
    /// The whole collection
    List(Vec<MovieSummary>),
    /// One page of the collection
    Page(PageResponse<MovieSummary>),
}

impl FavoritesPayload {
    /// Normalize into a page. A bare array is the complete collection, so it
    /// only ever fills page 1.
    pub fn into_page(self, page: PageIndex) -> PageResponse<MovieSummary> {
        match self {
            FavoritesPayload::Page(response) => response,
            FavoritesPayload::List(items) if page == PageIndex::FIRST => {
                PageResponse::new(items)
            }
            FavoritesPayload::List(_) => PageResponse::empty(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct Ack {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Serialize)]
struct ListQuery<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    q: Option<&'a str>,
    page: u32,
    limit: usize,
}

/// Client for the catalogue API.
///
/// Cheap to clone; clones share the connection pool and the session token.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    app_token: Option<String>,
    token_store: Arc<RwLock<Option<String>>>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("has_app_token", &self.app_token.is_some())
            .field(
                "has_token",
                &self
                    .token_store
                    .try_read()
                    .map(|t| t.is_some())
                    .unwrap_or(false),
            )
            .finish()
    }
}

/// Trim whitespace and trailing slashes and default the scheme to `http://`.
pub(crate) fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    }
}

/// Cap a ranking-list limit the way the server does; 0 means "default".
fn ranked_limit(limit: usize) -> usize {
    if limit == 0 {
        routes::movies::RANKED_LIMIT_CAP
    } else {
        limit.min(routes::movies::RANKED_LIMIT_CAP)
    }
}

/// Pull a human readable message out of an error body.
fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["message", "error"].iter().find_map(|key| {
        value
            .get(key)
            .and_then(serde_json::Value::as_str)
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
    })
}

impl ApiClient {
    /// Client with the default 30s timeout and no application token.
    pub fn new(base_url: &str) -> Result<Self> {
        Self::build(base_url, None, DEFAULT_TIMEOUT)
    }

    /// Client built from the URL, application token and timeout of `config`.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Self::build(
            &config.backend_url,
            config.app_token.clone(),
            config.request_timeout,
        )
    }

    fn build(
        raw_url: &str,
        app_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let base_url = normalize_base_url(raw_url);
        if base_url != raw_url {
            warn!(
                "[ApiClient] Normalized base URL from '{}' to '{}'",
                raw_url, base_url
            );
        }
        Url::parse(&base_url).map_err(|source| ApiError::InvalidUrl {
            url: base_url.clone(),
            source,
        })?;

        let client = Client::builder().timeout(timeout).build()?;
        info!(
            "[ApiClient] Creating new API client with base URL: {}",
            base_url
        );

        Ok(Self {
            client,
            base_url,
            app_token: app_token.filter(|t| !t.trim().is_empty()),
            token_store: Arc::new(RwLock::new(None)),
        })
    }

    /// Send `token` as the application token.
    pub fn with_app_token(mut self, token: impl Into<String>) -> Self {
        self.app_token = Some(token.into());
        self
    }

    /// Normalized base URL, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an API path.
    pub fn build_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Replace the session token; `None` signs out.
    pub async fn set_token(&self, token: Option<String>) {
        *self.token_store.write().await = token;
    }

    /// Current session token.
    pub async fn token(&self) -> Option<String> {
        self.token_store.read().await.clone()
    }

    /// Whether a session token is held.
    pub async fn is_authenticated(&self) -> bool {
        self.token_store.read().await.is_some()
    }

    /// Forget the session token. Purely local.
    pub async fn logout(&self) {
        self.set_token(None).await;
        debug!("[ApiClient] Session cleared");
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .client
            .request(method, self.build_url(path))
            .header(CONTENT_TYPE, "application/json");
        match &self.app_token {
            Some(token) => builder.header(routes::headers::APP_TOKEN, token),
            None => builder,
        }
    }

    async fn authorized(
        &self,
        method: Method,
        path: &str,
    ) -> Result<RequestBuilder> {
        let token = self
            .token_store
            .read()
            .await
            .clone()
            .ok_or(ApiError::NotAuthenticated)?;
        Ok(self.request(method, path).bearer_auth(token))
    }

    /// Send and map non-success statuses.
    async fn send(
        &self,
        request: RequestBuilder,
        access: Access,
    ) -> Result<Response> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::UNAUTHORIZED && access == Access::Session {
            warn!("[ApiClient] Session rejected by server, clearing token");
            self.set_token(None).await;
            return Err(ApiError::Unauthorized);
        }

        let body = response.text().await.unwrap_or_default();
        Err(ApiError::Status {
            status,
            message: error_message(&body),
        })
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        access: Access,
    ) -> Result<T> {
        let response = self.send(request, access).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Like [`execute`](Self::execute) for endpoints whose body may be empty.
    async fn execute_ack(
        &self,
        request: RequestBuilder,
        access: Access,
    ) -> Result<Option<String>> {
        let response = self.send(request, access).await?;
        let bytes = response.bytes().await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        let ack: Ack = serde_json::from_slice(&bytes).unwrap_or_default();
        Ok(ack.message)
    }

    async fn ranked(
        &self,
        route: &str,
        page: PageIndex,
        limit: usize,
    ) -> Result<PageResponse<MovieSummary>> {
        let query = ListQuery {
            q: None,
            page: page.get(),
            limit: ranked_limit(limit),
        };
        self.execute(self.request(Method::GET, route).query(&query), Access::Public)
            .await
    }

    /// One page of the most-popular ranking. `limit` is capped at 12.
    pub async fn most_popular(
        &self,
        page: PageIndex,
        limit: usize,
    ) -> Result<PageResponse<MovieSummary>> {
        self.ranked(routes::movies::MOST_POPULAR, page, limit).await
    }

    /// One page of the top-rated ranking. `limit` is capped at 12.
    pub async fn top_rated(
        &self,
        page: PageIndex,
        limit: usize,
    ) -> Result<PageResponse<MovieSummary>> {
        self.ranked(routes::movies::TOP_RATED, page, limit).await
    }

    /// One page of title matches for `query`, trimmed.
    pub async fn search(
        &self,
        query: &str,
        page: PageIndex,
        limit: usize,
    ) -> Result<PageResponse<MovieSummary>> {
        let query = ListQuery {
            q: Some(query.trim()),
            page: page.get(),
            limit,
        };
        self.execute(
            self.request(Method::GET, routes::movies::SEARCH).query(&query),
            Access::Public,
        )
        .await
    }

    /// Full record of one movie.
    pub async fn movie(&self, id: &MovieId) -> Result<MovieDetail> {
        let path = replace_param(routes::movies::ITEM, "{id}", id);
        self.execute(self.request(Method::GET, &path), Access::Public)
            .await
    }

    /// Full record of one person.
    pub async fn person(&self, id: &PersonId) -> Result<PersonDetail> {
        let path = replace_param(routes::persons::ITEM, "{id}", id);
        self.execute(self.request(Method::GET, &path), Access::Public)
            .await
    }

    /// Sign in and keep the returned token for later session requests.
    pub async fn login(&self, credentials: &Credentials) -> Result<Session> {
        let session: Session = self
            .execute(
                self.request(Method::POST, routes::auth::LOGIN)
                    .json(credentials),
                Access::Public,
            )
            .await?;
        self.set_token(Some(session.token.clone())).await;
        info!("[ApiClient] Signed in as {}", credentials.username);
        Ok(session)
    }

    /// Create an account. Returns the server's confirmation message, if any.
    pub async fn register(
        &self,
        registration: &Registration,
    ) -> Result<Option<String>> {
        self.execute_ack(
            self.request(Method::POST, routes::auth::REGISTER)
                .json(registration),
            Access::Public,
        )
        .await
    }

    /// Profile of the signed-in user.
    pub async fn profile(&self) -> Result<UserProfile> {
        let request =
            self.authorized(Method::GET, routes::users::PROFILE).await?;
        self.execute(request, Access::Session).await
    }

    /// One page of the signed-in user's favorites.
    pub async fn favorites(
        &self,
        page: PageIndex,
        limit: usize,
    ) -> Result<PageResponse<MovieSummary>> {
        let query = ListQuery {
            q: None,
            page: page.get(),
            limit,
        };
        let request = self
            .authorized(Method::GET, routes::users::FAVORITES)
            .await?
            .query(&query);
        let payload: FavoritesPayload =
            self.execute(request, Access::Session).await?;
        Ok(payload.into_page(page))
    }

    /// Returns the server's confirmation message, if any.
    pub async fn add_favorite(&self, id: &MovieId) -> Result<Option<String>> {
        let path = replace_param(routes::users::FAVORITE_ITEM, "{id}", id);
        let request = self.authorized(Method::POST, &path).await?;
        self.execute_ack(request, Access::Session).await
    }

    /// Returns the server's confirmation message, if any.
    pub async fn remove_favorite(
        &self,
        id: &MovieId,
    ) -> Result<Option<String>> {
        let path = replace_param(routes::users::FAVORITE_ITEM, "{id}", id);
        let request = self.authorized(Method::DELETE, &path).await?;
        self.execute_ack(request, Access::Session).await
    }

    /// Fetch pages `1..=pages` of a feed concurrently and merge them in page
    /// order, for callers that want a one-shot list instead of a window.
    ///
    /// Title and pagination come from page 1, falling back to the feed title
    /// and a `{ current_page: 1, page_size }` block.
    pub async fn prefetch_first_pages(
        &self,
        feed: &Feed,
        pages: NonZeroU32,
        page_size: usize,
    ) -> Result<PageResponse<MovieSummary>> {
        let responses = try_join_all(
            PageIndex::first_n(pages)
                .map(|page| feed.fetch(self, page, page_size)),
        )
        .await?;

        let mut responses = responses.into_iter();
        let first = responses.next().unwrap_or_default();
        let title = first
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| feed.title());
        let pagination = first.pagination.unwrap_or(Pagination {
            current_page: 1,
            page_size: u32::try_from(page_size).unwrap_or(u32::MAX),
            total_pages: None,
            total_items: None,
        });
        let data = first
            .data
            .into_iter()
            .chain(responses.flat_map(|page| page.data))
            .collect();

        Ok(PageResponse {
            title: Some(title),
            data,
            pagination: Some(pagination),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_base_urls() {
        assert_eq!(normalize_base_url("localhost:3000/"), "http://localhost:3000");
        assert_eq!(
            normalize_base_url("  https://api.example.com// "),
            "https://api.example.com"
        );
    }

    #[test]
    fn ranked_limits_are_capped() {
        assert_eq!(ranked_limit(0), 12);
        assert_eq!(ranked_limit(5), 5);
        assert_eq!(ranked_limit(40), 12);
    }

    #[test]
    fn error_message_prefers_message_field() {
        assert_eq!(
            error_message(r#"{"message": "Invalid credentials"}"#).as_deref(),
            Some("Invalid credentials")
        );
        assert_eq!(
            error_message(r#"{"error": "Token missing"}"#).as_deref(),
            Some("Token missing")
        );
        assert_eq!(error_message("<html>oops</html>"), None);
        assert_eq!(error_message(r#"{"message": "  "}"#), None);
    }

    #[test]
    fn bare_favorites_array_fills_only_the_first_page() {
        let payload: FavoritesPayload =
            serde_json::from_str(r#"[{"id": "tt1", "title": "One"}]"#).unwrap();
        assert_eq!(payload.clone().into_page(PageIndex::FIRST).len(), 1);
        assert!(payload.into_page(PageIndex::FIRST.next()).is_empty());

        let paged: FavoritesPayload = serde_json::from_str(
            r#"{"data": [{"id": "tt2", "title": "Two"}], "pagination": {"current_page": 2, "page_size": 12}}"#,
        )
        .unwrap();
        assert_eq!(paged.into_page(PageIndex::FIRST.next()).len(), 1);
    }

    #[test]
    fn rejects_unparseable_base_url() {
        assert!(matches!(
            ApiClient::new("http://exa mple.com"),
            Err(ApiError::InvalidUrl { .. })
        ));
    }
}
