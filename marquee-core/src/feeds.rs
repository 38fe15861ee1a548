//! Bindings from catalogue endpoints to [`PageSource`], so every list
//! surface runs through the same [`PageWindowCache`](crate::PageWindowCache).

use std::fmt;

use async_trait::async_trait;
use futures::future::join_all;
use marquee_contracts::page_source::PageSource;
use marquee_model::{MovieDetail, MovieSummary, PageIndex, PageResponse};
use tracing::{debug, warn};

use crate::api::{ApiClient, routes};
use crate::error::{Result, WindowError};
use crate::window::WindowConfig;

/// One paged list of movies.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Feed {
    /// Most-popular ranking
    MostPopular,
    /// Top-rated ranking
    TopRated,
    /// Title search as typed
    Search(String),
    /// The signed-in user's favorites
    Favorites,
}

impl Feed {
    /// Search feed for `query`, kept as typed.
    pub fn search(query: impl Into<String>) -> Self {
        Feed::Search(query.into())
    }

    /// Heading shown above the list.
    pub fn title(&self) -> String {
        match self {
            Feed::MostPopular => "Most Popular".to_string(),
            Feed::TopRated => "Top Rated".to_string(),
            Feed::Search(query) if query.trim().is_empty() => {
                "Search".to_string()
            }
            Feed::Search(query) => {
                format!("Search results for \"{}\"", query.trim())
            }
            Feed::Favorites => "My Favorites".to_string(),
        }
    }

    /// Whether the feed needs a signed-in client.
    pub fn requires_session(&self) -> bool {
        matches!(self, Feed::Favorites)
    }

    /// Largest `limit` the server honours for this feed, when it caps one.
    pub fn page_size_cap(&self) -> Option<usize> {
        match self {
            Feed::MostPopular | Feed::TopRated => {
                Some(routes::movies::RANKED_LIMIT_CAP)
            }
            Feed::Search(_) | Feed::Favorites => None,
        }
    }

    /// Reject a window whose pages the server would cut short. The cache
    /// derives the next page from `len / page_size`, so a capped page would
    /// look like the end of the list.
    pub fn check_window(
        &self,
        window: WindowConfig,
    ) -> std::result::Result<WindowConfig, WindowError> {
        match self.page_size_cap() {
            Some(cap) if window.page_size() > cap => {
                Err(WindowError::InvalidConfig(format!(
                    "page size {} exceeds the {cap} item limit of {self}",
                    window.page_size()
                )))
            }
            _ => Ok(window),
        }
    }

    /// Fetch one page of this feed. A blank search never reaches the
    /// network and yields an empty page.
    pub async fn fetch(
        &self,
        client: &ApiClient,
        page: PageIndex,
        limit: usize,
    ) -> Result<PageResponse<MovieSummary>> {
        match self {
            Feed::MostPopular => client.most_popular(page, limit).await,
            Feed::TopRated => client.top_rated(page, limit).await,
            Feed::Search(query) if query.trim().is_empty() => {
                debug!("blank search query, skipping request");
                Ok(PageResponse::empty())
            }
            Feed::Search(query) => client.search(query, page, limit).await,
            Feed::Favorites => client.favorites(page, limit).await,
        }
    }
}

impl fmt::Display for Feed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Feed::MostPopular => f.write_str("most-popular"),
            Feed::TopRated => f.write_str("top-rated"),
            Feed::Search(query) => write!(f, "search:{}", query.trim()),
            Feed::Favorites => f.write_str("favorites"),
        }
    }
}

/// A [`Feed`] bound to a client.
#[derive(Debug, Clone)]
pub struct FeedSource {
    client: ApiClient,
    feed: Feed,
}

impl FeedSource {
    /// Bind `feed` to `client`.
    pub fn new(client: ApiClient, feed: Feed) -> Self {
        Self { client, feed }
    }

    /// The bound feed.
    pub fn feed(&self) -> &Feed {
        &self.feed
    }

    /// The client requests go through.
    pub fn client(&self) -> &ApiClient {
        &self.client
    }
}

#[async_trait]
impl PageSource for FeedSource {
    type Item = MovieSummary;

    async fn fetch_page(
        &self,
        page: PageIndex,
        page_size: usize,
    ) -> anyhow::Result<PageResponse<MovieSummary>> {
        Ok(self.feed.fetch(&self.client, page, page_size).await?)
    }

    fn describe(&self) -> String {
        self.feed.to_string()
    }
}

/// A favorite with its full record when that could be fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HydratedFavorite {
    /// Full record fetched
    Detailed(Box<MovieDetail>),
    /// Detail lookup failed; the list entry is shown as is
    Summary(MovieSummary),
}

impl HydratedFavorite {
    /// List entry, rebuilt from the detail when there is one.
    pub fn summary(&self) -> MovieSummary {
        match self {
            HydratedFavorite::Detailed(detail) => detail.summary(),
            HydratedFavorite::Summary(summary) => summary.clone(),
        }
    }

    /// Full record, when the lookup succeeded.
    pub fn detail(&self) -> Option<&MovieDetail> {
        match self {
            HydratedFavorite::Detailed(detail) => Some(detail),
            HydratedFavorite::Summary(_) => None,
        }
    }
}

/// Fetch full details for every favorite concurrently, in input order. A
/// failed lookup falls back to the summary instead of failing the list.
pub async fn hydrate_favorites(
    client: &ApiClient,
    favorites: Vec<MovieSummary>,
) -> Vec<HydratedFavorite> {
    let lookups = favorites.into_iter().map(|favorite| async move {
        match client.movie(&favorite.id).await {
            Ok(detail) => HydratedFavorite::Detailed(Box::new(detail)),
            Err(err) => {
                warn!(movie = %favorite.id, "falling back to favorite summary: {err}");
                HydratedFavorite::Summary(favorite)
            }
        }
    });
    join_all(lookups).await
}
