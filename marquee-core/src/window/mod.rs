//! Paged, append-only item cache with a sliding view window.
//!
//! A [`PageWindowCache`] owns the items fetched so far for one list surface.
//! It is seeded by [`bootstrap`](PageWindowCache::bootstrap) (the first pages,
//! fetched concurrently) and grows one page at a time as
//! [`advance`](PageWindowCache::advance) pushes the window toward the tail.
//!
//! All state sits behind a single lock that is only held in synchronous
//! sections, so a cache can be shared (`Arc<PageWindowCache<_>>`) between the
//! tasks driving a view. Every operation captures the cache generation before
//! suspending; [`reset`](PageWindowCache::reset) and
//! [`teardown`](PageWindowCache::teardown) bump it, and completions that come
//! back to a newer generation are dropped.

mod config;
mod spotlight;
mod state;

use std::collections::BTreeSet;

use futures::TryFutureExt;
use futures::future::try_join_all;
use marquee_contracts::page_source::PageSource;
use marquee_model::PageIndex;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::error::WindowError;

pub use config::WindowConfig;
pub use spotlight::{DEFAULT_SPOTLIGHT_LIMIT, Spotlight};
pub use state::{FetchState, Phase};

use state::WindowState;

/// Result of [`PageWindowCache::bootstrap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bootstrap {
    /// Pages arrived
    Loaded {
        /// Items merged from all bootstrap pages
        items: usize,
    },
    /// A previous bootstrap already succeeded; nothing was fetched
    AlreadyLoaded,
    /// The cache was reset or torn down before the pages arrived
    Discarded,
}

/// What the tail check of an advance decided about fetching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageFetch {
    /// The move stayed clear of the tail
    NotNeeded,
    /// Another advance owns the fetch slot
    InFlight(PageIndex),
    /// The next page was already merged, so the list has ended
    AlreadyFetched(PageIndex),
    /// A page was fetched and appended
    Fetched {
        /// The fetched page
        page: PageIndex,
        /// Items it contributed
        items: usize,
    },
}

/// Result of [`PageWindowCache::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Nothing has been loaded yet
    Empty,
    /// The window moved (or was clamped in place)
    Moved {
        /// Cursor after the clamp
        cursor: usize,
        /// What happened at the tail
        fetch: PageFetch,
    },
    /// The cache was reset or torn down while the page was in flight
    Discarded,
}

/// Owned copy of everything a view needs to render one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowSnapshot<T> {
    /// The visible window
    pub items: Vec<T>,
    /// Offset of the first visible item
    pub cursor: usize,
    /// Items fetched so far
    pub total: usize,
    /// A bootstrap is running
    pub loading: bool,
    /// Bootstrap failure
    pub error: Option<String>,
    /// Last failed page fetch, cleared by the next success
    pub advance_error: Option<String>,
    /// Page an advance is fetching
    pub fetching: Option<PageIndex>,
    /// Merged pages, ascending
    pub fetched_pages: Vec<PageIndex>,
    /// The cursor is past the first window
    pub can_retreat: bool,
}

/// See the [module docs](self).
pub struct PageWindowCache<S: PageSource> {
    source: S,
    config: WindowConfig,
    label: String,
    state: Mutex<WindowState<S::Item>>,
}

impl<S: PageSource> std::fmt::Debug for PageWindowCache<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("PageWindowCache")
            .field("source", &self.label)
            .field("config", &self.config)
            .field("items", &state.items.len())
            .field("cursor", &state.cursor)
            .field("fetch", &state.fetch)
            .field("phase", &state.phase)
            .field("generation", &state.generation)
            .finish()
    }
}

impl<S: PageSource> PageWindowCache<S> {
    /// An idle cache. Nothing is fetched until [`bootstrap`](Self::bootstrap).
    pub fn new(source: S, config: WindowConfig) -> Self {
        let label = source.describe();
        Self {
            source,
            config,
            label,
            state: Mutex::new(WindowState::new(0)),
        }
    }

    /// Sizing this cache was built with.
    pub fn config(&self) -> &WindowConfig {
        &self.config
    }

    /// The injected page source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetch pages `1..=bootstrap_pages` concurrently and seed the cache.
    ///
    /// Items are merged in page order whatever order the responses complete
    /// in. Any failed page fails the whole bootstrap and leaves the cache
    /// empty with [`Phase::Failed`]; calling `bootstrap` again retries.
    pub async fn bootstrap(&self) -> Result<Bootstrap, WindowError> {
        let generation = {
            let mut state = self.state.lock();
            if state.detached {
                return Ok(Bootstrap::Discarded);
            }
            match state.phase {
                Phase::Loading => return Err(WindowError::BootstrapInFlight),
                Phase::Ready => return Ok(Bootstrap::AlreadyLoaded),
                Phase::Idle | Phase::Failed(_) => {}
            }
            state.phase = Phase::Loading;
            state.generation
        };

        let pages: Vec<PageIndex> =
            PageIndex::first_n(self.config.bootstrap_pages()).collect();
        debug!(source = %self.label, ?pages, "bootstrapping window cache");

        let page_size = self.config.page_size();
        let result = try_join_all(pages.iter().map(|&page| {
            self.source
                .fetch_page(page, page_size)
                .map_err(move |err| (page, err))
        }))
        .await;

        let mut state = self.state.lock();
        if state.generation != generation {
            debug!(source = %self.label, "discarding stale bootstrap result");
            return Ok(Bootstrap::Discarded);
        }

        match result {
            Ok(responses) => {
                state.items =
                    responses.into_iter().flat_map(|page| page.data).collect();
                state.fetched_pages = pages.into_iter().collect();
                state.cursor = 0;
                state.phase = Phase::Ready;
                let items = state.items.len();
                info!(source = %self.label, items, "window cache bootstrapped");
                Ok(Bootstrap::Loaded { items })
            }
            Err((page, err)) => {
                state.items.clear();
                state.fetched_pages.clear();
                state.cursor = 0;
                state.phase = Phase::Failed(format!("{err:#}"));
                warn!(source = %self.label, %page, "bootstrap failed: {err:#}");
                Err(WindowError::Bootstrap {
                    page,
                    source: err.into(),
                })
            }
        }
    }

    /// The visible slice `items[cursor .. cursor + view_size]`, possibly
    /// shorter near the tail or before anything is loaded.
    pub fn current_window(&self) -> Vec<S::Item>
    where
        S::Item: Clone,
    {
        self.state.lock().window(self.config.view_size()).to_vec()
    }

    /// Borrow the current window without cloning. The cache is locked for
    /// the duration of `f`.
    pub fn with_window<R>(&self, f: impl FnOnce(&[S::Item]) -> R) -> R {
        let state = self.state.lock();
        f(state.window(self.config.view_size()))
    }

    /// Move the window forward by one view, fetching the next page first when
    /// the move reaches the known tail.
    ///
    /// Only one page fetch is in flight per cache; concurrent callers that
    /// find the slot taken just clamp against the items already present. A
    /// failed fetch releases the slot, leaves the page unmarked so a later
    /// advance retries it, and is returned after the cursor has been clamped.
    pub async fn advance(&self) -> Result<Advance, WindowError> {
        let view_size = self.config.view_size();
        let page_size = self.config.page_size();

        let (tentative, page, generation) = {
            let mut state = self.state.lock();
            if state.detached {
                return Ok(Advance::Discarded);
            }
            if state.items.is_empty() {
                return Ok(Advance::Empty);
            }

            let tentative = state.cursor + view_size;
            let page = state.next_page_index(page_size);
            let settled = if !state.at_or_past_tail(tentative, view_size) {
                Some(PageFetch::NotNeeded)
            } else {
                match state.fetch {
                    FetchState::FetchingPage(in_flight) => {
                        Some(PageFetch::InFlight(in_flight))
                    }
                    FetchState::Idle if state.fetched_pages.contains(&page) => {
                        Some(PageFetch::AlreadyFetched(page))
                    }
                    FetchState::Idle => {
                        state.fetch = FetchState::FetchingPage(page);
                        None
                    }
                }
            };

            if let Some(fetch) = settled {
                state.clamp_cursor(tentative, view_size);
                return Ok(Advance::Moved {
                    cursor: state.cursor,
                    fetch,
                });
            }
            (tentative, page, state.generation)
        };

        debug!(source = %self.label, %page, "fetching next page");
        let result = self.source.fetch_page(page, page_size).await;

        let mut state = self.state.lock();
        if state.generation != generation {
            debug!(source = %self.label, %page, "discarding stale page");
            return Ok(Advance::Discarded);
        }
        state.fetch = FetchState::Idle;

        match result {
            Ok(response) => {
                let items = response.data.len();
                state.items.extend(response.data);
                state.fetched_pages.insert(page);
                state.advance_error = None;
                state.clamp_cursor(tentative, view_size);
                debug!(
                    source = %self.label,
                    %page,
                    items,
                    total = state.items.len(),
                    "page appended"
                );
                Ok(Advance::Moved {
                    cursor: state.cursor,
                    fetch: PageFetch::Fetched { page, items },
                })
            }
            Err(err) => {
                state.advance_error = Some(format!("{err:#}"));
                state.clamp_cursor(tentative, view_size);
                warn!(source = %self.label, %page, "page fetch failed: {err:#}");
                Err(WindowError::PageFetch {
                    page,
                    source: err.into(),
                })
            }
        }
    }

    /// Move the window back by one view, stopping at 0. Never fetches.
    pub fn retreat(&self) -> usize {
        let mut state = self.state.lock();
        if !state.detached {
            state.cursor = state.cursor.saturating_sub(self.config.view_size());
        }
        state.cursor
    }

    /// Drop everything and start over as a fresh cache. Pending operations
    /// complete as `Discarded`.
    pub fn reset(&self) {
        let mut state = self.state.lock();
        let generation = state.generation.wrapping_add(1);
        *state = WindowState::new(generation);
        debug!(source = %self.label, generation, "window cache reset");
    }

    /// Detach the cache from its view. Pending operations complete as
    /// `Discarded` and later calls become no-ops.
    pub fn teardown(&self) {
        let mut state = self.state.lock();
        state.generation = state.generation.wrapping_add(1);
        state.detached = true;
        debug!(source = %self.label, "window cache torn down");
    }

    /// Everything a view needs, taken under one lock.
    pub fn snapshot(&self) -> WindowSnapshot<S::Item>
    where
        S::Item: Clone,
    {
        let state = self.state.lock();
        WindowSnapshot {
            items: state.window(self.config.view_size()).to_vec(),
            cursor: state.cursor,
            total: state.items.len(),
            loading: state.phase.is_loading(),
            error: state.phase.error().map(str::to_string),
            advance_error: state.advance_error.clone(),
            fetching: state.fetch.in_flight(),
            fetched_pages: state.fetched_pages.iter().copied().collect(),
            can_retreat: state.cursor > 0,
        }
    }

    /// Offset of the first visible item.
    pub fn cursor(&self) -> usize {
        self.state.lock().cursor
    }

    /// Number of items fetched so far.
    pub fn len(&self) -> usize {
        self.state.lock().items.len()
    }

    /// Whether nothing has been fetched.
    pub fn is_empty(&self) -> bool {
        self.state.lock().items.is_empty()
    }

    /// Bootstrap lifecycle.
    pub fn phase(&self) -> Phase {
        self.state.lock().phase.clone()
    }

    /// Advance-path fetch slot.
    pub fn fetch_state(&self) -> FetchState {
        self.state.lock().fetch
    }

    /// Pages merged so far.
    pub fn fetched_pages(&self) -> BTreeSet<PageIndex> {
        self.state.lock().fetched_pages.clone()
    }

    /// Whether [`teardown`](Self::teardown) has run.
    pub fn is_detached(&self) -> bool {
        self.state.lock().detached
    }

    /// Every item fetched so far, in arrival order.
    pub fn items(&self) -> Vec<S::Item>
    where
        S::Item: Clone,
    {
        self.state.lock().items.clone()
    }
}
