use marquee_contracts::page_source::PageSource;
use marquee_model::PageIndex;
use parking_lot::Mutex;
use tracing::{debug, warn};

use super::{Bootstrap, Phase};
use crate::error::WindowError;

/// Items a spotlight keeps from its single page.
pub const DEFAULT_SPOTLIGHT_LIMIT: usize = 5;

#[derive(Debug)]
struct SpotlightState<T> {
    items: Vec<T>,
    index: usize,
    phase: Phase,
    generation: u64,
    detached: bool,
}

/// One-page banner that shows a single item at a time and wraps around at
/// both ends.
pub struct Spotlight<S: PageSource> {
    source: S,
    limit: usize,
    label: String,
    state: Mutex<SpotlightState<S::Item>>,
}

impl<S: PageSource> std::fmt::Debug for Spotlight<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("Spotlight")
            .field("source", &self.label)
            .field("limit", &self.limit)
            .field("items", &state.items.len())
            .field("index", &state.index)
            .field("phase", &state.phase)
            .finish()
    }
}

impl<S: PageSource> Spotlight<S> {
    /// Same as [`DEFAULT_SPOTLIGHT_LIMIT`]
    pub const DEFAULT_LIMIT: usize = DEFAULT_SPOTLIGHT_LIMIT;

    /// An unloaded spotlight over the first `limit` items of page 1.
    pub fn new(source: S, limit: usize) -> Self {
        let label = source.describe();
        Self {
            source,
            limit: limit.max(1),
            label,
            state: Mutex::new(SpotlightState {
                items: Vec::new(),
                index: 0,
                phase: Phase::Idle,
                generation: 0,
                detached: false,
            }),
        }
    }

    /// Fetch the first page (`limit` items). Same once-only and discard
    /// rules as [`PageWindowCache::bootstrap`](super::PageWindowCache::bootstrap).
    pub async fn load(&self) -> Result<Bootstrap, WindowError> {
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

        let result = self.source.fetch_page(PageIndex::FIRST, self.limit).await;

        let mut state = self.state.lock();
        if state.generation != generation {
            return Ok(Bootstrap::Discarded);
        }
        match result {
            Ok(page) => {
                state.items = page.data;
                state.index = 0;
                state.phase = Phase::Ready;
                debug!(source = %self.label, items = state.items.len(), "spotlight loaded");
                Ok(Bootstrap::Loaded {
                    items: state.items.len(),
                })
            }
            Err(err) => {
                state.items.clear();
                state.index = 0;
                state.phase = Phase::Failed(format!("{err:#}"));
                warn!(source = %self.label, "spotlight load failed: {err:#}");
                Err(WindowError::Bootstrap {
                    page: PageIndex::FIRST,
                    source: err.into(),
                })
            }
        }
    }

    /// Focus the next item, wrapping to the first. Returns the new index.
    pub fn next(&self) -> usize {
        let mut state = self.state.lock();
        if !state.items.is_empty() && !state.detached {
            state.index = (state.index + 1) % state.items.len();
        }
        state.index
    }

    /// Focus the previous item, wrapping to the last. Returns the new index.
    pub fn prev(&self) -> usize {
        let mut state = self.state.lock();
        if !state.items.is_empty() && !state.detached {
            let len = state.items.len();
            state.index = (state.index + len - 1) % len;
        }
        state.index
    }

    /// The highlighted item, `None` until loaded or when the page was empty.
    pub fn current(&self) -> Option<S::Item>
    where
        S::Item: Clone,
    {
        let state = self.state.lock();
        state.items.get(state.index).cloned()
    }

    /// 1-based `(position, count)`, `(0, 0)` when empty.
    pub fn position(&self) -> (usize, usize) {
        let state = self.state.lock();
        if state.items.is_empty() {
            (0, 0)
        } else {
            (state.index + 1, state.items.len())
        }
    }

    /// Load lifecycle.
    pub fn phase(&self) -> Phase {
        self.state.lock().phase.clone()
    }

    /// Detach; a load still in flight is discarded.
    pub fn teardown(&self) {
        let mut state = self.state.lock();
        state.generation = state.generation.wrapping_add(1);
        state.detached = true;
    }
}
