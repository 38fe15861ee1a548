use std::collections::BTreeSet;

use marquee_model::PageIndex;

/// Advance-path fetch slot. At most one page is in flight per cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchState {
    /// No fetch in flight
    #[default]
    Idle,
    /// An advance is fetching this page
    FetchingPage(PageIndex),
}

impl FetchState {
    /// Page being fetched, if any.
    pub fn in_flight(&self) -> Option<PageIndex> {
        match self {
            FetchState::Idle => None,
            FetchState::FetchingPage(page) => Some(*page),
        }
    }
}

/// Bootstrap lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Phase {
    /// Not bootstrapped yet
    #[default]
    Idle,
    /// Bootstrap running
    Loading,
    /// Bootstrap succeeded
    Ready,
    /// Bootstrap failed; the message is suitable for inline display
    Failed(String),
}

impl Phase {
    /// Whether a bootstrap is running.
    pub fn is_loading(&self) -> bool {
        matches!(self, Phase::Loading)
    }

    /// Failure message while in [`Phase::Failed`].
    pub fn error(&self) -> Option<&str> {
        match self {
            Phase::Failed(message) => Some(message),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub(crate) struct WindowState<T> {
    pub(crate) items: Vec<T>,
    pub(crate) fetched_pages: BTreeSet<PageIndex>,
    pub(crate) cursor: usize,
    pub(crate) fetch: FetchState,
    pub(crate) phase: Phase,
    pub(crate) advance_error: Option<String>,
    pub(crate) generation: u64,
    pub(crate) detached: bool,
}

impl<T> WindowState<T> {
    pub(crate) fn new(generation: u64) -> Self {
        Self {
            items: Vec::new(),
            fetched_pages: BTreeSet::new(),
            cursor: 0,
            fetch: FetchState::Idle,
            phase: Phase::Idle,
            advance_error: None,
            generation,
            detached: false,
        }
    }

    pub(crate) fn window(&self, view_size: usize) -> &[T] {
        let start = self.cursor.min(self.items.len());
        let end = start.saturating_add(view_size).min(self.items.len());
        &self.items[start..end]
    }

    pub(crate) fn max_cursor(&self, view_size: usize) -> usize {
        self.items.len().saturating_sub(view_size)
    }

    /// `tentative >= len - view_size`, without unsigned underflow.
    pub(crate) fn at_or_past_tail(
        &self,
        tentative: usize,
        view_size: usize,
    ) -> bool {
        tentative.saturating_add(view_size) >= self.items.len()
    }

    /// `len / page_size + 1`.
    ///
    /// Only exact while every fetched page was full and pages arrived without
    /// gaps. A short page before the true end makes this point back at an
    /// already fetched page, which then stalls further growth.
    pub(crate) fn next_page_index(&self, page_size: usize) -> PageIndex {
        let full_pages = self.items.len() / page_size;
        PageIndex::after_full_pages(
            u32::try_from(full_pages).unwrap_or(u32::MAX),
        )
    }

    pub(crate) fn clamp_cursor(&mut self, target: usize, view_size: usize) {
        self.cursor = target.min(self.max_cursor(view_size));
    }
}
