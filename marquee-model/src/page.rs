use std::num::NonZeroU32;

use crate::error::ModelError;

/// 1-based page number as understood by the remote API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct PageIndex(NonZeroU32);

impl PageIndex {
    pub const FIRST: PageIndex = PageIndex(NonZeroU32::MIN);

    pub fn new(page: u32) -> Result<Self, ModelError> {
        NonZeroU32::new(page).map(PageIndex).ok_or_else(|| {
            ModelError::InvalidPage("page numbers start at 1".to_string())
        })
    }

    pub fn get(self) -> u32 {
        self.0.get()
    }

    /// The page that follows this one, saturating at `u32::MAX`.
    pub fn next(self) -> PageIndex {
        PageIndex(self.0.saturating_add(1))
    }

    /// The page that follows `full_pages` complete pages, saturating at
    /// `u32::MAX`.
    pub fn after_full_pages(full_pages: u32) -> PageIndex {
        PageIndex(NonZeroU32::MIN.saturating_add(full_pages))
    }

    /// Pages `1..=count`, in order.
    pub fn first_n(count: NonZeroU32) -> impl Iterator<Item = PageIndex> {
        (1..=count.get()).filter_map(NonZeroU32::new).map(PageIndex)
    }
}

impl Default for PageIndex {
    fn default() -> Self {
        PageIndex::FIRST
    }
}

impl From<NonZeroU32> for PageIndex {
    fn from(page: NonZeroU32) -> Self {
        PageIndex(page)
    }
}

impl std::fmt::Display for PageIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Pagination block attached to list responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pagination {
    pub current_page: u32,
    pub page_size: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub total_pages: Option<u32>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub total_items: Option<u64>,
}

impl Pagination {
    /// Whether the server reports pages beyond `current_page`. Unknown totals
    /// count as "more".
    pub fn has_more(&self) -> bool {
        self.total_pages
            .is_none_or(|total| self.current_page < total)
    }
}

/// Envelope returned by every list endpoint.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PageResponse<T> {
    #[cfg_attr(feature = "serde", serde(default))]
    pub title: Option<String>,
    #[cfg_attr(
        feature = "serde",
        serde(
            default = "Vec::new",
            deserialize_with = "crate::de::vec_or_null",
            bound(deserialize = "T: serde::Deserialize<'de>")
        )
    )]
    pub data: Vec<T>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub pagination: Option<Pagination>,
}

impl<T> PageResponse<T> {
    pub fn new(data: Vec<T>) -> Self {
        Self {
            title: None,
            data,
            pagination: None,
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = Some(pagination);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl<T> Default for PageResponse<T> {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_zero_is_rejected() {
        assert!(PageIndex::new(0).is_err());
        assert_eq!(PageIndex::new(3).unwrap().get(), 3);
        assert_eq!(PageIndex::FIRST.next().get(), 2);
        assert_eq!(PageIndex::after_full_pages(0), PageIndex::FIRST);
        assert_eq!(PageIndex::after_full_pages(2).get(), 3);
    }

    #[test]
    fn first_n_is_ordered() {
        let pages: Vec<u32> = PageIndex::first_n(NonZeroU32::new(3).unwrap())
            .map(PageIndex::get)
            .collect();
        assert_eq!(pages, vec![1, 2, 3]);
    }

    #[test]
    fn has_more_respects_totals() {
        let last = Pagination {
            current_page: 4,
            page_size: 12,
            total_pages: Some(4),
            total_items: Some(40),
        };
        assert!(!last.has_more());
        let open = Pagination {
            total_pages: None,
            ..last
        };
        assert!(open.has_more());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn null_data_decodes_as_empty_page() {
        let page: PageResponse<u32> =
            serde_json::from_str(r#"{"data": null}"#).unwrap();
        assert!(page.is_empty());
        assert!(page.pagination.is_none());
    }
}
