use std::num::NonZeroU32;

use crate::error::WindowError;

/// Sizing for one [`PageWindowCache`](super::PageWindowCache).
///
/// `page_size` is what the cache asks the server for per page; `view_size`
/// is how many items a window exposes and may not exceed the page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowConfig {
    page_size: usize,
    view_size: usize,
    bootstrap_pages: NonZeroU32,
}

impl WindowConfig {
    /// Server-enforced page cap of the catalogue API
    pub const DEFAULT_PAGE_SIZE: usize = 12;
    /// Items shown per window
    pub const DEFAULT_VIEW_SIZE: usize = 3;
    /// Pages fetched up front
    pub const DEFAULT_BOOTSTRAP_PAGES: NonZeroU32 = NonZeroU32::MIN.saturating_add(1);

    /// Sizing with the default bootstrap depth.
    pub fn new(page_size: usize, view_size: usize) -> Result<Self, WindowError> {
        if page_size == 0 {
            return Err(WindowError::InvalidConfig(
                "page size must be at least 1".to_string(),
            ));
        }
        if view_size == 0 {
            return Err(WindowError::InvalidConfig(
                "view size must be at least 1".to_string(),
            ));
        }
        if view_size > page_size {
            return Err(WindowError::InvalidConfig(format!(
                "view size {view_size} exceeds page size {page_size}"
            )));
        }
        Ok(Self {
            page_size,
            view_size,
            bootstrap_pages: Self::DEFAULT_BOOTSTRAP_PAGES,
        })
    }

    /// Number of leading pages fetched concurrently by `bootstrap()`.
    pub fn with_bootstrap_pages(
        mut self,
        pages: u32,
    ) -> Result<Self, WindowError> {
        self.bootstrap_pages = NonZeroU32::new(pages).ok_or_else(|| {
            WindowError::InvalidConfig(
                "bootstrap must fetch at least one page".to_string(),
            )
        })?;
        Ok(self)
    }

    /// Items requested per page.
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Items exposed per window.
    pub fn view_size(&self) -> usize {
        self.view_size
    }

    /// Pages fetched by `bootstrap()`.
    pub fn bootstrap_pages(&self) -> NonZeroU32 {
        self.bootstrap_pages
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            page_size: Self::DEFAULT_PAGE_SIZE,
            view_size: Self::DEFAULT_VIEW_SIZE,
            bootstrap_pages: Self::DEFAULT_BOOTSTRAP_PAGES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_degenerate_sizes() {
        assert!(WindowConfig::new(0, 0).is_err());
        assert!(WindowConfig::new(12, 0).is_err());
        assert!(WindowConfig::new(2, 3).is_err());
        assert!(
            WindowConfig::default().with_bootstrap_pages(0).is_err()
        );
    }

    #[test]
    fn view_may_equal_page() {
        let config = WindowConfig::new(4, 4).unwrap();
        assert_eq!(config.view_size(), 4);
        assert_eq!(config.bootstrap_pages().get(), 2);
    }
}
