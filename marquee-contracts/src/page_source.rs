use std::sync::Arc;

use async_trait::async_trait;
use marquee_model::{PageIndex, PageResponse};

/// Injected page-fetch capability backing a paged view.
///
/// Implementations must fail on transport or server errors so callers can
/// tell "page unavailable" apart from "page empty". Repeated calls with the
/// same arguments are expected to return equivalent data. `page_size` is an
/// upper bound; only the true last page may come back short.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Record type of each page
    type Item: Send;

    /// Fetch `page` with at most `page_size` items.
    async fn fetch_page(
        &self,
        page: PageIndex,
        page_size: usize,
    ) -> anyhow::Result<PageResponse<Self::Item>>;

    /// Short label for logs.
    fn describe(&self) -> String {
        std::any::type_name::<Self>().to_string()
    }
}

/// Reference-counted source, shareable between a cache and its owner.
pub type SharedPageSource<T> = Arc<dyn PageSource<Item = T>>;

#[async_trait]
impl<S> PageSource for Arc<S>
where
    S: PageSource + ?Sized,
{
    type Item = S::Item;

    async fn fetch_page(
        &self,
        page: PageIndex,
        page_size: usize,
    ) -> anyhow::Result<PageResponse<Self::Item>> {
        (**self).fetch_page(page, page_size).await
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Numbers;

    #[async_trait]
    impl PageSource for Numbers {
        type Item = u32;

        async fn fetch_page(
            &self,
            page: PageIndex,
            page_size: usize,
        ) -> anyhow::Result<PageResponse<u32>> {
            let start = (page.get() - 1) * page_size as u32;
            Ok(PageResponse::new((start..start + page_size as u32).collect()))
        }
    }

    #[tokio::test]
    async fn arc_forwards_to_inner_source() {
        let shared: SharedPageSource<u32> = Arc::new(Numbers);
        let page = shared
            .fetch_page(PageIndex::new(2).unwrap(), 3)
            .await
            .unwrap();
        assert_eq!(page.data, vec![3, 4, 5]);
    }
}
