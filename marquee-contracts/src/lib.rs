//! Trait surfaces that describe interactions with Marquee data records.

/// Identity of renderable records.
pub mod identified;
/// Paged data sources behind a window cache.
pub mod page_source;

/// Frequently used trait combinators for view and orchestration crates.
pub mod prelude {
    pub use super::identified::Identified;
    pub use super::page_source::{PageSource, SharedPageSource};
}
