//! Core library for Marquee.
//!
//! The centre of the crate is [`window::PageWindowCache`], the paged,
//! append-only cache every list surface (most popular, top rated, search,
//! favorites) renders through. Around it sit the HTTP [`api::ApiClient`],
//! the [`feeds`] that bind the cache to concrete endpoints, and
//! [`config::ClientConfig`].

/// HTTP client and route table of the catalogue API.
pub mod api;
/// Client configuration.
pub mod config;
/// Error types.
pub mod error;
/// Catalogue lists as page sources.
pub mod feeds;
/// Paged window cache and spotlight.
pub mod window;

pub use api::ApiClient;
pub use config::ClientConfig;
pub use error::{ApiError, ConfigError, Result, WindowError};
pub use feeds::{Feed, FeedSource, HydratedFavorite, hydrate_favorites};
pub use window::{PageWindowCache, Spotlight, WindowConfig};

pub use marquee_contracts as contracts;
pub use marquee_model as model;
