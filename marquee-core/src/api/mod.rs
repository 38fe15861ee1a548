//! HTTP access to the movie catalogue API.

mod client;
/// Endpoint paths.
pub mod routes;

pub use client::{ApiClient, FavoritesPayload};
