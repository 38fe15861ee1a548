//! Item identity as seen by list views and caches.

use marquee_model::{MovieDetail, MovieId, MovieSummary, PersonId};
use marquee_model::{PersonDetail, PersonSummary};

/// Records that carry a stable catalogue identifier.
///
/// Caches treat items as opaque apart from this identity; views use it as a
/// render key and as the navigation target.
pub trait Identified {
    /// Identifier type
    type Id: Clone + Eq + std::hash::Hash + std::fmt::Display;

    /// The record's identifier.
    fn item_id(&self) -> &Self::Id;
}

impl Identified for MovieSummary {
    type Id = MovieId;

    fn item_id(&self) -> &MovieId {
        &self.id
    }
}

impl Identified for MovieDetail {
    type Id = MovieId;

    fn item_id(&self) -> &MovieId {
        &self.id
    }
}

impl Identified for PersonSummary {
    type Id = PersonId;

    fn item_id(&self) -> &PersonId {
        &self.id
    }
}

impl Identified for PersonDetail {
    type Id = PersonId;

    fn item_id(&self) -> &PersonId {
        &self.id
    }
}
