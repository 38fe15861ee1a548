//! Data records shared across Marquee crates.
#![allow(missing_docs)]

#[cfg(feature = "serde")]
mod de;
pub mod error;
pub mod ids;
pub mod movie;
pub mod page;
pub mod person;
pub mod prelude;
pub mod user;

// Intentionally curated re-exports for downstream consumers.
pub use error::{ModelError, Result as ModelResult};
pub use ids::{MovieId, PersonId};
pub use movie::{
    BoxOffice, CastCredit, CrewCredit, MovieDetail, MovieSummary, Ratings,
    Review,
};
pub use page::{PageIndex, PageResponse, Pagination};
pub use person::{PersonDetail, PersonSummary};
pub use user::{Credentials, Registration, Session, UserProfile};
