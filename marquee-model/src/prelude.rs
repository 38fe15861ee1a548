//! View focused snapshot of the record surface.
//! Prefer importing from this module instead of individual tree nodes when
//! working in presentation layers.

pub use super::ids::{MovieId, PersonId};
pub use super::movie::{
    BoxOffice, CastCredit, CrewCredit, MovieDetail, MovieSummary, Ratings,
    Review,
};
pub use super::page::{PageIndex, PageResponse, Pagination};
pub use super::person::{PersonDetail, PersonSummary};
pub use super::user::{Credentials, Registration, Session, UserProfile};
