use crate::ids::PersonId;
use crate::movie::MovieSummary;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PersonSummary {
    pub id: PersonId,
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub image: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub role: Option<String>,
}

/// Full person record from `GET /api/persons/{id}`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PersonDetail {
    pub id: PersonId,
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub image: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub role: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub summary: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub birth_date: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub death_date: Option<String>,
    #[cfg_attr(
        feature = "serde",
        serde(default, deserialize_with = "crate::de::opt_string")
    )]
    pub height: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub awards: Option<String>,
    #[cfg_attr(
        feature = "serde",
        serde(default, deserialize_with = "crate::de::vec_or_null")
    )]
    pub known_for: Vec<MovieSummary>,
}

impl PersonDetail {
    pub fn summary(&self) -> PersonSummary {
        PersonSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            image: self.image.clone(),
            role: self.role.clone(),
        }
    }
}

#[cfg(feature = "chrono")]
impl PersonDetail {
    pub fn birth_date_display(&self) -> Option<String> {
        self.birth_date.as_deref().map(format_date)
    }

    pub fn death_date_display(&self) -> Option<String> {
        self.death_date.as_deref().map(format_date)
    }
}

/// Render `YYYY-MM-DD` (optionally followed by a time part) as
/// `Month D, YYYY`. Anything else is returned verbatim.
#[cfg(feature = "chrono")]
pub fn format_date(raw: &str) -> String {
    let date_part = raw.get(..10).unwrap_or(raw);
    match chrono::NaiveDate::parse_from_str(date_part, "%Y-%m-%d") {
        Ok(date) => date.format("%B %-d, %Y").to_string(),
        Err(_) => raw.to_string(),
    }
}

#[cfg(all(test, feature = "chrono"))]
mod tests {
    use super::format_date;

    #[test]
    fn formats_iso_dates_and_keeps_free_text() {
        assert_eq!(format_date("1958-10-16"), "October 16, 1958");
        assert_eq!(format_date("1958-10-16T00:00:00Z"), "October 16, 1958");
        assert_eq!(format_date("circa 1900"), "circa 1900");
    }
}
