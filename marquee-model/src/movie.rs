use crate::ids::{MovieId, PersonId};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Movie card as returned by list endpoints (most popular, top rated, search,
/// favorites, similar movies, known-for credits).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MovieSummary {
    pub id: MovieId,
    #[cfg_attr(feature = "serde", serde(default))]
    pub title: String,
    #[cfg_attr(
        feature = "serde",
        serde(default, deserialize_with = "crate::de::opt_string")
    )]
    pub year: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub image: Option<String>,
    #[cfg_attr(
        feature = "serde",
        serde(default, deserialize_with = "crate::de::opt_string")
    )]
    pub rate: Option<String>,
    #[cfg_attr(
        feature = "serde",
        serde(default, deserialize_with = "crate::de::vec_or_null")
    )]
    pub genres: Vec<String>,
    /// Credit role when the card appears in a person's known-for list
    #[cfg_attr(feature = "serde", serde(default))]
    pub role: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub character: Option<String>,
}

impl MovieSummary {
    pub fn new(id: MovieId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            year: None,
            image: None,
            rate: None,
            genres: Vec::new(),
            role: None,
            character: None,
        }
    }

    /// `Title (Year)` when the year is known.
    pub fn display_title(&self) -> String {
        match &self.year {
            Some(year) => format!("{} ({})", self.title, year),
            None => self.title.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CrewCredit {
    pub id: PersonId,
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CastCredit {
    pub id: PersonId,
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub image: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub character: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Review {
    #[cfg_attr(feature = "serde", serde(default))]
    pub user: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub title: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub content: Option<String>,
    #[cfg_attr(
        feature = "serde",
        serde(default, deserialize_with = "crate::de::opt_string")
    )]
    pub rate: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub date: Option<String>,
}

/// Third-party rating sources. Keys follow the upstream payload casing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Ratings {
    #[cfg_attr(
        feature = "serde",
        serde(rename = "imDb", default, deserialize_with = "crate::de::opt_string")
    )]
    pub imdb: Option<String>,
    #[cfg_attr(
        feature = "serde",
        serde(default, deserialize_with = "crate::de::opt_string")
    )]
    pub metacritic: Option<String>,
    #[cfg_attr(
        feature = "serde",
        serde(
            rename = "theMovieDb",
            default,
            deserialize_with = "crate::de::opt_string"
        )
    )]
    pub the_movie_db: Option<String>,
    #[cfg_attr(
        feature = "serde",
        serde(
            rename = "filmAffinity",
            default,
            deserialize_with = "crate::de::opt_string"
        )
    )]
    pub film_affinity: Option<String>,
    #[cfg_attr(
        feature = "serde",
        serde(
            rename = "rottenTomatoes",
            default,
            deserialize_with = "crate::de::opt_string"
        )
    )]
    pub rotten_tomatoes: Option<String>,
}

impl Ratings {
    /// Labelled, non-empty ratings in display order.
    pub fn entries(&self) -> Vec<(&'static str, &str)> {
        labelled([
            ("IMDb", &self.imdb),
            ("Metacritic", &self.metacritic),
            ("TheMovieDB", &self.the_movie_db),
            ("FilmAffinity", &self.film_affinity),
            ("Rotten Tomatoes", &self.rotten_tomatoes),
        ])
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoxOffice {
    #[cfg_attr(feature = "serde", serde(default))]
    pub budget: Option<String>,
    #[cfg_attr(feature = "serde", serde(rename = "grossUSA", default))]
    pub gross_usa: Option<String>,
    #[cfg_attr(feature = "serde", serde(rename = "openingWeekendUSA", default))]
    pub opening_weekend_usa: Option<String>,
    #[cfg_attr(
        feature = "serde",
        serde(rename = "cumulativeWorldwideGross", default)
    )]
    pub worldwide: Option<String>,
}

impl BoxOffice {
    pub fn entries(&self) -> Vec<(&'static str, &str)> {
        labelled([
            ("Budget", &self.budget),
            ("Gross USA", &self.gross_usa),
            ("Opening Weekend USA", &self.opening_weekend_usa),
            ("Worldwide", &self.worldwide),
        ])
    }
}

fn labelled<'a, const N: usize>(
    entries: [(&'static str, &'a Option<String>); N],
) -> Vec<(&'static str, &'a str)> {
    entries
        .into_iter()
        .filter_map(|(label, value)| {
            value
                .as_deref()
                .filter(|v| !v.trim().is_empty())
                .map(|v| (label, v))
        })
        .collect()
}

/// Full movie record from `GET /api/movies/{id}`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MovieDetail {
    pub id: MovieId,
    #[cfg_attr(feature = "serde", serde(default))]
    pub title: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub full_title: Option<String>,
    #[cfg_attr(
        feature = "serde",
        serde(default, deserialize_with = "crate::de::opt_string")
    )]
    pub year: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub image: Option<String>,
    #[cfg_attr(
        feature = "serde",
        serde(default, deserialize_with = "crate::de::opt_string")
    )]
    pub runtime: Option<String>,
    /// May contain inline HTML markup
    #[cfg_attr(feature = "serde", serde(default))]
    pub plot_full: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub awards: Option<String>,
    #[cfg_attr(
        feature = "serde",
        serde(default, deserialize_with = "crate::de::vec_or_null")
    )]
    pub genres: Vec<String>,
    #[cfg_attr(
        feature = "serde",
        serde(default, deserialize_with = "crate::de::vec_or_null")
    )]
    pub countries: Vec<String>,
    #[cfg_attr(
        feature = "serde",
        serde(default, deserialize_with = "crate::de::vec_or_null")
    )]
    pub languages: Vec<String>,
    #[cfg_attr(
        feature = "serde",
        serde(default, deserialize_with = "crate::de::vec_or_null")
    )]
    pub directors: Vec<CrewCredit>,
    #[cfg_attr(
        feature = "serde",
        serde(default, deserialize_with = "crate::de::vec_or_null")
    )]
    pub actors: Vec<CastCredit>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub ratings: Option<Ratings>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub box_office: Option<BoxOffice>,
    #[cfg_attr(
        feature = "serde",
        serde(default, deserialize_with = "crate::de::vec_or_null")
    )]
    pub reviews: Vec<Review>,
    #[cfg_attr(
        feature = "serde",
        serde(default, deserialize_with = "crate::de::vec_or_null")
    )]
    pub similar_movies: Vec<MovieSummary>,
}

impl MovieDetail {
    /// Collapse the detail record back into a card.
    pub fn summary(&self) -> MovieSummary {
        MovieSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            year: self.year.clone(),
            image: self.image.clone(),
            rate: self.ratings.as_ref().and_then(|r| r.imdb.clone()),
            genres: self.genres.clone(),
            role: None,
            character: None,
        }
    }
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::*;

    #[test]
    fn decodes_sparse_detail_payload() {
        let json = r#"{
            "id": "tt0111161",
            "title": "The Shawshank Redemption",
            "year": 1994,
            "genres": null,
            "ratings": {"imDb": "9.3", "metacritic": "", "rottenTomatoes": 91},
            "box_office": {"budget": "$25,000,000", "grossUSA": null}
        }"#;
        let movie: MovieDetail = serde_json::from_str(json).unwrap();
        assert_eq!(movie.year.as_deref(), Some("1994"));
        assert!(movie.genres.is_empty());

        let ratings = movie.ratings.unwrap();
        assert_eq!(
            ratings.entries(),
            vec![("IMDb", "9.3"), ("Rotten Tomatoes", "91")]
        );
        assert_eq!(
            movie.box_office.unwrap().entries(),
            vec![("Budget", "$25,000,000")]
        );
    }
}
