use crate::error::ModelError;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        pub struct $name(String);

        // Wire ids go through the same checks as `from_string`.
        #[cfg(feature = "serde")]
        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let raw = crate::de::string(deserializer)?;
                Self::from_string(raw).map_err(serde::de::Error::custom)
            }
        }

        impl $name {
            pub fn from_string(id: impl Into<String>) -> Result<Self, ModelError> {
                let id = id.into();
                let trimmed = id.trim();
                if trimmed.is_empty() {
                    return Err(ModelError::InvalidId(
                        concat!($label, " ID cannot be empty").to_string(),
                    ));
                }
                if trimmed.contains('/') {
                    return Err(ModelError::InvalidId(format!(
                        concat!($label, " ID '{}' contains a path separator"),
                        trimmed
                    )));
                }
                Ok(Self(trimmed.to_string()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl std::str::FromStr for $name {
            type Err = ModelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_string(s)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

string_id!(
    /// Catalogue identifier for a movie (for example an IMDb style `tt0111161`)
    MovieId,
    "Movie"
);

string_id!(
    /// Catalogue identifier for a person (actor, director, writer)
    PersonId,
    "Person"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_blank_and_path_like_ids() {
        assert!(MovieId::from_string("  ").is_err());
        assert!(PersonId::from_string("nm1/../x").is_err());
        assert_eq!(
            MovieId::from_string(" tt0111161 ").unwrap().as_str(),
            "tt0111161"
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn numeric_ids_decode_as_text() {
        let id: MovieId = serde_json::from_str("42").unwrap();
        assert_eq!(id.as_str(), "42");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn wire_ids_are_validated() {
        assert!(serde_json::from_str::<MovieId>(r#""""#).is_err());
        assert!(serde_json::from_str::<MovieId>(r#""   ""#).is_err());
        assert!(serde_json::from_str::<PersonId>(r#""nm1/../x""#).is_err());
        let id: MovieId = serde_json::from_str(r#"" tt0133093 ""#).unwrap();
        assert_eq!(id.as_str(), "tt0133093");
    }
}
