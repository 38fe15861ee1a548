macro_rules! api_path {
    ($path:literal) => {
        concat!("/api", $path)
    };
}

/// Route definitions of the catalogue API
pub mod movies {
    /// Most-popular ranking, paged.
    pub const MOST_POPULAR: &str = api_path!("/movies/most-popular");
    /// Top-rated ranking, paged.
    pub const TOP_RATED: &str = api_path!("/movies/top-rated");
    /// Title search; takes `q` alongside `page` and `limit`.
    pub const SEARCH: &str = api_path!("/movies/search");
    /// Full record of one movie.
    pub const ITEM: &str = api_path!("/movies/{id}");

    /// The ranking endpoints refuse pages larger than this.
    pub const RANKED_LIMIT_CAP: usize = 12;
}

/// Person endpoints.
pub mod persons {
    /// Full record of one person.
    pub const ITEM: &str = api_path!("/persons/{id}");
}

/// Sign-in and registration.
pub mod auth {
    /// Exchanges credentials for a bearer token.
    pub const LOGIN: &str = api_path!("/auth/login");
    /// Creates an account.
    pub const REGISTER: &str = api_path!("/auth/register");
}

/// Endpoints scoped to the signed-in user.
pub mod users {
    /// Profile of the signed-in user.
    pub const PROFILE: &str = api_path!("/users/profile");
    /// Favorites list; a bare array or a paged envelope.
    pub const FAVORITES: &str = api_path!("/users/favorites");
    /// Add (`POST`) or remove (`DELETE`) one favorite.
    pub const FAVORITE_ITEM: &str = api_path!("/users/favorites/{id}");
}

/// Custom request headers.
pub mod headers {
    /// Application token header sent on every request.
    pub const APP_TOKEN: &str = "x-app-token";
}

/// Path helpers.
pub mod utils {
    /// Replace a single `{param}` placeholder.
    pub fn replace_param(
        route: &str,
        param: &str,
        value: impl AsRef<str>,
    ) -> String {
        route.replace(param, value.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_routes_expand() {
        assert_eq!(
            utils::replace_param(movies::ITEM, "{id}", "tt0111161"),
            "/api/movies/tt0111161"
        );
        assert_eq!(
            utils::replace_param(users::FAVORITE_ITEM, "{id}", "tt1"),
            "/api/users/favorites/tt1"
        );
        assert_eq!(auth::LOGIN, "/api/auth/login");
    }
}
