//! Client configuration: defaults, `.env`/environment, then an optional TOML
//! file whose present keys win.

use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::error::ConfigError;
use crate::feeds::Feed;
use crate::window::{DEFAULT_SPOTLIGHT_LIMIT, WindowConfig};

/// Environment variables read by [`ClientConfig::from_env`].
pub const ENV_BACKEND_URL: &str = "MARQUEE_BACKEND_URL";
/// Sent as `x-app-token`
pub const ENV_APP_TOKEN: &str = "MARQUEE_APP_TOKEN";
/// humantime duration, e.g. `45s`
pub const ENV_REQUEST_TIMEOUT: &str = "MARQUEE_REQUEST_TIMEOUT";
/// Items requested per page
pub const ENV_PAGE_SIZE: &str = "MARQUEE_PAGE_SIZE";
/// Items shown per window
pub const ENV_VIEW_SIZE: &str = "MARQUEE_VIEW_SIZE";
/// Pages fetched up front
pub const ENV_BOOTSTRAP_PAGES: &str = "MARQUEE_BOOTSTRAP_PAGES";
/// Spotlight size
pub const ENV_SPOTLIGHT_LIMIT: &str = "MARQUEE_SPOTLIGHT_LIMIT";

/// Local development server
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:3000";
/// Applied to every request
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings for the API client and the list views built on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Catalogue API base URL; a missing scheme means `http://`
    pub backend_url: String,
    /// Sent as `x-app-token` on every request
    pub app_token: Option<String>,
    /// Per-request timeout
    pub request_timeout: Duration,
    /// Items requested per page
    pub page_size: usize,
    /// Items shown per window
    pub view_size: usize,
    /// Pages fetched up front by a window cache
    pub bootstrap_pages: u32,
    /// Items cycled by the spotlight
    pub spotlight_limit: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            app_token: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            page_size: WindowConfig::DEFAULT_PAGE_SIZE,
            view_size: WindowConfig::DEFAULT_VIEW_SIZE,
            bootstrap_pages: WindowConfig::DEFAULT_BOOTSTRAP_PAGES.get(),
            spotlight_limit: DEFAULT_SPOTLIGHT_LIMIT,
        }
    }
}

/// Keys accepted in the TOML file. All optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    backend_url: Option<String>,
    app_token: Option<String>,
    /// humantime, e.g. `"45s"`
    request_timeout: Option<String>,
    page_size: Option<usize>,
    view_size: Option<usize>,
    bootstrap_pages: Option<u32>,
    spotlight_limit: Option<usize>,
}

fn parse_number<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|err: T::Err| ConfigError::InvalidValue {
            key,
            message: format!("'{raw}': {err}"),
        })
}

fn parse_timeout(key: &'static str, raw: &str) -> Result<Duration, ConfigError> {
    humantime::parse_duration(raw.trim()).map_err(|err| {
        ConfigError::InvalidValue {
            key,
            message: format!("'{raw}': {err}"),
        }
    })
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl ClientConfig {
    /// Defaults overridden by the process environment, after loading `.env`
    /// when one is present.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!("loaded environment from {}", path.display());
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_BACKEND_URL).and_then(non_blank) {
            config.backend_url = url;
        }
        if let Some(token) = lookup(ENV_APP_TOKEN) {
            config.app_token = non_blank(token);
        }
        if let Some(raw) = lookup(ENV_REQUEST_TIMEOUT) {
            config.request_timeout = parse_timeout(ENV_REQUEST_TIMEOUT, &raw)?;
        }
        if let Some(raw) = lookup(ENV_PAGE_SIZE) {
            config.page_size = parse_number(ENV_PAGE_SIZE, &raw)?;
        }
        if let Some(raw) = lookup(ENV_VIEW_SIZE) {
            config.view_size = parse_number(ENV_VIEW_SIZE, &raw)?;
        }
        if let Some(raw) = lookup(ENV_BOOTSTRAP_PAGES) {
            config.bootstrap_pages = parse_number(ENV_BOOTSTRAP_PAGES, &raw)?;
        }
        if let Some(raw) = lookup(ENV_SPOTLIGHT_LIMIT) {
            config.spotlight_limit = parse_number(ENV_SPOTLIGHT_LIMIT, &raw)?;
        }

        Ok(config)
    }

    /// Environment first, then `path` on top when given. The result is
    /// validated before it is returned.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = Self::from_env()?;
        if let Some(path) = path {
            config.apply_file(path)?;
        }
        config.window_config()?;
        Ok(config)
    }

    /// Overlay the keys present in the TOML file at `path`.
    pub fn apply_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        let contents =
            fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        let file: FileConfig =
            toml::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        debug!("applying config file {}", path.display());
        self.apply(file)
    }

    fn apply(&mut self, file: FileConfig) -> Result<(), ConfigError> {
        if let Some(url) = file.backend_url.and_then(non_blank) {
            self.backend_url = url;
        }
        if let Some(token) = file.app_token {
            self.app_token = non_blank(token);
        }
        if let Some(raw) = file.request_timeout {
            self.request_timeout = parse_timeout("request_timeout", &raw)?;
        }
        if let Some(page_size) = file.page_size {
            self.page_size = page_size;
        }
        if let Some(view_size) = file.view_size {
            self.view_size = view_size;
        }
        if let Some(pages) = file.bootstrap_pages {
            self.bootstrap_pages = pages;
        }
        if let Some(limit) = file.spotlight_limit {
            self.spotlight_limit = limit;
        }
        Ok(())
    }

    /// Validated window sizing.
    pub fn window_config(&self) -> Result<WindowConfig, ConfigError> {
        let config = WindowConfig::new(self.page_size, self.view_size)?
            .with_bootstrap_pages(self.bootstrap_pages)?;
        Ok(config)
    }

    /// [`window_config`](Self::window_config) checked against the page cap
    /// of `feed`.
    pub fn window_config_for(
        &self,
        feed: &Feed,
    ) -> Result<WindowConfig, ConfigError> {
        Ok(feed.check_window(self.window_config()?)?)
    }

    /// Spotlight size, never below one item.
    pub fn spotlight_limit(&self) -> usize {
        self.spotlight_limit.max(1)
    }
}
