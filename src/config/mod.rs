//! Application configuration management

use std::env;
use std::path::PathBuf;

use thiserror::Error;
use url::Url;

/// Default environment inside a space
pub const DEFAULT_ENVIRONMENT: &str = "master";

/// Default locale used to resolve localized asset fields
pub const DEFAULT_LOCALE: &str = "en-US";

/// Default Content Management API base URL
pub const DEFAULT_API_URL: &str = "https://api.contentful.com";

/// Assets requested per page
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Upper bound the Management API accepts for `limit`
pub const MAX_PAGE_SIZE: usize = 1000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is required (set it in the environment or a .env file)")]
    Missing(&'static str),

    #[error("invalid value for {var}: {value:?} ({reason})")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Scanner configuration loaded from environment variables
#[derive(Clone)]
pub struct Config {
    /// Contentful space identifier
    pub space_id: String,

    /// Environment inside the space
    pub environment_id: String,

    /// Management API access token
    pub access_token: String,

    /// Locale used for `fields.title` / `fields.file` lookups
    pub locale: String,

    /// Management API base URL (overridable for proxies and tests)
    pub api_url: Url,

    /// Assets requested per page
    pub page_size: usize,

    /// Keep paginating until an empty page instead of stopping on a short one
    pub strict_pagination: bool,

    /// Directory the JSON report is written to
    pub output_dir: PathBuf,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("space_id", &self.space_id)
            .field("environment_id", &self.environment_id)
            .field("access_token", &"***")
            .field("locale", &self.locale)
            .field("api_url", &self.api_url.as_str())
            .field("page_size", &self.page_size)
            .field("strict_pagination", &self.strict_pagination)
            .field("output_dir", &self.output_dir)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let space_id =
            get("CONTENTFUL_SPACE_ID").ok_or(ConfigError::Missing("CONTENTFUL_SPACE_ID"))?;
        let access_token = get("CONTENTFUL_MANAGEMENT_TOKEN")
            .ok_or(ConfigError::Missing("CONTENTFUL_MANAGEMENT_TOKEN"))?;

        let api_url_raw = get("CONTENTFUL_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let api_url = Url::parse(&api_url_raw).map_err(|e| ConfigError::Invalid {
            var: "CONTENTFUL_API_URL",
            value: api_url_raw.clone(),
            reason: e.to_string(),
        })?;

        let page_size = match get("SCAN_PAGE_SIZE") {
            Some(raw) => parse_page_size("SCAN_PAGE_SIZE", &raw)?,
            None => DEFAULT_PAGE_SIZE,
        };

        Ok(Self {
            space_id,
            environment_id: get("CONTENTFUL_ENVIRONMENT")
                .unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string()),
            access_token,
            locale: get("CONTENTFUL_LOCALE").unwrap_or_else(|| DEFAULT_LOCALE.to_string()),
            api_url,
            page_size,
            strict_pagination: get("SCAN_STRICT_PAGINATION")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
            output_dir: get("REPORT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
        })
    }
}

/// Parse and bound-check a page size value
pub fn parse_page_size(var: &'static str, raw: &str) -> Result<usize, ConfigError> {
    let invalid = |reason: String| ConfigError::Invalid {
        var,
        value: raw.to_string(),
        reason,
    };

    let size: usize = raw.parse().map_err(|e: std::num::ParseIntError| invalid(e.to_string()))?;
    if size == 0 || size > MAX_PAGE_SIZE {
        return Err(invalid(format!("must be between 1 and {}", MAX_PAGE_SIZE)));
    }
    Ok(size)
}
