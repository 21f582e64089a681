//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::ListingSelectors;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Shared HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Structured search API settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Browser-driven listing settings
    #[serde(default)]
    pub browser: BrowserConfig,

    /// Delay policy between per-document fetches
    #[serde(default)]
    pub pacing: PacingConfig,

    /// Listing extraction selectors
    #[serde(default)]
    pub selectors: ListingSelectors,

    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.http.user_agent.trim().is_empty() {
            return Err(AppError::validation("http.user_agent is empty"));
        }
        if self.http.timeout_secs == 0 {
            return Err(AppError::validation("http.timeout_secs must be > 0"));
        }
        if self.api.search_url.trim().is_empty() {
            return Err(AppError::validation("api.search_url is empty"));
        }
        if self.api.page_size == 0 {
            return Err(AppError::validation("api.page_size must be > 0"));
        }
        if self.api.max_pages == 0 {
            return Err(AppError::validation("api.max_pages must be > 0"));
        }
        if self.browser.search_url.trim().is_empty() {
            return Err(AppError::validation("browser.search_url is empty"));
        }
        if self.browser.max_pages == 0 {
            return Err(AppError::validation("browser.max_pages must be > 0"));
        }
        if self.browser.nav_timeout_secs == 0 {
            return Err(AppError::validation("browser.nav_timeout_secs must be > 0"));
        }
        if self.browser.selector_timeout_secs == 0 {
            return Err(AppError::validation(
                "browser.selector_timeout_secs must be > 0",
            ));
        }
        if self.browser.scroll_step_px == 0 {
            return Err(AppError::validation("browser.scroll_step_px must be > 0"));
        }
        Ok(())
    }
}

/// Shared HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Structured search API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Search endpoint receiving the paged POST requests
    #[serde(default = "defaults::api_search_url")]
    pub search_url: String,

    /// Records requested per page
    #[serde(default = "defaults::page_size")]
    pub page_size: usize,

    /// Hard ceiling on pages fetched per request, regardless of cursors
    #[serde(default = "defaults::api_max_pages")]
    pub max_pages: usize,

    /// Optional static bearer token sent with every API call
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bearer_token: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            search_url: defaults::api_search_url(),
            page_size: defaults::page_size(),
            max_pages: defaults::api_max_pages(),
            bearer_token: None,
        }
    }
}

/// Browser-driven listing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Search page URL; date range, location and page number are appended
    #[serde(default = "defaults::browser_search_url")]
    pub search_url: String,

    /// Bounded wait for page navigation, in seconds
    #[serde(default = "defaults::nav_timeout")]
    pub nav_timeout_secs: u64,

    /// Bounded wait for the results-list selector, in seconds
    #[serde(default = "defaults::selector_timeout")]
    pub selector_timeout_secs: u64,

    /// Auto-scroll step in pixels
    #[serde(default = "defaults::scroll_step")]
    pub scroll_step_px: u32,

    /// Auto-scroll interval in milliseconds
    #[serde(default = "defaults::scroll_interval")]
    pub scroll_interval_ms: u64,

    /// Hard ceiling on listing pages visited per request
    #[serde(default = "defaults::browser_max_pages")]
    pub max_pages: usize,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            search_url: defaults::browser_search_url(),
            nav_timeout_secs: defaults::nav_timeout(),
            selector_timeout_secs: defaults::selector_timeout(),
            scroll_step_px: defaults::scroll_step(),
            scroll_interval_ms: defaults::scroll_interval(),
            max_pages: defaults::browser_max_pages(),
        }
    }
}

/// Delay policy between per-document fetches on the API path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacingConfig {
    /// Delay after a record passed the CPV check and was kept
    #[serde(default = "defaults::kept_delay")]
    pub kept_delay_ms: u64,

    /// Delay after a record was skipped
    #[serde(default = "defaults::skipped_delay")]
    pub skipped_delay_ms: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            kept_delay_ms: defaults::kept_delay(),
            skipped_delay_ms: defaults::skipped_delay(),
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address for the ingestion endpoints
    #[serde(default = "defaults::bind_addr")]
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: defaults::bind_addr(),
        }
    }
}

mod defaults {
    // HTTP defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; anbud/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }

    // API defaults
    pub fn api_search_url() -> String {
        "https://api.doffin.no/public/v2/search".into()
    }
    pub fn page_size() -> usize {
        250
    }
    pub fn api_max_pages() -> usize {
        20
    }

    // Browser defaults
    pub fn browser_search_url() -> String {
        "https://www.doffin.no/search".into()
    }
    pub fn nav_timeout() -> u64 {
        30
    }
    pub fn selector_timeout() -> u64 {
        8
    }
    pub fn scroll_step() -> u32 {
        400
    }
    pub fn scroll_interval() -> u64 {
        200
    }
    pub fn browser_max_pages() -> usize {
        50
    }

    // Pacing defaults
    pub fn kept_delay() -> u64 {
        2000
    }
    pub fn skipped_delay() -> u64 {
        300
    }

    // Server defaults
    pub fn bind_addr() -> String {
        "0.0.0.0:3000".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_user_agent() {
        let mut config = Config::default();
        config.http.user_agent = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_page_ceiling() {
        let mut config = Config::default();
        config.api.max_pages = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_scroll_step() {
        let mut config = Config::default();
        config.browser.scroll_step_px = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_partial_file_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[api]\nmax_pages = 5\n\n[pacing]\nkept_delay_ms = 10\n"
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.api.max_pages, 5);
        assert_eq!(config.api.page_size, 250);
        assert_eq!(config.pacing.kept_delay_ms, 10);
        assert_eq!(config.pacing.skipped_delay_ms, 300);
    }

    #[test]
    fn test_load_or_default_on_missing_file() {
        let config = Config::load_or_default("/nonexistent/config.toml");
        assert_eq!(config.api.page_size, 250);
    }
}
