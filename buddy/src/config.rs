use serde::Deserialize;
use std::env;

use crate::error::{BuddyError, Result};

/// Width of an A4 page in PDF points.
pub const A4_WIDTH_POINTS: f64 = 595.28;

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub viewer: ViewerConfig,
}

/// Connection settings for the paper backend.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub document_base_url: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub search_limit: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ViewerConfig {
    /// Width in pixels that pages are rendered at.
    pub display_width: f64,
    /// Native page width in document units.
    pub native_page_width: f64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            document_base_url: "https://arxiv.org/pdf".to_string(),
            timeout_secs: 30,
            max_retries: 2,
            search_limit: 5,
        }
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            display_width: 800.0,
            native_page_width: A4_WIDTH_POINTS,
        }
    }
}

impl ApiConfig {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Base URL without a trailing slash, checked to be an absolute http(s) URL.
    pub fn normalized_base_url(&self) -> Result<String> {
        normalize_url(&self.base_url)
    }

    pub fn normalized_document_base_url(&self) -> Result<String> {
        normalize_url(&self.document_base_url)
    }
}

fn normalize_url(raw: &str) -> Result<String> {
    let parsed = url::Url::parse(raw.trim())?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(BuddyError::Validation(format!(
            "Unsupported URL scheme '{}' in {}",
            parsed.scheme(),
            raw
        )));
    }
    Ok(parsed.as_str().trim_end_matches('/').to_string())
}

impl Default for Config {
    fn default() -> Self {
        let api = ApiConfig::default();
        let viewer = ViewerConfig::default();
        Self {
            api: ApiConfig {
                base_url: env::var("BUDDY_API_URL").unwrap_or(api.base_url),
                document_base_url: env::var("BUDDY_DOCUMENT_URL")
                    .unwrap_or(api.document_base_url),
                timeout_secs: parse_env_or("BUDDY_API_TIMEOUT", api.timeout_secs),
                max_retries: parse_env_or("BUDDY_API_MAX_RETRIES", api.max_retries),
                search_limit: parse_env_or("BUDDY_SEARCH_LIMIT", api.search_limit),
            },
            viewer: ViewerConfig {
                display_width: parse_env_or("BUDDY_DISPLAY_WIDTH", viewer.display_width),
                native_page_width: parse_env_or(
                    "BUDDY_NATIVE_PAGE_WIDTH",
                    viewer.native_page_width,
                ),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }
}
