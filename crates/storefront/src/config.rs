//! Storefront configuration.
//!
//! Consumers construct the config programmatically (everything implements
//! `Default`) or load it from environment variables via
//! [`StorefrontConfig::from_env`].
//!
//! # Environment Variables
//!
//! ## Optional
//! - `STOREFRONT_CDN_HOST` - Image CDN delivery host (default: res.cloudinary.com)
//! - `STOREFRONT_CDN_EXCLUDED_ASSETS` - Comma-separated asset identifiers
//!   exempted from URL transformation (assets known to render incorrectly
//!   when cropped)
//! - `STOREFRONT_PRELOAD_CONCURRENCY` - Max simultaneous image prefetches
//!   (default: 3, minimum: 1)

use std::collections::HashSet;

use mjengo_core::AssetId;
use thiserror::Error;

/// Default image CDN delivery host.
pub const DEFAULT_CDN_HOST: &str = "res.cloudinary.com";

/// Default bound on simultaneous image prefetches.
pub const DEFAULT_PRELOAD_CONCURRENCY: usize = 3;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone, Default)]
pub struct StorefrontConfig {
    /// Image CDN configuration
    pub cdn: CdnConfig,
    /// Image preload pipeline configuration
    pub preload: PreloadConfig,
}

/// Image CDN configuration.
#[derive(Debug, Clone)]
pub struct CdnConfig {
    /// Delivery host whose URLs are rewritten; all other hosts pass through
    pub host: String,
    /// Asset identifiers never rewritten, whatever transformation is asked for
    pub excluded_assets: HashSet<AssetId>,
}

/// Image preload pipeline configuration.
#[derive(Debug, Clone)]
pub struct PreloadConfig {
    /// Max simultaneous in-flight image loads
    pub concurrency: usize,
}

impl Default for CdnConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_CDN_HOST.to_string(),
            excluded_assets: HashSet::new(),
        }
    }
}

impl Default for PreloadConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_PRELOAD_CONCURRENCY,
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present. Every
    /// variable is optional; missing ones fall back to defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a present variable fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("STOREFRONT_CDN_HOST", DEFAULT_CDN_HOST);
        let excluded_assets = get_optional_env("STOREFRONT_CDN_EXCLUDED_ASSETS")
            .map(|raw| parse_asset_list(&raw))
            .unwrap_or_default();
        let concurrency = get_env_or_default(
            "STOREFRONT_PRELOAD_CONCURRENCY",
            &DEFAULT_PRELOAD_CONCURRENCY.to_string(),
        )
        .parse::<usize>()
        .map_err(|e| {
            ConfigError::InvalidEnvVar("STOREFRONT_PRELOAD_CONCURRENCY".to_string(), e.to_string())
        })?;

        Ok(Self {
            cdn: CdnConfig {
                host,
                excluded_assets,
            },
            preload: PreloadConfig {
                concurrency: concurrency.max(1),
            },
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse a comma-separated asset identifier list.
fn parse_asset_list(raw: &str) -> HashSet<AssetId> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(AssetId::from)
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StorefrontConfig::default();
        assert_eq!(config.cdn.host, DEFAULT_CDN_HOST);
        assert!(config.cdn.excluded_assets.is_empty());
        assert_eq!(config.preload.concurrency, DEFAULT_PRELOAD_CONCURRENCY);
    }

    #[test]
    fn test_parse_asset_list() {
        let assets = parse_asset_list("sssss_wyzyk0, culvert900_t40svv ,,");
        assert_eq!(assets.len(), 2);
        assert!(assets.contains(&AssetId::new("sssss_wyzyk0")));
        assert!(assets.contains(&AssetId::new("culvert900_t40svv")));
    }

    #[test]
    fn test_parse_asset_list_empty() {
        assert!(parse_asset_list("").is_empty());
        assert!(parse_asset_list(" , ").is_empty());
    }
}
