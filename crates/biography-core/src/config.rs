//! Application configuration model.
//!
//! Every field has a default, so an empty or missing config file is valid.
//! Loading and environment overrides live in the infrastructure crate.

use crate::autosave::DEFAULT_AUTOSAVE_INTERVAL_MS;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub cache: CacheConfig,
    pub autosave: AutosaveConfig,
    pub display: DisplayConfig,
    pub pagination: PaginationConfig,
    pub auth: AuthConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8787".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://biography.db?mode=rwc".to_string(),
            max_connections: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub detail_ttl_secs: u64,
    pub featured_ttl_secs: u64,
    /// Featured list sizes that are cached. Invalidation clears exactly these.
    pub featured_limits: Vec<u32>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            detail_ttl_secs: 300,
            featured_ttl_secs: 180,
            featured_limits: vec![3, 6],
        }
    }
}

impl CacheConfig {
    pub fn detail_ttl(&self) -> Duration {
        Duration::from_secs(self.detail_ttl_secs)
    }

    pub fn featured_ttl(&self) -> Duration {
        Duration::from_secs(self.featured_ttl_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutosaveConfig {
    pub min_interval_ms: u64,
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            min_interval_ms: DEFAULT_AUTOSAVE_INTERVAL_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Shown instead of the owner's name on `anonymous` records.
    pub anonymous_name: String,
    /// Last step of the display-name fallback chain.
    pub fallback_name: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            anonymous_name: "匿名岩友".to_string(),
            fallback_name: "攀岩者".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    pub default_limit: u32,
    pub max_limit: u32,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_limit: 20,
            max_limit: 100,
        }
    }
}

impl PaginationConfig {
    /// Applies defaults and clamps a requested page/limit pair.
    pub fn resolve(&self, page: Option<u32>, limit: Option<u32>) -> (u32, u32) {
        let max = self.max_limit.max(1);
        let limit = limit.unwrap_or(self.default_limit).clamp(1, max);
        let page = page.unwrap_or(1).max(1);
        (page, limit)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Request header carrying the authenticated viewer id, set by the gateway.
    pub viewer_header: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            viewer_header: "x-user-id".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}
