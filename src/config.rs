//! Configuration management for ddns-sync.

use crate::detector::DEFAULT_IP_SERVICES;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// IP-echo services to query, in preference order.
    #[serde(default = "default_ip_services")]
    pub ip_services: Vec<String>,

    /// DNS provider to reconcile through.
    #[serde(default)]
    pub provider: ProviderConfig,
}

fn default_ip_services() -> Vec<String> {
    DEFAULT_IP_SERVICES.iter().map(|s| s.to_string()).collect()
}

/// Provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ProviderConfig {
    #[serde(rename = "cloudflare")]
    Cloudflare {
        /// API token (or environment variable name if prefixed with $).
        #[serde(default = "default_api_token")]
        api_token: String,
    },
}

fn default_api_token() -> String {
    "$CLOUDFLARE_API_TOKEN".to_string()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig::Cloudflare {
            api_token: default_api_token(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ip_services: default_ip_services(),
            provider: ProviderConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a specific path. A missing file yields the
    /// defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

impl ProviderConfig {
    /// Get the provider name.
    pub fn name(&self) -> &'static str {
        match self {
            ProviderConfig::Cloudflare { .. } => "cloudflare",
        }
    }
}
