//! Error types for ddns-sync.

use thiserror::Error;

/// Result type alias for ddns-sync.
pub type Result<T> = std::result::Result<T, DdnsError>;

/// DDNS error types.
#[derive(Error, Debug)]
pub enum DdnsError {
    /// Every configured IP-echo service failed.
    #[error("No IP-echo service available: all {attempted} endpoints failed")]
    NoProviderAvailable { attempted: usize },

    /// Hostname could not be resolved through the platform resolver.
    #[error("Failed to resolve {hostname}: {message}")]
    Resolution { hostname: String, message: String },

    /// The name-filtered zone listing returned no zones.
    #[error("Zone {zone} not found")]
    ZoneNotFound { zone: String },

    /// The name-filtered zone listing returned more than one zone.
    #[error("Zone lookup for {zone} returned {count} zones, expected exactly one")]
    AmbiguousZone { zone: String, count: usize },

    /// Transport or API-level failure from the DNS provider.
    #[error("Provider API error during {operation}: {message}")]
    ProviderApi { operation: String, message: String },

    /// Network/HTTP error.
    #[error("Network error: {0}")]
    Network(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DdnsError {
    /// Classify a provider failure, tagging it with the failing operation.
    pub fn provider_api(operation: impl Into<String>, message: impl Into<String>) -> Self {
        DdnsError::ProviderApi {
            operation: operation.into(),
            message: message.into(),
        }
    }

    pub fn resolution(hostname: impl Into<String>, message: impl Into<String>) -> Self {
        DdnsError::Resolution {
            hostname: hostname.into(),
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for DdnsError {
    fn from(e: reqwest::Error) -> Self {
        DdnsError::Network(e.to_string())
    }
}

impl From<toml::de::Error> for DdnsError {
    fn from(e: toml::de::Error) -> Self {
        DdnsError::Config(e.to_string())
    }
}
