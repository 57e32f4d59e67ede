//! Public IP discovery via IP-echo services.

use crate::error::{DdnsError, Result};
use std::net::IpAddr;
use std::time::Duration;

/// Default IP-echo endpoints, in preference order.
pub const DEFAULT_IP_SERVICES: [&str; 5] = [
    "https://ifconfig.me/ip",
    "https://icanhazip.com",
    "https://myip.dnsomatic.com",
    "https://myexternalip.com/raw",
    "https://api.ipify.org",
];

/// Public-IP detector with ordered fallback across echo services.
///
/// Each endpoint is expected to return the caller's IP as the full
/// response body in plain text. Endpoints are tried in order and the
/// first parseable answer wins.
pub struct IpDetector {
    client: reqwest::Client,
    services: Vec<String>,
}

impl IpDetector {
    /// Create a new detector with the default service list.
    pub fn new() -> Self {
        Self::with_services(
            DEFAULT_IP_SERVICES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        )
    }

    /// Create a new detector with a custom service list.
    pub fn with_services(services: Vec<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self { client, services }
    }

    /// Discover the current public IP address.
    ///
    /// Queries each service in order, skipping any that fails or returns
    /// something that is not an IP address. Errors with
    /// [`DdnsError::NoProviderAvailable`] once the list is exhausted.
    pub async fn discover(&self) -> Result<IpAddr> {
        for service in &self.services {
            match self.try_service(service).await {
                Ok(ip) => {
                    tracing::debug!(%ip, service = %service, "discovered public IP");
                    return Ok(ip);
                }
                Err(e) => {
                    tracing::warn!(service = %service, error = %e, "IP-echo service failed, trying next");
                }
            }
        }

        Err(DdnsError::NoProviderAvailable {
            attempted: self.services.len(),
        })
    }

    /// Query a single echo service.
    async fn try_service(&self, url: &str) -> Result<IpAddr> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(DdnsError::Network(format!(
                "HTTP {} from {}",
                response.status(),
                url
            )));
        }

        let text = response.text().await?;
        let ip_str = text.trim();

        ip_str
            .parse()
            .map_err(|_| DdnsError::Network(format!("Invalid IP response from {url}: {ip_str}")))
    }
}

impl Default for IpDetector {
    fn default() -> Self {
        Self::new()
    }
}
