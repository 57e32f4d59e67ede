//! Cloudflare DNS provider client.

use super::{DnsProvider, DnsRecord, NewRecord, RecordKind, RecordUpdate, Zone};
use crate::error::{DdnsError, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.cloudflare.com";

/// Cloudflare v4 API client behind the [`DnsProvider`] contract.
pub struct CloudflareProvider {
    client: reqwest::Client,
    api_token: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct CloudflareResponse<T> {
    success: bool,
    result: Option<T>,
    #[serde(default)]
    errors: Vec<CloudflareError>,
}

#[derive(Debug, Deserialize)]
struct CloudflareError {
    message: String,
}

impl CloudflareProvider {
    /// Create a new Cloudflare client.
    pub fn new(api_token: String) -> Self {
        Self::with_base_url(api_token, DEFAULT_BASE_URL.to_string())
    }

    /// Create with custom base URL (for testing).
    pub fn with_base_url(api_token: String, base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            api_token,
            base_url,
        }
    }

    /// Send a request and unwrap the `{success, result, errors}` envelope.
    ///
    /// Every failure, transport-level or API-level, is classified as a
    /// provider API error tagged with `operation`.
    async fn send<T: DeserializeOwned>(
        &self,
        operation: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<T> {
        let response = request
            .header("Authorization", format!("Bearer {}", self.api_token))
            .send()
            .await
            .map_err(|e| DdnsError::provider_api(operation, e.to_string()))?;

        let envelope: CloudflareResponse<T> = response
            .json()
            .await
            .map_err(|e| DdnsError::provider_api(operation, e.to_string()))?;

        if !envelope.success {
            let msg = envelope
                .errors
                .first()
                .map(|e| e.message.clone())
                .unwrap_or_else(|| "Unknown error".to_string());
            return Err(DdnsError::provider_api(operation, msg));
        }

        envelope
            .result
            .ok_or_else(|| DdnsError::provider_api(operation, "missing result"))
    }
}

#[async_trait]
impl DnsProvider for CloudflareProvider {
    fn name(&self) -> &'static str {
        "cloudflare"
    }

    async fn list_zones(&self, name: &str) -> Result<Vec<Zone>> {
        let url = format!("{}/client/v4/zones", self.base_url);
        let request = self.client.get(&url).query(&[("name", name)]);
        self.send("/zones", request).await
    }

    async fn list_records(
        &self,
        zone_id: &str,
        name: &str,
        kind: &RecordKind,
    ) -> Result<Vec<DnsRecord>> {
        let url = format!("{}/client/v4/zones/{}/dns_records", self.base_url, zone_id);
        let request = self
            .client
            .get(&url)
            .query(&[("name", name), ("type", kind.as_str()), ("match", "all")]);
        self.send("/zones/dns_records", request).await
    }

    async fn create_record(&self, zone_id: &str, record: &NewRecord) -> Result<DnsRecord> {
        let url = format!("{}/client/v4/zones/{}/dns_records", self.base_url, zone_id);
        let request = self.client.post(&url).json(record);
        self.send("/zones/dns_records:post", request).await
    }

    async fn update_record(
        &self,
        zone_id: &str,
        record_id: &str,
        record: &RecordUpdate,
    ) -> Result<DnsRecord> {
        let url = format!(
            "{}/client/v4/zones/{}/dns_records/{}",
            self.base_url, zone_id, record_id
        );
        let request = self.client.put(&url).json(record);
        self.send("/zones/dns_records:put", request).await
    }
}
