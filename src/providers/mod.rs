//! DNS provider clients.

mod cloudflare;

pub use cloudflare::CloudflareProvider;

use crate::config::ProviderConfig;
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;

/// DNS record kind. Only `A` and `AAAA` are ever mutated; anything else a
/// provider hands back is carried through [`RecordKind::Other`] and ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RecordKind {
    A,
    Aaaa,
    Other(String),
}

impl RecordKind {
    /// Whether this kind is an address record at all.
    pub fn is_address(&self) -> bool {
        matches!(self, RecordKind::A | RecordKind::Aaaa)
    }

    /// Whether `ip` belongs to this kind's address family.
    pub fn matches(&self, ip: IpAddr) -> bool {
        match self {
            RecordKind::A => ip.is_ipv4(),
            RecordKind::Aaaa => ip.is_ipv6(),
            RecordKind::Other(_) => false,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            RecordKind::A => "A",
            RecordKind::Aaaa => "AAAA",
            RecordKind::Other(s) => s,
        }
    }
}

impl From<String> for RecordKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "A" => RecordKind::A,
            "AAAA" => RecordKind::Aaaa,
            _ => RecordKind::Other(s),
        }
    }
}

impl From<RecordKind> for String {
    fn from(kind: RecordKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provider-side DNS zone. Looked up, never created.
#[derive(Debug, Clone, Deserialize)]
pub struct Zone {
    pub id: String,
    pub name: String,
}

/// Provider-side DNS record.
#[derive(Debug, Clone, Deserialize)]
pub struct DnsRecord {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: RecordKind,
    pub content: String,
    #[serde(default)]
    pub proxied: Option<bool>,
}

/// Payload for creating a record. Carries no `proxied` field so the
/// provider applies its own default.
#[derive(Debug, Clone, Serialize)]
pub struct NewRecord {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: RecordKind,
    pub content: String,
}

/// Payload for rewriting an existing record. `proxied` echoes whatever the
/// existing record carried.
#[derive(Debug, Clone, Serialize)]
pub struct RecordUpdate {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: RecordKind,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxied: Option<bool>,
}

/// The four operations the reconciler needs from a DNS provider.
///
/// Any provider exposing name-filtered zone and record listings plus
/// create/update-by-id can sit behind this trait.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Provider name for logging.
    fn name(&self) -> &'static str;

    /// List zones whose name equals `name`.
    async fn list_zones(&self, name: &str) -> Result<Vec<Zone>>;

    /// List records in `zone_id` filtered by `name` and `kind`. The filter
    /// is applied server-side; callers re-check locally.
    async fn list_records(
        &self,
        zone_id: &str,
        name: &str,
        kind: &RecordKind,
    ) -> Result<Vec<DnsRecord>>;

    /// Create a new record in `zone_id`.
    async fn create_record(&self, zone_id: &str, record: &NewRecord) -> Result<DnsRecord>;

    /// Rewrite the record identified by `zone_id` + `record_id`.
    async fn update_record(
        &self,
        zone_id: &str,
        record_id: &str,
        record: &RecordUpdate,
    ) -> Result<DnsRecord>;
}

/// Create a provider client from configuration.
pub fn create_provider(config: &ProviderConfig) -> Box<dyn DnsProvider> {
    match config {
        ProviderConfig::Cloudflare { api_token } => {
            Box::new(CloudflareProvider::new(resolve_env(api_token)))
        }
    }
}

/// Resolve environment variable references (values starting with $).
fn resolve_env(value: &str) -> String {
    if let Some(var_name) = value.strip_prefix('$') {
        std::env::var(var_name).unwrap_or_else(|_| {
            tracing::warn!("Environment variable {} not set", var_name);
            value.to_string()
        })
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod kind_tests {
    use super::*;

    #[test]
    fn test_kind_round_trip() {
        let a: RecordKind = "A".to_string().into();
        assert_eq!(a, RecordKind::A);
        assert_eq!(String::from(RecordKind::Aaaa), "AAAA");

        let txt: RecordKind = "TXT".to_string().into();
        assert_eq!(txt, RecordKind::Other("TXT".to_string()));
        assert!(!txt.is_address());
    }

    #[test]
    fn test_kind_family_match() {
        let v4: IpAddr = "192.0.2.1".parse().unwrap();
        let v6: IpAddr = "2001:db8::1".parse().unwrap();
        assert!(RecordKind::A.matches(v4));
        assert!(!RecordKind::A.matches(v6));
        assert!(RecordKind::Aaaa.matches(v6));
        assert!(!RecordKind::Aaaa.matches(v4));
    }
}
