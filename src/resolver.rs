//! Hostname resolution through the platform resolver.

use crate::error::{DdnsError, Result};
use crate::providers::RecordKind;
use std::net::IpAddr;
use tokio::net::lookup_host;

/// Resolve `hostname` and return the first address of the requested family.
///
/// Addresses are taken in the order the platform resolver yields them; no
/// sorting or preference logic is applied beyond the family filter.
pub async fn resolve_first(hostname: &str, kind: RecordKind) -> Result<IpAddr> {
    let addrs = lookup_host((hostname, 0))
        .await
        .map_err(|e| DdnsError::resolution(hostname, e.to_string()))?;

    let ips: Vec<IpAddr> = addrs.map(|a| a.ip()).collect();
    tracing::debug!(hostname, ?ips, "resolver answers");

    ips.into_iter()
        .find(|ip| kind.matches(*ip))
        .ok_or_else(|| {
            DdnsError::resolution(hostname, format!("no {kind} address in resolver answer"))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_resolve_localhost() {
        let ip = resolve_first("localhost", RecordKind::A).await.unwrap();
        assert!(ip.is_loopback());
        assert!(ip.is_ipv4());
    }

    #[tokio::test]
    async fn test_resolve_unknown_host() {
        let err = resolve_first("does-not-exist.invalid", RecordKind::A)
            .await
            .unwrap_err();
        assert!(matches!(err, DdnsError::Resolution { .. }));
    }
}
