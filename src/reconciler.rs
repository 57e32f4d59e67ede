//! Zone lookup and record reconciliation.
//!
//! One reconciliation pass compares the hostname's currently-visible
//! address with the discovered public IP and, only when they differ,
//! walks the provider's matching records: stale ones are rewritten in
//! place, already-correct ones are confirmed, and a record is created
//! only when nothing usable existed at all.

use crate::error::{DdnsError, Result};
use crate::providers::{DnsProvider, NewRecord, RecordKind, RecordUpdate};
use std::net::IpAddr;

/// Result of one reconciliation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The hostname already resolved to the public IP; no provider call
    /// was made.
    AlreadyInSync,
    /// A matching record already carried the desired content.
    Unchanged,
    /// At least one existing record's content was rewritten.
    Updated,
    /// No usable record existed, so one was created.
    Created,
}

/// Derive the zone name as the last two labels of the hostname.
///
/// Naive apex derivation: `foo.co.uk` yields `co.uk`. Kept in one place
/// so a public-suffix-aware rule can replace it.
pub fn derive_zone_name(hostname: &str) -> String {
    let mut labels: Vec<&str> = hostname.rsplit('.').take(2).collect();
    labels.reverse();
    labels.join(".")
}

/// Find the unique zone ID for `zone_name`.
///
/// Zero matches and multiple matches are both hard errors; there is no
/// disambiguation heuristic.
pub async fn find_zone_id(provider: &dyn DnsProvider, zone_name: &str) -> Result<String> {
    let mut zones = provider.list_zones(zone_name).await?;

    if zones.len() > 1 {
        return Err(DdnsError::AmbiguousZone {
            zone: zone_name.to_string(),
            count: zones.len(),
        });
    }

    match zones.pop() {
        Some(zone) => Ok(zone.id),
        None => Err(DdnsError::ZoneNotFound {
            zone: zone_name.to_string(),
        }),
    }
}

/// Make one record of `kind` under `hostname` carry `desired_ip`.
///
/// All name/kind-matched records are scanned; duplicates are evaluated
/// independently rather than treated as an error. A provider failure on
/// any mutation aborts the scan immediately.
pub async fn reconcile(
    provider: &dyn DnsProvider,
    zone_id: &str,
    hostname: &str,
    desired_ip: IpAddr,
    kind: &RecordKind,
) -> Result<Outcome> {
    let records = provider.list_records(zone_id, hostname, kind).await?;

    let desired_content = desired_ip.to_string();
    let mut updated = 0usize;
    let mut unchanged = 0usize;

    for record in &records {
        // The listing is kind-filtered server-side, but the filter is
        // advisory; re-check before touching anything.
        if !record.kind.is_address() || record.kind != *kind {
            tracing::info!(
                hostname,
                record_id = %record.id,
                kind = %record.kind,
                "ignored: wrong address family"
            );
            continue;
        }

        if record.content == desired_content {
            tracing::info!(hostname, content = %desired_content, "unchanged");
            unchanged += 1;
            continue;
        }

        let update = RecordUpdate {
            name: hostname.to_string(),
            kind: kind.clone(),
            content: desired_content.clone(),
            proxied: record.proxied,
        };
        provider.update_record(zone_id, &record.id, &update).await?;
        tracing::info!(
            hostname,
            record_id = %record.id,
            old = %record.content,
            new = %desired_content,
            "updated"
        );
        updated += 1;
    }

    if updated > 0 {
        return Ok(Outcome::Updated);
    }
    if unchanged > 0 {
        return Ok(Outcome::Unchanged);
    }

    // Nothing usable existed. Create one, leaving feature flags to the
    // provider's defaults.
    let record = NewRecord {
        name: hostname.to_string(),
        kind: kind.clone(),
        content: desired_content.clone(),
    };
    provider.create_record(zone_id, &record).await?;
    tracing::info!(hostname, content = %desired_content, "created");
    Ok(Outcome::Created)
}

/// One full reconciliation pass for `hostname`.
///
/// Short-circuits with [`Outcome::AlreadyInSync`] before any provider
/// call when the resolved address already equals the public IP.
pub async fn sync(
    provider: &dyn DnsProvider,
    hostname: &str,
    resolved_ip: IpAddr,
    public_ip: IpAddr,
    kind: &RecordKind,
) -> Result<Outcome> {
    if resolved_ip == public_ip {
        tracing::info!(hostname, ip = %public_ip, "already in sync");
        return Ok(Outcome::AlreadyInSync);
    }

    let zone_name = derive_zone_name(hostname);
    let zone_id = find_zone_id(provider, &zone_name).await?;
    tracing::debug!(zone = %zone_name, %zone_id, "zone resolved");

    reconcile(provider, &zone_id, hostname, public_ip, kind).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{DnsRecord, MockDnsProvider, Zone};

    const HOST: &str = "vpn.example.com";
    const ZONE: &str = "zone-1";

    fn record(id: &str, kind: RecordKind, content: &str, proxied: Option<bool>) -> DnsRecord {
        DnsRecord {
            id: id.to_string(),
            name: HOST.to_string(),
            kind,
            content: content.to_string(),
            proxied,
        }
    }

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn test_derive_zone_name() {
        assert_eq!(derive_zone_name("vpn.example.com"), "example.com");
        assert_eq!(derive_zone_name("example.com"), "example.com");
        assert_eq!(derive_zone_name("a.b.example.com"), "example.com");
        // Known naive behavior for multi-label public suffixes.
        assert_eq!(derive_zone_name("foo.co.uk"), "co.uk");
    }

    #[tokio::test]
    async fn test_sync_in_sync_makes_no_provider_calls() {
        // No expectations set: any provider call would panic.
        let provider = MockDnsProvider::new();

        let outcome = sync(
            &provider,
            HOST,
            ip("203.0.113.5"),
            ip("203.0.113.5"),
            &RecordKind::A,
        )
        .await
        .unwrap();

        assert_eq!(outcome, Outcome::AlreadyInSync);
    }

    #[tokio::test]
    async fn test_find_zone_id_single_match() {
        let mut provider = MockDnsProvider::new();
        provider
            .expect_list_zones()
            .withf(|name| name == "example.com")
            .times(1)
            .returning(|_| {
                Ok(vec![Zone {
                    id: ZONE.to_string(),
                    name: "example.com".to_string(),
                }])
            });

        let id = find_zone_id(&provider, "example.com").await.unwrap();
        assert_eq!(id, ZONE);
    }

    #[tokio::test]
    async fn test_find_zone_id_empty() {
        let mut provider = MockDnsProvider::new();
        provider
            .expect_list_zones()
            .times(1)
            .returning(|_| Ok(vec![]));

        let err = find_zone_id(&provider, "example.com").await.unwrap_err();
        assert!(matches!(err, DdnsError::ZoneNotFound { .. }));
    }

    #[tokio::test]
    async fn test_find_zone_id_ambiguous() {
        let mut provider = MockDnsProvider::new();
        provider.expect_list_zones().times(1).returning(|_| {
            Ok(vec![
                Zone {
                    id: "z1".to_string(),
                    name: "example.com".to_string(),
                },
                Zone {
                    id: "z2".to_string(),
                    name: "example.com".to_string(),
                },
            ])
        });

        let err = find_zone_id(&provider, "example.com").await.unwrap_err();
        assert!(matches!(err, DdnsError::AmbiguousZone { count: 2, .. }));
    }

    #[tokio::test]
    async fn test_reconcile_updates_stale_record_preserving_proxied() {
        let mut provider = MockDnsProvider::new();
        provider
            .expect_list_records()
            .times(1)
            .returning(|_, _, _| Ok(vec![record("r1", RecordKind::A, "198.51.100.1", Some(true))]));
        provider
            .expect_update_record()
            .withf(|zone_id, record_id, update| {
                zone_id == ZONE
                    && record_id == "r1"
                    && update.content == "203.0.113.5"
                    && update.kind == RecordKind::A
                    && update.proxied == Some(true)
            })
            .times(1)
            .returning(|_, _, _| Ok(record("r1", RecordKind::A, "203.0.113.5", Some(true))));

        let outcome = reconcile(&provider, ZONE, HOST, ip("203.0.113.5"), &RecordKind::A)
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::Updated);
    }

    #[tokio::test]
    async fn test_reconcile_correct_record_is_left_alone() {
        let mut provider = MockDnsProvider::new();
        provider
            .expect_list_records()
            .times(1)
            .returning(|_, _, _| Ok(vec![record("r1", RecordKind::A, "203.0.113.5", Some(false))]));

        let outcome = reconcile(&provider, ZONE, HOST, ip("203.0.113.5"), &RecordKind::A)
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::Unchanged);
    }

    #[tokio::test]
    async fn test_reconcile_creates_when_no_record_exists() {
        let mut provider = MockDnsProvider::new();
        provider
            .expect_list_records()
            .times(1)
            .returning(|_, _, _| Ok(vec![]));
        provider
            .expect_create_record()
            .withf(|zone_id, new| {
                zone_id == ZONE
                    && new.name == HOST
                    && new.kind == RecordKind::A
                    && new.content == "203.0.113.5"
            })
            .times(1)
            .returning(|_, _| Ok(record("r-new", RecordKind::A, "203.0.113.5", None)));

        let outcome = reconcile(&provider, ZONE, HOST, ip("203.0.113.5"), &RecordKind::A)
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::Created);
    }

    #[tokio::test]
    async fn test_reconcile_duplicate_records_fixed_independently() {
        // Abnormal but tolerated: two A records for the same name, one
        // already correct. Only the stale one gets rewritten and no
        // record is created.
        let mut provider = MockDnsProvider::new();
        provider.expect_list_records().times(1).returning(|_, _, _| {
            Ok(vec![
                record("r1", RecordKind::A, "203.0.113.5", Some(false)),
                record("r2", RecordKind::A, "198.51.100.1", Some(true)),
            ])
        });
        provider
            .expect_update_record()
            .withf(|_, record_id, update| record_id == "r2" && update.proxied == Some(true))
            .times(1)
            .returning(|_, _, _| Ok(record("r2", RecordKind::A, "203.0.113.5", Some(true))));

        let outcome = reconcile(&provider, ZONE, HOST, ip("203.0.113.5"), &RecordKind::A)
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::Updated);
    }

    #[tokio::test]
    async fn test_reconcile_cross_kind_record_never_mutated() {
        // A stray AAAA record slipping through the server-side filter
        // must be skipped, not rewritten to a v4 address.
        let mut provider = MockDnsProvider::new();
        provider.expect_list_records().times(1).returning(|_, _, _| {
            Ok(vec![
                record("r6", RecordKind::Aaaa, "2001:db8::1", None),
                record("r1", RecordKind::A, "203.0.113.5", Some(false)),
            ])
        });

        let outcome = reconcile(&provider, ZONE, HOST, ip("203.0.113.5"), &RecordKind::A)
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::Unchanged);
    }

    #[tokio::test]
    async fn test_reconcile_provider_error_aborts_scan() {
        let mut provider = MockDnsProvider::new();
        provider
            .expect_list_records()
            .times(1)
            .returning(|_, _, _| Ok(vec![record("r1", RecordKind::A, "198.51.100.1", None)]));
        provider
            .expect_update_record()
            .times(1)
            .returning(|_, _, _| Err(DdnsError::provider_api("/zones/dns_records:put", "rate limited")));

        let err = reconcile(&provider, ZONE, HOST, ip("203.0.113.5"), &RecordKind::A)
            .await
            .unwrap_err();

        assert!(matches!(err, DdnsError::ProviderApi { .. }));
    }

    #[tokio::test]
    async fn test_sync_zone_errors_stop_before_record_calls() {
        let mut provider = MockDnsProvider::new();
        provider
            .expect_list_zones()
            .times(1)
            .returning(|_| Ok(vec![]));
        // No list_records expectation: a record call would panic.

        let err = sync(
            &provider,
            HOST,
            ip("198.51.100.1"),
            ip("203.0.113.5"),
            &RecordKind::A,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, DdnsError::ZoneNotFound { .. }));
    }

    #[tokio::test]
    async fn test_sync_is_idempotent() {
        // Two passes with no external state change: both confirm the
        // record and neither issues a mutation call. The stale resolver
        // answer keeps the short-circuit from kicking in.
        let mut provider = MockDnsProvider::new();
        provider.expect_list_zones().times(2).returning(|_| {
            Ok(vec![Zone {
                id: ZONE.to_string(),
                name: "example.com".to_string(),
            }])
        });
        provider
            .expect_list_records()
            .times(2)
            .returning(|_, _, _| Ok(vec![record("r1", RecordKind::A, "203.0.113.5", Some(false))]));

        for _ in 0..2 {
            let outcome = sync(
                &provider,
                HOST,
                ip("198.51.100.1"),
                ip("203.0.113.5"),
                &RecordKind::A,
            )
            .await
            .unwrap();
            assert_eq!(outcome, Outcome::Unchanged);
        }
    }
}
