//! # ddns-sync
//!
//! Keeps a DNS "A" (or "AAAA") record synchronized with the machine's
//! current public IP address.
//!
//! One invocation resolves the target hostname, discovers the public IP
//! through a list of IP-echo services, and — only if the two differ —
//! looks up the zone and reconciles the record through the DNS
//! provider's API. Each run is stateless; scheduling repeated runs is
//! the caller's job (cron, a systemd timer, ...).
//!
//! ## Usage
//!
//! ```bash
//! # Reconcile an A record
//! ddns-sync vpn.example.com
//!
//! # Reconcile an AAAA record instead
//! ddns-sync --record-type aaaa vpn.example.com
//! ```

pub mod config;
pub mod detector;
pub mod error;
pub mod providers;
pub mod reconciler;
pub mod resolver;

pub use config::Config;
pub use detector::IpDetector;
pub use error::{DdnsError, Result};
pub use reconciler::Outcome;
