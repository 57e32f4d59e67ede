//! ddns-sync - keeps a DNS record pointed at the machine's public IP.

use clap::{Parser, ValueEnum};
use ddns_sync::config::Config;
use ddns_sync::detector::IpDetector;
use ddns_sync::error::DdnsError;
use ddns_sync::providers::{create_provider, RecordKind};
use ddns_sync::reconciler::{self, Outcome};
use ddns_sync::resolver;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Exit status when resolution or public-IP discovery fails outright.
/// Distinct from provider errors, which exit through the error chain.
const EXIT_LOOKUP_FAILED: i32 = 2;

#[derive(Parser)]
#[command(name = "ddns-sync")]
#[command(about = "Keeps a DNS A/AAAA record pointed at the machine's current public IP")]
#[command(version)]
struct Cli {
    /// Hostname to reconcile (e.g. vpn.example.com)
    hostname: String,

    /// DNS provider to update through
    #[arg(short, long, value_enum, default_value_t = ProviderKind::Cloudflare)]
    provider: ProviderKind,

    /// Record type to manage
    #[arg(short = 't', long, value_enum, default_value_t = RecordType::A)]
    record_type: RecordType,

    /// Path to config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// IP-echo service override (repeatable, tried in order)
    #[arg(long = "ip-service", value_name = "URL")]
    ip_services: Vec<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum ProviderKind {
    Cloudflare,
}

#[derive(Clone, Copy, ValueEnum)]
enum RecordType {
    A,
    Aaaa,
}

impl From<RecordType> for RecordKind {
    fn from(t: RecordType) -> Self {
        match t {
            RecordType::A => RecordKind::A,
            RecordType::Aaaa => RecordKind::Aaaa,
        }
    }
}

fn get_config_path(cli_path: Option<PathBuf>) -> PathBuf {
    if let Some(path) = cli_path {
        return path;
    }

    // Default locations
    let candidates = [
        dirs::config_dir().map(|p| p.join("ddns-sync/config.toml")),
        Some(PathBuf::from("/etc/ddns-sync/config.toml")),
        Some(PathBuf::from("config.toml")),
    ];

    for candidate in candidates.into_iter().flatten() {
        if candidate.exists() {
            return candidate;
        }
    }

    dirs::config_dir()
        .map(|p| p.join("ddns-sync/config.toml"))
        .unwrap_or_else(|| PathBuf::from("config.toml"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config_path = get_config_path(cli.config.clone());
    let config = Config::load_from(&config_path)?;

    let kind: RecordKind = cli.record_type.into();

    // Cheap lookups first; either failing stops the run before any
    // provider call is attempted.
    let resolved_ip = match resolver::resolve_first(&cli.hostname, kind.clone()).await {
        Ok(ip) => ip,
        Err(e) => {
            tracing::error!(hostname = %cli.hostname, error = %e, "hostname resolution failed");
            std::process::exit(EXIT_LOOKUP_FAILED);
        }
    };

    let detector = if cli.ip_services.is_empty() {
        IpDetector::with_services(config.ip_services.clone())
    } else {
        IpDetector::with_services(cli.ip_services.clone())
    };

    let public_ip = match detector.discover().await {
        Ok(ip) => ip,
        Err(e) => {
            tracing::error!(hostname = %cli.hostname, error = %e, "public IP discovery failed");
            std::process::exit(EXIT_LOOKUP_FAILED);
        }
    };

    if !kind.matches(public_ip) {
        return Err(DdnsError::Config(format!(
            "discovered public IP {public_ip} cannot back a {kind} record"
        ))
        .into());
    }

    let provider = match cli.provider {
        ProviderKind::Cloudflare => create_provider(&config.provider),
    };

    let outcome = match reconciler::sync(
        provider.as_ref(),
        &cli.hostname,
        resolved_ip,
        public_ip,
        &kind,
    )
    .await
    {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!(hostname = %cli.hostname, error = %e, "reconciliation failed");
            return Err(e.into());
        }
    };

    match outcome {
        Outcome::AlreadyInSync => {
            println!(
                "{} -> {}({}) == public IP, nothing to do",
                cli.hostname, kind, public_ip
            );
        }
        Outcome::Unchanged => println!("UNCHANGED: {} {}", cli.hostname, public_ip),
        Outcome::Updated => println!("UPDATED: {} {} -> {}", cli.hostname, resolved_ip, public_ip),
        Outcome::Created => println!("CREATED: {} {}", cli.hostname, public_ip),
    }

    Ok(())
}
