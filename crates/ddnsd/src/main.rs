// # ddnsd - DDNS Daemon
//
// Keeps Cloudflare address records pointed at this host's public IP.
//
// This is a thin integration layer. All reconciliation logic lives in
// ddns-core; this binary only:
// 1. Reads configuration from environment variables
// 2. Initializes logging and the runtime
// 3. Builds the probe, IP source, provider and reporter
// 4. Runs the scheduler until SIGTERM/SIGINT
//
// ## Configuration
//
// ### Credentials (one scheme required)
// - `DDNS_CF_EMAIL` + `DDNS_CF_API_KEY`: Global API key
// - `DDNS_CF_API_TOKEN`: Scoped API token
// - `DDNS_CF_BASE_URL`: API base URL (default: Cloudflare v4)
//
// ### Domains
// - `DDNS_DOMAINS`: Comma-separated `zone_id:domain[:proxied]` entries
//   (proxied defaults to true)
//
// ### Public IP
// - `DDNS_IP_CHECK_SERVICES`: Comma-separated service URLs, tried in order
// - `DDNS_IP_FAMILY`: any, v4 or v6 (default: any)
//
// ### Connectivity
// - `DDNS_PROBE_HOST`: Probe host (default: www.cloudflare.com)
// - `DDNS_PROBE_PORT`: Probe port (default: 80)
//
// ### Engine
// - `DDNS_INTERVAL_SECS`: Seconds between cycles (default: 300)
// - `DDNS_RECORD_TTL`: TTL written on update (default: 120)
// - `DDNS_MODE`: live or dry-run (default: live)
// - `DDNS_LOG_LEVEL`: trace, debug, info, warn, error (default: info)
//
// ## Example
//
// ```bash
// export DDNS_CF_EMAIL=ops@example.com
// export DDNS_CF_API_KEY=your_global_key
// export DDNS_DOMAINS=023e105f4ecef8ad9ca31a8372d0c353:home.example.com
//
// ddnsd
// ```

mod env;

use anyhow::Result;
use ddns_core::{Reconciler, Scheduler, TcpProbe, TracingReporter};
use ddns_ip_http::HttpIpSource;
use ddns_provider_cloudflare::CloudflareProvider;
use env::Config;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum DdnsExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<DdnsExitCode> for ExitCode {
    fn from(code: DdnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DdnsExitCode::ConfigError.into();
    }

    info!("Starting ddnsd daemon");
    info!(
        "Configuration loaded: {} domain(s), provider {:?}",
        config.ddns.domains.len(),
        config.ddns.provider
    );

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DdnsExitCode::RuntimeError.into();
        }
    };

    let scheduler = match build_scheduler(&config) {
        Ok(scheduler) => scheduler,
        Err(e) => {
            error!("Startup error: {:#}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    let result = rt.block_on(async {
        match scheduler.run().await {
            Ok(cycles) => {
                info!("Shutting down daemon after {} cycle(s)", cycles);
                DdnsExitCode::CleanShutdown
            }
            Err(e) => {
                error!("Daemon error: {}", e);
                DdnsExitCode::RuntimeError
            }
        }
    });

    result.into()
}

/// Wire the concrete components into a scheduler
fn build_scheduler(config: &Config) -> Result<Scheduler> {
    let ddns = &config.ddns;

    let probe = TcpProbe::from_config(&ddns.probe);
    let ip_source = HttpIpSource::from_config(&ddns.ip_check)?;
    let provider = CloudflareProvider::from_config(&ddns.provider)?;

    for domain in &ddns.domains {
        info!(
            "Managing {} in zone {} (proxied: {})",
            domain.name, domain.zone_id, domain.proxied
        );
    }

    let reconciler = Reconciler::new(
        Box::new(probe),
        Box::new(ip_source),
        Box::new(provider),
        Box::new(TracingReporter::new()),
        ddns,
    )?;

    Ok(Scheduler::from_config(reconciler, &ddns.engine))
}
