use anyhow::Context;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use route53_takeover::config::ScanConfig;
use route53_takeover::errors::ScanError;
use route53_takeover::fingerprint::{DnsHttpOracle, FingerprintDb, FingerprintOracle};
use route53_takeover::report::{JsonlSink, Reporter, TracingSink};
use route53_takeover::scan::{ScanSummary, Scanner};
use route53_takeover::zones::route53::Route53Provider;

/// Clean findings are emitted at debug level from the report module only.
const REPORT_DIRECTIVE: &str = "route53_takeover::report=debug";

fn log_filter(debug: bool, verbose: bool, rust_log: Option<&str>) -> EnvFilter {
    // AWS/HTTP/DNS internals stay at WARN unless RUST_LOG says otherwise.
    let crate_level = if debug { "debug" } else { "warn" };
    let default_str = format!(
        "route53_takeover={crate},aws_config=warn,aws_smithy_runtime=warn,aws_sdk_route53=warn,hyper=warn,reqwest=warn,hickory_proto=warn,hickory_resolver=warn",
        crate = crate_level
    );
    let filter = rust_log
        .and_then(|s| EnvFilter::try_new(s).ok())
        .or_else(|| EnvFilter::try_new(&default_str).ok())
        .unwrap_or_else(|| EnvFilter::new(crate_level));

    if verbose && !debug {
        match REPORT_DIRECTIVE.parse() {
            Ok(directive) => filter.add_directive(directive),
            Err(_) => filter,
        }
    } else {
        filter
    }
}

fn init_logging(cli: &Cli) {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(cli.debug, cli.verbose, rust_log.as_deref()))
        .with_ansi(true)
        .with_target(false)
        .init();
}

pub async fn run_from_cli(cli: Cli) -> anyhow::Result<()> {
    init_logging(&cli);

    let config = cli.scan_config();
    let fingerprints = Arc::new(FingerprintDb::load(&config.fingerprints).await?);
    info!(signatures = fingerprints.len(), path = %config.fingerprints.display(), "Loaded fingerprints");

    let oracle: Arc<dyn FingerprintOracle> = Arc::new(
        DnsHttpOracle::new(config.timeout_secs, config.https).context("failed to build HTTP client")?,
    );

    let (jsonl, writer) = match &cli.out {
        Some(path) => {
            let (sink, handle) = JsonlSink::spawn(PathBuf::from(path));
            (Some(sink), Some(handle))
        }
        None => (None, None),
    };

    let mut failed_profiles = Vec::new();
    for profile in cli.profiles() {
        info!(profile = %profile, "Scanning account");
        let reporter = build_reporter(&config, jsonl.clone());
        match scan_profile(&profile, cli.region.as_deref(), &config, fingerprints.clone(), oracle.clone(), reporter).await {
            Ok(summary) => log_summary(&profile, &summary),
            Err(e) => {
                error!(status = "scan_failed", stage = e.stage(), profile = %profile, error = %e, "aborting scan of profile");
                failed_profiles.push(profile);
            }
        }
    }

    drop(jsonl);
    if let Some(handle) = writer {
        if let Err(e) = handle.await {
            error!(error = %e, "jsonl writer task failed");
        }
    }

    if !failed_profiles.is_empty() {
        anyhow::bail!("zone enumeration failed for profile(s): {}", failed_profiles.join(", "));
    }
    Ok(())
}

fn build_reporter(config: &ScanConfig, jsonl: Option<JsonlSink>) -> Reporter {
    let reporter = Reporter::new(config.verbose).with_sink(Arc::new(TracingSink));
    match jsonl {
        Some(sink) => reporter.with_sink(Arc::new(sink)),
        None => reporter,
    }
}

async fn scan_profile(
    profile: &str,
    region: Option<&str>,
    config: &ScanConfig,
    fingerprints: Arc<FingerprintDb>,
    oracle: Arc<dyn FingerprintOracle>,
    reporter: Reporter,
) -> Result<ScanSummary, ScanError> {
    let api_timeout = Duration::from_secs(config.api_timeout_secs);
    let provider = Arc::new(Route53Provider::connect(profile, region, api_timeout).await);
    Scanner::new(provider, oracle, fingerprints, reporter)
        .with_max_in_flight(config.max_in_flight)
        .run()
        .await
}

fn log_summary(profile: &str, summary: &ScanSummary) {
    info!(
        profile = %profile,
        zones = summary.zones_scanned,
        zones_failed = summary.zones_failed,
        records = summary.records_checked,
        vulnerable = summary.vulnerable().count(),
        lookup_failures = summary.oracle_failures,
        "Scan finished"
    );
}
