use clap::Parser;

use route53_takeover::config::ScanConfig;

/// Audit Route 53 public hosted zones for CNAMEs vulnerable to subdomain takeover
#[derive(clap::Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// An AWS CLI profile name, or comma-separated list for multiple
    #[arg(long, default_value = "default")]
    pub profiles: String,

    /// Notify all record sets including non vulnerable
    #[arg(long, default_value_t = false)]
    pub verbose: bool,

    /// Enable detailed debug logging
    #[arg(long, default_value_t = false)]
    pub debug: bool,

    /// Path to the subjack-style fingerprint database
    #[arg(long, default_value = "./fingerprints.json")]
    pub fingerprints: String,

    /// Maximum fingerprint lookups in flight (default: unbounded)
    #[arg(short = 'c', long)]
    pub max_in_flight: Option<usize>,

    /// DNS/HTTP timeout per lookup in seconds
    #[arg(long, default_value_t = 10_u64)]
    pub timeout: u64,

    /// Route 53 API operation timeout in seconds, retries included
    #[arg(long, default_value_t = 30_u64)]
    pub api_timeout: u64,

    /// Fetch landing pages over https
    #[arg(long, default_value_t = false)]
    pub https: bool,

    /// AWS region used to sign Route 53 requests (default: us-east-1)
    #[arg(long)]
    pub region: Option<String>,

    /// Append reported findings to this JSON-lines file
    #[arg(short = 'o', long)]
    pub out: Option<String>,
}

impl Cli {
    pub fn profiles(&self) -> Vec<String> {
        self.profiles
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn scan_config(&self) -> ScanConfig {
        ScanConfig {
            verbose: self.verbose,
            max_in_flight: self.max_in_flight,
            timeout_secs: self.timeout,
            api_timeout_secs: self.api_timeout,
            https: self.https,
            fingerprints: self.fingerprints.clone().into(),
        }
    }
}

pub fn parse_cli() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_profiles() {
        let cli = Cli::parse_from(["route53-takeover", "--profiles", "prod, staging,,dev"]);
        assert_eq!(cli.profiles(), vec!["prod", "staging", "dev"]);
    }

    #[test]
    fn defaults() {
        let cli = Cli::parse_from(["route53-takeover"]);
        assert_eq!(cli.profiles(), vec!["default"]);
        let cfg = cli.scan_config();
        assert!(!cfg.verbose);
        assert_eq!(cfg.max_in_flight, None);
        assert_eq!(cfg.timeout_secs, 10);
        assert_eq!(cfg.api_timeout_secs, 30);
    }

    #[test]
    fn api_timeout_flag() {
        let cli = Cli::parse_from(["route53-takeover", "--api-timeout", "90"]);
        assert_eq!(cli.scan_config().api_timeout_secs, 90);
    }

    #[test]
    fn bound_and_verbose() {
        let cli = Cli::parse_from(["route53-takeover", "--verbose", "-c", "32"]);
        let cfg = cli.scan_config();
        assert!(cfg.verbose);
        assert_eq!(cfg.max_in_flight, Some(32));
    }
}
