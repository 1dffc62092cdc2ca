use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Also report records that matched nothing.
    pub verbose: bool,
    /// Ceiling on concurrent fingerprint lookups; `None` is unbounded.
    pub max_in_flight: Option<usize>,
    /// DNS and HTTP timeout of a single lookup.
    pub timeout_secs: u64,
    /// Bound on each Route 53 API call, retries included.
    pub api_timeout_secs: u64,
    /// Probe landing pages over https instead of http.
    pub https: bool,
    pub fingerprints: PathBuf,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            max_in_flight: None,
            timeout_secs: 10,
            api_timeout_secs: 30,
            https: false,
            fingerprints: PathBuf::from("./fingerprints.json"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let cfg: ScanConfig = serde_json::from_str(r#"{"max_in_flight": 64, "verbose": true}"#).unwrap();
        assert_eq!(cfg.max_in_flight, Some(64));
        assert!(cfg.verbose);
        assert_eq!(cfg.timeout_secs, 10);
        assert_eq!(cfg.api_timeout_secs, 30);
        assert_eq!(cfg.fingerprints, PathBuf::from("./fingerprints.json"));
    }

    #[test]
    fn api_timeout_is_configurable() {
        let cfg: ScanConfig = serde_json::from_str(r#"{"api_timeout_secs": 120}"#).unwrap();
        assert_eq!(cfg.api_timeout_secs, 120);
        assert_eq!(cfg.timeout_secs, 10);
    }
}
