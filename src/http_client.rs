use reqwest::{Client, ClientBuilder};
use std::time::Duration;

/// Client used to fetch the landing page behind a candidate hostname.
///
/// Dangling endpoints routinely serve mismatched or expired certificates, and
/// the body is what we fingerprint, so certificate validation is off.
pub fn create_probe_client(timeout_secs: u64) -> reqwest::Result<Client> {
    ClientBuilder::new()
        .pool_max_idle_per_host(4)
        .pool_idle_timeout(Some(Duration::from_secs(30)))
        .tcp_nodelay(true)
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(timeout_secs.min(5)))
        .gzip(true)
        .brotli(true)
        .use_rustls_tls()
        .danger_accept_invalid_certs(true)
        .redirect(reqwest::redirect::Policy::limited(5))
        .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36")
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        assert!(create_probe_client(10).is_ok());
    }
}
