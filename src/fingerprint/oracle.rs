use async_trait::async_trait;
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::error::{ResolveError, ResolveErrorKind};
use hickory_resolver::proto::op::ResponseCode;
use hickory_resolver::proto::rr::{RData, RecordType};
use hickory_resolver::TokioAsyncResolver;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use super::FingerprintDb;
use crate::errors::OracleError;
use crate::http_client::create_probe_client;

/// Decides whether a hostname points at an unclaimed third-party service.
#[async_trait]
pub trait FingerprintOracle: Send + Sync {
    /// `Ok(Some(service))` when vulnerable, `Ok(None)` when not.
    ///
    /// `target` is the CNAME value already known from the zone, if any;
    /// without it the oracle resolves the hostname itself.
    async fn identify(
        &self,
        hostname: &str,
        target: Option<&str>,
        db: &FingerprintDb,
    ) -> Result<Option<String>, OracleError>;
}

/// Resolves the CNAME, matches it against the signature set, then confirms
/// with either an NXDOMAIN check on the target or the landing page body.
pub struct DnsHttpOracle {
    resolver: TokioAsyncResolver,
    client: Client,
    https: bool,
}

impl DnsHttpOracle {
    pub fn new(timeout_secs: u64, https: bool) -> reqwest::Result<Self> {
        let mut opts = ResolverOpts::default();
        opts.timeout = Duration::from_secs(timeout_secs);
        Ok(Self {
            resolver: TokioAsyncResolver::tokio(ResolverConfig::default(), opts),
            client: create_probe_client(timeout_secs)?,
            https,
        })
    }

    async fn resolve_cname(&self, hostname: &str) -> Result<Option<String>, OracleError> {
        match self.resolver.lookup(fqdn(hostname), RecordType::CNAME).await {
            Ok(lookup) => Ok(lookup.record_iter().find_map(|r| match r.data() {
                Some(RData::CNAME(target)) => Some(target.0.to_string()),
                _ => None,
            })),
            Err(e) if is_no_records(&e) => Ok(None),
            Err(e) => Err(OracleError::Resolve { host: hostname.to_string(), message: e.to_string() }),
        }
    }

    async fn target_is_dead(&self, target: &str) -> Result<bool, OracleError> {
        match self.resolver.lookup_ip(fqdn(target)).await {
            Ok(_) => Ok(false),
            Err(e) if is_nxdomain(&e) => Ok(true),
            Err(e) if is_no_records(&e) => Ok(false),
            Err(e) => Err(OracleError::Resolve { host: target.to_string(), message: e.to_string() }),
        }
    }

    /// Landing page body, or `None` when the host cannot be fetched.
    async fn fetch_body(&self, hostname: &str) -> Result<Option<String>, OracleError> {
        let scheme = if self.https { "https" } else { "http" };
        let url = url::Url::parse(&format!("{scheme}://{hostname}/"))
            .map_err(|_| OracleError::InvalidHost(hostname.to_string()))?;

        let response = match self.client.get(url).send().await {
            Ok(r) => r,
            Err(e) => {
                debug!(host = %hostname, error = %e, "landing page fetch failed");
                return Ok(None);
            }
        };
        match response.text().await {
            Ok(body) => Ok(Some(body)),
            Err(e) => {
                debug!(host = %hostname, error = %e, "landing page body unreadable");
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl FingerprintOracle for DnsHttpOracle {
    async fn identify(
        &self,
        hostname: &str,
        target: Option<&str>,
        db: &FingerprintDb,
    ) -> Result<Option<String>, OracleError> {
        let target = match target {
            Some(t) => t.to_string(),
            None => match self.resolve_cname(hostname).await? {
                Some(t) => t,
                None => return Ok(None),
            },
        };
        let Some(signature) = db.match_target(&target) else {
            return Ok(None);
        };
        debug!(host = %hostname, target = %target, service = %signature.service, "CNAME matches signature");

        if signature.nxdomain {
            return Ok(self.target_is_dead(&target).await?.then(|| signature.service.clone()));
        }

        let vulnerable = self
            .fetch_body(hostname)
            .await?
            .is_some_and(|body| signature.matches_body(&body));
        Ok(vulnerable.then(|| signature.service.clone()))
    }
}

fn fqdn(name: &str) -> String {
    if name.ends_with('.') {
        name.to_string()
    } else {
        format!("{name}.")
    }
}

fn is_no_records(e: &ResolveError) -> bool {
    matches!(e.kind(), ResolveErrorKind::NoRecordsFound { .. })
}

fn is_nxdomain(e: &ResolveError) -> bool {
    matches!(
        e.kind(),
        ResolveErrorKind::NoRecordsFound { response_code, .. } if *response_code == ResponseCode::NXDomain
    )
}
