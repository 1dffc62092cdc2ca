use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use super::limiter::InFlightLimit;
use crate::errors::ScanError;
use crate::fingerprint::{FingerprintDb, FingerprintOracle};
use crate::report::{Reporter, ScanFinding};
use crate::zones::{list_cname_records, list_public_zones, HostedZone, RecordSet, ZoneProvider};

/// Totals of one account scan. `findings` holds every classified record,
/// clean ones included, whatever the reporter's verbosity.
#[derive(Debug, Clone, Default)]
pub struct ScanSummary {
    pub findings: Vec<ScanFinding>,
    pub zones_scanned: usize,
    pub zones_failed: usize,
    pub records_checked: usize,
    pub oracle_failures: usize,
}

impl ScanSummary {
    pub fn vulnerable(&self) -> impl Iterator<Item = &ScanFinding> {
        self.findings.iter().filter(|f| f.vulnerable)
    }

    fn absorb(&mut self, zone: ZoneOutcome) {
        if zone.failed {
            self.zones_failed += 1;
        } else {
            self.zones_scanned += 1;
        }
        self.records_checked += zone.records;
        self.oracle_failures += zone.oracle_failures;
        self.findings.extend(zone.findings);
    }
}

#[derive(Debug, Default)]
struct ZoneOutcome {
    findings: Vec<ScanFinding>,
    records: usize,
    oracle_failures: usize,
    failed: bool,
}

/// Two-level fan-out: one task per public zone, and inside each zone one
/// task per CNAME record. A zone task completes only after all of its
/// record tasks have, and a scan only after all zone tasks.
#[derive(Clone)]
pub struct Scanner {
    provider: Arc<dyn ZoneProvider>,
    oracle: Arc<dyn FingerprintOracle>,
    fingerprints: Arc<FingerprintDb>,
    limit: InFlightLimit,
    reporter: Reporter,
}

impl Scanner {
    pub fn new(
        provider: Arc<dyn ZoneProvider>,
        oracle: Arc<dyn FingerprintOracle>,
        fingerprints: Arc<FingerprintDb>,
        reporter: Reporter,
    ) -> Self {
        Self {
            provider,
            oracle,
            fingerprints,
            limit: InFlightLimit::unbounded(),
            reporter,
        }
    }

    /// Bound the number of fingerprint lookups in flight across all zones.
    pub fn with_max_in_flight(mut self, limit: Option<usize>) -> Self {
        self.limit = InFlightLimit::new(limit);
        self
    }

    /// Enumerate the account's public zones and scan them.
    ///
    /// Only enumeration failure is returned as an error; zone and record
    /// failures are reported and counted in the summary.
    pub async fn run(&self) -> Result<ScanSummary, ScanError> {
        let zones = list_public_zones(self.provider.as_ref()).await?;
        info!(zones = zones.len(), "Scanning public hosted zones");
        Ok(self.scan(zones).await)
    }

    pub async fn scan(&self, zones: Vec<HostedZone>) -> ScanSummary {
        let mut tasks = JoinSet::new();
        for zone in zones {
            if zone.is_private {
                debug!(zone = %zone.name, "skipping private zone");
                continue;
            }
            let scanner = self.clone();
            tasks.spawn(async move { scanner.scan_zone(zone).await });
        }

        let mut summary = ScanSummary::default();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(outcome) => summary.absorb(outcome),
                Err(e) => {
                    error!(status = "scan_failed", stage = "records", error = %e, "zone task aborted");
                    summary.zones_failed += 1;
                }
            }
        }
        summary
    }

    async fn scan_zone(&self, zone: HostedZone) -> ZoneOutcome {
        let records = match list_cname_records(self.provider.as_ref(), &zone.id).await {
            Ok(records) => records,
            Err(e) => {
                self.reporter.report_failure(&zone.name, &e);
                return ZoneOutcome { failed: true, ..Default::default() };
            }
        };
        debug!(zone = %zone.name, cnames = records.len(), "checking CNAME records");

        let mut outcome = ZoneOutcome { records: records.len(), ..Default::default() };
        let mut tasks = JoinSet::new();
        for record in records {
            let permit = self.limit.acquire().await;
            let scanner = self.clone();
            tasks.spawn(async move {
                let result = scanner.check_record(&record).await;
                drop(permit);
                result
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Some(finding)) => outcome.findings.push(finding),
                Ok(None) => outcome.oracle_failures += 1,
                Err(e) => {
                    error!(status = "scan_failed", stage = "oracle", zone = %zone.name, error = %e, "record task aborted");
                    outcome.oracle_failures += 1;
                }
            }
        }
        outcome
    }

    async fn check_record(&self, record: &RecordSet) -> Option<ScanFinding> {
        let hostname = record.name.trim_end_matches('.');
        let target = record.values.first().map(String::as_str);
        match self.oracle.identify(hostname, target, &self.fingerprints).await {
            Ok(service) => {
                let finding = ScanFinding::new(&record.name, service);
                self.reporter.report(&finding);
                Some(finding)
            }
            Err(source) => {
                let err = ScanError::Oracle { hostname: hostname.to_string(), source };
                self.reporter.report_failure(hostname, &err);
                None
            }
        }
    }
}
