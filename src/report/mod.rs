pub mod jsonl;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::errors::ScanError;

pub use jsonl::JsonlSink;

/// Classification of one CNAME record set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScanFinding {
    /// Record name without the trailing dot.
    pub subdomain: String,
    pub vulnerable: bool,
    pub service: Option<String>,
}

impl ScanFinding {
    pub fn new(record_name: &str, service: Option<String>) -> Self {
        Self {
            subdomain: record_name.trim_end_matches('.').to_string(),
            vulnerable: service.is_some(),
            service,
        }
    }
}

/// Observer of emitted findings and of units that could not be scanned.
pub trait FindingSink: Send + Sync {
    fn vulnerable(&self, finding: &ScanFinding);
    fn clean(&self, finding: &ScanFinding);
    fn failure(&self, subject: &str, error: &ScanError);
}

/// Emit `finding` to `sink`: vulnerable always, clean only when `verbose`.
pub fn report(finding: &ScanFinding, verbose: bool, sink: &dyn FindingSink) {
    if finding.vulnerable {
        sink.vulnerable(finding);
    } else if verbose {
        sink.clean(finding);
    }
}

/// Fans each emission out to every configured sink.
#[derive(Clone)]
pub struct Reporter {
    verbose: bool,
    sinks: Vec<Arc<dyn FindingSink>>,
}

impl Reporter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose, sinks: Vec::new() }
    }

    pub fn with_sink(mut self, sink: Arc<dyn FindingSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn report(&self, finding: &ScanFinding) {
        for sink in &self.sinks {
            report(finding, self.verbose, sink.as_ref());
        }
    }

    /// Contained failures are always emitted, regardless of verbosity.
    pub fn report_failure(&self, subject: &str, error: &ScanError) {
        for sink in &self.sinks {
            sink.failure(subject, error);
        }
    }
}

/// Log sink: warnings for vulnerable records, debug for clean ones, errors for failures.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl FindingSink for TracingSink {
    fn vulnerable(&self, finding: &ScanFinding) {
        let service = finding.service.as_deref().unwrap_or("unknown");
        warn!(
            status = "vulnerable",
            subdomain = %finding.subdomain,
            service = %service,
            "{} is pointing to a vulnerable {} service",
            finding.subdomain,
            service
        );
    }

    fn clean(&self, finding: &ScanFinding) {
        debug!(status = "ok", subdomain = %finding.subdomain, "{} is ok", finding.subdomain);
    }

    fn failure(&self, subject: &str, error: &ScanError) {
        error!(status = "scan_failed", stage = error.stage(), subject = %subject, error = %error, "could not scan {}", subject);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Emission {
    Vulnerable(ScanFinding),
    Clean(ScanFinding),
    Failure { stage: &'static str, subject: String },
}

/// Keeps every emission in memory, in arrival order.
#[derive(Debug, Default)]
pub struct MemorySink {
    emitted: Mutex<Vec<Emission>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emissions(&self) -> Vec<Emission> {
        self.emitted.lock().clone()
    }

    pub fn findings(&self) -> Vec<ScanFinding> {
        self.emitted
            .lock()
            .iter()
            .filter_map(|e| match e {
                Emission::Vulnerable(f) | Emission::Clean(f) => Some(f.clone()),
                Emission::Failure { .. } => None,
            })
            .collect()
    }

    pub fn failures(&self) -> Vec<(&'static str, String)> {
        self.emitted
            .lock()
            .iter()
            .filter_map(|e| match e {
                Emission::Failure { stage, subject } => Some((*stage, subject.clone())),
                _ => None,
            })
            .collect()
    }
}

impl FindingSink for MemorySink {
    fn vulnerable(&self, finding: &ScanFinding) {
        self.emitted.lock().push(Emission::Vulnerable(finding.clone()));
    }

    fn clean(&self, finding: &ScanFinding) {
        self.emitted.lock().push(Emission::Clean(finding.clone()));
    }

    fn failure(&self, subject: &str, error: &ScanError) {
        self.emitted.lock().push(Emission::Failure { stage: error.stage(), subject: subject.to_string() });
    }
}
