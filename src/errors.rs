use thiserror::Error;

/// Failure raised by a [`crate::zones::ZoneProvider`] call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{operation} failed: {message}")]
pub struct ProviderError {
    pub operation: &'static str,
    pub message: String,
}

impl ProviderError {
    pub fn new(operation: &'static str, message: impl Into<String>) -> Self {
        Self { operation, message: message.into() }
    }
}

/// Failure of a single fingerprint lookup.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OracleError {
    #[error("DNS resolution failed for {host}: {message}")]
    Resolve { host: String, message: String },

    #[error("invalid hostname: {0}")]
    InvalidHost(String),
}

#[derive(Error, Debug)]
pub enum ScanError {
    /// Zone listing failed. Fatal for the profile being scanned.
    #[error("failed to enumerate hosted zones: {0}")]
    Enumeration(#[source] ProviderError),

    #[error("failed to list record sets for zone {zone_id}: {reason}")]
    Pagination { zone_id: String, reason: String },

    #[error("fingerprint check failed for {hostname}: {source}")]
    Oracle {
        hostname: String,
        #[source]
        source: OracleError,
    },

    #[error("failed to load fingerprints from {path}: {message}")]
    Fingerprints { path: String, message: String },
}

impl ScanError {
    pub fn pagination(zone_id: &str, reason: impl ToString) -> Self {
        ScanError::Pagination { zone_id: zone_id.to_string(), reason: reason.to_string() }
    }

    /// Pipeline stage the error belongs to, used as the `stage` log field.
    pub fn stage(&self) -> &'static str {
        match self {
            ScanError::Enumeration(_) => "zones",
            ScanError::Pagination { .. } => "records",
            ScanError::Oracle { .. } => "oracle",
            ScanError::Fingerprints { .. } => "fingerprints",
        }
    }
}
