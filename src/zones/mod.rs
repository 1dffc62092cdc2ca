// Hosted zone model and the provider seam used by the scan pipeline.

pub mod enumerator;
pub mod paginator;
pub mod route53;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::ProviderError;

pub use enumerator::list_public_zones;
pub use paginator::list_cname_records;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostedZone {
    pub id: String,
    pub name: String,
    pub is_private: bool,
}

/// DNS record type as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RecordType {
    A,
    Aaaa,
    Cname,
    Mx,
    Ns,
    Soa,
    Txt,
    Other(String),
}

impl RecordType {
    pub fn as_str(&self) -> &str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
            RecordType::Cname => "CNAME",
            RecordType::Mx => "MX",
            RecordType::Ns => "NS",
            RecordType::Soa => "SOA",
            RecordType::Txt => "TXT",
            RecordType::Other(s) => s,
        }
    }
}

impl From<&str> for RecordType {
    fn from(s: &str) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "A" => RecordType::A,
            "AAAA" => RecordType::Aaaa,
            "CNAME" => RecordType::Cname,
            "MX" => RecordType::Mx,
            "NS" => RecordType::Ns,
            "SOA" => RecordType::Soa,
            "TXT" => RecordType::Txt,
            other => RecordType::Other(other.to_string()),
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordSet {
    /// Fully-qualified name, trailing dot included.
    pub name: String,
    pub record_type: RecordType,
    /// Routing policy identifier (weighted, latency, failover...).
    pub set_identifier: Option<String>,
    /// Record data; for a CNAME, the canonical name it points at.
    pub values: Vec<String>,
}

impl RecordSet {
    pub fn is_cname(&self) -> bool {
        self.record_type == RecordType::Cname
    }
}

/// Continuation token of a truncated record listing.
///
/// All three fields must be sent back on the next request; resuming by
/// name alone repeats or skips record sets sharing that name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PaginationCursor {
    pub next_name: String,
    pub next_type: RecordType,
    pub next_identifier: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ZonePage {
    pub zones: Vec<HostedZone>,
    /// Set when more zones are available.
    pub next_marker: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct RecordPage {
    pub record_sets: Vec<RecordSet>,
    pub is_truncated: bool,
    pub next: Option<PaginationCursor>,
}

/// Authenticated, read-only access to one account's DNS zones.
#[async_trait]
pub trait ZoneProvider: Send + Sync {
    async fn list_zones_page(&self, marker: Option<String>) -> Result<ZonePage, ProviderError>;

    async fn list_records_page(
        &self,
        zone_id: &str,
        cursor: Option<&PaginationCursor>,
    ) -> Result<RecordPage, ProviderError>;
}
