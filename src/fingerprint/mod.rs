pub mod oracle;

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::errors::ScanError;

pub use oracle::{DnsHttpOracle, FingerprintOracle};

/// One vulnerable-service signature, in the subjack `fingerprints.json` layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FingerprintSignature {
    pub service: String,
    /// Substrings of the CNAME target that identify the service.
    #[serde(default)]
    pub cname: Vec<String>,
    /// Response body markers of an unclaimed endpoint.
    #[serde(default)]
    pub fingerprint: Vec<String>,
    /// Unclaimed when the CNAME target no longer resolves.
    #[serde(default)]
    pub nxdomain: bool,
}

impl FingerprintSignature {
    pub fn matches_target(&self, target: &str) -> bool {
        let target = target.trim_end_matches('.').to_ascii_lowercase();
        self.cname
            .iter()
            .filter(|p| !p.is_empty())
            .any(|p| target.contains(&p.to_ascii_lowercase()))
    }

    pub fn matches_body(&self, body: &str) -> bool {
        self.fingerprint.iter().filter(|f| !f.is_empty()).any(|f| body.contains(f.as_str()))
    }
}

/// Ordered, read-only signature set shared by every lookup of a run.
#[derive(Debug, Clone, Default)]
pub struct FingerprintDb {
    signatures: Vec<FingerprintSignature>,
}

impl FingerprintDb {
    pub fn new(signatures: Vec<FingerprintSignature>) -> Self {
        Self { signatures }
    }

    pub fn from_json(data: &str) -> serde_json::Result<Self> {
        let signatures: Vec<FingerprintSignature> = serde_json::from_str(data)?;
        Ok(Self::new(signatures))
    }

    pub async fn load(path: &Path) -> Result<Self, ScanError> {
        let fail = |message: String| ScanError::Fingerprints {
            path: path.display().to_string(),
            message,
        };
        let data = tokio::fs::read_to_string(path).await.map_err(|e| fail(e.to_string()))?;
        let db = Self::from_json(&data).map_err(|e| fail(e.to_string()))?;
        if db.is_empty() {
            return Err(fail("no signatures defined".to_string()));
        }
        Ok(db)
    }

    /// First signature, in file order, whose CNAME patterns match `target`.
    pub fn match_target(&self, target: &str) -> Option<&FingerprintSignature> {
        self.signatures.iter().find(|s| s.matches_target(target))
    }

    pub fn signatures(&self) -> &[FingerprintSignature] {
        &self.signatures
    }

    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }
}
