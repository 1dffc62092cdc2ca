pub mod config;
pub mod errors;
pub mod fingerprint;
pub mod http_client;
pub mod report;
pub mod scan;
pub mod zones;

// re-export types used in tests
pub use crate::errors::{OracleError, ProviderError, ScanError};
pub use crate::report::ScanFinding;
