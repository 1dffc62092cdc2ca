pub mod dispatcher;
pub mod limiter;

pub use dispatcher::{ScanSummary, Scanner};
pub use limiter::InFlightLimit;
