use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Optional ceiling on simultaneous fingerprint lookups.
#[derive(Debug, Clone, Default)]
pub struct InFlightLimit {
    semaphore: Option<Arc<Semaphore>>,
}

/// Held for the duration of one lookup; releases its slot on drop.
#[derive(Debug)]
pub struct LookupPermit {
    _permit: Option<OwnedSemaphorePermit>,
}

impl InFlightLimit {
    /// `None` leaves lookups unbounded. A limit of zero is raised to one.
    pub fn new(limit: Option<usize>) -> Self {
        Self {
            semaphore: limit.map(|l| Arc::new(Semaphore::new(l.max(1)))),
        }
    }

    pub fn unbounded() -> Self {
        Self::new(None)
    }

    pub async fn acquire(&self) -> LookupPermit {
        let permit = match &self.semaphore {
            // The semaphore is never closed, so acquisition only fails if that changes.
            Some(s) => s.clone().acquire_owned().await.ok(),
            None => None,
        };
        LookupPermit { _permit: permit }
    }
}
