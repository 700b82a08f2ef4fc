//! Remote store boundary and its simulated implementation.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use listedit_common::{PartialItem, RemoteError, ServerConfirmedItem};
use tracing::{debug, warn};

/// Persists item diffs and answers with the server's timestamp.
#[async_trait]
pub trait RemoteStore: Send + Sync + 'static {
    async fn persist(&self, diff: PartialItem) -> Result<ServerConfirmedItem, RemoteError>;
}

#[async_trait]
impl<R: RemoteStore + ?Sized> RemoteStore for Arc<R> {
    async fn persist(&self, diff: PartialItem) -> Result<ServerConfirmedItem, RemoteError> {
        (**self).persist(diff).await
    }
}

// ---------------------------------------------------------------------------
// SimulatedRemoteStore
// ---------------------------------------------------------------------------

/// Stand-in remote store: answers after a fixed delay with a fresh,
/// strictly increasing server timestamp.
pub struct SimulatedRemoteStore {
    delay: Duration,
    last_issued: Mutex<Option<DateTime<Utc>>>,
    received: Mutex<Vec<PartialItem>>,
    fail_next: AtomicUsize,
}

impl SimulatedRemoteStore {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_issued: Mutex::new(None),
            received: Mutex::new(Vec::new()),
            fail_next: AtomicUsize::new(0),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Every diff received so far, in arrival order.
    pub fn received(&self) -> Vec<PartialItem> {
        match self.received.lock() {
            Ok(received) => received.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Make the next `n` persist calls fail with `RemoteError::Unavailable`.
    pub fn fail_next(&self, n: usize) {
        self.fail_next.store(n, Ordering::SeqCst);
    }

    fn record(&self, diff: PartialItem) {
        match self.received.lock() {
            Ok(mut received) => received.push(diff),
            Err(poisoned) => poisoned.into_inner().push(diff),
        }
    }

    fn take_failure(&self) -> bool {
        self.fail_next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    fn issue_timestamp(&self) -> DateTime<Utc> {
        let now = Utc::now();
        let mut last = match self.last_issued.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let issued = match *last {
            Some(prev) if now <= prev => prev + chrono::Duration::milliseconds(1),
            _ => now,
        };
        *last = Some(issued);
        issued
    }
}

#[async_trait]
impl RemoteStore for SimulatedRemoteStore {
    async fn persist(&self, diff: PartialItem) -> Result<ServerConfirmedItem, RemoteError> {
        let id = diff.id;
        self.record(diff);
        let fail = self.take_failure();

        tokio::time::sleep(self.delay).await;

        if fail {
            warn!(item_id = id, "Simulated remote store failure");
            return Err(RemoteError::Unavailable(format!(
                "simulated outage while saving item {id}"
            )));
        }

        let confirmed = ServerConfirmedItem {
            id,
            modified_at: self.issue_timestamp(),
        };
        debug!(item_id = id, modified_at = %confirmed.modified_at, "Remote store confirmed save");
        Ok(confirmed)
    }
}
