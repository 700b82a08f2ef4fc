//! Save pipeline: diff → optimistic dispatch → remote persist → reconcile.
//!
//! Each save runs as its own task and suspends only on the remote call (and,
//! under `SaveOrdering::PerItem`, on the previous save of the same item).
//! Reconciliation goes through `Action::ApplyChanges`, so it merges into the
//! state current at arrival time and never into the snapshot captured when
//! the save started.
//!
//! Diffs are taken against the last value the remote store confirmed for an
//! item, not against local state. Local state already holds optimistic values
//! that may never have reached the remote store.

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use futures::FutureExt;
use listedit_common::{
    ApplicationState, Item, ItemId, PartialItem, RemoteError, SaveOrdering, ServerConfirmedItem,
};
use listedit_engine::{MemoryJournal, Store};
use tokio::sync::{broadcast, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::actions::Action;
use crate::diff::diff_against;
use crate::reducer::ItemReducer;
use crate::remote::RemoteStore;

/// The store every editor component shares.
pub type EditorStore = Store<Action, ApplicationState, ItemReducer, Arc<MemoryJournal>>;

/// Correlates a save request with its outcome and log lines.
pub type SaveId = Uuid;

/// How a single save ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The remote store accepted the diff and the confirmation was reconciled.
    Confirmed {
        save_id: SaveId,
        item: ServerConfirmedItem,
    },
    /// The remote store failed. The optimistic value stays in place.
    Failed {
        save_id: SaveId,
        item_id: ItemId,
        error: RemoteError,
    },
}

impl SaveOutcome {
    pub fn save_id(&self) -> SaveId {
        match self {
            Self::Confirmed { save_id, .. } | Self::Failed { save_id, .. } => *save_id,
        }
    }

    pub fn item_id(&self) -> ItemId {
        match self {
            Self::Confirmed { item, .. } => item.id,
            Self::Failed { item_id, .. } => *item_id,
        }
    }

    pub fn is_confirmed(&self) -> bool {
        matches!(self, Self::Confirmed { .. })
    }
}

/// Latest failed save for an item, kept until a save requested after it
/// confirms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveFailure {
    pub save_id: SaveId,
    /// Request order of the failed save.
    pub seq: u64,
    pub error: RemoteError,
    pub at: DateTime<Utc>,
}

/// Caller's handle on one in-flight save.
pub struct SaveHandle {
    save_id: SaveId,
    item_id: ItemId,
    done: oneshot::Receiver<SaveOutcome>,
}

impl SaveHandle {
    pub fn save_id(&self) -> SaveId {
        self.save_id
    }

    pub fn item_id(&self) -> ItemId {
        self.item_id
    }

    /// Wait for the save to finish.
    pub async fn outcome(self) -> SaveOutcome {
        match self.done.await {
            Ok(outcome) => outcome,
            Err(_) => SaveOutcome::Failed {
                save_id: self.save_id,
                item_id: self.item_id,
                error: RemoteError::Aborted("save task dropped its result".to_string()),
            },
        }
    }
}

/// What the pipeline knows about one item's remote copy.
#[derive(Debug, Default)]
struct RemoteRecord {
    /// Last value the remote store confirmed.
    accepted: Option<Item>,
    /// Sequence of the newest confirmed save.
    confirmed_seq: u64,
    failure: Option<SaveFailure>,
}

impl RemoteRecord {
    fn seeded(item: Item) -> Self {
        Self {
            accepted: Some(item),
            ..Self::default()
        }
    }

    /// Fold a confirmed diff into the accepted value. Applied in confirmation
    /// order, so a late older confirmation leaves its value here and the next
    /// save of the newer value sends it again.
    fn accept(&mut self, sent: &PartialItem, confirmed: &ServerConfirmedItem) {
        if let Some(item) = self.accepted.as_mut() {
            if let Some(name) = &sent.name {
                item.name = name.clone();
            }
            item.modified_at = confirmed.modified_at;
        } else if let Some(name) = &sent.name {
            self.accepted = Some(Item::new(sent.id, name.clone(), confirmed.modified_at));
        }
    }
}

pub struct SavePipeline<R: RemoteStore> {
    store: Arc<EditorStore>,
    remote: Arc<R>,
    ordering: SaveOrdering,
    next_seq: AtomicU64,
    /// Last spawned save per item, awaited by the next one under `PerItem`.
    tails: Mutex<HashMap<ItemId, JoinHandle<()>>>,
    records: Mutex<HashMap<ItemId, RemoteRecord>>,
    outcomes: broadcast::Sender<SaveOutcome>,
    in_flight: watch::Sender<usize>,
}

impl<R: RemoteStore> SavePipeline<R> {
    pub fn new(
        store: Arc<EditorStore>,
        remote: Arc<R>,
        ordering: SaveOrdering,
        outcome_buffer: usize,
    ) -> Self {
        let (outcomes, _) = broadcast::channel(outcome_buffer.max(1));
        let (in_flight, _) = watch::channel(0);
        // Whatever the editor starts with is taken to be what the remote holds
        let records = store
            .state()
            .items
            .iter()
            .map(|item| (item.id, RemoteRecord::seeded(item.clone())))
            .collect();
        Self {
            store,
            remote,
            ordering,
            next_seq: AtomicU64::new(0),
            tails: Mutex::new(HashMap::new()),
            records: Mutex::new(records),
            outcomes,
            in_flight,
        }
    }

    /// Start saving `item`. The optimistic update is visible in the store by
    /// the time this returns; the remote round-trip continues in the
    /// background.
    pub fn save(self: &Arc<Self>, item: Item) -> SaveHandle {
        let save_id = Uuid::new_v4();
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed) + 1;
        let item_id = item.id;

        // 1. Diff against what the remote store last accepted
        let diff = {
            let records = lock(&self.records);
            let accepted = records.get(&item_id).and_then(|r| r.accepted.as_ref());
            diff_against(accepted, &item)
        };

        // 2. Optimistic apply
        self.store.dispatch(Action::save_item(item));
        info!(
            save_id = %save_id,
            seq,
            item_id,
            changed_name = diff.name.is_some(),
            "Applied optimistic save"
        );

        // 3 + 4. Persist and reconcile in the background
        self.in_flight.send_modify(|n| *n += 1);
        let (done_tx, done_rx) = oneshot::channel();

        match self.ordering {
            SaveOrdering::Concurrent => {
                tokio::spawn(Arc::clone(self).run(save_id, seq, diff, None, done_tx));
            }
            SaveOrdering::PerItem => {
                let mut tails = lock(&self.tails);
                let previous = tails.remove(&item_id);
                let handle =
                    tokio::spawn(Arc::clone(self).run(save_id, seq, diff, previous, done_tx));
                tails.insert(item_id, handle);
            }
        }

        SaveHandle {
            save_id,
            item_id,
            done: done_rx,
        }
    }

    async fn run(
        self: Arc<Self>,
        save_id: SaveId,
        seq: u64,
        diff: PartialItem,
        previous: Option<JoinHandle<()>>,
        done: oneshot::Sender<SaveOutcome>,
    ) {
        let item_id = diff.id;

        if let Some(previous) = previous {
            debug!(save_id = %save_id, item_id, "Waiting for earlier save of the same item");
            if let Err(e) = previous.await {
                warn!(save_id = %save_id, item_id, error = %e, "Earlier save task ended abnormally");
            }
        }

        let result = AssertUnwindSafe(self.remote.persist(diff.clone()))
            .catch_unwind()
            .await
            .unwrap_or_else(|_| Err(RemoteError::Aborted("remote store panicked".to_string())));

        let outcome = match result {
            Ok(confirmed) => {
                self.store.dispatch(Action::apply_changes(confirmed.clone()));
                self.record_confirmation(seq, &diff, &confirmed);
                info!(
                    save_id = %save_id,
                    item_id,
                    modified_at = %confirmed.modified_at,
                    "Reconciled save"
                );
                SaveOutcome::Confirmed {
                    save_id,
                    item: confirmed,
                }
            }
            Err(error) => {
                warn!(save_id = %save_id, item_id, error = %error, "Save failed, keeping local value");
                self.record_failure(
                    item_id,
                    SaveFailure {
                        save_id,
                        seq,
                        error: error.clone(),
                        at: Utc::now(),
                    },
                );
                SaveOutcome::Failed {
                    save_id,
                    item_id,
                    error,
                }
            }
        };

        // No subscribers is fine; the handle still gets the outcome.
        let _ = self.outcomes.send(outcome.clone());
        self.in_flight.send_modify(|n| *n = n.saturating_sub(1));
        // A dropped handle is fine; subscribers already got the outcome.
        let _ = done.send(outcome);
    }

    fn record_confirmation(
        &self,
        seq: u64,
        sent: &PartialItem,
        confirmed: &ServerConfirmedItem,
    ) {
        let mut records = lock(&self.records);
        let record = records.entry(sent.id).or_default();
        record.accept(sent, confirmed);
        record.confirmed_seq = record.confirmed_seq.max(seq);
        // Only a save requested after the failure resolves it
        if record.failure.as_ref().is_some_and(|f| f.seq < seq) {
            record.failure = None;
        }
    }

    fn record_failure(&self, item_id: ItemId, failure: SaveFailure) {
        let mut records = lock(&self.records);
        let record = records.entry(item_id).or_default();
        let superseded = record.confirmed_seq > failure.seq
            || record.failure.as_ref().is_some_and(|f| f.seq > failure.seq);
        if superseded {
            debug!(
                save_id = %failure.save_id,
                item_id,
                "Newer save already settled, not recording failure"
            );
        } else {
            record.failure = Some(failure);
        }
    }

    /// Receive every save outcome from now on.
    pub fn subscribe_outcomes(&self) -> broadcast::Receiver<SaveOutcome> {
        self.outcomes.subscribe()
    }

    /// Latest unresolved failure per item.
    pub fn failures(&self) -> HashMap<ItemId, SaveFailure> {
        lock(&self.records)
            .iter()
            .filter_map(|(id, record)| Some((*id, record.failure.clone()?)))
            .collect()
    }

    /// Number of saves that have not produced an outcome yet.
    pub fn in_flight(&self) -> usize {
        *self.in_flight.borrow()
    }

    /// Wait until every started save has produced its outcome.
    pub async fn settle(&self) {
        let mut rx = self.in_flight.subscribe();
        // The sender lives in `self`, so the channel cannot close under us.
        let _ = rx.wait_for(|n| *n == 0).await;
    }

    pub fn remote(&self) -> &Arc<R> {
        &self.remote
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
