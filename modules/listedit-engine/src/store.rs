//! The dispatch loop.

use std::marker::PhantomData;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::traits::{ActionJournal, ActionLike, Reducer};

/// Generic state store.
///
/// Journal → reduce → publish, all under the channel's write lock, so
/// dispatches never interleave and apply in the order they were issued.
/// Subscribers always observe the latest published state first.
pub struct Store<A, S, Red, J>
where
    A: ActionLike,
    S: Send + Sync + 'static,
    Red: Reducer<A, S>,
    J: ActionJournal,
{
    reducer: Red,
    journal: J,
    state: watch::Sender<Arc<S>>,
    _phantom: PhantomData<fn() -> A>,
}

impl<A, S, Red, J> Store<A, S, Red, J>
where
    A: ActionLike,
    S: Send + Sync + 'static,
    Red: Reducer<A, S>,
    J: ActionJournal,
{
    pub fn new(reducer: Red, journal: J, initial: S) -> Self {
        let (state, _) = watch::channel(Arc::new(initial));
        Self {
            reducer,
            journal,
            state,
            _phantom: PhantomData,
        }
    }

    /// Apply an action synchronously and publish the resulting state.
    /// Returns the state the action produced.
    pub fn dispatch(&self, action: A) -> Arc<S> {
        let mut published = None;

        self.state.send_modify(|current| {
            // 1. Journal (observability only; a failing journal never blocks state)
            let action_type = action.action_type_str();
            match self
                .journal
                .record(action_type.clone(), action.to_journal_payload())
            {
                Ok(entry) => debug!(seq = entry.seq, action_type = %action_type, "Dispatched action"),
                Err(e) => warn!(error = %e, action_type = %action_type, "Failed to journal action"),
            }

            // 2. Reduce into a fresh snapshot
            let next = Arc::new(self.reducer.reduce(current, &action));

            // 3. Publish
            *current = Arc::clone(&next);
            published = Some(next);
        });

        published.unwrap_or_else(|| self.state())
    }

    /// Latest published state.
    pub fn state(&self) -> Arc<S> {
        Arc::clone(&self.state.borrow())
    }

    /// Receiver that starts at the latest state and sees every later one.
    pub fn subscribe(&self) -> watch::Receiver<Arc<S>> {
        self.state.subscribe()
    }

    /// Wait until the published state satisfies `predicate`. Resolves
    /// immediately when the current state already does.
    pub async fn wait_for<F>(&self, mut predicate: F) -> Result<Arc<S>>
    where
        F: FnMut(&S) -> bool,
    {
        let mut rx = self.subscribe();
        let state = rx
            .wait_for(|state| predicate(&**state))
            .await
            .map_err(|_| anyhow!("store closed while waiting for state"))?;
        Ok(Arc::clone(&state))
    }

    /// Read-only access to the journal.
    pub fn journal(&self) -> &J {
        &self.journal
    }
}
