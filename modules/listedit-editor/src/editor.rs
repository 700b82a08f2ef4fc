//! Presentation boundary.
//!
//! `Editor` owns the store and the save pipeline and is the only thing a
//! front end talks to: it takes raw intents (`request_edit`, `request_save`)
//! and hands out state snapshots and row projections.

use std::collections::HashMap;
use std::sync::Arc;

use listedit_common::{ApplicationState, Config, Item, ItemId, RowView};
use listedit_engine::{MemoryJournal, Store};
use tokio::sync::{broadcast, watch};
use tracing::debug;

use crate::actions::Action;
use crate::reducer::ItemReducer;
use crate::remote::{RemoteStore, SimulatedRemoteStore};
use crate::save::{EditorStore, SaveFailure, SaveHandle, SaveOutcome, SavePipeline};

pub struct Editor<R: RemoteStore = SimulatedRemoteStore> {
    store: Arc<EditorStore>,
    journal: Arc<MemoryJournal>,
    pipeline: Arc<SavePipeline<R>>,
}

impl Editor<SimulatedRemoteStore> {
    /// Seeded editor backed by the simulated remote store.
    pub fn from_config(config: &Config) -> Self {
        let remote = SimulatedRemoteStore::new(config.save_delay);
        Self::new(ApplicationState::seeded(), remote, config)
    }
}

impl<R: RemoteStore> Editor<R> {
    pub fn new(initial: ApplicationState, remote: R, config: &Config) -> Self {
        let journal = Arc::new(MemoryJournal::new());
        let store = Arc::new(Store::new(ItemReducer, Arc::clone(&journal), initial));
        let pipeline = Arc::new(SavePipeline::new(
            Arc::clone(&store),
            Arc::new(remote),
            config.save_ordering,
            config.outcome_buffer,
        ));
        Self {
            store,
            journal,
            pipeline,
        }
    }

    // --- Intents ---

    /// Put an item into edit mode.
    pub fn request_edit(&self, id: ItemId) -> Arc<ApplicationState> {
        debug!(item_id = id, "Edit requested");
        self.store.dispatch(Action::edit_item(id))
    }

    /// Save an edited item. The new value is in `state()` when this returns.
    pub fn request_save(&self, item: Item) -> SaveHandle {
        self.pipeline.save(item)
    }

    /// Rename whichever item is in edit mode. `None` when nothing is being
    /// edited or the editing id is unknown.
    pub fn save_editing(&self, name: impl Into<String>) -> Option<SaveHandle> {
        let edited = self.store.state().editing_item()?.renamed(name);
        Some(self.request_save(edited))
    }

    // --- Projections ---

    pub fn state(&self) -> Arc<ApplicationState> {
        self.store.state()
    }

    pub fn rows(&self) -> Vec<RowView> {
        self.store.state().rows()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<ApplicationState>> {
        self.store.subscribe()
    }

    pub fn subscribe_outcomes(&self) -> broadcast::Receiver<SaveOutcome> {
        self.pipeline.subscribe_outcomes()
    }

    pub fn failures(&self) -> HashMap<ItemId, SaveFailure> {
        self.pipeline.failures()
    }

    pub fn in_flight(&self) -> usize {
        self.pipeline.in_flight()
    }

    /// Wait for every in-flight save to produce its outcome.
    pub async fn settle(&self) {
        self.pipeline.settle().await
    }

    pub fn journal(&self) -> &MemoryJournal {
        &self.journal
    }

    pub fn remote(&self) -> &R {
        self.pipeline.remote()
    }
}
