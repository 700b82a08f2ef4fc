//! Core traits for the dispatch engine.

use anyhow::Result;

use crate::journal::JournalEntry;

/// Actions carry a type string and know how to serialize for the journal.
pub trait ActionLike: Clone + Send + Sync + 'static {
    /// Stable type string recorded in the journal (`"save_item"`).
    fn action_type_str(&self) -> String;

    /// Serialize this action to the JSON payload stored in the journal.
    fn to_journal_payload(&self) -> serde_json::Value;
}

/// Pure state derivation. No I/O, no side effects.
///
/// Takes the previous state by reference and returns its replacement, so the
/// previous snapshot stays valid for anyone still holding it.
pub trait Reducer<A: ActionLike, S>: Send + Sync {
    fn reduce(&self, state: &S, action: &A) -> S;
}

/// Records dispatched actions with sequence numbers.
///
/// Called while the store holds its write lock, so journal order is
/// reduction order. Implemented by `MemoryJournal` and by `Arc<J>`.
pub trait ActionJournal: Send + Sync {
    fn record(&self, action_type: String, payload: serde_json::Value) -> Result<JournalEntry>;
}
