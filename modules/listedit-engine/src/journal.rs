//! ActionJournal implementations.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::traits::ActionJournal;

/// An action as recorded in the journal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
    pub seq: i64,
    pub ts: DateTime<Utc>,
    pub action_type: String,
    pub payload: serde_json::Value,
}

// ---------------------------------------------------------------------------
// MemoryJournal
// ---------------------------------------------------------------------------

/// In-memory journal. Assigns incrementing sequence numbers. Thread-safe.
pub struct MemoryJournal {
    next_seq: AtomicI64,
    entries: Mutex<Vec<JournalEntry>>,
}

impl MemoryJournal {
    pub fn new() -> Self {
        Self {
            next_seq: AtomicI64::new(1),
            entries: Mutex::new(Vec::new()),
        }
    }

    /// Snapshot of every recorded entry, oldest first.
    pub fn entries(&self) -> Vec<JournalEntry> {
        match self.entries.lock() {
            Ok(entries) => entries.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Action type strings in dispatch order.
    pub fn action_types(&self) -> Vec<String> {
        self.entries().into_iter().map(|e| e.action_type).collect()
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryJournal {
    fn default() -> Self {
        Self::new()
    }
}

impl ActionJournal for MemoryJournal {
    fn record(&self, action_type: String, payload: serde_json::Value) -> Result<JournalEntry> {
        let entry = JournalEntry {
            seq: self.next_seq.fetch_add(1, Ordering::SeqCst),
            ts: Utc::now(),
            action_type,
            payload,
        };
        self.entries
            .lock()
            .map_err(|_| anyhow!("journal lock poisoned"))?
            .push(entry.clone());
        Ok(entry)
    }
}

// ---------------------------------------------------------------------------
// Arc<J> blanket — lets callers keep a handle for inspection
// ---------------------------------------------------------------------------

impl<J: ActionJournal + ?Sized> ActionJournal for Arc<J> {
    fn record(&self, action_type: String, payload: serde_json::Value) -> Result<JournalEntry> {
        (**self).record(action_type, payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sequence_numbers_start_at_one_and_increase() {
        let journal = MemoryJournal::new();
        let a = journal.record("a".into(), json!({})).unwrap();
        let b = journal.record("b".into(), json!({})).unwrap();

        assert_eq!(a.seq, 1);
        assert_eq!(b.seq, 2);
        assert_eq!(journal.action_types(), vec!["a", "b"]);
    }

    #[test]
    fn shared_handle_sees_records_made_through_arc() {
        let journal = Arc::new(MemoryJournal::new());
        let handle: Arc<MemoryJournal> = Arc::clone(&journal);

        handle.record("x".into(), json!({ "id": 1 })).unwrap();

        assert_eq!(journal.len(), 1);
        assert_eq!(journal.entries()[0].payload, json!({ "id": 1 }));
    }
}
