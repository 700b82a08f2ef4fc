//! Action dispatch engine.
//!
//! Provides a generic state store: journal → reduce → publish. State is
//! replaced wholesale on every dispatch and published to subscribers, who
//! always see the latest snapshot first.
//!
//! Consumers define their domain by implementing `ActionLike` (the closed set
//! of transitions) and `Reducer` (pure state derivation).

pub mod journal;
pub mod store;
pub mod traits;

pub use journal::{JournalEntry, MemoryJournal};
pub use store::Store;
pub use traits::{ActionJournal, ActionLike, Reducer};
