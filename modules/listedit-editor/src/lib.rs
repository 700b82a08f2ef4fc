//! Inline list editor core.
//!
//! User intents become `Action`s, `ItemReducer` derives each new
//! `ApplicationState`, and `SavePipeline` turns a save intent into an
//! optimistic dispatch, a remote persist, and a reconciliation dispatch.

pub mod actions;
pub mod diff;
pub mod editor;
pub mod reducer;
pub mod remote;
pub mod save;
pub mod terminal;

pub use actions::Action;
pub use editor::Editor;
pub use reducer::ItemReducer;
pub use remote::{RemoteStore, SimulatedRemoteStore};
pub use save::{EditorStore, SaveFailure, SaveHandle, SaveId, SaveOutcome, SavePipeline};
