//! The closed set of state transitions.

use listedit_common::{Item, ItemId, ServerConfirmedItem};
use listedit_engine::ActionLike;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// Put `id` into edit mode.
    EditItem { id: ItemId },
    /// Optimistic local update, before the remote store has answered.
    SaveItem { item: Item },
    /// Merge the remote store's confirmation into the matching item.
    ApplyChanges { item: ServerConfirmedItem },
}

impl Action {
    pub fn edit_item(id: ItemId) -> Self {
        Self::EditItem { id }
    }

    pub fn save_item(item: Item) -> Self {
        Self::SaveItem { item }
    }

    pub fn apply_changes(item: ServerConfirmedItem) -> Self {
        Self::ApplyChanges { item }
    }
}

impl ActionLike for Action {
    fn action_type_str(&self) -> String {
        match self {
            Self::EditItem { .. } => "edit_item".into(),
            Self::SaveItem { .. } => "save_item".into(),
            Self::ApplyChanges { .. } => "apply_changes".into(),
        }
    }

    fn to_journal_payload(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_else(|e| {
            serde_json::json!({ "type": self.action_type_str(), "error": e.to_string() })
        })
    }
}
