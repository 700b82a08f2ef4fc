//! Pure state derivation for the list editor.
//!
//! Items are addressed by id, never by position, so a reconciliation that
//! arrives late merges into whatever the item looks like now.

use listedit_common::{ApplicationState, Item, ItemId, ServerConfirmedItem};
use listedit_engine::Reducer;

use crate::actions::Action;

pub struct ItemReducer;

impl Reducer<Action, ApplicationState> for ItemReducer {
    fn reduce(&self, state: &ApplicationState, action: &Action) -> ApplicationState {
        reduce(state, action)
    }
}

pub fn reduce(state: &ApplicationState, action: &Action) -> ApplicationState {
    match action {
        // Unknown ids are accepted; the row simply never renders as editing.
        Action::EditItem { id } => ApplicationState {
            editing_id: Some(*id),
            ..state.clone()
        },
        Action::SaveItem { item } => ApplicationState {
            items: map_item(&state.items, item.id, |_| item.clone()),
            ..state.clone()
        },
        Action::ApplyChanges { item } => ApplicationState {
            items: map_item(&state.items, item.id, |current| apply_changes(current, item)),
            ..state.clone()
        },
    }
}

/// Merge a server confirmation into a local item. Only the timestamp moves;
/// the local name always survives.
pub fn apply_changes(current: &Item, confirmed: &ServerConfirmedItem) -> Item {
    Item {
        modified_at: confirmed.modified_at,
        ..current.clone()
    }
}

fn map_item<F>(items: &[Item], id: ItemId, f: F) -> Vec<Item>
where
    F: Fn(&Item) -> Item,
{
    items
        .iter()
        .map(|it| if it.id == id { f(it) } else { it.clone() })
        .collect()
}
