//! Reducer properties checked through a real store.
//!
//! - every seeded item can be replaced without touching its neighbours
//! - reconciliation never changes a name
//! - a reconciliation for an older save never resurrects its name

use std::sync::Arc;

use chrono::Duration;
use listedit_common::{seed_modified_at, ApplicationState, ServerConfirmedItem};
use listedit_editor::{reducer::reduce, Action, EditorStore, ItemReducer};
use listedit_engine::{MemoryJournal, Store};

fn seeded_store() -> EditorStore {
    Store::new(
        ItemReducer,
        Arc::new(MemoryJournal::new()),
        ApplicationState::seeded(),
    )
}

fn confirmation(id: i64, seconds_after_seed: i64) -> ServerConfirmedItem {
    ServerConfirmedItem {
        id,
        modified_at: seed_modified_at() + Duration::seconds(seconds_after_seed),
    }
}

#[test]
fn save_touches_only_the_matching_item_for_every_id() {
    let state = ApplicationState::seeded();

    for (idx, item) in state.items.iter().enumerate() {
        let next = reduce(&state, &Action::save_item(item.renamed("changed")));

        for (other_idx, (before, after)) in state.items.iter().zip(&next.items).enumerate() {
            if other_idx == idx {
                assert_eq!(after.name, "changed");
                assert_eq!(after.id, before.id);
            } else {
                assert_eq!(after, before);
            }
        }
        let ids: Vec<_> = next.items.iter().map(|it| it.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }
}

#[test]
fn apply_changes_never_alters_names() {
    let mut state = ApplicationState::seeded();
    state.items[1] = state.items[1].renamed("locally edited");

    for (n, item) in state.items.iter().enumerate() {
        let next = reduce(&state, &Action::apply_changes(confirmation(item.id, n as i64 + 1)));
        let names: Vec<_> = next.items.iter().map(|it| it.name.as_str()).collect();
        let expected: Vec<_> = state.items.iter().map(|it| it.name.as_str()).collect();
        assert_eq!(names, expected);
    }
}

#[test]
fn stale_confirmation_does_not_restore_older_name() {
    let store = seeded_store();
    let original = store.state().item(1).unwrap().clone();

    store.dispatch(Action::save_item(original.renamed("A")));
    store.dispatch(Action::save_item(original.renamed("B")));
    let state = store.dispatch(Action::apply_changes(confirmation(1, 10)));

    let item = state.item(1).unwrap();
    assert_eq!(item.name, "B");
    assert_eq!(item.modified_at, confirmation(1, 10).modified_at);
}

#[test]
fn unknown_id_leaves_items_unchanged() {
    let store = seeded_store();
    let ghost = listedit_common::Item::new(9999, "Ghost", seed_modified_at());

    store.dispatch(Action::save_item(ghost));
    store.dispatch(Action::apply_changes(confirmation(9999, 1)));

    assert_eq!(store.state().items, ApplicationState::seeded().items);
}

#[test]
fn journal_payloads_describe_each_transition() {
    let store = seeded_store();

    store.dispatch(Action::edit_item(1));
    store.dispatch(Action::apply_changes(confirmation(1, 1)));

    let entries = store.journal().entries();
    assert_eq!(entries[0].payload["type"], "edit_item");
    assert_eq!(entries[0].payload["id"], 1);
    assert_eq!(entries[1].payload["type"], "apply_changes");
    assert_eq!(entries[1].payload["item"]["id"], 1);
    assert!(entries[1].payload["item"].get("modifiedAt").is_some());
}
