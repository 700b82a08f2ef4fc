//! Per-field diffs for the remote store.

use listedit_common::{Item, PartialItem};

/// Fields of `edited` that differ from `stored`, plus identity.
pub fn diff(stored: &Item, edited: &Item) -> PartialItem {
    PartialItem {
        id: edited.id,
        name: (stored.name != edited.name).then(|| edited.name.clone()),
        modified_at: (stored.modified_at != edited.modified_at).then_some(edited.modified_at),
    }
}

/// Diff `edited` against the last value the remote store accepted for it.
/// Items the remote store has never confirmed are sent whole.
pub fn diff_against(accepted: Option<&Item>, edited: &Item) -> PartialItem {
    match accepted {
        Some(stored) => diff(stored, edited),
        None => PartialItem::from(edited.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use listedit_common::{seed_modified_at, ApplicationState};

    #[test]
    fn rename_carries_only_the_name() {
        let stored = Item::new(1, "Milk Chocolate", seed_modified_at());
        let edited = stored.renamed("Milk Choc 2");

        assert_eq!(
            diff(&stored, &edited),
            PartialItem {
                id: 1,
                name: Some("Milk Choc 2".into()),
                modified_at: None,
            }
        );
    }

    #[test]
    fn unchanged_item_diffs_to_identity() {
        let stored = Item::new(1, "Milk Chocolate", seed_modified_at());
        assert!(diff(&stored, &stored.clone()).is_empty());
    }

    #[test]
    fn changed_timestamp_is_included() {
        let stored = Item::new(2, "Dark Chocolate", seed_modified_at());
        let edited = Item {
            modified_at: seed_modified_at() + Duration::seconds(1),
            ..stored.clone()
        };

        let d = diff(&stored, &edited);
        assert_eq!(d.name, None);
        assert_eq!(d.modified_at, Some(edited.modified_at));
    }

    #[test]
    fn unknown_item_is_sent_whole() {
        let stray = Item::new(42, "Hazelnut", seed_modified_at());

        assert_eq!(diff_against(None, &stray), PartialItem::from(stray));
    }

    #[test]
    fn known_item_is_diffed_against_accepted_value() {
        let state = ApplicationState::seeded();
        let edited = state.items[4].renamed("Hot Chocolate");

        let d = diff_against(state.item(5), &edited);
        assert_eq!(d.id, 5);
        assert_eq!(d.name.as_deref(), Some("Hot Chocolate"));
        assert_eq!(d.modified_at, None);
    }
}
