use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Stable identity of an item. Never reassigned after creation.
pub type ItemId = i64;

// --- Entities ---

/// A named record as held in local state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub modified_at: DateTime<Utc>,
}

impl Item {
    pub fn new(id: ItemId, name: impl Into<String>, modified_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name: name.into(),
            modified_at,
        }
    }

    /// Copy of this item with a new name. `modified_at` is left alone:
    /// only the server assigns timestamps.
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }
}

/// Payload sent to the remote store: identity plus whichever fields changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialItem {
    pub id: ItemId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<DateTime<Utc>>,
}

impl PartialItem {
    /// A diff carrying identity only.
    pub fn identity(id: ItemId) -> Self {
        Self {
            id,
            name: None,
            modified_at: None,
        }
    }

    /// True when no field besides `id` is present.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.modified_at.is_none()
    }
}

impl From<Item> for PartialItem {
    fn from(item: Item) -> Self {
        Self {
            id: item.id,
            name: Some(item.name),
            modified_at: Some(item.modified_at),
        }
    }
}

/// The remote store's answer to a save. Never echoes `name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfirmedItem {
    pub id: ItemId,
    pub modified_at: DateTime<Utc>,
}

// --- Application state ---

/// Whole-editor state. Replaced on every dispatch, never mutated in place.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationState {
    /// Display order. Fixed length, unique ids.
    pub items: Vec<Item>,
    /// The item currently in edit mode, if any.
    pub editing_id: Option<ItemId>,
}

impl ApplicationState {
    pub fn new(items: Vec<Item>) -> Self {
        Self {
            items,
            editing_id: None,
        }
    }

    /// Startup state built from the demo seed records.
    pub fn seeded() -> Self {
        Self::new(seed_items())
    }

    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|it| it.id == id)
    }

    pub fn is_editing(&self, id: ItemId) -> bool {
        self.editing_id.map_or(false, |editing| editing == id)
    }

    /// The item in edit mode, when `editing_id` points at a known item.
    pub fn editing_item(&self) -> Option<&Item> {
        self.editing_id.and_then(|id| self.item(id))
    }

    /// Rendering projection: one row per item, in display order.
    pub fn rows(&self) -> Vec<RowView> {
        self.items
            .iter()
            .map(|item| RowView {
                item: item.clone(),
                editing: self.is_editing(item.id),
            })
            .collect()
    }
}

/// What the presentation layer needs to draw one row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowView {
    pub item: Item,
    pub editing: bool,
}

// --- Seed data ---

/// 2018-12-31T23:59:59.999Z
const SEED_MODIFIED_AT_MS: i64 = 1_546_300_799_999;

pub fn seed_modified_at() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH + Duration::milliseconds(SEED_MODIFIED_AT_MS)
}

pub fn seed_items() -> Vec<Item> {
    let modified_at = seed_modified_at();
    [
        (1, "Milk Chocolate"),
        (2, "Dark Chocolate"),
        (3, "White Chocolate"),
        (4, "Raw Chocolate"),
        (5, "Chocolate Milk"),
    ]
    .into_iter()
    .map(|(id, name)| Item::new(id, name, modified_at))
    .collect()
}
