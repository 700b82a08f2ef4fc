//! Integration tests for the Store dispatch loop.

use std::sync::Arc;

use listedit_engine::{ActionLike, MemoryJournal, Reducer, Store};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Test action type
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
enum TestAction {
    Push { label: String },
    Clear,
}

impl ActionLike for TestAction {
    fn action_type_str(&self) -> String {
        match self {
            TestAction::Push { .. } => "test:push".into(),
            TestAction::Clear => "test:clear".into(),
        }
    }

    fn to_journal_payload(&self) -> serde_json::Value {
        serde_json::to_value(self).expect("TestAction serialization should never fail")
    }
}

// ---------------------------------------------------------------------------
// Test state + reducer
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Clone, PartialEq)]
struct TestState {
    labels: Vec<String>,
    clears: u32,
}

struct TestReducer;

impl Reducer<TestAction, TestState> for TestReducer {
    fn reduce(&self, state: &TestState, action: &TestAction) -> TestState {
        match action {
            TestAction::Push { label } => {
                let mut labels = state.labels.clone();
                labels.push(label.clone());
                TestState {
                    labels,
                    ..state.clone()
                }
            }
            TestAction::Clear => TestState {
                labels: Vec::new(),
                clears: state.clears + 1,
            },
        }
    }
}

type TestStore = Store<TestAction, TestState, TestReducer, Arc<MemoryJournal>>;

fn test_store() -> (TestStore, Arc<MemoryJournal>) {
    let journal = Arc::new(MemoryJournal::new());
    let store = Store::new(TestReducer, Arc::clone(&journal), TestState::default());
    (store, journal)
}

fn push(label: &str) -> TestAction {
    TestAction::Push {
        label: label.into(),
    }
}

// =========================================================================
// Tests
// =========================================================================

#[test]
fn dispatch_returns_and_publishes_reduced_state() {
    let (store, _) = test_store();

    let returned = store.dispatch(push("a"));

    assert_eq!(returned.labels, vec!["a"]);
    assert_eq!(*store.state(), *returned);
}

#[test]
fn earlier_snapshots_are_not_mutated() {
    let (store, _) = test_store();
    let before = store.dispatch(push("a"));

    store.dispatch(push("b"));
    store.dispatch(TestAction::Clear);

    assert_eq!(before.labels, vec!["a"]);
    assert!(store.state().labels.is_empty());
    assert_eq!(store.state().clears, 1);
}

#[test]
fn journal_records_actions_in_dispatch_order() {
    let (store, journal) = test_store();

    store.dispatch(push("a"));
    store.dispatch(TestAction::Clear);
    store.dispatch(push("b"));

    assert_eq!(
        journal.action_types(),
        vec!["test:push", "test:clear", "test:push"]
    );
    let entries = journal.entries();
    assert_eq!(entries[0].payload["label"], "a");
    assert!(entries.windows(2).all(|w| w[0].seq < w[1].seq));
}

#[tokio::test]
async fn late_subscriber_sees_latest_state_first() {
    let (store, _) = test_store();
    store.dispatch(push("a"));
    store.dispatch(push("b"));

    let rx = store.subscribe();

    assert_eq!(rx.borrow().labels, vec!["a", "b"]);
}

#[tokio::test]
async fn subscriber_is_notified_of_later_dispatches() {
    let (store, _) = test_store();
    let mut rx = store.subscribe();

    store.dispatch(push("a"));

    rx.changed().await.unwrap();
    assert_eq!(rx.borrow_and_update().labels, vec!["a"]);
}

#[tokio::test]
async fn wait_for_resolves_once_predicate_holds() {
    let (store, _) = test_store();
    let store = Arc::new(store);

    let waiter = {
        let store = Arc::clone(&store);
        tokio::spawn(async move { store.wait_for(|s| s.labels.len() == 2).await })
    };

    store.dispatch(push("a"));
    store.dispatch(push("b"));

    let state = waiter.await.unwrap().unwrap();
    assert_eq!(state.labels, vec!["a", "b"]);
}

#[tokio::test]
async fn wait_for_is_immediate_when_already_satisfied() {
    let (store, _) = test_store();
    store.dispatch(push("a"));

    let state = store.wait_for(|s| !s.labels.is_empty()).await.unwrap();
    assert_eq!(state.labels, vec!["a"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_dispatches_never_lose_updates() {
    let (store, journal) = test_store();
    let store = Arc::new(store);

    let tasks: Vec<_> = (0..50)
        .map(|i| {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                store.dispatch(push(&format!("item-{i}")));
            })
        })
        .collect();
    for task in tasks {
        task.await.unwrap();
    }

    assert_eq!(store.state().labels.len(), 50);
    assert_eq!(journal.len(), 50);
}
