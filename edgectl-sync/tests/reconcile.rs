//! End-to-end reconciliation behaviour against a stateful stub remote.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use rstest::rstest;

use edgectl_sync::{
    Change, DictionaryTarget, Item, LocalSource, Reconciler, RemoteDictionary, RemoteError,
    SourceError, SyncError, SyncOutcome,
};

// ---------------------------------------------------------------------------
// Stubs
// ---------------------------------------------------------------------------

/// In-memory remote dictionary. Applies batches to its own state so that a
/// follow-up run observes what an earlier run wrote.
#[derive(Default)]
struct StubRemote {
    state: RefCell<BTreeMap<String, String>>,
    applied: RefCell<Vec<Vec<Change>>>,
    attempts: Cell<usize>,
    missing: bool,
    fail_list: bool,
    fail_on_attempt: Option<usize>,
}

impl StubRemote {
    fn with_items(pairs: &[(&str, &str)]) -> Self {
        let state = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self {
            state: RefCell::new(state),
            ..Self::default()
        }
    }

    fn batch_sizes(&self) -> Vec<usize> {
        self.applied.borrow().iter().map(Vec::len).collect()
    }

    fn items(&self) -> BTreeMap<String, String> {
        self.state.borrow().clone()
    }
}

impl RemoteDictionary for StubRemote {
    fn list_items(&self, _target: &DictionaryTarget) -> Result<Vec<Item>, RemoteError> {
        if self.missing {
            return Err(RemoteError::NotFound);
        }
        if self.fail_list {
            return Err(RemoteError::Failed("connection reset".into()));
        }
        Ok(self
            .state
            .borrow()
            .iter()
            .map(|(k, v)| Item::new(k.clone(), v.clone()))
            .collect())
    }

    fn apply_batch(&self, _target: &DictionaryTarget, batch: &[Change]) -> Result<(), RemoteError> {
        let attempt = self.attempts.get() + 1;
        self.attempts.set(attempt);
        if self.fail_on_attempt == Some(attempt) {
            return Err(RemoteError::Failed("batch rejected".into()));
        }

        let mut state = self.state.borrow_mut();
        for change in batch {
            match change {
                Change::Create { key, value } | Change::Update { key, value } => {
                    state.insert(key.clone(), value.clone());
                }
                Change::Delete { key } => {
                    state.remove(key);
                }
            }
        }
        self.applied.borrow_mut().push(batch.to_vec());
        Ok(())
    }
}

#[derive(Clone)]
struct VecSource(Vec<Item>);

impl VecSource {
    fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        Self(pairs.iter().map(|(k, v)| Item::new(*k, *v)).collect())
    }
}

impl LocalSource for VecSource {
    fn read_all(&mut self) -> Result<Vec<Item>, SourceError> {
        Ok(self.0.clone())
    }
}

fn target() -> DictionaryTarget {
    DictionaryTarget {
        service_id: "s-100".into(),
        dictionary_id: "d-edge".into(),
    }
}

fn run(remote: &StubRemote, local: VecSource) -> Result<SyncOutcome, SyncError> {
    Reconciler::new(remote, local, target()).sync()
}

// ---------------------------------------------------------------------------
// Diff-and-mutate table
// ---------------------------------------------------------------------------

#[rstest]
#[case::creations(
    &[("one-key", "one-value")],
    &[("one-key", "one-value"), ("two-key", "two-value")],
    (1, 0, 0)
)]
#[case::deletions(&[("one-key", "one-value")], &[], (0, 0, 1))]
#[case::updates(&[("one-key", "one-value")], &[("one-key", "foo")], (0, 1, 0))]
#[case::no_changes(&[("one-key", "one-value")], &[("one-key", "one-value")], (0, 0, 0))]
#[case::all_at_once(
    &[("one-key", "one-value"), ("three-key", "three-value")],
    &[("one-key", "foo"), ("two-key", "two-value")],
    (1, 1, 1)
)]
fn sync_converges_remote_to_local(
    #[case] remote_pairs: &[(&str, &str)],
    #[case] local_pairs: &[(&str, &str)],
    #[case] expected: (usize, usize, usize),
) {
    let remote = StubRemote::with_items(remote_pairs);
    let outcome = run(&remote, VecSource::from_pairs(local_pairs)).expect("sync");

    let (created, updated, deleted) = expected;
    assert_eq!(outcome.created, created, "created");
    assert_eq!(outcome.updated, updated, "updated");
    assert_eq!(outcome.deleted, deleted, "deleted");

    let want: BTreeMap<String, String> = local_pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    assert_eq!(remote.items(), want, "remote must equal local after sync");
}

#[test]
fn matching_sides_issue_no_mutation_calls() {
    let remote = StubRemote::with_items(&[("a", "1")]);
    let outcome = run(&remote, VecSource::from_pairs(&[("a", "1")])).expect("sync");

    assert!(outcome.is_noop());
    assert_eq!(outcome.batches, 0);
    assert_eq!(remote.attempts.get(), 0);
}

#[test]
fn sync_twice_is_idempotent() {
    let remote = StubRemote::with_items(&[("a", "1")]);
    let local = VecSource::from_pairs(&[("a", "1"), ("b", "2")]);

    let first = run(&remote, local.clone()).expect("first run");
    assert_eq!(first.created, 1);

    let second = run(&remote, local).expect("second run");
    assert!(second.is_noop(), "second run must find nothing to do");
    assert_eq!(remote.attempts.get(), 1, "only the first run may mutate");
}

// ---------------------------------------------------------------------------
// Preconditions
// ---------------------------------------------------------------------------

#[test]
fn duplicate_local_keys_fail_without_touching_the_remote() {
    let remote = StubRemote::with_items(&[("one-key", "one-value")]);
    let local = VecSource::from_pairs(&[("boo-key", "one-value"), ("boo-key", "two-value")]);

    let err = run(&remote, local).expect_err("must reject duplicates");

    assert!(matches!(err, SyncError::DuplicateKey { key } if key == "boo-key"));
    assert_eq!(remote.attempts.get(), 0);
}

#[test]
fn oversized_local_sets_fail_before_any_network_call() {
    let items: Vec<Item> = (0..1001).map(|i| Item::new(format!("k{i:04}"), "v")).collect();
    let remote = StubRemote {
        fail_list: true, // a list call would blow up the test
        ..StubRemote::default()
    };

    let err = Reconciler::new(&remote, VecSource(items), target())
        .sync()
        .expect_err("must reject oversized set");

    assert!(matches!(err, SyncError::TooManyItems { count: 1001 }));
    assert_eq!(remote.attempts.get(), 0);
}

// ---------------------------------------------------------------------------
// Remote failures
// ---------------------------------------------------------------------------

#[test]
fn missing_dictionary_is_distinct_from_transport_failure() {
    let remote = StubRemote {
        missing: true,
        ..StubRemote::default()
    };

    let err = run(&remote, VecSource::from_pairs(&[("a", "1")])).expect_err("must fail");

    assert!(matches!(
        err,
        SyncError::DictionaryNotFound { dictionary_id } if dictionary_id == "d-edge"
    ));
    assert_eq!(remote.attempts.get(), 0);
}

#[test]
fn list_transport_failure_names_the_operation() {
    let remote = StubRemote {
        fail_list: true,
        ..StubRemote::default()
    };

    let err = run(&remote, VecSource::from_pairs(&[("a", "1")])).expect_err("must fail");

    assert!(matches!(
        err,
        SyncError::Remote { op: "listing dictionary items", .. }
    ));
}

// ---------------------------------------------------------------------------
// Batching
// ---------------------------------------------------------------------------

#[test]
fn large_changelogs_flush_in_capped_batches() {
    let pairs: Vec<(String, String)> = (0..2500).map(|i| (format!("k{i:04}"), "v".to_string())).collect();
    let borrowed: Vec<(&str, &str)> = pairs
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    let remote = StubRemote::with_items(&borrowed);

    let outcome = run(&remote, VecSource(vec![])).expect("sync");

    assert_eq!(outcome.deleted, 2500);
    assert_eq!(outcome.batches, 3);
    assert_eq!(remote.batch_sizes(), vec![1000, 1000, 500]);
    assert!(remote.items().is_empty());
}

#[test]
fn earlier_batches_stay_applied_when_a_later_batch_fails() {
    let pairs: Vec<(String, String)> = (0..1500).map(|i| (format!("k{i:04}"), "v".to_string())).collect();
    let borrowed: Vec<(&str, &str)> = pairs
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    let remote = StubRemote {
        fail_on_attempt: Some(2),
        ..StubRemote::with_items(&borrowed)
    };

    let err = run(&remote, VecSource(vec![])).expect_err("second batch must fail");

    assert!(matches!(
        err,
        SyncError::Remote { op: "applying dictionary batch", .. }
    ));
    assert_eq!(remote.attempts.get(), 2, "third batch must never be attempted");
    assert_eq!(remote.batch_sizes(), vec![1000], "first batch stays applied");
    assert_eq!(remote.items().len(), 500);

    // A later run converges the remainder.
    let remote = StubRemote {
        state: RefCell::new(remote.items()),
        ..StubRemote::default()
    };
    let outcome = run(&remote, VecSource(vec![])).expect("follow-up run");
    assert_eq!(outcome.deleted, 500);
    assert!(remote.items().is_empty());
}
