use futures::StreamExt;
use std::time::Duration;
use tasklist_core::model::task::next_task_id;
use tasklist_core::{SqliteTaskStore, StoreError, TaskRecord, TaskRecordStream, TaskStore};

const WAIT: Duration = Duration::from_secs(5);
const QUIET: Duration = Duration::from_millis(150);

fn record(text: &str) -> TaskRecord {
    TaskRecord {
        id: next_task_id(),
        task: text.to_string(),
        selected: false,
    }
}

async fn next_snapshot(stream: &mut TaskRecordStream) -> Vec<TaskRecord> {
    tokio::time::timeout(WAIT, stream.next())
        .await
        .expect("snapshot should arrive in time")
        .expect("stream should not end")
        .expect("snapshot query should succeed")
}

async fn assert_quiet(stream: &mut TaskRecordStream) {
    assert!(
        tokio::time::timeout(QUIET, stream.next()).await.is_err(),
        "no snapshot expected"
    );
}

#[tokio::test]
async fn new_subscription_emits_current_snapshot() {
    let store = SqliteTaskStore::open_in_memory().unwrap();
    let first = record("first");
    store.insert(first.clone()).await.unwrap();

    let mut stream = store.observe_all();
    assert_eq!(next_snapshot(&mut stream).await, vec![first]);
    assert_quiet(&mut stream).await;
}

#[tokio::test]
async fn empty_store_emits_empty_snapshot() {
    let store = SqliteTaskStore::open_in_memory().unwrap();
    let mut stream = store.observe_all();
    assert!(next_snapshot(&mut stream).await.is_empty());
}

#[tokio::test]
async fn every_mutation_emits_a_fresh_snapshot() {
    let store = SqliteTaskStore::open_in_memory().unwrap();
    let mut stream = store.observe_all();
    assert!(next_snapshot(&mut stream).await.is_empty());

    let mut task = record("laundry");
    store.insert(task.clone()).await.unwrap();
    assert_eq!(next_snapshot(&mut stream).await, vec![task.clone()]);

    task.selected = true;
    store.update(task.clone()).await.unwrap();
    assert_eq!(next_snapshot(&mut stream).await, vec![task.clone()]);

    store.delete(task).await.unwrap();
    assert!(next_snapshot(&mut stream).await.is_empty());
}

#[tokio::test]
async fn snapshots_keep_insertion_order() {
    let store = SqliteTaskStore::open_in_memory().unwrap();
    let a = record("a");
    let b = record("b");
    let c = record("c");
    for task in [&a, &b, &c] {
        store.insert(task.clone()).await.unwrap();
    }

    let mut stream = store.observe_all();
    assert_eq!(next_snapshot(&mut stream).await, vec![a, b, c]);
}

#[tokio::test]
async fn insert_with_existing_id_is_a_conflict() {
    let store = SqliteTaskStore::open_in_memory().unwrap();
    let original = record("original");
    store.insert(original.clone()).await.unwrap();

    let duplicate = TaskRecord {
        task: "duplicate".to_string(),
        ..original.clone()
    };
    let err = store.insert(duplicate).await.unwrap_err();
    assert!(matches!(err, StoreError::Conflict(id) if id == original.id));

    let mut stream = store.observe_all();
    assert_eq!(next_snapshot(&mut stream).await, vec![original]);
}

#[tokio::test]
async fn update_of_missing_task_is_not_found() {
    let store = SqliteTaskStore::open_in_memory().unwrap();
    let missing = record("missing");
    let err = store.update(missing.clone()).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound(id) if id == missing.id));
}

#[tokio::test]
async fn deleting_missing_task_succeeds_without_emission() {
    let store = SqliteTaskStore::open_in_memory().unwrap();
    let kept = record("kept");
    store.insert(kept.clone()).await.unwrap();

    let mut stream = store.observe_all();
    assert_eq!(next_snapshot(&mut stream).await, vec![kept.clone()]);

    store.delete(record("never stored")).await.unwrap();
    assert_quiet(&mut stream).await;

    let mut fresh = store.observe_all();
    assert_eq!(next_snapshot(&mut fresh).await, vec![kept]);
}

#[tokio::test]
async fn concurrent_subscribers_each_see_changes() {
    let store = SqliteTaskStore::open_in_memory().unwrap();
    let mut first = store.observe_all();
    let mut second = store.observe_all();
    assert!(next_snapshot(&mut first).await.is_empty());
    assert!(next_snapshot(&mut second).await.is_empty());

    let task = record("shared");
    store.insert(task.clone()).await.unwrap();

    assert_eq!(next_snapshot(&mut first).await, vec![task.clone()]);
    assert_eq!(next_snapshot(&mut second).await, vec![task]);
}

#[tokio::test]
async fn empty_text_is_stored() {
    let store = SqliteTaskStore::open_in_memory().unwrap();
    let blank = record("");
    store.insert(blank.clone()).await.unwrap();

    let mut stream = store.observe_all();
    assert_eq!(next_snapshot(&mut stream).await, vec![blank]);
}

#[tokio::test]
async fn file_store_persists_across_reopen_and_seeds_ids() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasks.db");

    let far_future = TaskRecord {
        id: next_task_id() + 10_000_000,
        task: "from an earlier run".to_string(),
        selected: true,
    };
    {
        let store = SqliteTaskStore::open(&path).unwrap();
        store.insert(far_future.clone()).await.unwrap();
    }

    let reopened = SqliteTaskStore::open(&path).unwrap();
    let mut stream = reopened.observe_all();
    assert_eq!(next_snapshot(&mut stream).await, vec![far_future.clone()]);
    assert!(next_task_id() > far_future.id);
}
