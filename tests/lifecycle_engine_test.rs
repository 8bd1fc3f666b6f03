//! Lifecycle engine behavior: transition ordering, idempotence, and the
//! store-mutated-but-unpublished failure mode.

mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use serde_json::json;
use uuid::Uuid;

use command_core::lifecycle::LifecycleEngine;
use command_core::models::{Command, CommandStatus};
use common::{journal_entries, new_journal, InMemoryCommandStore, InMemoryQueueClient, Journal};

const EVENTS_QUEUE: &str = "command_events";

fn setup() -> (
    Arc<InMemoryCommandStore>,
    Arc<InMemoryQueueClient>,
    LifecycleEngine,
    Journal,
) {
    let journal = new_journal();
    let store = Arc::new(InMemoryCommandStore::new(journal.clone()));
    let queue = Arc::new(InMemoryQueueClient::new(journal.clone()));
    let engine = LifecycleEngine::new(store.clone(), queue.clone(), EVENTS_QUEUE.to_string());
    (store, queue, engine, journal)
}

#[tokio::test]
async fn test_create_persists_in_process_then_publishes_create() {
    let (store, queue, engine, journal) = setup();

    let command = engine.create_command(json!(["a", "b"])).await.unwrap();

    let stored = store.get(command.id).expect("record should exist");
    assert_eq!(stored.status, CommandStatus::InProcess);
    assert_eq!(stored.items, json!(["a", "b"]));

    let events = queue.sent_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["action"], "CREATE");
    assert_eq!(events[0]["command"]["id"], json!(command.id));
    assert_eq!(
        events[0]["group_id"],
        json!(format!("Commands-{}", command.id))
    );

    // Store write strictly before publish.
    assert_eq!(journal_entries(&journal), vec!["store.put", "queue.send"]);
}

#[tokio::test]
async fn test_create_publish_failure_leaves_store_mutated_and_errors() {
    let (store, queue, engine, journal) = setup();
    queue.fail_sends.store(true, Ordering::SeqCst);

    let result = engine.create_command(json!({})).await;

    assert!(result.is_err());
    // The known gap: record persisted, no event ever sent.
    assert_eq!(store.len(), 1);
    assert!(queue.sent_events().is_empty());
    assert_eq!(journal_entries(&journal), vec!["store.put"]);
}

#[tokio::test]
async fn test_store_failure_aborts_before_publish() {
    let (store, queue, engine, _journal) = setup();
    store.fail_writes.store(true, Ordering::SeqCst);

    let result = engine.create_command(json!({})).await;

    assert!(result.is_err());
    assert!(queue.sent_events().is_empty());
}

#[tokio::test]
async fn test_delete_is_idempotent_and_still_publishes() {
    let (_store, queue, engine, journal) = setup();

    // Nothing was ever stored under this id.
    let id = Uuid::new_v4();
    engine.delete_command(id).await.unwrap();

    let events = queue.sent_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["action"], "DELETED");
    assert_eq!(events[0]["command"]["id"], json!(id));
    assert_eq!(journal_entries(&journal), vec!["store.delete", "queue.send"]);
}

#[tokio::test]
async fn test_validate_updates_status_then_publishes() {
    let (store, queue, engine, journal) = setup();
    let command = Command::new(json!({"sku": "widget"}));
    store.seed(command.clone());

    engine.validate_command(command.clone()).await.unwrap();

    assert_eq!(
        store.get(command.id).unwrap().status,
        CommandStatus::Validated
    );

    let events = queue.sent_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["action"], "VALIDATED");
    assert_eq!(events[0]["command"]["status"], "VALIDATED");
    assert_eq!(
        journal_entries(&journal),
        vec!["store.update_status", "queue.send"]
    );
}

#[tokio::test]
async fn test_cancel_updates_status_then_publishes() {
    let (store, queue, engine, _journal) = setup();
    let command = Command::new(json!({}));
    store.seed(command.clone());

    engine.cancel_command(command.clone()).await.unwrap();

    assert_eq!(
        store.get(command.id).unwrap().status,
        CommandStatus::Canceled
    );
    assert_eq!(queue.sent_events()[0]["action"], "CANCELED");
}

#[tokio::test]
async fn test_validate_of_absent_record_is_noop_but_publishes() {
    let (store, queue, engine, _journal) = setup();

    // Record deleted by a racing transition; the conditional update matches
    // nothing and the engine does not special-case it.
    let command = Command::new(json!({}));
    engine.validate_command(command).await.unwrap();

    assert_eq!(store.len(), 0);
    assert_eq!(queue.sent_events()[0]["action"], "VALIDATED");
}

#[tokio::test]
async fn test_confirm_create_overwrites_existing_record() {
    let (store, queue, engine, _journal) = setup();
    let mut command = Command::new(json!(["a"]));
    store.seed(command.clone());

    // Orchestrator re-asserts the command with its own view of the record.
    command.status = CommandStatus::InProcess;
    command.items = json!(["a", "b"]);
    engine.confirm_create(command.clone()).await.unwrap();

    let stored = store.get(command.id).unwrap();
    assert_eq!(stored.items, json!(["a", "b"]));
    assert_eq!(queue.sent_events()[0]["action"], "CREATED");
}

#[tokio::test]
async fn test_events_carry_fresh_dedup_keys() {
    let (store, queue, engine, _journal) = setup();
    let command = Command::new(json!({}));
    store.seed(command.clone());

    engine.validate_command(command.clone()).await.unwrap();
    engine.validate_command(command.clone()).await.unwrap();

    let events = queue.sent_events();
    assert_eq!(events.len(), 2);
    assert_ne!(
        events[0]["deduplication_id"], events[1]["deduplication_id"],
        "republished events must not share a dedup key"
    );
    assert_eq!(events[0]["group_id"], events[1]["group_id"]);
}

#[tokio::test]
async fn test_full_lifecycle_scenario() {
    let (store, queue, engine, _journal) = setup();

    // POST
    let command = engine.create_command(json!(["a", "b"])).await.unwrap();
    assert_eq!(command.status, CommandStatus::InProcess);

    // Inbound VALIDATE
    engine.validate_command(command.clone()).await.unwrap();
    assert_eq!(
        store.get(command.id).unwrap().status,
        CommandStatus::Validated
    );

    // DELETE
    engine.delete_command(command.id).await.unwrap();
    assert!(store.get(command.id).is_none());
    assert!(engine.list_commands().await.unwrap().is_empty());

    let actions: Vec<_> = queue
        .sent_events()
        .iter()
        .map(|e| e["action"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(actions, vec!["CREATE", "VALIDATED", "DELETED"]);
}
