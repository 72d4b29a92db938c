//! Consistency contract between the customer store and the remote service,
//! exercised against the deterministic in-memory service.

use std::sync::Arc;

use uuid::Uuid;

use trackline_core::{CustomerPatch, CustomerStatus, NewCustomer, UserId};
use trackline_remote::{CustomerService, InMemoryDataService, ServiceError};
use trackline_store::{CustomerStore, StoreError};

fn store() -> (Arc<InMemoryDataService>, CustomerStore<InMemoryDataService>) {
    let service = Arc::new(InMemoryDataService::new());
    (service.clone(), CustomerStore::new(service))
}

fn creator() -> UserId {
    UserId(Uuid::nil())
}

fn payload(name: &str, unique_id: &str, tracking: &str) -> NewCustomer {
    NewCustomer {
        customer_name: name.to_string(),
        unique_id: unique_id.to_string(),
        tracking_number: tracking.to_string(),
        status: CustomerStatus::Active,
        notes: None,
    }
}

#[tokio::test]
async fn create_places_the_row_at_the_front_exactly_once() {
    let (_, store) = store();
    store.load().await.expect("load");
    store.create(payload("First", "U1", "T1"), creator()).await.expect("create");
    let created = store.create(payload("Second", "U2", "T2"), creator()).await.expect("create");

    let items = store.snapshot().items;
    assert_eq!(items[0].id, created.id);
    assert_eq!(items.iter().filter(|row| row.id == created.id).count(), 1);
    assert_eq!(items.len(), 2);
}

#[tokio::test]
async fn acme_scenario_create_update_delete() {
    let (_, store) = store();
    store.load().await.expect("load");

    let created = store
        .create(payload("Acme Co", "U1", "T1"), creator())
        .await
        .expect("create");

    let front = &store.snapshot().items[0];
    assert_eq!(front.customer_name, "Acme Co");
    assert_eq!(front.status, CustomerStatus::Active);

    store
        .update(
            created.id,
            CustomerPatch { status: Some(CustomerStatus::Completed), ..Default::default() },
        )
        .await
        .expect("update");

    let entry = store
        .snapshot()
        .items
        .into_iter()
        .find(|row| row.id == created.id)
        .expect("entry present");
    assert_eq!(entry.status, CustomerStatus::Completed);
    assert_eq!(entry.customer_name, "Acme Co");

    let before = store.snapshot().items.len();
    store.remove(created.id).await.expect("remove");
    let items = store.snapshot().items;
    assert!(items.iter().all(|row| row.id != created.id));
    assert_eq!(items.len(), before - 1);
}

#[tokio::test]
async fn update_preserves_position_and_leaves_other_rows_untouched() {
    let (_, store) = store();
    store.load().await.expect("load");
    let a = store.create(payload("Alpha", "U1", "T1"), creator()).await.expect("create");
    let b = store.create(payload("Beta", "U2", "T2"), creator()).await.expect("create");
    let c = store.create(payload("Gamma", "U3", "T3"), creator()).await.expect("create");

    let before = store.snapshot().items;
    store
        .update(b.id, CustomerPatch { notes: Some("follow up".to_string()), ..Default::default() })
        .await
        .expect("update");
    let after = store.snapshot().items;

    let order: Vec<_> = after.iter().map(|row| row.id).collect();
    assert_eq!(order, vec![c.id, b.id, a.id]);
    assert_eq!(after[1].notes.as_deref(), Some("follow up"));
    assert_eq!(after[0], before[0]);
    assert_eq!(after[2], before[2]);
}

#[tokio::test]
async fn load_is_idempotent_without_intervening_mutations() {
    let (service, store) = store();
    for row in [payload("One", "U1", "T1"), payload("Two", "U2", "T2")] {
        service.insert(row, creator()).await.expect("seed");
    }

    store.load().await.expect("first load");
    let first = store.snapshot().items;
    store.load().await.expect("second load");
    let second = store.snapshot().items;

    assert_eq!(first, second);
}

#[tokio::test]
async fn search_returns_only_matching_rows_and_does_not_touch_the_cache() {
    let (service, store) = store();
    for row in [
        payload("Acme Co", "U1", "T1"),
        payload("Globex", "U2", "T2"),
        payload("Initech", "U3", "T3"),
    ] {
        service.insert(row, creator()).await.expect("seed");
    }
    store.load().await.expect("load");
    let cached = store.snapshot().items;

    let results = store.search("acme").await.expect("search");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].customer_name, "Acme Co");
    assert_eq!(store.snapshot().items, cached);
}

#[tokio::test]
async fn empty_search_term_is_refused_without_a_remote_call() {
    let (service, store) = store();
    service
        .fail_next_with(ServiceError::Transport("connection reset".to_string()))
        .await;

    assert_eq!(store.search("   ").await, Err(StoreError::EmptyQuery));

    // The staged failure was not consumed, so the next real search hits it.
    assert!(matches!(
        store.search("acme").await,
        Err(StoreError::Service(ServiceError::Transport(_)))
    ));
}

#[tokio::test]
async fn failed_update_leaves_the_cache_identical() {
    let (service, store) = store();
    store.load().await.expect("load");
    let created = store.create(payload("Acme Co", "U1", "T1"), creator()).await.expect("create");
    let before = store.snapshot().items;

    service
        .fail_next_with(ServiceError::Transport("connection reset".to_string()))
        .await;
    let err = store
        .update(
            created.id,
            CustomerPatch { status: Some(CustomerStatus::Cancelled), ..Default::default() },
        )
        .await
        .expect_err("update must fail");

    assert!(matches!(err, StoreError::Service(ServiceError::Transport(_))));
    assert_eq!(store.snapshot().items, before);
}

#[tokio::test]
async fn update_of_an_unknown_id_surfaces_not_found() {
    let (_, store) = store();
    store.load().await.expect("load");
    let missing = trackline_core::CustomerId(Uuid::new_v4());

    let err = store
        .update(missing, CustomerPatch { notes: Some("x".to_string()), ..Default::default() })
        .await
        .expect_err("must fail");
    assert_eq!(err, StoreError::Service(ServiceError::NotFound(missing)));
    assert!(store.snapshot().items.is_empty());
}

#[tokio::test]
async fn failed_load_clears_is_loading_and_keeps_previous_items() {
    let (service, store) = store();
    assert!(store.snapshot().is_loading);

    service
        .fail_next_with(ServiceError::Remote { status: 503, message: "unavailable".to_string() })
        .await;
    store.load().await.expect_err("load must fail");

    let snapshot = store.snapshot();
    assert!(!snapshot.is_loading);
    assert!(snapshot.items.is_empty());
}

#[tokio::test]
async fn subscribers_are_notified_after_each_mutation() {
    let (_, store) = store();
    let mut watcher = store.subscribe();

    store.load().await.expect("load");
    watcher.changed().await.expect("load notification");
    assert!(!watcher.borrow_and_update().is_loading);

    let created = store.create(payload("Acme Co", "U1", "T1"), creator()).await.expect("create");
    watcher.changed().await.expect("create notification");
    assert_eq!(watcher.borrow_and_update().items[0].id, created.id);

    store.remove(created.id).await.expect("remove");
    watcher.changed().await.expect("remove notification");
    assert!(watcher.borrow_and_update().items.is_empty());
}
