use std::collections::HashSet;
use std::sync::Arc;

use vitrina::{
    OrderedItem, Payload, Scope,
    backend::Backend,
    order::{NewItem, validate},
};

use crate::helpers::*;

/// Creates `count` products at once, each from its own task.
async fn create_concurrently(backend: &Arc<dyn Backend>, count: i64) -> Vec<OrderedItem> {
    let tasks: Vec<_> = (1..=count)
        .map(|i| {
            let backend = Arc::clone(backend);
            tokio::spawn(async move {
                backend
                    .create_item(Scope::Products, NewItem::new(Payload::product(500 + i)))
                    .await
            })
        })
        .collect();

    let mut created = Vec::new();
    for task in tasks {
        created.push(task.await.unwrap().expect("concurrent create failed"));
    }
    created
}

fn assert_distinct_and_dense(created: &[OrderedItem], count: usize) {
    let ids: HashSet<i64> = created.iter().map(|i| i.id.get()).collect();
    assert_eq!(ids.len(), count, "ids must be unique");

    let mut orders = orders(created);
    orders.sort_unstable();
    assert_eq!(orders, (1..=count as u32).collect::<Vec<_>>());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creates_get_distinct_ids_and_orders() {
    let backend = test_backend().await;
    let created = create_concurrently(&backend, 16).await;
    assert_distinct_and_dense(&created, 16);

    let stored = backend.fetch_collection(Scope::Products).await.unwrap();
    assert_eq!(stored.len(), 16);
    validate(&stored).unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_toggles_all_land() {
    let backend = test_backend().await;
    let created = seed_products(backend.as_ref(), 8).await;

    let tasks: Vec<_> = created
        .iter()
        .map(|item| {
            let backend = Arc::clone(&backend);
            let id = item.id;
            tokio::spawn(async move { backend.set_active(Scope::Products, id, false).await })
        })
        .collect();
    for task in tasks {
        task.await.unwrap().expect("concurrent toggle failed");
    }

    let stored = backend.fetch_collection(Scope::Products).await.unwrap();
    assert!(stored.iter().all(|i| !i.active));
    assert!(backend.fetch_active(Scope::Products).await.unwrap().is_empty());
}

/// A file database gives each pooled connection its own lock, unlike the
/// shared-cache in-memory one.
#[cfg(feature = "sqlite")]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creates_on_sqlite_file() {
    use vitrina::backend::database::Sqlite;

    let dir = tempfile::tempdir().unwrap();
    let backend: Arc<dyn Backend> =
        Arc::new(Sqlite::open_sqlite(dir.path().join("vitrina.db")).await.unwrap());

    let created = create_concurrently(&backend, 16).await;
    assert_distinct_and_dense(&created, 16);

    // Ids stay unique across scopes while positions restart per scope
    let slide = backend
        .create_item(
            Scope::Carousel,
            NewItem::new(Payload::slide("Sale", Some("sale.jpg"), None)),
        )
        .await
        .unwrap();
    assert_eq!(slide.order, 1);
    assert_eq!(slide.id.get(), 17);
}
