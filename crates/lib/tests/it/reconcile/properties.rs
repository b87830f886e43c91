//! Ordering guarantees checked end to end against the selected test backend.

use vitrina::{
    ItemId, OrderUpdate, Reconciler, Scope,
    backend::OrderStore,
    order::{swap, validate},
    reconcile::{DeleteOutcome, SwapOutcome},
};

use crate::helpers::*;

#[tokio::test]
async fn test_gap_free_after_every_swap() {
    for n in 2..=5i64 {
        let backend = test_backend().await;
        seed_products(backend.as_ref(), n).await;
        let reconciler = Reconciler::load(backend.clone(), Scope::Products)
            .await
            .unwrap();

        // Walk through every ordered pair on the same collection
        for a in 1..=n {
            for b in 1..=n {
                reconciler.swap(ItemId(a), ItemId(b)).await.unwrap();
                let stored = backend.fetch_collection(Scope::Products).await.unwrap();
                validate(&stored).unwrap();
                assert_eq!(reconciler.snapshot().await, stored);
            }
        }
    }
}

#[tokio::test]
async fn test_gap_free_after_every_delete() {
    for n in 1..=5i64 {
        for k in 1..=n {
            let backend = test_backend().await;
            seed_products(backend.as_ref(), n).await;
            let reconciler = Reconciler::load(backend.clone(), Scope::Products)
                .await
                .unwrap();

            let outcome = reconciler.delete(ItemId(k)).await;
            assert!(outcome.is_compacted(), "delete {k} of {n}: {outcome:?}");

            let stored = backend.fetch_collection(Scope::Products).await.unwrap();
            assert_eq!(stored.len() as i64, n - 1);
            validate(&stored).unwrap();
            assert!(stored.iter().all(|item| item.id != ItemId(k)));
        }
    }
}

#[tokio::test]
async fn test_self_swap_is_idempotent() {
    let backend = test_backend().await;
    seed_slides(backend.as_ref(), 3).await;
    let reconciler = Reconciler::load(backend.clone(), Scope::Carousel)
        .await
        .unwrap();
    let before = reconciler.snapshot().await;

    let outcome = reconciler.swap(ItemId(2), ItemId(2)).await.unwrap();
    assert!(matches!(outcome, SwapOutcome::Unchanged));
    assert_eq!(reconciler.snapshot().await, before);
    assert_eq!(
        backend.fetch_collection(Scope::Carousel).await.unwrap(),
        before
    );
}

#[tokio::test]
async fn test_next_order_follows_max() {
    let backend = test_backend().await;
    let reconciler = Reconciler::load(backend.clone(), Scope::Products)
        .await
        .unwrap();
    assert_eq!(reconciler.next_order().await, 1);

    seed_products(backend.as_ref(), 2).await;
    backend
        .bulk_update_order(Scope::Products, &[OrderUpdate::new(1, 9)])
        .await
        .unwrap();
    reconciler.reload().await.unwrap();
    assert_eq!(reconciler.next_order().await, 10);
}

#[tokio::test]
async fn test_swap_first_and_last_example() {
    let backend = test_backend().await;
    seed_products(backend.as_ref(), 3).await;
    let reconciler = Reconciler::load(backend.clone(), Scope::Products)
        .await
        .unwrap();

    let optimistic = swap(&reconciler.snapshot().await, ItemId(1), ItemId(3))
        .unwrap()
        .unwrap();
    assert_eq!(pairs(&optimistic), vec![(3, 1), (2, 2), (1, 3)]);

    let outcome = reconciler.swap(ItemId(1), ItemId(3)).await.unwrap();
    assert!(outcome.is_persisted());
    assert_eq!(
        pairs(&backend.fetch_collection(Scope::Products).await.unwrap()),
        vec![(3, 1), (2, 2), (1, 3)]
    );
}

#[tokio::test]
async fn test_rejected_swap_reloads_stored_state() {
    let backend = test_backend().await;
    seed_products(backend.as_ref(), 3).await;
    let reconciler = Reconciler::load(backend.clone(), Scope::Products)
        .await
        .unwrap();

    // Item 3 disappears behind the reconciler's back, so the bulk update is refused
    backend
        .delete_item(Scope::Products, ItemId(3))
        .await
        .unwrap();

    let outcome = reconciler.swap(ItemId(1), ItemId(3)).await.unwrap();
    let cause = outcome.cause().expect("swap should be reverted");
    assert!(cause.is_not_found());

    let stored = backend.fetch_collection(Scope::Products).await.unwrap();
    assert_eq!(reconciler.snapshot().await, stored);
    assert_eq!(pairs(&stored), vec![(1, 1), (2, 2)]);
    assert!(!reconciler.is_stale().await);
}

#[tokio::test]
async fn test_delete_compact_example() {
    let backend = test_backend().await;
    seed_products(backend.as_ref(), 4).await;
    let reconciler = Reconciler::load(backend.clone(), Scope::Products)
        .await
        .unwrap();

    match reconciler.delete(ItemId(2)).await {
        DeleteOutcome::Compacted { shifted } => assert_eq!(
            shifted,
            vec![OrderUpdate::new(3, 2), OrderUpdate::new(4, 3)]
        ),
        other => panic!("Unexpected outcome: {other:?}"),
    }

    let expected = vec![(1, 1), (3, 2), (4, 3)];
    assert_eq!(pairs(&reconciler.snapshot().await), expected);
    assert_eq!(
        pairs(&backend.fetch_collection(Scope::Products).await.unwrap()),
        expected
    );
}

#[tokio::test]
async fn test_delete_missing_item_reports_failure() {
    let backend = test_backend().await;
    seed_products(backend.as_ref(), 2).await;
    let reconciler = Reconciler::load(backend.clone(), Scope::Products)
        .await
        .unwrap();
    backend
        .delete_item(Scope::Products, ItemId(1))
        .await
        .unwrap();

    let outcome = reconciler.delete(ItemId(1)).await;
    assert!(matches!(outcome, DeleteOutcome::DeleteFailed { .. }));
    assert!(outcome.cause().unwrap().is_not_found());
    // Nothing was reloaded; the cached copy still shows the old item
    assert_eq!(reconciler.snapshot().await.len(), 2);
}
