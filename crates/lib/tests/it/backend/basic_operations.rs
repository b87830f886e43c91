use vitrina::{
    ItemId, OrderUpdate, Payload, Scope,
    backend::{BackendError, OrderStore},
    order::{ImageField, ItemPatch, NewItem, validate},
};

use crate::helpers::*;

#[tokio::test]
async fn test_create_appends_at_next_order() {
    let backend = test_backend().await;
    let created = seed_products(backend.as_ref(), 3).await;
    assert_eq!(orders(&created), vec![1, 2, 3]);

    let items = backend.fetch_collection(Scope::Products).await.unwrap();
    assert_eq!(items, created);
    validate(&items).unwrap();
}

#[tokio::test]
async fn test_create_with_explicit_order() {
    let backend = test_backend().await;
    seed_products(backend.as_ref(), 2).await;
    let item = backend
        .create_item(Scope::Products, NewItem::new(Payload::product(9)).at(7))
        .await
        .unwrap();
    assert_eq!(item.order, 7);

    let next = backend
        .create_item(Scope::Products, NewItem::new(Payload::product(10)).at(0))
        .await
        .unwrap();
    assert_eq!(next.order, 8);
}

#[tokio::test]
async fn test_collections_are_independent() {
    let backend = test_backend().await;
    seed_products(backend.as_ref(), 2).await;
    let slides = seed_slides(backend.as_ref(), 2).await;

    assert_eq!(orders(&slides), vec![1, 2]);
    let ids: Vec<i64> = slides.iter().map(|s| s.id.get()).collect();
    assert_eq!(ids, vec![3, 4]);

    let err = backend
        .bulk_update_order(Scope::Carousel, &[OrderUpdate::new(1, 2)])
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_create_rejects_mismatched_payload() {
    let backend = test_backend().await;

    let err = backend
        .create_item(Scope::Carousel, NewItem::new(Payload::product(1)))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        vitrina::Error::Backend(BackendError::ScopeMismatch { .. })
    ));

    let no_image = NewItem::new(Payload::slide("Empty", None, None));
    let err = backend
        .create_item(Scope::Carousel, no_image)
        .await
        .unwrap_err();
    assert!(err.is_validation_error());
    assert!(backend.fetch_collection(Scope::Carousel).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_bulk_update_replaces_orders() {
    let backend = test_backend().await;
    seed_products(backend.as_ref(), 3).await;
    backend
        .bulk_update_order(
            Scope::Products,
            &[
                OrderUpdate::new(1, 3),
                OrderUpdate::new(2, 1),
                OrderUpdate::new(3, 2),
            ],
        )
        .await
        .unwrap();

    let items = backend.fetch_collection(Scope::Products).await.unwrap();
    assert_eq!(pairs(&items), vec![(2, 1), (3, 2), (1, 3)]);
}

#[tokio::test]
async fn test_bulk_update_unknown_id_changes_nothing() {
    let backend = test_backend().await;
    let before = seed_products(backend.as_ref(), 3).await;

    let err = backend
        .bulk_update_order(
            Scope::Products,
            &[OrderUpdate::new(1, 3), OrderUpdate::new(42, 1)],
        )
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(
        backend.fetch_collection(Scope::Products).await.unwrap(),
        before
    );
}

#[tokio::test]
async fn test_delete_leaves_gap_for_caller() {
    let backend = test_backend().await;
    seed_products(backend.as_ref(), 4).await;
    backend
        .delete_item(Scope::Products, ItemId(2))
        .await
        .unwrap();

    let items = backend.fetch_collection(Scope::Products).await.unwrap();
    assert_eq!(pairs(&items), vec![(1, 1), (3, 3), (4, 4)]);
    assert!(validate(&items).is_err());

    let err = backend
        .delete_item(Scope::Products, ItemId(2))
        .await
        .unwrap_err();
    assert_eq!(err.module(), "backend");
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_toggle_keeps_position() {
    let backend = test_backend().await;
    seed_slides(backend.as_ref(), 3).await;

    let hidden = backend
        .set_active(Scope::Carousel, ItemId(2), false)
        .await
        .unwrap();
    assert!(!hidden.active);
    assert_eq!(hidden.order, 2);

    let public = backend.fetch_active(Scope::Carousel).await.unwrap();
    assert_eq!(pairs(&public), vec![(1, 1), (3, 3)]);

    backend
        .set_active(Scope::Carousel, ItemId(2), true)
        .await
        .unwrap();
    assert_eq!(backend.fetch_active(Scope::Carousel).await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_update_and_clear_slide_images() {
    let backend = test_backend().await;
    let slide = backend
        .create_item(
            Scope::Carousel,
            NewItem::new(Payload::slide("Sale", Some("desk.jpg"), Some("mob.jpg"))),
        )
        .await
        .unwrap();

    let patch = ItemPatch {
        image_url: Some("desk-v2.jpg".into()),
        ..Default::default()
    };
    let edited = backend
        .update_item(Scope::Carousel, slide.id, patch)
        .await
        .unwrap();
    assert_eq!(
        edited.payload,
        Payload::slide("Sale", Some("desk-v2.jpg"), Some("mob.jpg"))
    );

    let cleared = backend
        .clear_image(Scope::Carousel, slide.id, ImageField::ImageMobileUrl)
        .await
        .unwrap();
    assert_eq!(cleared.payload, Payload::slide("Sale", Some("desk-v2.jpg"), None));
    assert_eq!(cleared.order, slide.order);

    let err = backend
        .update_item(Scope::Carousel, slide.id, ItemPatch::default())
        .await
        .unwrap_err();
    assert!(err.is_validation_error());
}

#[tokio::test]
async fn test_update_missing_item() {
    let backend = test_backend().await;
    let patch = ItemPatch {
        product_id: Some(5),
        ..Default::default()
    };
    let err = backend
        .update_item(Scope::Products, ItemId(99), patch)
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}
