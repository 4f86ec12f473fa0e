mod common;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use common::{receive_stock, seed_item, seed_location, test_app};
use warehouse_api::entities::TransactionType;
use warehouse_api::errors::ServiceError;
use warehouse_api::services::stock_ledger::NewTransaction;

fn movement(
    item_id: i64,
    location_id: i64,
    quantity: Decimal,
    transaction_type: TransactionType,
) -> NewTransaction {
    NewTransaction {
        item_id,
        location_id,
        quantity,
        transaction_type,
        reference: None,
        note: None,
    }
}

#[tokio::test]
async fn receipt_creates_the_stock_level_lazily() {
    let app = test_app().await;
    let item = seed_item(&app, "A1", "Bolt", 0).await;
    let location = seed_location(&app, "Regal 1").await;

    assert!(app.services.stock.list_stock_levels().await.unwrap().is_empty());

    let recorded = receive_stock(&app, item.id, location.id, dec!(7.5)).await;
    assert_eq!(recorded.quantity, dec!(7.5));
    assert_eq!(recorded.transaction_type, TransactionType::Receipt);

    let levels = app.services.stock.list_stock_levels().await.unwrap();
    assert_eq!(levels.len(), 1);
    assert_eq!(levels[0].quantity, dec!(7.5));
    assert_eq!(levels[0].item.sku, "A1");
    assert_eq!(levels[0].location.name, "Regal 1");
}

#[tokio::test]
async fn shipment_subtracts_and_stores_the_submitted_quantity() {
    let app = test_app().await;
    let item = seed_item(&app, "A1", "Bolt", 0).await;
    let location = seed_location(&app, "Regal 1").await;
    receive_stock(&app, item.id, location.id, dec!(10)).await;

    let shipment = app
        .services
        .stock
        .register_transaction(movement(
            item.id,
            location.id,
            dec!(4),
            TransactionType::Shipment,
        ))
        .await
        .unwrap();
    // The ledger keeps the submitted amount; the sign is implied by the type.
    assert_eq!(shipment.quantity, dec!(4));

    let levels = app.services.stock.list_stock_levels().await.unwrap();
    assert_eq!(levels[0].quantity, dec!(6));
}

#[tokio::test]
async fn overdraw_is_rejected_and_leaves_no_trace() {
    let app = test_app().await;
    let item = seed_item(&app, "A1", "Bolt", 0).await;
    let location = seed_location(&app, "Regal 1").await;
    receive_stock(&app, item.id, location.id, dec!(3)).await;

    let err = app
        .services
        .stock
        .register_transaction(movement(
            item.id,
            location.id,
            dec!(3.5),
            TransactionType::Shipment,
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidInput(_)));

    // The failed movement neither changed the level nor appended an entry.
    let levels = app.services.stock.list_stock_levels().await.unwrap();
    assert_eq!(levels[0].quantity, dec!(3));
    assert_eq!(app.services.stock.list_transactions(50).await.unwrap().len(), 1);
}

#[tokio::test]
async fn competing_shipments_cannot_overdraw_the_level() {
    let app = test_app().await;
    let item = seed_item(&app, "A1", "Bolt", 0).await;
    let location = seed_location(&app, "Regal 1").await;
    receive_stock(&app, item.id, location.id, dec!(5)).await;

    // Two full-stock shipments: only one may go through, no matter how
    // they interleave.
    let drain = movement(item.id, location.id, dec!(5), TransactionType::Shipment);
    app.services
        .stock
        .register_transaction(drain.clone())
        .await
        .unwrap();
    let err = app
        .services
        .stock
        .register_transaction(drain)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidInput(_)));

    // Ledger and level agree: 5 received, 5 shipped, 0 on hand.
    let levels = app.services.stock.list_stock_levels().await.unwrap();
    assert_eq!(levels[0].quantity, Decimal::ZERO);
    assert_eq!(app.services.stock.list_transactions(50).await.unwrap().len(), 2);
}

#[tokio::test]
async fn adjustments_are_signed_but_never_go_negative() {
    let app = test_app().await;
    let item = seed_item(&app, "A1", "Bolt", 0).await;
    let location = seed_location(&app, "Regal 1").await;
    receive_stock(&app, item.id, location.id, dec!(5)).await;

    app.services
        .stock
        .register_transaction(movement(
            item.id,
            location.id,
            dec!(-2),
            TransactionType::Adjustment,
        ))
        .await
        .unwrap();
    let levels = app.services.stock.list_stock_levels().await.unwrap();
    assert_eq!(levels[0].quantity, dec!(3));

    let err = app
        .services
        .stock
        .register_transaction(movement(
            item.id,
            location.id,
            dec!(-4),
            TransactionType::Adjustment,
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidInput(_)));
}

#[tokio::test]
async fn zero_quantity_and_negative_receipts_are_rejected() {
    let app = test_app().await;
    let item = seed_item(&app, "A1", "Bolt", 0).await;
    let location = seed_location(&app, "Regal 1").await;

    for (quantity, transaction_type) in [
        (Decimal::ZERO, TransactionType::Adjustment),
        (dec!(-1), TransactionType::Receipt),
        (dec!(-1), TransactionType::Shipment),
    ] {
        let err = app
            .services
            .stock
            .register_transaction(movement(item.id, location.id, quantity, transaction_type))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }
}

#[tokio::test]
async fn unknown_item_or_location_is_not_found() {
    let app = test_app().await;
    let item = seed_item(&app, "A1", "Bolt", 0).await;
    let location = seed_location(&app, "Regal 1").await;

    let err = app
        .services
        .stock
        .register_transaction(movement(999, location.id, dec!(1), TransactionType::Receipt))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));

    let err = app
        .services
        .stock
        .register_transaction(movement(item.id, 999, dec!(1), TransactionType::Receipt))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn transaction_listing_is_newest_first_and_bounded() {
    let app = test_app().await;
    let item = seed_item(&app, "A1", "Bolt", 0).await;
    let location = seed_location(&app, "Regal 1").await;

    for i in 1..=5 {
        receive_stock(&app, item.id, location.id, Decimal::from(i)).await;
    }

    let recent = app.services.stock.list_transactions(3).await.unwrap();
    assert_eq!(recent.len(), 3);
    // Newest first; ids break created-at ties.
    assert_eq!(recent[0].transaction.quantity, dec!(5));
    assert_eq!(recent[1].transaction.quantity, dec!(4));
    assert_eq!(recent[2].transaction.quantity, dec!(3));
}

#[tokio::test]
async fn per_location_levels_are_independent() {
    let app = test_app().await;
    let item = seed_item(&app, "A1", "Bolt", 0).await;
    let front = seed_location(&app, "Regal 1").await;
    let back = seed_location(&app, "Regal 2").await;

    receive_stock(&app, item.id, front.id, dec!(2)).await;
    receive_stock(&app, item.id, back.id, dec!(9)).await;

    let err = app
        .services
        .stock
        .register_transaction(movement(
            item.id,
            front.id,
            dec!(5),
            TransactionType::Shipment,
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidInput(_)));

    let levels = app.services.stock.list_stock_levels().await.unwrap();
    assert_eq!(levels.len(), 2);
}
