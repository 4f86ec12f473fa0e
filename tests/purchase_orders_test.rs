mod common;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::EntityTrait;

use common::{seed_item, test_app};
use warehouse_api::entities::{
    purchase_order::Entity as PurchaseOrderEntity,
    purchase_order_line::Entity as PurchaseOrderLineEntity, PurchaseOrderStatus,
};
use warehouse_api::errors::ServiceError;
use warehouse_api::services::catalog::NewSupplier;
use warehouse_api::services::purchase_orders::{NewOrder, NewOrderLine, OrderPatch};

fn order_with_lines(order_number: &str, lines: Vec<NewOrderLine>) -> NewOrder {
    NewOrder {
        order_number: order_number.to_string(),
        supplier_id: None,
        status: PurchaseOrderStatus::Released,
        expected_date: None,
        notes: None,
        lines,
    }
}

fn line(item_id: Option<i64>, ordered: Decimal) -> NewOrderLine {
    NewOrderLine {
        item_id,
        description: None,
        ordered_quantity: ordered,
        unit_price: None,
    }
}

#[tokio::test]
async fn order_is_created_with_lines_and_zero_received() {
    let app = test_app().await;
    let item = seed_item(&app, "A1", "Bolt", 0).await;

    let view = app
        .services
        .purchase_orders
        .create_order(order_with_lines(
            "PO-1",
            vec![line(Some(item.id), dec!(10)), line(None, dec!(4))],
        ))
        .await
        .unwrap();

    assert_eq!(view.order.order_number, "PO-1");
    assert_eq!(view.lines.len(), 2);
    assert!(view
        .lines
        .iter()
        .all(|l| l.line.received_quantity == Decimal::ZERO));
    assert_eq!(view.lines[0].item.as_ref().unwrap().sku, "A1");
    assert!(view.lines[1].item.is_none());
}

#[tokio::test]
async fn duplicate_order_number_is_a_conflict() {
    let app = test_app().await;
    app.services
        .purchase_orders
        .create_order(order_with_lines("PO-1", vec![line(None, dec!(1))]))
        .await
        .unwrap();

    let err = app
        .services
        .purchase_orders
        .create_order(order_with_lines("PO-1", vec![line(None, dec!(2))]))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));
}

#[tokio::test]
async fn invalid_line_aborts_the_whole_order() {
    let app = test_app().await;

    let err = app
        .services
        .purchase_orders
        .create_order(order_with_lines(
            "PO-1",
            vec![line(None, dec!(5)), line(None, Decimal::ZERO)],
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidInput(_)));

    // Nothing was persisted, not even the valid line or the header.
    assert!(PurchaseOrderEntity::find().all(&*app.db).await.unwrap().is_empty());
    assert!(PurchaseOrderLineEntity::find()
        .all(&*app.db)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn unknown_line_item_aborts_the_order() {
    let app = test_app().await;

    let err = app
        .services
        .purchase_orders
        .create_order(order_with_lines("PO-1", vec![line(Some(999), dec!(5))]))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
    assert!(PurchaseOrderEntity::find().all(&*app.db).await.unwrap().is_empty());
}

#[tokio::test]
async fn unknown_supplier_is_not_found_on_create_and_update() {
    let app = test_app().await;

    let mut order = order_with_lines("PO-1", vec![line(None, dec!(1))]);
    order.supplier_id = Some(999);
    let err = app
        .services
        .purchase_orders
        .create_order(order)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
    assert!(PurchaseOrderEntity::find().all(&*app.db).await.unwrap().is_empty());

    let created = app
        .services
        .purchase_orders
        .create_order(order_with_lines("PO-2", vec![line(None, dec!(1))]))
        .await
        .unwrap();
    let err = app
        .services
        .purchase_orders
        .update_order(
            created.order.id,
            OrderPatch {
                supplier_id: Some(999),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));

    // A real supplier attaches fine.
    let supplier = app
        .services
        .catalog
        .create_supplier(NewSupplier {
            name: "Meyer".into(),
            contact_email: None,
            contact_phone: None,
            notes: None,
        })
        .await
        .unwrap();
    let updated = app
        .services
        .purchase_orders
        .update_order(
            created.order.id,
            OrderPatch {
                supplier_id: Some(supplier.id),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.supplier.unwrap().name, "Meyer");
}

#[tokio::test]
async fn header_patch_only_touches_set_fields() {
    let app = test_app().await;
    let view = app
        .services
        .purchase_orders
        .create_order(order_with_lines("PO-1", vec![line(None, dec!(1))]))
        .await
        .unwrap();

    let updated = app
        .services
        .purchase_orders
        .update_order(
            view.order.id,
            OrderPatch {
                status: Some(PurchaseOrderStatus::Completed),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.order.status, PurchaseOrderStatus::Completed);
    assert_eq!(updated.order.order_number, "PO-1");
    assert_eq!(updated.lines.len(), 1);
}

#[tokio::test]
async fn lines_can_be_added_after_creation() {
    let app = test_app().await;
    let view = app
        .services
        .purchase_orders
        .create_order(order_with_lines("PO-1", vec![]))
        .await
        .unwrap();

    app.services
        .purchase_orders
        .add_line(view.order.id, line(None, dec!(3)))
        .await
        .unwrap();

    let reloaded = app
        .services
        .purchase_orders
        .get_order(view.order.id)
        .await
        .unwrap();
    assert_eq!(reloaded.lines.len(), 1);

    let err = app
        .services
        .purchase_orders
        .add_line(999, line(None, dec!(1)))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn received_quantity_is_an_absolute_set() {
    let app = test_app().await;
    let view = app
        .services
        .purchase_orders
        .create_order(order_with_lines("PO-1", vec![line(None, dec!(10))]))
        .await
        .unwrap();
    let line_id = view.lines[0].line.id;

    let updated = app
        .services
        .purchase_orders
        .set_line_received(line_id, dec!(4))
        .await
        .unwrap();
    assert_eq!(updated.received_quantity, dec!(4));

    // A second call overwrites rather than accumulates.
    let updated = app
        .services
        .purchase_orders
        .set_line_received(line_id, dec!(4))
        .await
        .unwrap();
    assert_eq!(updated.received_quantity, dec!(4));

    // Over-delivery is allowed; negative is not.
    let updated = app
        .services
        .purchase_orders
        .set_line_received(line_id, dec!(12))
        .await
        .unwrap();
    assert_eq!(updated.received_quantity, dec!(12));

    let err = app
        .services
        .purchase_orders
        .set_line_received(line_id, dec!(-1))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidInput(_)));
}

#[tokio::test]
async fn orders_list_newest_first() {
    let app = test_app().await;
    for number in ["PO-1", "PO-2", "PO-3"] {
        app.services
            .purchase_orders
            .create_order(order_with_lines(number, vec![line(None, dec!(1))]))
            .await
            .unwrap();
    }

    let orders = app.services.purchase_orders.list_orders().await.unwrap();
    assert_eq!(orders.len(), 3);
    assert_eq!(orders[0].order.order_number, "PO-3");
    assert_eq!(orders[2].order.order_number, "PO-1");
}

#[tokio::test]
async fn deleting_an_order_removes_its_lines() {
    let app = test_app().await;
    let view = app
        .services
        .purchase_orders
        .create_order(order_with_lines("PO-1", vec![line(None, dec!(2))]))
        .await
        .unwrap();

    app.services
        .purchase_orders
        .delete_order(view.order.id)
        .await
        .unwrap();

    assert!(PurchaseOrderEntity::find().all(&*app.db).await.unwrap().is_empty());
    assert!(PurchaseOrderLineEntity::find()
        .all(&*app.db)
        .await
        .unwrap()
        .is_empty());

    let err = app
        .services
        .purchase_orders
        .delete_order(view.order.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}
