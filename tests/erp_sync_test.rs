mod common;

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::json;

use common::{
    receive_stock, seed_item, seed_location, test_app, test_app_with_transport,
    TEST_WAREHOUSE_LABEL,
};
use warehouse_api::erp::{
    ErpExportAck, ErpExportStatus, ErpPurchaseOrder, ErpPurchaseOrderLine, ErpTransport,
    ErpTransportError, InventorySnapshot,
};

/// In-memory transport capturing snapshots and serving canned orders.
#[derive(Default)]
struct StubTransport {
    sent: Mutex<Vec<InventorySnapshot>>,
    orders: Vec<serde_json::Value>,
    fail_send: bool,
    fail_fetch: bool,
    ack_transmitted: Option<usize>,
}

#[async_trait]
impl ErpTransport for StubTransport {
    async fn send_snapshot(
        &self,
        snapshot: &InventorySnapshot,
    ) -> Result<ErpExportAck, ErpTransportError> {
        if self.fail_send {
            return Err(ErpTransportError("connection refused".into()));
        }
        self.sent.lock().unwrap().push(snapshot.clone());
        Ok(ErpExportAck {
            transmitted: self.ack_transmitted,
            message: None,
        })
    }

    async fn fetch_open_orders(&self) -> Result<Vec<serde_json::Value>, ErpTransportError> {
        if self.fail_fetch {
            return Err(ErpTransportError("connection refused".into()));
        }
        Ok(self.orders.clone())
    }
}

fn erp_order(order_number: &str, supplier: &str, lines: Vec<ErpPurchaseOrderLine>) -> ErpPurchaseOrder {
    serde_json::from_value(json!({
        "order_number": order_number,
        "supplier_name": supplier,
        "lines": serde_json::to_value(lines).unwrap(),
    }))
    .unwrap()
}

fn erp_line(sku: &str, name: &str, ordered: Decimal) -> ErpPurchaseOrderLine {
    ErpPurchaseOrderLine {
        sku: sku.to_string(),
        name: name.to_string(),
        ordered_quantity: ordered,
        unit_price: None,
        description: None,
    }
}

#[tokio::test]
async fn export_is_disabled_without_a_transport() {
    let app = test_app().await;

    let response = app.services.erp.push_inventory_snapshot().await.unwrap();
    assert_eq!(response.status, ErpExportStatus::Disabled);
    assert_eq!(response.transmitted, 0);
    assert!(response.message.unwrap().contains("not configured"));
}

#[tokio::test]
async fn export_delivers_the_full_snapshot() {
    let transport = Arc::new(StubTransport::default());
    let app = test_app_with_transport(Some(transport.clone())).await;

    let item = seed_item(&app, "A1", "Bolt", 0).await;
    let location = seed_location(&app, "Regal 1").await;
    receive_stock(&app, item.id, location.id, dec!(7)).await;

    let response = app.services.erp.push_inventory_snapshot().await.unwrap();
    assert_eq!(response.status, ErpExportStatus::Ok);
    // No count in the ack, so the local entry count is reported.
    assert_eq!(response.transmitted, 1);

    let sent = transport.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].warehouse, TEST_WAREHOUSE_LABEL);
    assert_eq!(sent[0].entries.len(), 1);
    assert_eq!(sent[0].entries[0].sku, "A1");
    assert_eq!(sent[0].entries[0].location, "Regal 1");
    assert_eq!(sent[0].entries[0].quantity, dec!(7));
}

#[tokio::test]
async fn export_prefers_the_acknowledged_count() {
    let transport = Arc::new(StubTransport {
        ack_transmitted: Some(42),
        ..Default::default()
    });
    let app = test_app_with_transport(Some(transport)).await;

    let response = app.services.erp.push_inventory_snapshot().await.unwrap();
    assert_eq!(response.status, ErpExportStatus::Ok);
    assert_eq!(response.transmitted, 42);
}

#[tokio::test]
async fn transport_failure_is_reported_as_data() {
    let transport = Arc::new(StubTransport {
        fail_send: true,
        ..Default::default()
    });
    let app = test_app_with_transport(Some(transport)).await;

    let response = app.services.erp.push_inventory_snapshot().await.unwrap();
    assert_eq!(response.status, ErpExportStatus::Error);
    assert_eq!(response.transmitted, 0);
    assert!(response.message.unwrap().contains("connection refused"));
}

#[tokio::test]
async fn import_creates_order_supplier_and_items_on_first_sight() {
    let app = test_app().await;
    let order = erp_order("PO-1", "Schrauben Meyer", vec![erp_line("A1", "Bolt", dec!(10))]);

    let result = app
        .services
        .erp
        .import_purchase_orders(std::slice::from_ref(&order))
        .await
        .unwrap();
    assert_eq!(result.imported, 1);
    assert_eq!(result.updated, 0);
    assert_eq!(result.skipped, 0);

    let supplier = app
        .services
        .catalog
        .get_supplier_by_name("Schrauben Meyer")
        .await
        .unwrap()
        .expect("supplier auto-created");

    let items = app.services.catalog.list_items().await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].sku, "A1");
    assert_eq!(items[0].name, "Bolt");
    assert_eq!(items[0].unit_of_measure, "Stk");
    assert_eq!(items[0].reorder_level, 0);

    let stored = app
        .services
        .purchase_orders
        .find_by_number("PO-1")
        .await
        .unwrap()
        .expect("order persisted");
    assert_eq!(stored.supplier_id, Some(supplier.id));

    let view = app.services.purchase_orders.get_order(stored.id).await.unwrap();
    assert_eq!(view.lines.len(), 1);
    assert_eq!(view.lines[0].line.ordered_quantity, dec!(10));
    assert_eq!(view.lines[0].line.received_quantity, Decimal::ZERO);
}

#[tokio::test]
async fn reimport_overwrites_the_header_and_rebuilds_the_lines() {
    let app = test_app().await;
    let first = erp_order("PO-1", "Meyer", vec![erp_line("A1", "Bolt", dec!(10))]);
    app.services
        .erp
        .import_purchase_orders(std::slice::from_ref(&first))
        .await
        .unwrap();

    // Record a partial delivery locally, then let the feed replace the order.
    let stored = app
        .services
        .purchase_orders
        .find_by_number("PO-1")
        .await
        .unwrap()
        .unwrap();
    let view = app.services.purchase_orders.get_order(stored.id).await.unwrap();
    app.services
        .purchase_orders
        .set_line_received(view.lines[0].line.id, dec!(6))
        .await
        .unwrap();

    let second = erp_order(
        "PO-1",
        "Huber",
        vec![erp_line("A1", "Bolt", dec!(12)), erp_line("A2", "Washer", dec!(3))],
    );
    let result = app
        .services
        .erp
        .import_purchase_orders(std::slice::from_ref(&second))
        .await
        .unwrap();
    assert_eq!(result.imported, 0);
    assert_eq!(result.updated, 1);

    let view = app.services.purchase_orders.get_order(stored.id).await.unwrap();
    assert_eq!(view.supplier.as_ref().unwrap().name, "Huber");
    assert_eq!(view.lines.len(), 2);
    // The rebuilt line set starts over from zero received.
    assert!(view
        .lines
        .iter()
        .all(|l| l.line.received_quantity == Decimal::ZERO));
    assert_eq!(view.lines[0].line.ordered_quantity, dec!(12));
}

#[tokio::test]
async fn one_bad_order_never_aborts_its_siblings() {
    let app = test_app().await;
    let good = erp_order("PO-1", "Meyer", vec![erp_line("A1", "Bolt", dec!(5))]);
    let bad = erp_order("PO-2", "Meyer", vec![erp_line("A2", "Washer", Decimal::ZERO)]);
    let also_good = erp_order("PO-3", "Meyer", vec![erp_line("A3", "Nut", dec!(2))]);

    let result = app
        .services
        .erp
        .import_purchase_orders(&[good, bad, also_good])
        .await
        .unwrap();
    assert_eq!(result.imported, 2);
    assert_eq!(result.skipped, 1);
    assert_eq!(result.details.len(), 1);
    assert!(result.details[0].contains("PO-2"));

    assert!(app
        .services
        .purchase_orders
        .find_by_number("PO-2")
        .await
        .unwrap()
        .is_none());
    assert!(app
        .services
        .purchase_orders
        .find_by_number("PO-3")
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn fetch_skips_malformed_records_individually() {
    let transport = Arc::new(StubTransport {
        orders: vec![
            json!({
                "order_number": "PO-1",
                "supplier_name": "Meyer",
                "lines": [{"sku": "A1", "name": "Bolt", "ordered_quantity": "5"}],
            }),
            json!({"not": "an order"}),
        ],
        ..Default::default()
    });
    let app = test_app_with_transport(Some(transport)).await;

    let orders = app.services.erp.fetch_purchase_orders().await.unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].order_number, "PO-1");
    // Feed defaults apply when the record omits them.
    assert_eq!(
        orders[0].status,
        warehouse_api::entities::PurchaseOrderStatus::Released
    );
}

#[tokio::test]
async fn sync_reports_an_empty_feed_without_failing() {
    let app = test_app().await;

    let result = app.services.erp.sync_purchase_orders().await.unwrap();
    assert_eq!(result.imported, 0);
    assert_eq!(result.updated, 0);
    assert_eq!(result.skipped, 0);
    assert_eq!(
        result.details,
        vec!["no purchase orders received from the ERP".to_string()]
    );
}

#[tokio::test]
async fn sync_names_the_transport_failure_in_the_details() {
    let transport = Arc::new(StubTransport {
        fail_fetch: true,
        ..Default::default()
    });
    let app = test_app_with_transport(Some(transport)).await;

    let result = app.services.erp.sync_purchase_orders().await.unwrap();
    assert_eq!(result.imported, 0);
    assert_eq!(result.skipped, 0);
    assert_eq!(result.details.len(), 1);
    // The detail carries the transport error, distinguishable from a feed
    // that is merely empty.
    assert!(result.details[0].contains("connection refused"));
    assert_ne!(
        result.details[0],
        "no purchase orders received from the ERP"
    );
}

#[tokio::test]
async fn sync_runs_fetch_and_import_end_to_end() {
    let transport = Arc::new(StubTransport {
        orders: vec![json!({
            "order_number": "PO-9",
            "supplier_name": "Meyer",
            "expected_date": "2026-09-15",
            "lines": [{"sku": "A1", "name": "Bolt", "ordered_quantity": "5", "unit_price": "0.12"}],
        })],
        ..Default::default()
    });
    let app = test_app_with_transport(Some(transport)).await;

    let result = app.services.erp.sync_purchase_orders().await.unwrap();
    assert_eq!(result.imported, 1);

    let stored = app
        .services
        .purchase_orders
        .find_by_number("PO-9")
        .await
        .unwrap()
        .unwrap();
    let view = app.services.purchase_orders.get_order(stored.id).await.unwrap();
    assert_eq!(view.lines[0].line.unit_price, Some(dec!(0.12)));
    assert_eq!(
        stored.expected_date,
        Some(chrono::NaiveDate::from_ymd_opt(2026, 9, 15).unwrap())
    );
}
