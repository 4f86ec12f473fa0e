#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;

use warehouse_api::config::AppConfig;
use warehouse_api::entities::{inventory_transaction, item, storage_location, TransactionType};
use warehouse_api::erp::ErpTransport;
use warehouse_api::migrator::Migrator;
use warehouse_api::services::catalog::{NewItem, NewLocation};
use warehouse_api::services::stock_ledger::NewTransaction;
use warehouse_api::services::AppServices;
use warehouse_api::{app_router, AppState};

pub const TEST_WAREHOUSE_LABEL: &str = "Testlager";

/// One service bundle over a private in-memory database.
pub struct TestApp {
    pub db: Arc<DatabaseConnection>,
    pub services: AppServices,
}

/// Fresh in-memory database with the full schema applied.
///
/// The pool is pinned to a single connection; every connection to
/// `sqlite::memory:` would otherwise open its own empty database.
pub async fn test_db() -> Arc<DatabaseConnection> {
    let mut opts = ConnectOptions::new("sqlite::memory:".to_owned());
    opts.max_connections(1)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(5))
        .sqlx_logging(false);
    let db = Database::connect(opts).await.expect("database connection");
    Migrator::up(&db, None).await.expect("migrations");
    Arc::new(db)
}

pub async fn test_app() -> TestApp {
    test_app_with_transport(None).await
}

pub async fn test_app_with_transport(transport: Option<Arc<dyn ErpTransport>>) -> TestApp {
    let db = test_db().await;
    let services = AppServices::new(db.clone(), transport, TEST_WAREHOUSE_LABEL.to_string());
    TestApp { db, services }
}

/// Full axum application over a fresh in-memory database.
pub async fn test_router() -> axum::Router {
    let app = test_app().await;
    let config: AppConfig = config::Config::builder()
        .build()
        .expect("config builder")
        .try_deserialize()
        .expect("default config");
    app_router(AppState {
        db: app.db,
        config,
        services: app.services,
    })
}

pub async fn seed_item(app: &TestApp, sku: &str, name: &str, reorder_level: i32) -> item::Model {
    app.services
        .catalog
        .create_item(NewItem {
            sku: sku.to_string(),
            name: name.to_string(),
            description: None,
            unit_of_measure: "Stk".to_string(),
            reorder_level,
        })
        .await
        .expect("seed item")
}

pub async fn seed_location(app: &TestApp, name: &str) -> storage_location::Model {
    app.services
        .catalog
        .create_location(NewLocation {
            name: name.to_string(),
            description: None,
        })
        .await
        .expect("seed location")
}

pub async fn receive_stock(
    app: &TestApp,
    item_id: i64,
    location_id: i64,
    quantity: Decimal,
) -> inventory_transaction::Model {
    app.services
        .stock
        .register_transaction(NewTransaction {
            item_id,
            location_id,
            quantity,
            transaction_type: TransactionType::Receipt,
            reference: None,
            note: None,
        })
        .await
        .expect("seed receipt")
}
