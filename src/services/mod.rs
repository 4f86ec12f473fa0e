pub mod catalog;
pub mod erp_sync;
pub mod planning;
pub mod purchase_orders;
pub mod stock_ledger;

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::erp::ErpTransport;

/// Bundle of the five warehouse services sharing one connection pool.
#[derive(Clone)]
pub struct AppServices {
    pub catalog: Arc<catalog::CatalogService>,
    pub stock: Arc<stock_ledger::StockLedgerService>,
    pub purchase_orders: Arc<purchase_orders::PurchaseOrderService>,
    pub erp: Arc<erp_sync::ErpSyncService>,
    pub planning: Arc<planning::PlanningService>,
}

impl AppServices {
    pub fn new(
        db: Arc<DatabaseConnection>,
        erp_transport: Option<Arc<dyn ErpTransport>>,
        warehouse_label: String,
    ) -> Self {
        Self {
            catalog: Arc::new(catalog::CatalogService::new(db.clone())),
            stock: Arc::new(stock_ledger::StockLedgerService::new(db.clone())),
            purchase_orders: Arc::new(purchase_orders::PurchaseOrderService::new(db.clone())),
            erp: Arc::new(erp_sync::ErpSyncService::new(
                db.clone(),
                erp_transport,
                warehouse_label,
            )),
            planning: Arc::new(planning::PlanningService::new(db)),
        }
    }
}
