use std::collections::HashMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
};
use serde::Serialize;
use tracing::instrument;

use crate::entities::{
    item::{self, Entity as ItemEntity},
    purchase_order::{self, Entity as PurchaseOrderEntity},
    purchase_order_line::{self, Entity as PurchaseOrderLineEntity},
    stock_level::{self, Entity as StockLevelEntity},
    PurchaseOrderStatus,
};
use crate::errors::ServiceError;
use crate::services::stock_ledger;

const RECENT_TRANSACTION_COUNT: u64 = 10;

/// Item whose summed stock has fallen to or below its reorder level.
#[derive(Debug, Clone, Serialize)]
pub struct LowStockEntry {
    pub item_id: i64,
    pub sku: String,
    pub name: String,
    pub quantity: Decimal,
    pub reorder_level: i32,
}

/// Headline numbers for the dashboard.
#[derive(Debug, Serialize)]
pub struct DashboardMetrics {
    pub total_items: u64,
    pub total_quantity: Decimal,
    pub open_orders: u64,
    pub low_stock: Vec<LowStockEntry>,
    pub recent_transactions: Vec<stock_ledger::TransactionView>,
}

/// Reorder suggestion for one item, given what is on hand and already
/// inbound on open purchase orders.
#[derive(Debug, Clone, Serialize)]
pub struct PlanningSuggestion {
    pub item_id: i64,
    pub sku: String,
    pub name: String,
    pub reorder_level: i32,
    pub on_hand: Decimal,
    pub on_order: Decimal,
    pub coverage_gap: Decimal,
    pub shortfall: Decimal,
    pub suggested_order: Decimal,
    pub needs_reorder: bool,
}

/// Read-only aggregator over the catalog, ledger and purchase orders.
#[derive(Clone)]
pub struct PlanningService {
    db: Arc<DatabaseConnection>,
}

impl PlanningService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn dashboard_metrics(&self) -> Result<DashboardMetrics, ServiceError> {
        let total_items = ItemEntity::find().count(&*self.db).await?;
        // Orders count as open here while not completed, cancelled ones
        // included, matching the dashboard's historical reading.
        let open_orders = PurchaseOrderEntity::find()
            .filter(purchase_order::Column::Status.ne(PurchaseOrderStatus::Completed))
            .count(&*self.db)
            .await?;

        let items = ItemEntity::find()
            .order_by_asc(item::Column::Name)
            .all(&*self.db)
            .await?;
        let on_hand = self.on_hand_by_item().await?;

        let total_quantity = on_hand.values().copied().sum();
        let low_stock = items
            .iter()
            .filter_map(|item| {
                let quantity = on_hand.get(&item.id).copied().unwrap_or(Decimal::ZERO);
                (quantity <= Decimal::from(item.reorder_level)).then(|| LowStockEntry {
                    item_id: item.id,
                    sku: item.sku.clone(),
                    name: item.name.clone(),
                    quantity,
                    reorder_level: item.reorder_level,
                })
            })
            .collect();

        let recent_transactions =
            stock_ledger::load_transaction_views(&*self.db, RECENT_TRANSACTION_COUNT).await?;

        Ok(DashboardMetrics {
            total_items,
            total_quantity,
            open_orders,
            low_stock,
            recent_transactions,
        })
    }

    /// One suggestion per item, sorted by item name.
    #[instrument(skip(self))]
    pub async fn planning_overview(&self) -> Result<Vec<PlanningSuggestion>, ServiceError> {
        let items = ItemEntity::find()
            .order_by_asc(item::Column::Name)
            .all(&*self.db)
            .await?;
        let on_hand = self.on_hand_by_item().await?;
        let on_order = self.on_order_by_item().await?;

        Ok(items
            .into_iter()
            .map(|item| {
                let on_hand = on_hand.get(&item.id).copied().unwrap_or(Decimal::ZERO);
                let on_order = on_order.get(&item.id).copied().unwrap_or(Decimal::ZERO);
                suggest(item, on_hand, on_order)
            })
            .collect())
    }

    async fn on_hand_by_item(&self) -> Result<HashMap<i64, Decimal>, ServiceError> {
        let mut sums: HashMap<i64, Decimal> = HashMap::new();
        for level in StockLevelEntity::find().all(&*self.db).await? {
            *sums.entry(level.item_id).or_default() += level.quantity;
        }
        Ok(sums)
    }

    /// Outstanding quantity per item across open purchase orders.
    async fn on_order_by_item(&self) -> Result<HashMap<i64, Decimal>, ServiceError> {
        let open_orders: Vec<purchase_order::Model> = PurchaseOrderEntity::find()
            .filter(purchase_order::Column::Status.ne(PurchaseOrderStatus::Completed))
            .filter(purchase_order::Column::Status.ne(PurchaseOrderStatus::Cancelled))
            .all(&*self.db)
            .await?;
        let open_ids: Vec<i64> = open_orders.iter().map(|o| o.id).collect();

        let mut sums: HashMap<i64, Decimal> = HashMap::new();
        if open_ids.is_empty() {
            return Ok(sums);
        }
        for line in PurchaseOrderLineEntity::find()
            .filter(purchase_order_line::Column::PurchaseOrderId.is_in(open_ids))
            .all(&*self.db)
            .await?
        {
            let Some(item_id) = line.item_id else {
                continue;
            };
            let gap = (line.ordered_quantity - line.received_quantity).max(Decimal::ZERO);
            if gap > Decimal::ZERO {
                *sums.entry(item_id).or_default() += gap;
            }
        }
        Ok(sums)
    }
}

fn suggest(item: item::Model, on_hand: Decimal, on_order: Decimal) -> PlanningSuggestion {
    let coverage_gap = Decimal::from(item.reorder_level) - on_hand;
    let shortfall = (coverage_gap - on_order).max(Decimal::ZERO);
    PlanningSuggestion {
        item_id: item.id,
        sku: item.sku,
        name: item.name,
        reorder_level: item.reorder_level,
        on_hand,
        on_order,
        coverage_gap,
        shortfall,
        suggested_order: shortfall,
        needs_reorder: shortfall > Decimal::ZERO,
    }
}
