use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    DatabaseTransaction, EntityTrait, QueryFilter, QueryOrder, QuerySelect, SqlErr,
    TransactionTrait,
};
use serde::Serialize;
use tracing::{info, instrument};

use crate::entities::{
    inventory_transaction::{self, Entity as InventoryTransactionEntity},
    item::{self, Entity as ItemEntity},
    stock_level::{self, Entity as StockLevelEntity},
    storage_location::{self, Entity as StorageLocationEntity},
    TransactionType,
};
use crate::errors::ServiceError;

/// Input for one stock movement.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub item_id: i64,
    pub location_id: i64,
    pub quantity: Decimal,
    pub transaction_type: TransactionType,
    pub reference: Option<String>,
    pub note: Option<String>,
}

/// Stock level joined with its item and location master data.
#[derive(Debug, Clone, Serialize)]
pub struct StockLevelView {
    pub id: i64,
    pub quantity: Decimal,
    pub item: item::Model,
    pub location: storage_location::Model,
}

/// Ledger entry joined with its item and location master data.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionView {
    #[serde(flatten)]
    pub transaction: inventory_transaction::Model,
    pub item: item::Model,
    pub location: storage_location::Model,
}

/// The only component allowed to mutate stock quantities.
///
/// Every mutation runs as one atomic unit: resolve item and location, look
/// up or lazily create the stock level, apply the per-type delta, append
/// the ledger entry. Stock never goes negative; writers to the same level
/// serialize on an exclusive row lock.
#[derive(Clone)]
pub struct StockLedgerService {
    db: Arc<DatabaseConnection>,
}

impl StockLedgerService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self), fields(item_id = input.item_id, location_id = input.location_id))]
    pub async fn register_transaction(
        &self,
        input: NewTransaction,
    ) -> Result<inventory_transaction::Model, ServiceError> {
        if input.quantity.is_zero() {
            return Err(ServiceError::InvalidInput(
                "movement quantity must not be zero".into(),
            ));
        }

        let txn = self.db.begin().await?;

        let item = ItemEntity::find_by_id(input.item_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("item {} not found", input.item_id)))?;
        let location = StorageLocationEntity::find_by_id(input.location_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("storage location {} not found", input.location_id))
            })?;

        // Read under an exclusive row lock so concurrent movements against
        // the same (item, location) serialize at the store instead of both
        // passing the negativity check on a stale quantity.
        let level = match StockLevelEntity::find()
            .filter(stock_level::Column::ItemId.eq(item.id))
            .filter(stock_level::Column::LocationId.eq(location.id))
            .lock_exclusive()
            .one(&txn)
            .await?
        {
            Some(level) => level,
            None => create_level_at_zero(&txn, item.id, location.id).await?,
        };

        let new_quantity = apply_delta(level.quantity, input.quantity, input.transaction_type)?;

        let mut active: stock_level::ActiveModel = level.into();
        active.quantity = Set(new_quantity);
        active.update(&txn).await?;

        let recorded = inventory_transaction::ActiveModel {
            item_id: Set(item.id),
            location_id: Set(location.id),
            quantity: Set(input.quantity),
            transaction_type: Set(input.transaction_type),
            reference: Set(input.reference),
            note: Set(input.note),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        info!(
            transaction_id = recorded.id,
            transaction_type = %recorded.transaction_type,
            %new_quantity,
            "stock movement registered"
        );
        Ok(recorded)
    }

    /// All stock levels in stable (id) order, with master data attached.
    pub async fn list_stock_levels(&self) -> Result<Vec<StockLevelView>, ServiceError> {
        load_stock_level_views(&*self.db).await
    }

    /// The most recent ledger entries, newest first.
    pub async fn list_transactions(
        &self,
        limit: u64,
    ) -> Result<Vec<TransactionView>, ServiceError> {
        load_transaction_views(&*self.db, limit).await
    }
}

/// Inserts the zero-quantity row for a first movement.
///
/// Runs inside a savepoint: losing the insert race against a concurrent
/// first movement must not poison the outer transaction, and the unique
/// (item, location) index guarantees the row exists afterwards, so it is
/// refetched under the same exclusive lock.
async fn create_level_at_zero(
    txn: &DatabaseTransaction,
    item_id: i64,
    location_id: i64,
) -> Result<stock_level::Model, ServiceError> {
    let nested = txn.begin().await?;
    let inserted = stock_level::ActiveModel {
        item_id: Set(item_id),
        location_id: Set(location_id),
        quantity: Set(Decimal::ZERO),
        ..Default::default()
    }
    .insert(&nested)
    .await;

    match inserted {
        Ok(level) => {
            nested.commit().await?;
            Ok(level)
        }
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            nested.rollback().await?;
            StockLevelEntity::find()
                .filter(stock_level::Column::ItemId.eq(item_id))
                .filter(stock_level::Column::LocationId.eq(location_id))
                .lock_exclusive()
                .one(txn)
                .await?
                .ok_or_else(|| ServiceError::InternalError("stock level vanished".into()))
        }
        Err(e) => Err(e.into()),
    }
}

/// Applies one movement to a current quantity, enforcing the per-type sign
/// rules and the non-negativity invariant. Returns the new level.
fn apply_delta(
    current: Decimal,
    quantity: Decimal,
    transaction_type: TransactionType,
) -> Result<Decimal, ServiceError> {
    let new_quantity = match transaction_type {
        TransactionType::Receipt => {
            if quantity <= Decimal::ZERO {
                return Err(ServiceError::InvalidInput(
                    "a receipt requires a positive amount".into(),
                ));
            }
            current + quantity
        }
        TransactionType::Shipment => {
            if quantity <= Decimal::ZERO {
                return Err(ServiceError::InvalidInput(
                    "a shipment requires a positive amount".into(),
                ));
            }
            current - quantity
        }
        // Adjustments carry their own sign.
        TransactionType::Adjustment => current + quantity,
    };

    if new_quantity < Decimal::ZERO {
        return Err(ServiceError::InvalidInput(
            "stock level must not become negative".into(),
        ));
    }
    Ok(new_quantity)
}

/// Loads all stock levels in stable (id) order with master data attached.
/// Shared with the ERP reconciliation engine for snapshot export.
pub async fn load_stock_level_views<C: ConnectionTrait>(
    conn: &C,
) -> Result<Vec<StockLevelView>, ServiceError> {
    let levels = StockLevelEntity::find()
        .order_by_asc(stock_level::Column::Id)
        .all(conn)
        .await?;
    let items = load_items_by_id(conn).await?;
    let locations = load_locations_by_id(conn).await?;

    levels
        .into_iter()
        .map(|level| {
            let item = items
                .get(&level.item_id)
                .cloned()
                .ok_or_else(|| ServiceError::InternalError("stock level without item".into()))?;
            let location = locations.get(&level.location_id).cloned().ok_or_else(|| {
                ServiceError::InternalError("stock level without location".into())
            })?;
            Ok(StockLevelView {
                id: level.id,
                quantity: level.quantity,
                item,
                location,
            })
        })
        .collect()
}

/// Loads the newest `limit` ledger entries with master data attached.
/// Shared with the planning aggregator.
pub async fn load_transaction_views<C: ConnectionTrait>(
    conn: &C,
    limit: u64,
) -> Result<Vec<TransactionView>, ServiceError> {
    let transactions = InventoryTransactionEntity::find()
        .order_by_desc(inventory_transaction::Column::CreatedAt)
        .order_by_desc(inventory_transaction::Column::Id)
        .limit(limit)
        .all(conn)
        .await?;
    let items = load_items_by_id(conn).await?;
    let locations = load_locations_by_id(conn).await?;

    transactions
        .into_iter()
        .map(|transaction| {
            let item = items
                .get(&transaction.item_id)
                .cloned()
                .ok_or_else(|| ServiceError::InternalError("transaction without item".into()))?;
            let location = locations
                .get(&transaction.location_id)
                .cloned()
                .ok_or_else(|| ServiceError::InternalError("transaction without location".into()))?;
            Ok(TransactionView {
                transaction,
                item,
                location,
            })
        })
        .collect()
}

async fn load_items_by_id<C: ConnectionTrait>(
    conn: &C,
) -> Result<HashMap<i64, item::Model>, ServiceError> {
    Ok(ItemEntity::find()
        .all(conn)
        .await?
        .into_iter()
        .map(|i| (i.id, i))
        .collect())
}

async fn load_locations_by_id<C: ConnectionTrait>(
    conn: &C,
) -> Result<HashMap<i64, storage_location::Model>, ServiceError> {
    Ok(StorageLocationEntity::find()
        .all(conn)
        .await?
        .into_iter()
        .map(|l| (l.id, l))
        .collect())
}
