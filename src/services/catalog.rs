use std::sync::Arc;

use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use tracing::{info, instrument};

use crate::entities::{
    item::{self, Entity as ItemEntity},
    purchase_order_line::{self, Entity as PurchaseOrderLineEntity},
    stock_level::{self, Entity as StockLevelEntity},
    inventory_transaction::{self, Entity as InventoryTransactionEntity},
    storage_location::{self, Entity as StorageLocationEntity},
    supplier::{self, Entity as SupplierEntity},
};
use crate::errors::ServiceError;

pub const DEFAULT_LOCATION_NAME: &str = "Hauptlager";
pub const DEFAULT_UNIT_OF_MEASURE: &str = "Stk";

#[derive(Debug, Clone)]
pub struct NewItem {
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub unit_of_measure: String,
    pub reorder_level: i32,
}

/// Partial update; `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub unit_of_measure: Option<String>,
    pub reorder_level: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct NewLocation {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewSupplier {
    pub name: String,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub notes: Option<String>,
}

/// Defaults applied when an item is auto-created from an ERP SKU reference.
#[derive(Debug, Clone, Default)]
pub struct ItemDefaults {
    pub name: Option<String>,
    pub description: Option<String>,
}

fn validate_new_item(input: &NewItem) -> Result<(), ServiceError> {
    if input.sku.trim().is_empty() {
        return Err(ServiceError::InvalidInput("SKU must not be empty".into()));
    }
    if input.name.trim().is_empty() {
        return Err(ServiceError::InvalidInput("name must not be empty".into()));
    }
    if input.reorder_level < 0 {
        return Err(ServiceError::InvalidInput(
            "reorder level must not be negative".into(),
        ));
    }
    Ok(())
}

/// Master data store for items, storage locations and suppliers.
#[derive(Clone)]
pub struct CatalogService {
    db: Arc<DatabaseConnection>,
}

impl CatalogService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    pub async fn list_items(&self) -> Result<Vec<item::Model>, ServiceError> {
        Ok(ItemEntity::find()
            .order_by_asc(item::Column::Name)
            .all(&*self.db)
            .await?)
    }

    pub async fn get_item(&self, item_id: i64) -> Result<item::Model, ServiceError> {
        ItemEntity::find_by_id(item_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("item {item_id} not found")))
    }

    #[instrument(skip(self), fields(sku = %input.sku))]
    pub async fn create_item(&self, input: NewItem) -> Result<item::Model, ServiceError> {
        validate_new_item(&input)?;
        let existing = ItemEntity::find()
            .filter(item::Column::Sku.eq(input.sku.clone()))
            .one(&*self.db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "item with SKU {} already exists",
                input.sku
            )));
        }

        let item = item::ActiveModel {
            sku: Set(input.sku.clone()),
            name: Set(input.name),
            description: Set(input.description),
            unit_of_measure: Set(input.unit_of_measure),
            reorder_level: Set(input.reorder_level),
            ..Default::default()
        }
        .insert(&*self.db)
        .await
        .map_err(|e| {
            ServiceError::conflict_on_unique(e, format!("item with SKU {} already exists", input.sku))
        })?;
        info!(item_id = item.id, "item created");
        Ok(item)
    }

    #[instrument(skip(self, patch))]
    pub async fn update_item(
        &self,
        item_id: i64,
        patch: ItemPatch,
    ) -> Result<item::Model, ServiceError> {
        if let Some(level) = patch.reorder_level {
            if level < 0 {
                return Err(ServiceError::InvalidInput(
                    "reorder level must not be negative".into(),
                ));
            }
        }
        let item = self.get_item(item_id).await?;
        let mut active: item::ActiveModel = item.into();
        if let Some(name) = patch.name {
            active.name = Set(name);
        }
        if let Some(description) = patch.description {
            active.description = Set(Some(description));
        }
        if let Some(unit) = patch.unit_of_measure {
            active.unit_of_measure = Set(unit);
        }
        if let Some(level) = patch.reorder_level {
            active.reorder_level = Set(level);
        }
        Ok(active.update(&*self.db).await?)
    }

    /// Deletes an item together with its stock levels and ledger history.
    ///
    /// Explicit cascade in a fixed order inside one transaction: purchase
    /// order lines are detached (the order keeps its history), stock levels
    /// and transactions are removed, then the item itself.
    #[instrument(skip(self))]
    pub async fn delete_item(&self, item_id: i64) -> Result<(), ServiceError> {
        let item = self.get_item(item_id).await?;
        let txn = self.db.begin().await?;

        PurchaseOrderLineEntity::update_many()
            .col_expr(
                purchase_order_line::Column::ItemId,
                Expr::value(Option::<i64>::None),
            )
            .filter(purchase_order_line::Column::ItemId.eq(item_id))
            .exec(&txn)
            .await?;
        StockLevelEntity::delete_many()
            .filter(stock_level::Column::ItemId.eq(item_id))
            .exec(&txn)
            .await?;
        InventoryTransactionEntity::delete_many()
            .filter(inventory_transaction::Column::ItemId.eq(item_id))
            .exec(&txn)
            .await?;
        ItemEntity::delete_by_id(item_id).exec(&txn).await?;

        txn.commit().await?;
        info!(item_id, sku = %item.sku, "item deleted with stock history");
        Ok(())
    }

    pub async fn list_locations(&self) -> Result<Vec<storage_location::Model>, ServiceError> {
        Ok(StorageLocationEntity::find()
            .order_by_asc(storage_location::Column::Name)
            .all(&*self.db)
            .await?)
    }

    #[instrument(skip(self), fields(name = %input.name))]
    pub async fn create_location(
        &self,
        input: NewLocation,
    ) -> Result<storage_location::Model, ServiceError> {
        if input.name.trim().is_empty() {
            return Err(ServiceError::InvalidInput("name must not be empty".into()));
        }
        let existing = StorageLocationEntity::find()
            .filter(storage_location::Column::Name.eq(input.name.clone()))
            .one(&*self.db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "storage location {} already exists",
                input.name
            )));
        }

        storage_location::ActiveModel {
            name: Set(input.name.clone()),
            description: Set(input.description),
            ..Default::default()
        }
        .insert(&*self.db)
        .await
        .map_err(|e| {
            ServiceError::conflict_on_unique(
                e,
                format!("storage location {} already exists", input.name),
            )
        })
    }

    /// Idempotent bootstrap: guarantees at least one storage location
    /// exists. Invoked once at startup; safe to call again at any time.
    #[instrument(skip(self))]
    pub async fn ensure_default_location(
        &self,
    ) -> Result<storage_location::Model, ServiceError> {
        if let Some(location) = StorageLocationEntity::find()
            .order_by_asc(storage_location::Column::Id)
            .one(&*self.db)
            .await?
        {
            return Ok(location);
        }

        let inserted = storage_location::ActiveModel {
            name: Set(DEFAULT_LOCATION_NAME.to_string()),
            description: Set(Some("Automatisch erzeugter Standardlagerort".to_string())),
            ..Default::default()
        }
        .insert(&*self.db)
        .await;

        match inserted {
            Ok(location) => {
                info!(location_id = location.id, "default storage location created");
                Ok(location)
            }
            // Lost the race against a concurrent bootstrap; the unique name
            // constraint guarantees the row now exists.
            Err(e) if matches!(e.sql_err(), Some(sea_orm::SqlErr::UniqueConstraintViolation(_))) => {
                StorageLocationEntity::find()
                    .filter(storage_location::Column::Name.eq(DEFAULT_LOCATION_NAME))
                    .one(&*self.db)
                    .await?
                    .ok_or_else(|| {
                        ServiceError::InternalError("default location vanished".into())
                    })
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn list_suppliers(&self) -> Result<Vec<supplier::Model>, ServiceError> {
        Ok(SupplierEntity::find()
            .order_by_asc(supplier::Column::Name)
            .all(&*self.db)
            .await?)
    }

    #[instrument(skip(self), fields(name = %input.name))]
    pub async fn create_supplier(
        &self,
        input: NewSupplier,
    ) -> Result<supplier::Model, ServiceError> {
        if input.name.trim().is_empty() {
            return Err(ServiceError::InvalidInput("name must not be empty".into()));
        }
        let existing = SupplierEntity::find()
            .filter(supplier::Column::Name.eq(input.name.clone()))
            .one(&*self.db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "supplier {} already exists",
                input.name
            )));
        }

        supplier::ActiveModel {
            name: Set(input.name.clone()),
            contact_email: Set(input.contact_email),
            contact_phone: Set(input.contact_phone),
            notes: Set(input.notes),
            ..Default::default()
        }
        .insert(&*self.db)
        .await
        .map_err(|e| {
            ServiceError::conflict_on_unique(e, format!("supplier {} already exists", input.name))
        })
    }

    pub async fn get_supplier_by_name(
        &self,
        name: &str,
    ) -> Result<Option<supplier::Model>, ServiceError> {
        find_supplier_by_name(&*self.db, name).await
    }
}

/// Case-insensitive supplier lookup, usable inside any transaction scope.
pub async fn find_supplier_by_name<C: ConnectionTrait>(
    conn: &C,
    name: &str,
) -> Result<Option<supplier::Model>, ServiceError> {
    Ok(SupplierEntity::find()
        .filter(
            Expr::expr(Func::lower(Expr::col(supplier::Column::Name)))
                .eq(name.to_lowercase()),
        )
        .one(conn)
        .await?)
}

/// Resolves a supplier by case-insensitive name, creating it when absent.
pub async fn get_or_create_supplier_by_name<C: ConnectionTrait>(
    conn: &C,
    name: &str,
) -> Result<supplier::Model, ServiceError> {
    if let Some(supplier) = find_supplier_by_name(conn, name).await? {
        return Ok(supplier);
    }
    let supplier = supplier::ActiveModel {
        name: Set(name.to_string()),
        ..Default::default()
    }
    .insert(conn)
    .await?;
    info!(supplier_id = supplier.id, name, "supplier auto-created");
    Ok(supplier)
}

/// Resolves an item by SKU, creating it with defaults when absent.
pub async fn get_or_create_item_by_sku<C: ConnectionTrait>(
    conn: &C,
    sku: &str,
    defaults: ItemDefaults,
) -> Result<item::Model, ServiceError> {
    if let Some(item) = ItemEntity::find()
        .filter(item::Column::Sku.eq(sku))
        .one(conn)
        .await?
    {
        return Ok(item);
    }
    let item = item::ActiveModel {
        sku: Set(sku.to_string()),
        name: Set(defaults.name.unwrap_or_else(|| sku.to_string())),
        description: Set(defaults.description),
        unit_of_measure: Set(DEFAULT_UNIT_OF_MEASURE.to_string()),
        reorder_level: Set(0),
        ..Default::default()
    }
    .insert(conn)
    .await?;
    info!(item_id = item.id, sku, "item auto-created");
    Ok(item)
}
