use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::entity::prelude::Date;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use serde::Serialize;
use tracing::{info, instrument};

use crate::entities::{
    item::{self, Entity as ItemEntity},
    purchase_order::{self, Entity as PurchaseOrderEntity},
    purchase_order_line::{self, Entity as PurchaseOrderLineEntity},
    supplier::{self, Entity as SupplierEntity},
    PurchaseOrderStatus,
};
use crate::errors::ServiceError;

#[derive(Debug, Clone)]
pub struct NewOrderLine {
    pub item_id: Option<i64>,
    pub description: Option<String>,
    pub ordered_quantity: Decimal,
    pub unit_price: Option<Decimal>,
}

#[derive(Debug, Clone)]
pub struct NewOrder {
    pub order_number: String,
    pub supplier_id: Option<i64>,
    pub status: PurchaseOrderStatus,
    pub expected_date: Option<Date>,
    pub notes: Option<String>,
    pub lines: Vec<NewOrderLine>,
}

/// Partial update; `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct OrderPatch {
    pub supplier_id: Option<i64>,
    pub status: Option<PurchaseOrderStatus>,
    pub expected_date: Option<Date>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LineView {
    #[serde(flatten)]
    pub line: purchase_order_line::Model,
    pub item: Option<item::Model>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderView {
    #[serde(flatten)]
    pub order: purchase_order::Model,
    pub supplier: Option<supplier::Model>,
    pub lines: Vec<LineView>,
}

pub(crate) fn validate_line(line: &NewOrderLine) -> Result<(), ServiceError> {
    if line.ordered_quantity <= Decimal::ZERO {
        return Err(ServiceError::InvalidInput(
            "ordered quantity must be positive".into(),
        ));
    }
    if let Some(price) = line.unit_price {
        if price < Decimal::ZERO {
            return Err(ServiceError::InvalidInput(
                "unit price must not be negative".into(),
            ));
        }
    }
    Ok(())
}

/// Sum of the positive per-line gaps between ordered and received.
pub fn order_remaining(lines: &[purchase_order_line::Model]) -> Decimal {
    lines
        .iter()
        .map(|line| (line.ordered_quantity - line.received_quantity).max(Decimal::ZERO))
        .sum()
}

/// An order is open while it is neither completed nor cancelled and still
/// has undelivered quantity on at least one line.
pub fn is_open(order: &purchase_order::Model, lines: &[purchase_order_line::Model]) -> bool {
    !matches!(
        order.status,
        PurchaseOrderStatus::Completed | PurchaseOrderStatus::Cancelled
    ) && order_remaining(lines) > Decimal::ZERO
}

/// Manages purchase order headers, lines and received quantities.
#[derive(Clone)]
pub struct PurchaseOrderService {
    db: Arc<DatabaseConnection>,
}

impl PurchaseOrderService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Creates an order header and its initial lines as one unit; nothing
    /// is persisted when any line is invalid.
    #[instrument(skip(self, input), fields(order_number = %input.order_number))]
    pub async fn create_order(&self, input: NewOrder) -> Result<OrderView, ServiceError> {
        for line in &input.lines {
            validate_line(line)?;
        }

        let txn = self.db.begin().await?;

        if let Some(supplier_id) = input.supplier_id {
            ensure_supplier_exists(&txn, supplier_id).await?;
        }

        let existing = PurchaseOrderEntity::find()
            .filter(purchase_order::Column::OrderNumber.eq(input.order_number.clone()))
            .one(&txn)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "order number {} already exists",
                input.order_number
            )));
        }

        let order = purchase_order::ActiveModel {
            order_number: Set(input.order_number.clone()),
            supplier_id: Set(input.supplier_id),
            status: Set(input.status),
            expected_date: Set(input.expected_date),
            notes: Set(input.notes),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| {
            ServiceError::conflict_on_unique(
                e,
                format!("order number {} already exists", input.order_number),
            )
        })?;

        for line in input.lines {
            insert_line(&txn, order.id, line).await?;
        }

        txn.commit().await?;
        info!(order_id = order.id, "purchase order created");
        self.get_order(order.id).await
    }

    /// Applies a partial update to the header; unset fields stay untouched.
    #[instrument(skip(self, patch))]
    pub async fn update_order(
        &self,
        order_id: i64,
        patch: OrderPatch,
    ) -> Result<OrderView, ServiceError> {
        let order = PurchaseOrderEntity::find_by_id(order_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("purchase order {order_id} not found"))
            })?;

        if let Some(supplier_id) = patch.supplier_id {
            ensure_supplier_exists(&*self.db, supplier_id).await?;
        }

        let mut active: purchase_order::ActiveModel = order.into();
        if let Some(supplier_id) = patch.supplier_id {
            active.supplier_id = Set(Some(supplier_id));
        }
        if let Some(status) = patch.status {
            active.status = Set(status);
        }
        if let Some(expected_date) = patch.expected_date {
            active.expected_date = Set(Some(expected_date));
        }
        if let Some(notes) = patch.notes {
            active.notes = Set(Some(notes));
        }
        active.update(&*self.db).await?;
        self.get_order(order_id).await
    }

    /// Appends a line to an existing order; received quantity starts at 0.
    #[instrument(skip(self, line))]
    pub async fn add_line(
        &self,
        order_id: i64,
        line: NewOrderLine,
    ) -> Result<purchase_order_line::Model, ServiceError> {
        validate_line(&line)?;
        let order = PurchaseOrderEntity::find_by_id(order_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("purchase order {order_id} not found"))
            })?;
        insert_line(&*self.db, order.id, line).await
    }

    /// Overwrites a line's received quantity (absolute set, idempotent).
    ///
    /// Deliberately does not post a stock ledger receipt; that linkage is
    /// left to the caller.
    #[instrument(skip(self))]
    pub async fn set_line_received(
        &self,
        line_id: i64,
        received_quantity: Decimal,
    ) -> Result<purchase_order_line::Model, ServiceError> {
        if received_quantity < Decimal::ZERO {
            return Err(ServiceError::InvalidInput(
                "received quantity must not be negative".into(),
            ));
        }
        let line = PurchaseOrderLineEntity::find_by_id(line_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("order line {line_id} not found")))?;

        let mut active: purchase_order_line::ActiveModel = line.into();
        active.received_quantity = Set(received_quantity);
        Ok(active.update(&*self.db).await?)
    }

    pub async fn get_order(&self, order_id: i64) -> Result<OrderView, ServiceError> {
        let order = PurchaseOrderEntity::find_by_id(order_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("purchase order {order_id} not found"))
            })?;
        let mut views = self.assemble_views(vec![order]).await?;
        views
            .pop()
            .ok_or_else(|| ServiceError::InternalError("order view assembly failed".into()))
    }

    pub async fn find_by_number(
        &self,
        order_number: &str,
    ) -> Result<Option<purchase_order::Model>, ServiceError> {
        Ok(PurchaseOrderEntity::find()
            .filter(purchase_order::Column::OrderNumber.eq(order_number))
            .one(&*self.db)
            .await?)
    }

    /// All orders, newest first, with supplier and lines attached.
    pub async fn list_orders(&self) -> Result<Vec<OrderView>, ServiceError> {
        let orders = PurchaseOrderEntity::find()
            .order_by_desc(purchase_order::Column::CreatedAt)
            .order_by_desc(purchase_order::Column::Id)
            .all(&*self.db)
            .await?;
        self.assemble_views(orders).await
    }

    /// Deletes an order and its owned lines in one transaction.
    #[instrument(skip(self))]
    pub async fn delete_order(&self, order_id: i64) -> Result<(), ServiceError> {
        let order = PurchaseOrderEntity::find_by_id(order_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("purchase order {order_id} not found"))
            })?;

        let txn = self.db.begin().await?;
        PurchaseOrderLineEntity::delete_many()
            .filter(purchase_order_line::Column::PurchaseOrderId.eq(order.id))
            .exec(&txn)
            .await?;
        PurchaseOrderEntity::delete_by_id(order.id).exec(&txn).await?;
        txn.commit().await?;
        info!(order_id, order_number = %order.order_number, "purchase order deleted");
        Ok(())
    }

    async fn assemble_views(
        &self,
        orders: Vec<purchase_order::Model>,
    ) -> Result<Vec<OrderView>, ServiceError> {
        let suppliers: HashMap<i64, supplier::Model> = SupplierEntity::find()
            .all(&*self.db)
            .await?
            .into_iter()
            .map(|s| (s.id, s))
            .collect();
        let items: HashMap<i64, item::Model> = ItemEntity::find()
            .all(&*self.db)
            .await?
            .into_iter()
            .map(|i| (i.id, i))
            .collect();

        let order_ids: Vec<i64> = orders.iter().map(|o| o.id).collect();
        let mut lines_by_order: HashMap<i64, Vec<purchase_order_line::Model>> = HashMap::new();
        for line in PurchaseOrderLineEntity::find()
            .filter(purchase_order_line::Column::PurchaseOrderId.is_in(order_ids))
            .order_by_asc(purchase_order_line::Column::Id)
            .all(&*self.db)
            .await?
        {
            lines_by_order
                .entry(line.purchase_order_id)
                .or_default()
                .push(line);
        }

        Ok(orders
            .into_iter()
            .map(|order| {
                let supplier = order.supplier_id.and_then(|id| suppliers.get(&id).cloned());
                let lines = lines_by_order
                    .remove(&order.id)
                    .unwrap_or_default()
                    .into_iter()
                    .map(|line| {
                        let item = line.item_id.and_then(|id| items.get(&id).cloned());
                        LineView { line, item }
                    })
                    .collect();
                OrderView {
                    order,
                    supplier,
                    lines,
                }
            })
            .collect())
    }
}

async fn ensure_supplier_exists<C: ConnectionTrait>(
    conn: &C,
    supplier_id: i64,
) -> Result<(), ServiceError> {
    SupplierEntity::find_by_id(supplier_id)
        .one(conn)
        .await?
        .map(|_| ())
        .ok_or_else(|| ServiceError::NotFound(format!("supplier {supplier_id} not found")))
}

async fn insert_line<C: ConnectionTrait>(
    conn: &C,
    order_id: i64,
    line: NewOrderLine,
) -> Result<purchase_order_line::Model, ServiceError> {
    if let Some(item_id) = line.item_id {
        ItemEntity::find_by_id(item_id)
            .one(conn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("item {item_id} for order line not found"))
            })?;
    }
    Ok(purchase_order_line::ActiveModel {
        purchase_order_id: Set(order_id),
        item_id: Set(line.item_id),
        description: Set(line.description),
        ordered_quantity: Set(line.ordered_quantity),
        received_quantity: Set(Decimal::ZERO),
        unit_price: Set(line.unit_price),
        ..Default::default()
    }
    .insert(conn)
    .await?)
}
