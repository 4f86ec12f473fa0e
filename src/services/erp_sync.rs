use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    TransactionTrait,
};
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::entities::{
    purchase_order::{self, Entity as PurchaseOrderEntity},
    purchase_order_line::{self, Entity as PurchaseOrderLineEntity},
};
use crate::erp::{
    ErpExportResponse, ErpExportStatus, ErpPurchaseOrder, ErpTransport, InventorySnapshot,
    InventorySnapshotEntry,
};
use crate::errors::ServiceError;
use crate::services::{catalog, stock_ledger};

/// Aggregate outcome of one import batch.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ErpImportResult {
    pub imported: u32,
    pub updated: u32,
    pub skipped: u32,
    pub details: Vec<String>,
}

enum ImportOutcome {
    Imported,
    Updated,
}

/// Maps between the local inventory/purchase-order model and the external
/// ERP data shape.
///
/// Export failures and a missing transport configuration are reported as
/// data, never as errors; import tolerates malformed and failing orders
/// individually.
pub struct ErpSyncService {
    db: Arc<DatabaseConnection>,
    transport: Option<Arc<dyn ErpTransport>>,
    warehouse_label: String,
}

impl ErpSyncService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        transport: Option<Arc<dyn ErpTransport>>,
        warehouse_label: String,
    ) -> Self {
        Self {
            db,
            transport,
            warehouse_label,
        }
    }

    /// Projects every stock level into the ERP wire shape.
    pub async fn build_inventory_snapshot(&self) -> Result<InventorySnapshot, ServiceError> {
        let levels = stock_ledger::load_stock_level_views(&*self.db).await?;
        let entries = levels
            .into_iter()
            .map(|level| InventorySnapshotEntry {
                sku: level.item.sku,
                item_name: level.item.name,
                location: level.location.name,
                quantity: level.quantity,
                unit_of_measure: level.item.unit_of_measure,
            })
            .collect();
        Ok(InventorySnapshot {
            generated_at: Utc::now(),
            warehouse: self.warehouse_label.clone(),
            entries,
        })
    }

    /// Builds and delivers the inventory snapshot.
    ///
    /// Returns `disabled` when no transport is configured and `error` when
    /// delivery fails; neither aborts the caller.
    #[instrument(skip(self))]
    pub async fn push_inventory_snapshot(&self) -> Result<ErpExportResponse, ServiceError> {
        let Some(transport) = &self.transport else {
            return Ok(ErpExportResponse {
                status: ErpExportStatus::Disabled,
                transmitted: 0,
                message: Some("ERP base URL is not configured".into()),
            });
        };

        // The snapshot is read outside any transaction; the transport call
        // must never hold one open.
        let snapshot = self.build_inventory_snapshot().await?;
        match transport.send_snapshot(&snapshot).await {
            Ok(ack) => Ok(ErpExportResponse {
                status: ErpExportStatus::Ok,
                transmitted: ack.transmitted.unwrap_or(snapshot.entries.len()),
                message: ack.message,
            }),
            Err(e) => {
                warn!(error = %e, "inventory snapshot delivery failed");
                Ok(ErpExportResponse {
                    status: ErpExportStatus::Error,
                    transmitted: 0,
                    message: Some(e.to_string()),
                })
            }
        }
    }

    /// Fetches the ERP's open purchase orders, skipping malformed records
    /// individually. A failing transport is an `ExternalServiceError`; no
    /// transport configured is an empty feed.
    #[instrument(skip(self))]
    pub async fn fetch_purchase_orders(&self) -> Result<Vec<ErpPurchaseOrder>, ServiceError> {
        let Some(transport) = &self.transport else {
            return Ok(Vec::new());
        };
        let raw_orders = transport.fetch_open_orders().await.map_err(|e| {
            warn!(error = %e, "fetching purchase orders from the ERP failed");
            ServiceError::ExternalServiceError(e.to_string())
        })?;

        let mut orders = Vec::with_capacity(raw_orders.len());
        for raw in raw_orders {
            match serde_json::from_value::<ErpPurchaseOrder>(raw) {
                Ok(order) => orders.push(order),
                Err(e) => warn!(error = %e, "skipping malformed ERP purchase order"),
            }
        }
        Ok(orders)
    }

    /// Merges externally described orders into local state, keyed by order
    /// number. Each order commits independently; one failure is counted as
    /// skipped and never aborts its siblings.
    #[instrument(skip(self, orders), fields(count = orders.len()))]
    pub async fn import_purchase_orders(
        &self,
        orders: &[ErpPurchaseOrder],
    ) -> Result<ErpImportResult, ServiceError> {
        let mut result = ErpImportResult::default();

        for order in orders {
            match self.import_single(order).await {
                Ok(ImportOutcome::Imported) => result.imported += 1,
                Ok(ImportOutcome::Updated) => result.updated += 1,
                Err(e) => {
                    warn!(order_number = %order.order_number, error = %e, "order import skipped");
                    result.skipped += 1;
                    result.details.push(format!(
                        "order {} could not be saved: {e}",
                        order.order_number
                    ));
                }
            }
        }

        info!(
            imported = result.imported,
            updated = result.updated,
            skipped = result.skipped,
            "purchase order import finished"
        );
        Ok(result)
    }

    /// Fetch followed by import. A feed that is down is a sync outcome
    /// reported in the details, not an error to the caller.
    pub async fn sync_purchase_orders(&self) -> Result<ErpImportResult, ServiceError> {
        let orders = match self.fetch_purchase_orders().await {
            Ok(orders) => orders,
            Err(e) => {
                return Ok(ErpImportResult {
                    details: vec![format!("fetching purchase orders from the ERP failed: {e}")],
                    ..Default::default()
                })
            }
        };
        if orders.is_empty() {
            return Ok(ErpImportResult {
                details: vec!["no purchase orders received from the ERP".into()],
                ..Default::default()
            });
        }
        self.import_purchase_orders(&orders).await
    }

    async fn import_single(&self, order: &ErpPurchaseOrder) -> Result<ImportOutcome, ServiceError> {
        for line in &order.lines {
            if line.ordered_quantity <= Decimal::ZERO {
                return Err(ServiceError::InvalidInput(format!(
                    "line for SKU {} has a non-positive ordered quantity",
                    line.sku
                )));
            }
        }

        let txn = self.db.begin().await?;

        let supplier = catalog::get_or_create_supplier_by_name(&txn, &order.supplier_name).await?;

        let existing = PurchaseOrderEntity::find()
            .filter(purchase_order::Column::OrderNumber.eq(order.order_number.clone()))
            .one(&txn)
            .await?;

        let (order_id, outcome) = match existing {
            None => {
                let created = purchase_order::ActiveModel {
                    order_number: Set(order.order_number.clone()),
                    supplier_id: Set(Some(supplier.id)),
                    status: Set(order.status),
                    expected_date: Set(order.expected_date),
                    notes: Set(order.notes.clone()),
                    created_at: Set(Utc::now()),
                    ..Default::default()
                }
                .insert(&txn)
                .await?;
                (created.id, ImportOutcome::Imported)
            }
            Some(existing) => {
                // Full header replace, then discard-and-rebuild of the line
                // set; received quantities are reset along with the lines.
                let order_id = existing.id;
                let mut active: purchase_order::ActiveModel = existing.into();
                active.supplier_id = Set(Some(supplier.id));
                active.status = Set(order.status);
                active.expected_date = Set(order.expected_date);
                active.notes = Set(order.notes.clone());
                active.update(&txn).await?;

                PurchaseOrderLineEntity::delete_many()
                    .filter(purchase_order_line::Column::PurchaseOrderId.eq(order_id))
                    .exec(&txn)
                    .await?;
                (order_id, ImportOutcome::Updated)
            }
        };

        for line in &order.lines {
            let item = catalog::get_or_create_item_by_sku(
                &txn,
                &line.sku,
                catalog::ItemDefaults {
                    name: Some(line.name.clone()),
                    description: line.description.clone(),
                },
            )
            .await?;

            purchase_order_line::ActiveModel {
                purchase_order_id: Set(order_id),
                item_id: Set(Some(item.id)),
                description: Set(line.description.clone()),
                ordered_quantity: Set(line.ordered_quantity),
                received_quantity: Set(Decimal::ZERO),
                unit_price: Set(line.unit_price),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
        }

        txn.commit().await?;
        Ok(outcome)
    }
}
