//! Boundary to the external ERP system: wire types and the transport
//! collaborator the reconciliation engine talks to.

pub mod client;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::Date;
use serde::{Deserialize, Serialize};

use crate::entities::PurchaseOrderStatus;

pub use client::HttpErpTransport;

/// Failure of the ERP transport itself (network, HTTP, decoding).
///
/// The reconciliation engine converts these into result data; they never
/// propagate to its callers as errors.
#[derive(Debug, thiserror::Error)]
#[error("ERP transport error: {0}")]
pub struct ErpTransportError(pub String);

/// One stock level projected for export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventorySnapshotEntry {
    pub sku: String,
    pub item_name: String,
    pub location: String,
    pub quantity: Decimal,
    pub unit_of_measure: String,
}

/// Full inventory snapshot pushed to the ERP.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventorySnapshot {
    pub generated_at: DateTime<Utc>,
    pub warehouse: String,
    pub entries: Vec<InventorySnapshotEntry>,
}

/// Acknowledgement returned by a successful snapshot delivery.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErpExportAck {
    /// Record count confirmed by the remote side, when it reports one
    pub transmitted: Option<usize>,
    pub message: Option<String>,
}

/// Outcome category of an export attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErpExportStatus {
    Ok,
    Disabled,
    Error,
}

/// Export result handed back to callers; failures are data, not errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErpExportResponse {
    pub status: ErpExportStatus,
    pub transmitted: usize,
    pub message: Option<String>,
}

/// Purchase order line as described by the ERP feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErpPurchaseOrderLine {
    pub sku: String,
    pub name: String,
    pub ordered_quantity: Decimal,
    #[serde(default)]
    pub unit_price: Option<Decimal>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Purchase order as described by the ERP feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErpPurchaseOrder {
    pub order_number: String,
    pub supplier_name: String,
    #[serde(default)]
    pub expected_date: Option<Date>,
    #[serde(default = "default_import_status")]
    pub status: PurchaseOrderStatus,
    #[serde(default)]
    pub notes: Option<String>,
    pub lines: Vec<ErpPurchaseOrderLine>,
}

fn default_import_status() -> PurchaseOrderStatus {
    PurchaseOrderStatus::Released
}

/// Transport to the external ERP system.
///
/// Implementations must apply their own bounded timeout; callers never hold
/// a database transaction open across these calls.
#[async_trait]
pub trait ErpTransport: Send + Sync {
    /// Delivers an inventory snapshot to the ERP.
    async fn send_snapshot(
        &self,
        snapshot: &InventorySnapshot,
    ) -> Result<ErpExportAck, ErpTransportError>;

    /// Fetches the raw open purchase order records from the ERP.
    async fn fetch_open_orders(&self) -> Result<Vec<serde_json::Value>, ErpTransportError>;
}
