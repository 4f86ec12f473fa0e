use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};

use crate::erp::{ErpExportResponse, InventorySnapshot};
use crate::errors::ServiceError;
use crate::services::erp_sync::ErpImportResult;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/snapshot", get(snapshot))
        .route("/export", post(export_inventory))
        .route("/sync-orders", post(sync_orders))
}

/// The snapshot as it would be transmitted, without sending it.
async fn snapshot(State(state): State<AppState>) -> Result<Json<InventorySnapshot>, ServiceError> {
    Ok(Json(state.services.erp.build_inventory_snapshot().await?))
}

async fn export_inventory(
    State(state): State<AppState>,
) -> Result<Json<ErpExportResponse>, ServiceError> {
    Ok(Json(state.services.erp.push_inventory_snapshot().await?))
}

async fn sync_orders(State(state): State<AppState>) -> Result<Json<ErpImportResult>, ServiceError> {
    Ok(Json(state.services.erp.sync_purchase_orders().await?))
}
