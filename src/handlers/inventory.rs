use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::entities::{inventory_transaction, TransactionType};
use crate::errors::ServiceError;
use crate::services::stock_ledger::{NewTransaction, StockLevelView, TransactionView};
use crate::AppState;

const DEFAULT_TRANSACTION_LIMIT: u64 = 20;
const MAX_TRANSACTION_LIMIT: u64 = 200;

#[derive(Debug, Deserialize)]
pub struct RegisterTransactionRequest {
    pub item_id: i64,
    pub location_id: i64,
    pub quantity: Decimal,
    pub transaction_type: TransactionType,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct TransactionListQuery {
    pub limit: Option<u64>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/stock-levels", get(list_stock_levels))
        .route(
            "/transactions",
            get(list_transactions).post(register_transaction),
        )
}

async fn list_stock_levels(
    State(state): State<AppState>,
) -> Result<Json<Vec<StockLevelView>>, ServiceError> {
    Ok(Json(state.services.stock.list_stock_levels().await?))
}

async fn list_transactions(
    State(state): State<AppState>,
    Query(query): Query<TransactionListQuery>,
) -> Result<Json<Vec<TransactionView>>, ServiceError> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_TRANSACTION_LIMIT)
        .min(MAX_TRANSACTION_LIMIT);
    Ok(Json(state.services.stock.list_transactions(limit).await?))
}

async fn register_transaction(
    State(state): State<AppState>,
    Json(req): Json<RegisterTransactionRequest>,
) -> Result<(StatusCode, Json<inventory_transaction::Model>), ServiceError> {
    let recorded = state
        .services
        .stock
        .register_transaction(NewTransaction {
            item_id: req.item_id,
            location_id: req.location_id,
            quantity: req.quantity,
            transaction_type: req.transaction_type,
            reference: req.reference,
            note: req.note,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(recorded)))
}
