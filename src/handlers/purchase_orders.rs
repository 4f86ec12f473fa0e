use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::Date;
use serde::Deserialize;

use crate::entities::{purchase_order_line, PurchaseOrderStatus};
use crate::errors::ServiceError;
use crate::services::purchase_orders::{NewOrder, NewOrderLine, OrderPatch, OrderView};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct OrderLineRequest {
    #[serde(default)]
    pub item_id: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
    pub ordered_quantity: Decimal,
    #[serde(default)]
    pub unit_price: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub order_number: String,
    #[serde(default)]
    pub supplier_id: Option<i64>,
    #[serde(default = "default_status")]
    pub status: PurchaseOrderStatus,
    #[serde(default)]
    pub expected_date: Option<Date>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub lines: Vec<OrderLineRequest>,
}

fn default_status() -> PurchaseOrderStatus {
    PurchaseOrderStatus::Draft
}

#[derive(Debug, Deserialize, Default)]
pub struct UpdateOrderRequest {
    pub supplier_id: Option<i64>,
    pub status: Option<PurchaseOrderStatus>,
    pub expected_date: Option<Date>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReceiveLineRequest {
    pub received_quantity: Decimal,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_orders).post(create_order))
        .route(
            "/:id",
            get(get_order).put(update_order).delete(delete_order),
        )
        .route("/:id/lines", axum::routing::post(add_line))
        .route("/lines/:line_id/received", put(set_line_received))
}

impl From<OrderLineRequest> for NewOrderLine {
    fn from(req: OrderLineRequest) -> Self {
        NewOrderLine {
            item_id: req.item_id,
            description: req.description,
            ordered_quantity: req.ordered_quantity,
            unit_price: req.unit_price,
        }
    }
}

async fn list_orders(State(state): State<AppState>) -> Result<Json<Vec<OrderView>>, ServiceError> {
    Ok(Json(state.services.purchase_orders.list_orders().await?))
}

async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<OrderView>, ServiceError> {
    Ok(Json(state.services.purchase_orders.get_order(id).await?))
}

async fn create_order(
    State(state): State<AppState>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderView>), ServiceError> {
    let order = state
        .services
        .purchase_orders
        .create_order(NewOrder {
            order_number: req.order_number,
            supplier_id: req.supplier_id,
            status: req.status,
            expected_date: req.expected_date,
            notes: req.notes,
            lines: req.lines.into_iter().map(Into::into).collect(),
        })
        .await?;
    Ok((StatusCode::CREATED, Json(order)))
}

async fn update_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateOrderRequest>,
) -> Result<Json<OrderView>, ServiceError> {
    let order = state
        .services
        .purchase_orders
        .update_order(
            id,
            OrderPatch {
                supplier_id: req.supplier_id,
                status: req.status,
                expected_date: req.expected_date,
                notes: req.notes,
            },
        )
        .await?;
    Ok(Json(order))
}

async fn delete_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ServiceError> {
    state.services.purchase_orders.delete_order(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn add_line(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<OrderLineRequest>,
) -> Result<(StatusCode, Json<purchase_order_line::Model>), ServiceError> {
    let line = state
        .services
        .purchase_orders
        .add_line(id, req.into())
        .await?;
    Ok((StatusCode::CREATED, Json(line)))
}

async fn set_line_received(
    State(state): State<AppState>,
    Path(line_id): Path<i64>,
    Json(req): Json<ReceiveLineRequest>,
) -> Result<Json<purchase_order_line::Model>, ServiceError> {
    let line = state
        .services
        .purchase_orders
        .set_line_received(line_id, req.received_quantity)
        .await?;
    Ok(Json(line))
}
