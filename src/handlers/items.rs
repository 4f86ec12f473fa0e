use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::entities::item;
use crate::errors::ServiceError;
use crate::services::catalog::{ItemPatch, NewItem, DEFAULT_UNIT_OF_MEASURE};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateItemRequest {
    pub sku: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_unit")]
    pub unit_of_measure: String,
    #[serde(default)]
    pub reorder_level: i32,
}

fn default_unit() -> String {
    DEFAULT_UNIT_OF_MEASURE.to_string()
}

#[derive(Debug, Deserialize, Default)]
pub struct UpdateItemRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub unit_of_measure: Option<String>,
    pub reorder_level: Option<i32>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_items).post(create_item))
        .route("/:id", get(get_item).put(update_item).delete(delete_item))
}

async fn list_items(State(state): State<AppState>) -> Result<Json<Vec<item::Model>>, ServiceError> {
    Ok(Json(state.services.catalog.list_items().await?))
}

async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<item::Model>, ServiceError> {
    Ok(Json(state.services.catalog.get_item(id).await?))
}

async fn create_item(
    State(state): State<AppState>,
    Json(req): Json<CreateItemRequest>,
) -> Result<(StatusCode, Json<item::Model>), ServiceError> {
    let item = state
        .services
        .catalog
        .create_item(NewItem {
            sku: req.sku,
            name: req.name,
            description: req.description,
            unit_of_measure: req.unit_of_measure,
            reorder_level: req.reorder_level,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(item)))
}

async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateItemRequest>,
) -> Result<Json<item::Model>, ServiceError> {
    let item = state
        .services
        .catalog
        .update_item(
            id,
            ItemPatch {
                name: req.name,
                description: req.description,
                unit_of_measure: req.unit_of_measure,
                reorder_level: req.reorder_level,
            },
        )
        .await?;
    Ok(Json(item))
}

async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ServiceError> {
    state.services.catalog.delete_item(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
