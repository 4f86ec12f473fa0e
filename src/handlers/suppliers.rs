use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Deserialize;

use crate::entities::supplier;
use crate::errors::ServiceError;
use crate::services::catalog::NewSupplier;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateSupplierRequest {
    pub name: String,
    #[serde(default)]
    pub contact_email: Option<String>,
    #[serde(default)]
    pub contact_phone: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_suppliers).post(create_supplier))
}

async fn list_suppliers(
    State(state): State<AppState>,
) -> Result<Json<Vec<supplier::Model>>, ServiceError> {
    Ok(Json(state.services.catalog.list_suppliers().await?))
}

async fn create_supplier(
    State(state): State<AppState>,
    Json(req): Json<CreateSupplierRequest>,
) -> Result<(StatusCode, Json<supplier::Model>), ServiceError> {
    let supplier = state
        .services
        .catalog
        .create_supplier(NewSupplier {
            name: req.name,
            contact_email: req.contact_email,
            contact_phone: req.contact_phone,
            notes: req.notes,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(supplier)))
}
