use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Deserialize;

use crate::entities::storage_location;
use crate::errors::ServiceError;
use crate::services::catalog::NewLocation;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateLocationRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_locations).post(create_location))
}

async fn list_locations(
    State(state): State<AppState>,
) -> Result<Json<Vec<storage_location::Model>>, ServiceError> {
    Ok(Json(state.services.catalog.list_locations().await?))
}

async fn create_location(
    State(state): State<AppState>,
    Json(req): Json<CreateLocationRequest>,
) -> Result<(StatusCode, Json<storage_location::Model>), ServiceError> {
    let location = state
        .services
        .catalog
        .create_location(NewLocation {
            name: req.name,
            description: req.description,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(location)))
}
