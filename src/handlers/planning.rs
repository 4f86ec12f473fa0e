use axum::{extract::State, routing::get, Json, Router};

use crate::errors::ServiceError;
use crate::services::planning::{DashboardMetrics, PlanningSuggestion};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/overview", get(overview))
}

async fn dashboard(State(state): State<AppState>) -> Result<Json<DashboardMetrics>, ServiceError> {
    Ok(Json(state.services.planning.dashboard_metrics().await?))
}

async fn overview(
    State(state): State<AppState>,
) -> Result<Json<Vec<PlanningSuggestion>>, ServiceError> {
    Ok(Json(state.services.planning.planning_overview().await?))
}
