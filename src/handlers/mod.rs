pub mod erp;
pub mod health;
pub mod inventory;
pub mod items;
pub mod locations;
pub mod planning;
pub mod purchase_orders;
pub mod suppliers;

use axum::Router;

use crate::AppState;

/// Assembles the versioned API surface.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .nest("/items", items::router())
        .nest("/locations", locations::router())
        .nest("/suppliers", suppliers::router())
        .nest("/inventory", inventory::router())
        .nest("/purchase-orders", purchase_orders::router())
        .nest("/planning", planning::router())
        .nest("/erp", erp::router())
}
