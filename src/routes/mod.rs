//! Rutas de la API
//!
//! Este módulo arma el router completo; los tests de integración lo
//! reutilizan sin levantar el binario.

pub mod admin_routes;
pub mod trip_routes;

use axum::{extract::State, routing::get, Json, Router};
use serde_json::json;

use crate::state::AppState;
use crate::store::vehicle_index_key;

pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .nest("/api/trip", trip_routes::create_trip_router())
        .nest("/api/admin", admin_routes::create_admin_router())
}

/// Health check: consulta el almacén para reportar conectividad real,
/// no solo que el proceso responde
async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let store_reachable = state.store.exists(&vehicle_index_key()).await.is_ok();

    Json(json!({
        "service": "trip-coordinator",
        "status": if store_reachable { "healthy" } else { "degraded" },
        "store": if store_reachable { "connected" } else { "disconnected" },
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
