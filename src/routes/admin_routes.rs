//! Rutas administrativas

use axum::{
    extract::State,
    routing::{delete, get},
    Json, Router,
};
use serde_json::json;

use crate::controllers::admin_controller::AdminController;
use crate::dto::ApiResponse;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_admin_router() -> Router<AppState> {
    Router::new()
        .route("/vehicles", get(vehicles_overview))
        .route("/notifications", get(list_notifications))
        .route("/notifications", delete(clear_notifications))
}

async fn vehicles_overview(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let controller = AdminController::new(&state);
    let response = controller.vehicles_overview().await?;
    Ok(Json(json!(ApiResponse::success(response))))
}

async fn list_notifications(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let controller = AdminController::new(&state);
    let response = controller.list_notifications().await?;
    Ok(Json(json!(ApiResponse::success(response))))
}

async fn clear_notifications(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let controller = AdminController::new(&state);
    controller.clear_notifications().await?;
    Ok(Json(json!(ApiResponse::success_with_message(
        (),
        "Notificaciones eliminadas exitosamente".to_string()
    ))))
}
