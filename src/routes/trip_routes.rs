//! Rutas del flujo de viaje

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use validator::Validate;

use crate::controllers::trip_lifecycle_controller::TripLifecycleController;
use crate::dto::trip_dto::{
    DeviceRequest, DriverLoginRequest, EndTripOutcome, EndTripRequest, LocationGateOutcome,
    SelectVehicleRequest, SelfieRequest, StartTripOutcome, StartTripRequest,
    VehiclePhotosRequest, VerifyLocationRequest,
};
use crate::dto::ApiResponse;
use crate::services::positioning::ReportedPositioning;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_trip_router() -> Router<AppState> {
    Router::new()
        .route("/vehicle/select", post(select_vehicle))
        .route("/driver/login", post(driver_login))
        .route("/verification/location", post(verify_location))
        .route("/verification/selfie", post(record_selfie))
        .route("/verification/photos", post(record_vehicle_photos))
        .route("/start", post(start_trip))
        .route("/end/request", post(request_end_trip))
        .route("/end/force", post(force_end_trip))
        .route("/logout", post(logout))
        .route("/session/:device_id", get(get_session))
        .route("/status/:vehicle", get(get_trip_status))
        .route("/drivers/:vehicle", get(list_drivers))
}

async fn select_vehicle(
    State(state): State<AppState>,
    Json(request): Json<SelectVehicleRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    request.validate()?;
    let controller = TripLifecycleController::new(&state);
    let response = controller.select_vehicle(&request.vehicle).await?;
    Ok(Json(json!(ApiResponse::success(response))))
}

async fn driver_login(
    State(state): State<AppState>,
    Json(request): Json<DriverLoginRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    request.validate()?;
    let controller = TripLifecycleController::new(&state);
    let response = controller
        .driver_login(
            &request.device_id,
            &request.vehicle,
            &request.phone,
            request.name,
        )
        .await?;
    Ok(Json(json!(ApiResponse::success(response))))
}

async fn verify_location(
    State(state): State<AppState>,
    Json(request): Json<VerifyLocationRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    request.validate()?;
    let provider = ReportedPositioning::new(request.fix.validated_fix()?);
    let controller = TripLifecycleController::new(&state);

    match controller.verify_location(&request.device_id, &provider).await? {
        outcome @ LocationGateOutcome::Verified { .. } => Ok(Json(json!({
            "success": true,
            "data": outcome,
        }))),
        outcome @ LocationGateOutcome::DistanceRejected { .. } => Ok(Json(json!({
            "success": false,
            "code": "DISTANCE_GATE",
            "message": "All drivers must be within range to continue",
            "data": outcome,
        }))),
    }
}

async fn record_selfie(
    State(state): State<AppState>,
    Json(request): Json<SelfieRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    request.validate()?;
    let controller = TripLifecycleController::new(&state);
    let response = controller
        .record_selfie(&request.device_id, &request.photo)
        .await?;
    Ok(Json(json!(ApiResponse::success(response))))
}

async fn record_vehicle_photos(
    State(state): State<AppState>,
    Json(request): Json<VehiclePhotosRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    request.validate()?;
    let controller = TripLifecycleController::new(&state);
    let response = controller
        .record_vehicle_photos(&request.device_id, &request.photos)
        .await?;
    Ok(Json(json!(ApiResponse::success(response))))
}

async fn start_trip(
    State(state): State<AppState>,
    Json(request): Json<StartTripRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    request.validate()?;
    let provider = ReportedPositioning::new(request.fix.validated_fix()?);
    let controller = TripLifecycleController::new(&state);

    match controller.start_trip(&request.device_id, &provider).await? {
        outcome @ StartTripOutcome::Started { .. } => Ok(Json(json!({
            "success": true,
            "data": outcome,
        }))),
        outcome @ StartTripOutcome::DistanceRejected { .. } => Ok(Json(json!({
            "success": false,
            "code": "DISTANCE_GATE",
            "message": "All drivers must be within range to start the trip",
            "data": outcome,
        }))),
    }
}

async fn request_end_trip(
    State(state): State<AppState>,
    Json(request): Json<EndTripRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    request.validate()?;
    let provider = ReportedPositioning::new(request.fix.validated_fix()?);
    let controller = TripLifecycleController::new(&state);

    match controller
        .request_end_trip(&request.device_id, &provider)
        .await?
    {
        outcome @ EndTripOutcome::Ended { .. } => Ok(Json(json!({
            "success": true,
            "data": outcome,
        }))),
        outcome @ EndTripOutcome::Refused { .. } => Ok(Json(json!({
            "success": false,
            "code": "DISTANCE_GATE",
            "message": "Cannot end trip - drivers are too far apart",
            "data": outcome,
        }))),
    }
}

async fn force_end_trip(
    State(state): State<AppState>,
    Json(request): Json<DeviceRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    request.validate()?;
    let controller = TripLifecycleController::new(&state);
    let outcome = controller.force_end_trip(&request.device_id).await?;
    Ok(Json(json!({
        "success": true,
        "data": outcome,
    })))
}

async fn logout(
    State(state): State<AppState>,
    Json(request): Json<DeviceRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    request.validate()?;
    let controller = TripLifecycleController::new(&state);
    controller.logout(&request.device_id).await?;
    Ok(Json(json!(ApiResponse::success_with_message(
        (),
        "Logged out".to_string()
    ))))
}

async fn get_session(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let controller = TripLifecycleController::new(&state);
    let session = controller.get_session(&device_id).await?;
    Ok(Json(json!({
        "success": true,
        "data": session,
    })))
}

async fn get_trip_status(
    State(state): State<AppState>,
    Path(vehicle): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let controller = TripLifecycleController::new(&state);
    let response = controller.get_trip_status(&vehicle).await?;
    Ok(Json(json!(ApiResponse::success(response))))
}

async fn list_drivers(
    State(state): State<AppState>,
    Path(vehicle): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let controller = TripLifecycleController::new(&state);
    let drivers = controller.list_drivers(&vehicle).await?;
    Ok(Json(json!({
        "success": true,
        "data": drivers,
    })))
}
