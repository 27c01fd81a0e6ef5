//! Tests de la API HTTP
//!
//! Ejercitan el router completo con requests reales (sin red) sobre el
//! almacén en memoria.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use trip_coordinator::config::EnvironmentConfig;
use trip_coordinator::routes;
use trip_coordinator::state::AppState;
use trip_coordinator::store::MemoryStore;

fn test_app() -> Router {
    let state = AppState::new(Arc::new(MemoryStore::new()), EnvironmentConfig::for_tests());
    routes::create_api_router().with_state(state)
}

async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

fn fix(latitude: f64, longitude: f64) -> Value {
    json!({ "latitude": latitude, "longitude": longitude, "accuracy": 12.0 })
}

/// Dejar el vehículo V-100 con dos conductores logueados vía la API
async fn login_pair_http(app: &Router) {
    let (status, _) = post_json(app, "/api/trip/vehicle/select", json!({ "vehicle": "v-100" })).await;
    assert_eq!(status, StatusCode::OK);

    for (device, phone, name) in [
        ("device-a", "9000000001", "Arun"),
        ("device-b", "9000000002", "Binu"),
    ] {
        let (status, body) = post_json(
            app,
            "/api/trip/driver/login",
            json!({ "device_id": device, "vehicle": "V-100", "phone": phone, "name": name }),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "login de {} falló: {}", phone, body);
        assert_eq!(body["success"], true);
    }
}

#[tokio::test]
async fn test_health_reports_store_connectivity() {
    let app = test_app();

    let (status, body) = get_json(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["service"], "trip-coordinator");
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["store"], "connected");
}

#[tokio::test]
async fn test_logout_uses_response_envelope() {
    let app = test_app();
    login_pair_http(&app).await;

    let (status, body) = post_json(
        &app,
        "/api/trip/logout",
        json!({ "device_id": "device-b" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Logged out");
}

#[tokio::test]
async fn test_full_trip_flow_over_http() {
    let app = test_app();
    login_pair_http(&app).await;

    // Verificación GPS de ambos conductores, a ~16 m entre sí
    let (status, body) = post_json(
        &app,
        "/api/trip/verification/location",
        json!({ "device_id": "device-a", "fix": fix(8.0883, 77.4324) }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["outcome"], "verified");

    let (_, body) = post_json(
        &app,
        "/api/trip/verification/location",
        json!({ "device_id": "device-b", "fix": fix(8.0884, 77.4325) }),
    )
    .await;
    assert_eq!(body["success"], true);

    // Selfie y fotos del vehículo
    let (status, _) = post_json(
        &app,
        "/api/trip/verification/selfie",
        json!({ "device_id": "device-a", "photo": "data:image/jpeg;base64,c2VsZmll" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = post_json(
        &app,
        "/api/trip/verification/photos",
        json!({ "device_id": "device-a", "photos": ["cGhvdG8x", "cGhvdG8y", "cGhvdG8z"] }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["checklist"]["vehicle_photos"], 3);

    // Arranque
    let (status, body) = post_json(
        &app,
        "/api/trip/start",
        json!({ "device_id": "device-a", "fix": fix(8.0883, 77.4324) }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["outcome"], "started");

    let (_, body) = get_json(&app, "/api/trip/status/V-100").await;
    assert_eq!(body["data"]["phase"], "active");
    assert_eq!(body["data"]["status"], "active");

    // Fin dentro de rango
    let (status, body) = post_json(
        &app,
        "/api/trip/end/request",
        json!({ "device_id": "device-a", "fix": fix(8.0884, 77.4325) }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["outcome"], "ended");
    assert_eq!(body["data"]["forced"], false);

    let (_, body) = get_json(&app, "/api/trip/status/V-100").await;
    assert_eq!(body["data"]["phase"], "ended");
}

#[tokio::test]
async fn test_distance_gate_is_a_success_false_response() {
    let app = test_app();
    login_pair_http(&app).await;

    let (_, _) = post_json(
        &app,
        "/api/trip/verification/location",
        json!({ "device_id": "device-a", "fix": fix(8.0883, 77.4324) }),
    )
    .await;

    // B a ~200 m: la puerta responde 200 con success=false, no un error
    let (status, body) = post_json(
        &app,
        "/api/trip/verification/location",
        json!({ "device_id": "device-b", "fix": fix(8.0901, 77.4324) }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "DISTANCE_GATE");
    assert_eq!(body["data"]["outcome"], "distance_rejected");
    assert_eq!(body["data"]["threshold_m"], 90.0);
}

#[tokio::test]
async fn test_invalid_phone_returns_400() {
    let app = test_app();
    post_json(&app, "/api/trip/vehicle/select", json!({ "vehicle": "V-100" })).await;

    let (status, body) = post_json(
        &app,
        "/api/trip/driver/login",
        json!({ "device_id": "device-a", "vehicle": "V-100", "phone": "1234567890" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Validation Error");
}

#[tokio::test]
async fn test_invalid_coordinates_return_400() {
    let app = test_app();
    login_pair_http(&app).await;

    let (status, _) = post_json(
        &app,
        "/api/trip/verification/location",
        json!({ "device_id": "device-a", "fix": fix(123.0, 77.4324) }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_wrong_phase_returns_409() {
    let app = test_app();
    login_pair_http(&app).await;

    // El viaje no está activo todavía
    let (status, _) = post_json(
        &app,
        "/api/trip/end/request",
        json!({ "device_id": "device-a", "fix": fix(8.0883, 77.4324) }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_unknown_session_returns_404() {
    let app = test_app();

    let (status, _) = post_json(
        &app,
        "/api/trip/verification/location",
        json!({ "device_id": "device-x", "fix": fix(8.0883, 77.4324) }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_session_lookup_roundtrip() {
    let app = test_app();
    login_pair_http(&app).await;

    let (status, body) = get_json(&app, "/api/trip/session/device-a").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["vehicle"], "V-100");
    assert_eq!(body["data"]["phone"], "9000000001");

    // Dispositivo sin sesión: success con data null
    let (status, body) = get_json(&app, "/api/trip/session/device-x").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].is_null());
}

#[tokio::test]
async fn test_admin_vehicles_and_notifications() {
    let app = test_app();
    login_pair_http(&app).await;

    let (status, body) = get_json(&app, "/api/admin/vehicles").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["vehicles"][0]["registration"], "V-100");
    assert_eq!(body["data"]["vehicles"][0]["logged_in_count"], 2);

    let (status, body) = get_json(&app, "/api/admin/notifications").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 0);

    // DELETE vacía el log aunque ya esté vacío
    let request = Request::builder()
        .method("DELETE")
        .uri("/api/admin/notifications")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Notificaciones eliminadas exitosamente");
}

#[tokio::test]
async fn test_refused_end_produces_admin_notification() {
    let app = test_app();
    login_pair_http(&app).await;

    for (device, point) in [("device-a", (8.0883, 77.4324)), ("device-b", (8.0884, 77.4325))] {
        post_json(
            &app,
            "/api/trip/verification/location",
            json!({ "device_id": device, "fix": fix(point.0, point.1) }),
        )
        .await;
    }
    post_json(
        &app,
        "/api/trip/verification/selfie",
        json!({ "device_id": "device-a", "photo": "c2VsZmll" }),
    )
    .await;
    post_json(
        &app,
        "/api/trip/verification/photos",
        json!({ "device_id": "device-a", "photos": ["cGhvdG8x", "cGhvdG8y", "cGhvdG8z"] }),
    )
    .await;
    post_json(
        &app,
        "/api/trip/start",
        json!({ "device_id": "device-a", "fix": fix(8.0883, 77.4324) }),
    )
    .await;

    // Intento de fin a ~500 m
    let (status, body) = post_json(
        &app,
        "/api/trip/end/request",
        json!({ "device_id": "device-a", "fix": fix(8.0928, 77.4324) }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["data"]["outcome"], "refused");

    let (_, body) = get_json(&app, "/api/admin/notifications").await;
    assert_eq!(body["data"]["total"], 1);
    let notification = &body["data"]["notifications"][0];
    assert_eq!(notification["type"], "Distance Violation");
    assert_eq!(notification["severity"], "warning");
    assert_eq!(notification["vehicle"], "V-100");
    assert_eq!(notification["driver_phone"], "9000000001");

    // Override forzado habilitado tras el rechazo
    let (status, body) = post_json(
        &app,
        "/api/trip/end/force",
        json!({ "device_id": "device-a" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["forced"], true);
}
