//! DTOs del flujo de viaje

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::location::LocationFix;
use crate::models::session::DriverSession;
use crate::models::trip::{PreTripChecklist, TripPhase, TripStatus};
use crate::utils::errors::{validation_error, AppResult};
use crate::utils::validation::{validate_latitude, validate_longitude};

/// Lectura GPS reportada por el dispositivo en la request
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct FixPayload {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy: f64,
}

impl FixPayload {
    /// Validar coordenadas y sellar la lectura con el timestamp actual
    pub fn validated_fix(&self) -> AppResult<LocationFix> {
        validate_latitude(self.latitude)
            .map_err(|_| validation_error("latitude", "latitude must be between -90 and 90"))?;
        validate_longitude(self.longitude)
            .map_err(|_| validation_error("longitude", "longitude must be between -180 and 180"))?;
        if !self.accuracy.is_finite() || self.accuracy < 0.0 {
            return Err(validation_error("accuracy", "accuracy must be a non-negative number"));
        }
        Ok(LocationFix::new(self.latitude, self.longitude, self.accuracy))
    }
}

// Requests

#[derive(Debug, Deserialize, Validate)]
pub struct SelectVehicleRequest {
    #[validate(length(min = 1, max = 40))]
    pub vehicle: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct DriverLoginRequest {
    #[validate(length(min = 1, max = 128))]
    pub device_id: String,
    #[validate(length(min = 1, max = 40))]
    pub vehicle: String,
    #[validate(length(min = 1, max = 20))]
    pub phone: String,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct VerifyLocationRequest {
    #[validate(length(min = 1, max = 128))]
    pub device_id: String,
    pub fix: FixPayload,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SelfieRequest {
    #[validate(length(min = 1, max = 128))]
    pub device_id: String,
    #[validate(length(min = 1))]
    pub photo: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct VehiclePhotosRequest {
    #[validate(length(min = 1, max = 128))]
    pub device_id: String,
    pub photos: Vec<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct StartTripRequest {
    #[validate(length(min = 1, max = 128))]
    pub device_id: String,
    pub fix: FixPayload,
}

#[derive(Debug, Deserialize, Validate)]
pub struct EndTripRequest {
    #[validate(length(min = 1, max = 128))]
    pub device_id: String,
    pub fix: FixPayload,
}

#[derive(Debug, Deserialize, Validate)]
pub struct DeviceRequest {
    #[validate(length(min = 1, max = 128))]
    pub device_id: String,
}

// Responses

#[derive(Debug, Serialize)]
pub struct PhaseResponse {
    pub vehicle: String,
    pub phase: TripPhase,
    pub logged_in_count: usize,
    pub quorum: usize,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub session: DriverSession,
    pub phase: TripPhase,
    pub logged_in_count: usize,
    pub quorum: usize,
}

#[derive(Debug, Serialize)]
pub struct ChecklistResponse {
    pub phase: TripPhase,
    pub checklist: PreTripChecklist,
}

#[derive(Debug, Serialize)]
pub struct TripStatusResponse {
    pub vehicle: String,
    pub phase: TripPhase,
    #[serde(flatten)]
    pub trip: TripStatus,
}

/// Resultado de la verificación de posición (paso GPS del checklist)
#[derive(Debug, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LocationGateOutcome {
    Verified {
        checklist: PreTripChecklist,
    },
    /// Puerta de distancia: ningún otro conductor dentro del umbral.
    /// Condición recuperable para el usuario, no un error.
    DistanceRejected {
        nearest_other_m: Option<f64>,
        threshold_m: f64,
    },
}

#[derive(Debug, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StartTripOutcome {
    Started {
        started_at: DateTime<Utc>,
    },
    DistanceRejected {
        nearest_other_m: Option<f64>,
        threshold_m: f64,
    },
}

#[derive(Debug, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EndTripOutcome {
    Ended {
        ended_at: DateTime<Utc>,
        forced: bool,
    },
    /// Fin rechazado por proximidad; la notificación ya quedó en el log
    Refused {
        nearest_other_m: Option<f64>,
        threshold_m: f64,
        notification_id: uuid::Uuid,
    },
}
