//! Estado del viaje
//!
//! La fase reemplaza los flags dispersos del flujo original: en lugar de
//! re-derivar "el paso actual" de campos sueltos, cada vehículo lleva una
//! fase explícita y una checklist pre-viaje estructurada.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::vehicle::REQUIRED_VEHICLE_PHOTOS;

/// Fase del ciclo de vida del viaje por vehículo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TripPhase {
    /// Vehículo seleccionado, esperando que se complete el quorum
    AwaitingDrivers,
    /// Quorum alcanzado, la verificación pre-viaje puede comenzar
    ReadyToStart,
    /// Verificación pre-viaje en curso (GPS, selfie, fotos del vehículo)
    PreTripVerification,
    Active,
    Ended,
}

impl TripPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            TripPhase::AwaitingDrivers => "awaiting_drivers",
            TripPhase::ReadyToStart => "ready_to_start",
            TripPhase::PreTripVerification => "pre_trip_verification",
            TripPhase::Active => "active",
            TripPhase::Ended => "ended",
        }
    }
}

/// Estado persistente del viaje, exactamente un registro por vehículo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TripStatus {
    NotStarted,
    Active {
        started_at: DateTime<Utc>,
    },
    Ended {
        started_at: DateTime<Utc>,
        ended_at: DateTime<Utc>,
    },
}

impl TripStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, TripStatus::Active { .. })
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        match self {
            TripStatus::NotStarted => None,
            TripStatus::Active { started_at } => Some(*started_at),
            TripStatus::Ended { started_at, .. } => Some(*started_at),
        }
    }
}

/// Checklist pre-viaje del conductor que está operando
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PreTripChecklist {
    pub location_verified: bool,
    pub selfie_captured: bool,
    pub vehicle_photos: usize,
}

impl PreTripChecklist {
    /// Las cuatro condiciones de la puerta de arranque: posición
    /// verificada (incluye proximidad), selfie y exactamente 3 fotos.
    pub fn is_complete(&self) -> bool {
        self.location_verified
            && self.selfie_captured
            && self.vehicle_photos == REQUIRED_VEHICLE_PHOTOS
    }
}
