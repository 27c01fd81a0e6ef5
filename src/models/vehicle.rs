//! Modelo de Vehicle
//!
//! Este módulo contiene el registro por vehículo que el Trip Registry
//! persiste como una unidad: conductores en orden de registro, fotos a
//! nivel de vehículo, fase y estado del viaje. Guardar el registro entero
//! bajo una sola clave mantiene cada mutación como un read-modify-write
//! atómico por vehículo.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::driver::DriverRecord;
use crate::models::trip::{TripPhase, TripStatus};

/// Fotos del vehículo requeridas para arrancar un viaje
pub const REQUIRED_VEHICLE_PHOTOS: usize = 3;

/// Referencia opaca a una foto capturada (digest del payload)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoRef {
    pub reference: String,
    pub captured_at: DateTime<Utc>,
}

/// Registro por vehículo - una clave por matrícula en el almacén
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleRecord {
    /// Matrícula en texto libre, normalizada a mayúsculas
    pub registration: String,
    /// Conductores en orden de primer login
    pub drivers: Vec<DriverRecord>,
    /// Fotos a nivel de vehículo, compartidas por todos los conductores
    pub vehicle_photos: Vec<PhotoRef>,
    pub phase: TripPhase,
    pub trip: TripStatus,
    /// Teléfono del conductor cuyo último intento de fin fue rechazado
    /// por la puerta de proximidad; habilita el fin forzado
    #[serde(default)]
    pub end_refused_for: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl VehicleRecord {
    pub fn new(registration: String) -> Self {
        Self {
            registration,
            drivers: Vec::new(),
            vehicle_photos: Vec::new(),
            phase: TripPhase::AwaitingDrivers,
            trip: TripStatus::NotStarted,
            end_refused_for: None,
            created_at: Utc::now(),
        }
    }

    pub fn driver(&self, phone: &str) -> Option<&DriverRecord> {
        self.drivers.iter().find(|d| d.phone == phone)
    }

    pub fn driver_mut(&mut self, phone: &str) -> Option<&mut DriverRecord> {
        self.drivers.iter_mut().find(|d| d.phone == phone)
    }

    pub fn logged_in_count(&self) -> usize {
        self.drivers.iter().filter(|d| d.is_logged_in).count()
    }
}

/// Resumen por vehículo para el dashboard administrativo
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleOverview {
    pub registration: String,
    pub driver_count: usize,
    pub logged_in_count: usize,
    pub phase: TripPhase,
    pub trip: TripStatus,
}
