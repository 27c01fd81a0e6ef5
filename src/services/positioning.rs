//! Proveedor de posicionamiento
//!
//! El controlador nunca lee GPS directamente: consume un proveedor
//! inyectado que devuelve una lectura fresca o un fallo tipado. Cada
//! paso de verificación vuelve a consultar la posición actual; una
//! lectura nunca se cachea entre pasos.

use async_trait::async_trait;
use rand::Rng;
use thiserror::Error;

use crate::models::location::LocationFix;

/// Fallos de adquisición de posición. Recuperables: el caller puede
/// reintentar y ningún estado previo cambia.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PositioningError {
    #[error("Location permission denied. Please enable location access.")]
    PermissionDenied,
    #[error("Location information unavailable. Please check your GPS.")]
    Unavailable,
    #[error("Location request timed out. Please try again.")]
    Timeout,
}

impl PositioningError {
    pub fn code(&self) -> &'static str {
        match self {
            PositioningError::PermissionDenied => "GPS_PERMISSION_DENIED",
            PositioningError::Unavailable => "GPS_UNAVAILABLE",
            PositioningError::Timeout => "GPS_TIMEOUT",
        }
    }
}

#[async_trait]
pub trait PositioningProvider: Send + Sync {
    /// Adquirir la posición actual. Debe devolver una lectura fresca;
    /// el timeout acotado lo impone el controlador.
    async fn current_position(&self) -> Result<LocationFix, PositioningError>;
}

/// Posición reportada por el dispositivo en la request HTTP.
///
/// En el despliegue web el GPS vive en el cliente: la request trae la
/// lectura que el dispositivo acaba de tomar y este proveedor la entrega
/// al controlador como cualquier otra fuente de posición.
pub struct ReportedPositioning {
    fix: LocationFix,
}

impl ReportedPositioning {
    pub fn new(fix: LocationFix) -> Self {
        Self { fix }
    }
}

#[async_trait]
impl PositioningProvider for ReportedPositioning {
    async fn current_position(&self) -> Result<LocationFix, PositioningError> {
        Ok(self.fix)
    }
}

/// Proveedor simulado para desarrollo local: jitter aleatorio alrededor
/// de un punto base, sin demoras artificiales.
pub struct SimulatedPositioning {
    pub base_latitude: f64,
    pub base_longitude: f64,
}

impl SimulatedPositioning {
    pub fn new(base_latitude: f64, base_longitude: f64) -> Self {
        Self {
            base_latitude,
            base_longitude,
        }
    }
}

#[async_trait]
impl PositioningProvider for SimulatedPositioning {
    async fn current_position(&self) -> Result<LocationFix, PositioningError> {
        let (latitude, longitude, accuracy) = {
            let mut rng = rand::thread_rng();
            (
                self.base_latitude + (rng.gen::<f64>() - 0.5) * 0.001,
                self.base_longitude + (rng.gen::<f64>() - 0.5) * 0.001,
                10.0 + rng.gen::<f64>() * 20.0,
            )
        };
        Ok(LocationFix::new(latitude, longitude, accuracy))
    }
}
