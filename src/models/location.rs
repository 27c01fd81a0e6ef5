//! Modelo de posición GPS
//!
//! Una lectura de posición siempre proviene de una consulta en vivo al
//! proveedor de posicionamiento; nunca se reutiliza una lectura vieja
//! entre pasos de verificación.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lectura puntual de GPS
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationFix {
    pub latitude: f64,
    pub longitude: f64,
    /// Precisión estimada en metros
    pub accuracy: f64,
    pub captured_at: DateTime<Utc>,
}

impl LocationFix {
    pub fn new(latitude: f64, longitude: f64, accuracy: f64) -> Self {
        Self {
            latitude,
            longitude,
            accuracy,
            captured_at: Utc::now(),
        }
    }

    /// Formatear coordenadas para logs y mensajes
    pub fn display(&self) -> String {
        format!("{:.6}, {:.6}", self.latitude, self.longitude)
    }
}
