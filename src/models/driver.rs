//! Modelo de Driver
//!
//! Un conductor se identifica por su teléfono dentro de un vehículo.
//! Un re-login con el mismo teléfono actualiza el registro existente,
//! nunca lo duplica. El logout solo apaga el flag: el historial de
//! participación se conserva para la vista administrativa.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::location::LocationFix;
use crate::models::vehicle::PhotoRef;

/// Registro de conductor dentro de un vehículo
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverRecord {
    /// Teléfono móvil de 10 dígitos, único dentro del vehículo
    pub phone: String,
    /// Nombre para mostrar, puede estar vacío
    #[serde(default)]
    pub name: String,
    pub login_time: DateTime<Utc>,
    pub logout_time: Option<DateTime<Utc>>,
    pub is_logged_in: bool,
    /// Última posición conocida, si alguna vez reportó una
    pub location: Option<LocationFix>,
    /// La posición pasó la puerta de proximidad en esta sesión
    #[serde(default)]
    pub location_verified: bool,
    pub selfie: Option<PhotoRef>,
}

impl DriverRecord {
    pub fn new(phone: String, name: String) -> Self {
        Self {
            phone,
            name,
            login_time: Utc::now(),
            logout_time: None,
            is_logged_in: true,
            location: None,
            location_verified: false,
            selfie: None,
        }
    }

    /// Nombre para mostrar en mensajes; cae al teléfono si no hay nombre
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.phone
        } else {
            &self.name
        }
    }
}
