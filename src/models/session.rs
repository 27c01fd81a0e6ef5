//! Sesión del conductor
//!
//! Identidad del conductor activo en un cliente: exactamente una por
//! dispositivo. Se crea en el login, se reemplaza en un re-login y se
//! destruye en el logout o al terminar el viaje.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverSession {
    pub vehicle: String,
    pub phone: String,
    #[serde(default)]
    pub name: String,
}
