//! Utilidades de validación
//!
//! Este módulo contiene funciones helper para validación de datos
//! de entrada antes de tocar cualquier estado.

use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

lazy_static! {
    /// Móvil de 10 dígitos que empieza en 6-9
    static ref PHONE_RE: Regex = Regex::new(r"^[6-9]\d{9}$").unwrap();
}

/// Normalizar un teléfono: descartar todo lo que no sea dígito y
/// quedarse con los primeros 10
pub fn normalize_phone(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_ascii_digit())
        .take(10)
        .collect()
}

/// Validar un teléfono ya normalizado
pub fn validate_phone(value: &str) -> Result<(), ValidationError> {
    if !PHONE_RE.is_match(value) {
        let mut error = ValidationError::new("phone");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Normalizar una matrícula: recortar espacios y pasar a mayúsculas
pub fn normalize_registration(value: &str) -> String {
    value.trim().to_uppercase()
}

/// Validar latitud en grados
pub fn validate_latitude(value: f64) -> Result<(), ValidationError> {
    if !(-90.0..=90.0).contains(&value) || !value.is_finite() {
        let mut error = ValidationError::new("latitude");
        error.add_param("value".into(), &value);
        return Err(error);
    }
    Ok(())
}

/// Validar longitud en grados
pub fn validate_longitude(value: f64) -> Result<(), ValidationError> {
    if !(-180.0..=180.0).contains(&value) || !value.is_finite() {
        let mut error = ValidationError::new("longitude");
        error.add_param("value".into(), &value);
        return Err(error);
    }
    Ok(())
}
