//! Notificaciones administrativas
//!
//! Lista append-only de violaciones de política, visible para el operador.
//! Solo se limpia en bloque por acción explícita del operador.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Tipo de evento que generó la notificación
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationKind {
    #[serde(rename = "Distance Violation")]
    DistanceViolation,
    #[serde(rename = "Forced Trip End")]
    ForcedTripEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminNotification {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub severity: Severity,
    pub vehicle: String,
    pub driver_phone: String,
    pub driver_name: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl AdminNotification {
    pub fn new(
        kind: NotificationKind,
        severity: Severity,
        vehicle: String,
        driver_phone: String,
        driver_name: String,
        message: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            severity,
            vehicle,
            driver_phone,
            driver_name,
            message,
            created_at: Utc::now(),
        }
    }
}
