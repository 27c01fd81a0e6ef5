//! Log de notificaciones administrativas
//!
//! Lista append-only bajo una sola clave, más reciente primero. El
//! append es un read-modify-write, así que va bajo el lock global del
//! log.

use tracing::info;

use crate::models::notification::AdminNotification;
use crate::state::AppState;
use crate::store::notifications_key;
use crate::utils::errors::{AppError, AppResult};

pub struct NotificationLog {
    state: AppState,
}

impl NotificationLog {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    async fn load(&self) -> AppResult<Vec<AdminNotification>> {
        match self.state.store.get(&notifications_key()).await? {
            Some(raw) => serde_json::from_str(&raw)
                .map_err(|e| AppError::Storage(format!("corrupt notification log: {}", e))),
            None => Ok(Vec::new()),
        }
    }

    async fn save(&self, notifications: &[AdminNotification]) -> AppResult<()> {
        let raw = serde_json::to_string(notifications)
            .map_err(|e| AppError::Storage(format!("serialize notification log: {}", e)))?;
        self.state.store.set(&notifications_key(), raw).await
    }

    /// Agregar una notificación al frente del log
    pub async fn append(&self, notification: AdminNotification) -> AppResult<()> {
        let _guard = self.state.lock_notifications().await;

        let mut notifications = self.load().await?;
        info!(
            "🔔 Notificación administrativa: {:?} para vehículo {} ({})",
            notification.kind, notification.vehicle, notification.driver_phone
        );
        notifications.insert(0, notification);
        self.save(&notifications).await
    }

    /// Listar, más reciente primero
    pub async fn list(&self) -> AppResult<Vec<AdminNotification>> {
        self.load().await
    }

    /// Limpieza en bloque por acción del operador
    pub async fn clear(&self) -> AppResult<()> {
        let _guard = self.state.lock_notifications().await;
        self.save(&[]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EnvironmentConfig;
    use crate::models::notification::{NotificationKind, Severity};
    use crate::store::MemoryStore;
    use std::sync::Arc;

    fn test_log() -> NotificationLog {
        NotificationLog::new(AppState::new(
            Arc::new(MemoryStore::new()),
            EnvironmentConfig::for_tests(),
        ))
    }

    fn violation(vehicle: &str) -> AdminNotification {
        AdminNotification::new(
            NotificationKind::DistanceViolation,
            Severity::Warning,
            vehicle.to_string(),
            "9000000001".to_string(),
            "Arun".to_string(),
            "test".to_string(),
        )
    }

    #[tokio::test]
    async fn test_append_newest_first() {
        let log = test_log();

        log.append(violation("V-100")).await.unwrap();
        log.append(violation("V-200")).await.unwrap();

        let listed = log.list().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].vehicle, "V-200");
        assert_eq!(listed[1].vehicle, "V-100");
    }

    #[tokio::test]
    async fn test_clear_empties_the_log() {
        let log = test_log();

        log.append(violation("V-100")).await.unwrap();
        log.clear().await.unwrap();

        assert!(log.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_notification_type_serializes_as_human_tag() {
        let raw = serde_json::to_value(violation("V-100")).unwrap();
        assert_eq!(raw["type"], "Distance Violation");
        assert_eq!(raw["severity"], "warning");
    }
}
