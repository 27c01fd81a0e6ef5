//! Controlador administrativo
//!
//! Vista de operador: resumen de vehículos y log de notificaciones.

use tracing::info;

use crate::dto::admin_dto::{NotificationsResponse, VehiclesOverviewResponse};
use crate::repositories::{NotificationLog, TripRegistry};
use crate::state::AppState;
use crate::utils::errors::AppResult;

pub struct AdminController {
    registry: TripRegistry,
    notifications: NotificationLog,
}

impl AdminController {
    pub fn new(state: &AppState) -> Self {
        Self {
            registry: TripRegistry::new(state.clone()),
            notifications: NotificationLog::new(state.clone()),
        }
    }

    pub async fn vehicles_overview(&self) -> AppResult<VehiclesOverviewResponse> {
        let vehicles = self.registry.list_vehicles().await?;
        let total = vehicles.len();
        Ok(VehiclesOverviewResponse { vehicles, total })
    }

    pub async fn list_notifications(&self) -> AppResult<NotificationsResponse> {
        let notifications = self.notifications.list().await?;
        let total = notifications.len();
        Ok(NotificationsResponse {
            notifications,
            total,
        })
    }

    pub async fn clear_notifications(&self) -> AppResult<()> {
        self.notifications.clear().await?;
        info!("🧹 Notificaciones administrativas limpiadas por el operador");
        Ok(())
    }
}
