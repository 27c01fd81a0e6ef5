//! DTOs del dashboard administrativo

use serde::Serialize;

use crate::models::notification::AdminNotification;
use crate::models::vehicle::VehicleOverview;

#[derive(Debug, Serialize)]
pub struct VehiclesOverviewResponse {
    pub vehicles: Vec<VehicleOverview>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct NotificationsResponse {
    pub notifications: Vec<AdminNotification>,
    pub total: usize,
}
