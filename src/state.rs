//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum. El almacén clave-valor entra como trait
//! object para poder inyectar el doble en memoria en los tests.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

use crate::config::environment::EnvironmentConfig;
use crate::store::KvStore;

/// Tabla de locks por vehículo para serializar los read-modify-write
pub type VehicleLocks = Arc<RwLock<HashMap<String, Arc<Mutex<()>>>>>;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn KvStore>,
    pub config: EnvironmentConfig,
    vehicle_locks: VehicleLocks,
    notification_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(store: Arc<dyn KvStore>, config: EnvironmentConfig) -> Self {
        Self {
            store,
            config,
            vehicle_locks: Arc::new(RwLock::new(HashMap::new())),
            notification_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Tomar el lock del vehículo indicado; lo crea si no existe.
    /// Toda mutación del registro de un vehículo ocurre bajo este guard.
    pub async fn lock_vehicle(&self, registration: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut table = self.vehicle_locks.write().await;
            table
                .entry(registration.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }

    /// Lock global del log de notificaciones (append es read-modify-write)
    pub async fn lock_notifications(&self) -> OwnedMutexGuard<()> {
        self.notification_lock.clone().lock_owned().await
    }
}
