//! Trip Registry
//!
//! Almacén por vehículo de conductores, fotos, fase y estado del viaje.
//! Sin reglas de negocio: el controlador del ciclo de vida decide, este
//! módulo solo lee y escribe. Cada mutación carga, modifica y guarda el
//! registro completo bajo el lock del vehículo, de modo que dos clientes
//! escribiendo a la vez no pierden actualizaciones.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::models::driver::DriverRecord;
use crate::models::location::LocationFix;
use crate::models::trip::{TripPhase, TripStatus};
use crate::models::vehicle::{PhotoRef, VehicleOverview, VehicleRecord};
use crate::state::AppState;
use crate::store::{vehicle_index_key, vehicle_key};
use crate::utils::errors::{AppError, AppResult};

pub struct TripRegistry {
    state: AppState,
}

impl TripRegistry {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    /// Leer el registro de un vehículo
    pub async fn get(&self, registration: &str) -> AppResult<Option<VehicleRecord>> {
        match self.state.store.get(&vehicle_key(registration)).await? {
            Some(raw) => {
                let record = serde_json::from_str(&raw)
                    .map_err(|e| AppError::Storage(format!("corrupt vehicle record: {}", e)))?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    async fn save(&self, record: &VehicleRecord) -> AppResult<()> {
        let raw = serde_json::to_string(record)
            .map_err(|e| AppError::Storage(format!("serialize vehicle record: {}", e)))?;
        self.state
            .store
            .set(&vehicle_key(&record.registration), raw)
            .await
    }

    /// Registrar la matrícula en el índice para la vista administrativa
    async fn index_registration(&self, registration: &str) -> AppResult<()> {
        let key = vehicle_index_key();
        let mut index: Vec<String> = match self.state.store.get(&key).await? {
            Some(raw) => serde_json::from_str(&raw)
                .map_err(|e| AppError::Storage(format!("corrupt vehicle index: {}", e)))?,
            None => Vec::new(),
        };
        if !index.iter().any(|r| r == registration) {
            index.push(registration.to_string());
            let raw = serde_json::to_string(&index)
                .map_err(|e| AppError::Storage(format!("serialize vehicle index: {}", e)))?;
            self.state.store.set(&key, raw).await?;
        }
        Ok(())
    }

    /// Crear el registro del vehículo si no existe todavía
    pub async fn ensure_vehicle(&self, registration: &str) -> AppResult<VehicleRecord> {
        let _guard = self.state.lock_vehicle(registration).await;

        if let Some(record) = self.get(registration).await? {
            return Ok(record);
        }

        let record = VehicleRecord::new(registration.to_string());
        self.save(&record).await?;
        self.index_registration(registration).await?;
        debug!("🚌 Vehículo registrado: {}", registration);
        Ok(record)
    }

    /// Aplicar una mutación al registro bajo el lock del vehículo.
    /// Devuelve None (no-op) si el vehículo no existe.
    async fn update<F, R>(&self, registration: &str, mutate: F) -> AppResult<Option<R>>
    where
        F: FnOnce(&mut VehicleRecord) -> R,
    {
        let _guard = self.state.lock_vehicle(registration).await;

        let mut record = match self.get(registration).await? {
            Some(record) => record,
            None => return Ok(None),
        };
        let result = mutate(&mut record);
        self.save(&record).await?;
        Ok(Some(result))
    }

    /// Upsert idempotente del conductor: enciende el login, refresca el
    /// timestamp y reexige la verificación de posición de esta sesión.
    /// La posición y la selfie previamente guardadas se conservan.
    pub async fn register_or_update_driver(
        &self,
        registration: &str,
        phone: &str,
        name: &str,
    ) -> AppResult<DriverRecord> {
        let _guard = self.state.lock_vehicle(registration).await;

        let mut record = match self.get(registration).await? {
            Some(record) => record,
            None => {
                let record = VehicleRecord::new(registration.to_string());
                self.index_registration(registration).await?;
                record
            }
        };

        let driver = match record.drivers.iter().position(|d| d.phone == phone) {
            Some(idx) => {
                let existing = &mut record.drivers[idx];
                existing.is_logged_in = true;
                existing.login_time = Utc::now();
                existing.logout_time = None;
                existing.location_verified = false;
                if !name.is_empty() {
                    existing.name = name.to_string();
                }
                existing.clone()
            }
            None => {
                let driver = DriverRecord::new(phone.to_string(), name.to_string());
                record.drivers.push(driver.clone());
                driver
            }
        };

        self.save(&record).await?;
        Ok(driver)
    }

    /// Guardar la posición del conductor. No-op silencioso si el
    /// conductor no existe: hay que registrarse antes de reportar.
    pub async fn record_location(
        &self,
        registration: &str,
        phone: &str,
        fix: LocationFix,
    ) -> AppResult<()> {
        let updated = self
            .update(registration, |record| {
                if let Some(driver) = record.driver_mut(phone) {
                    driver.location = Some(fix);
                    true
                } else {
                    false
                }
            })
            .await?;

        if !matches!(updated, Some(true)) {
            debug!(
                "📍 record_location ignorado: conductor {} no registrado en {}",
                phone, registration
            );
        }
        Ok(())
    }

    /// Marcar que la posición del conductor pasó la puerta de proximidad
    pub async fn confirm_location_verified(
        &self,
        registration: &str,
        phone: &str,
    ) -> AppResult<()> {
        self.update(registration, |record| {
            if let Some(driver) = record.driver_mut(phone) {
                driver.location_verified = true;
            }
            if record.phase == TripPhase::ReadyToStart {
                record.phase = TripPhase::PreTripVerification;
            }
        })
        .await?;
        Ok(())
    }

    /// Guardar la selfie del conductor. Misma precondición silenciosa
    /// que record_location.
    pub async fn record_selfie(
        &self,
        registration: &str,
        phone: &str,
        photo: PhotoRef,
    ) -> AppResult<()> {
        self.update(registration, |record| {
            if let Some(driver) = record.driver_mut(phone) {
                driver.selfie = Some(photo);
            }
        })
        .await?;
        Ok(())
    }

    /// Guardar las fotos a nivel de vehículo (el controlador ya validó
    /// que sean exactamente las requeridas)
    pub async fn record_vehicle_photos(
        &self,
        registration: &str,
        photos: Vec<PhotoRef>,
    ) -> AppResult<()> {
        self.update(registration, |record| {
            record.vehicle_photos = photos;
        })
        .await?;
        Ok(())
    }

    /// Apagar el login del conductor conservando su historial
    pub async fn logout(&self, registration: &str, phone: &str) -> AppResult<()> {
        self.update(registration, |record| {
            if let Some(driver) = record.driver_mut(phone) {
                driver.is_logged_in = false;
                driver.logout_time = Some(Utc::now());
                driver.location_verified = false;
            }
        })
        .await?;
        Ok(())
    }

    /// Descartar los artefactos de verificación del viaje anterior:
    /// fotos del vehículo, selfies y flags de posición verificada.
    /// Las últimas posiciones conocidas se conservan (las usa la puerta
    /// de fin de viaje).
    pub async fn reset_verification(&self, registration: &str) -> AppResult<()> {
        self.update(registration, |record| {
            record.vehicle_photos.clear();
            record.end_refused_for = None;
            for driver in &mut record.drivers {
                driver.location_verified = false;
                driver.selfie = None;
            }
        })
        .await?;
        Ok(())
    }

    /// Registrar que la puerta de proximidad rechazó el fin de viaje de
    /// este conductor; habilita el fin forzado para él
    pub async fn mark_end_refused(&self, registration: &str, phone: &str) -> AppResult<()> {
        self.update(registration, |record| {
            record.end_refused_for = Some(phone.to_string());
        })
        .await?;
        Ok(())
    }

    pub async fn set_phase(&self, registration: &str, phase: TripPhase) -> AppResult<()> {
        self.update(registration, |record| {
            record.phase = phase;
        })
        .await?;
        Ok(())
    }

    /// Activar el viaje con timestamp de inicio
    pub async fn start_trip(&self, registration: &str) -> AppResult<DateTime<Utc>> {
        let started_at = Utc::now();
        self.update(registration, |record| {
            record.trip = TripStatus::Active { started_at };
            record.phase = TripPhase::Active;
        })
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Vehicle '{}' not found", registration)))?;
        Ok(started_at)
    }

    /// Terminar el viaje con timestamp de fin
    pub async fn end_trip(&self, registration: &str) -> AppResult<DateTime<Utc>> {
        let ended_at = Utc::now();
        self.update(registration, |record| {
            let started_at = record.trip.started_at().unwrap_or(ended_at);
            record.trip = TripStatus::Ended {
                started_at,
                ended_at,
            };
            record.phase = TripPhase::Ended;
            record.end_refused_for = None;
        })
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Vehicle '{}' not found", registration)))?;
        Ok(ended_at)
    }

    /// Conductores en orden de primer login
    pub async fn list_drivers(&self, registration: &str) -> AppResult<Vec<DriverRecord>> {
        Ok(self
            .get(registration)
            .await?
            .map(|record| record.drivers)
            .unwrap_or_default())
    }

    pub async fn count_logged_in(&self, registration: &str) -> AppResult<usize> {
        Ok(self
            .get(registration)
            .await?
            .map(|record| record.logged_in_count())
            .unwrap_or(0))
    }

    /// Resumen de todos los vehículos para el dashboard administrativo
    pub async fn list_vehicles(&self) -> AppResult<Vec<VehicleOverview>> {
        let index: Vec<String> = match self.state.store.get(&vehicle_index_key()).await? {
            Some(raw) => serde_json::from_str(&raw)
                .map_err(|e| AppError::Storage(format!("corrupt vehicle index: {}", e)))?,
            None => Vec::new(),
        };

        let mut overview = Vec::with_capacity(index.len());
        for registration in index {
            if let Some(record) = self.get(&registration).await? {
                overview.push(VehicleOverview {
                    registration: record.registration.clone(),
                    driver_count: record.drivers.len(),
                    logged_in_count: record.logged_in_count(),
                    phase: record.phase,
                    trip: record.trip,
                });
            }
        }
        Ok(overview)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EnvironmentConfig;
    use crate::store::MemoryStore;
    use std::sync::Arc;

    fn test_state() -> AppState {
        AppState::new(Arc::new(MemoryStore::new()), EnvironmentConfig::for_tests())
    }

    #[tokio::test]
    async fn test_register_is_idempotent_per_phone() {
        let registry = TripRegistry::new(test_state());

        registry
            .register_or_update_driver("V-100", "9000000001", "Arun")
            .await
            .unwrap();
        registry
            .register_or_update_driver("V-100", "9000000001", "")
            .await
            .unwrap();

        let drivers = registry.list_drivers("V-100").await.unwrap();
        assert_eq!(drivers.len(), 1);
        assert_eq!(registry.count_logged_in("V-100").await.unwrap(), 1);
        // El nombre previo sobrevive a un re-login sin nombre
        assert_eq!(drivers[0].name, "Arun");
    }

    #[tokio::test]
    async fn test_relogin_preserves_location_but_requires_reverification() {
        let registry = TripRegistry::new(test_state());

        registry
            .register_or_update_driver("V-100", "9000000001", "Arun")
            .await
            .unwrap();
        registry
            .record_location("V-100", "9000000001", LocationFix::new(8.0883, 77.4324, 10.0))
            .await
            .unwrap();
        registry
            .confirm_location_verified("V-100", "9000000001")
            .await
            .unwrap();

        registry
            .register_or_update_driver("V-100", "9000000001", "Arun")
            .await
            .unwrap();

        let drivers = registry.list_drivers("V-100").await.unwrap();
        assert!(drivers[0].location.is_some());
        assert!(!drivers[0].location_verified);
    }

    #[tokio::test]
    async fn test_record_location_without_driver_is_silent_noop() {
        let registry = TripRegistry::new(test_state());
        registry.ensure_vehicle("V-100").await.unwrap();

        registry
            .record_location("V-100", "9999999999", LocationFix::new(8.0, 77.0, 5.0))
            .await
            .unwrap();

        assert!(registry.list_drivers("V-100").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_logout_keeps_history() {
        let registry = TripRegistry::new(test_state());

        registry
            .register_or_update_driver("V-100", "9000000001", "Arun")
            .await
            .unwrap();
        registry.logout("V-100", "9000000001").await.unwrap();

        let drivers = registry.list_drivers("V-100").await.unwrap();
        assert_eq!(drivers.len(), 1);
        assert!(!drivers[0].is_logged_in);
        assert!(drivers[0].logout_time.is_some());
        assert_eq!(registry.count_logged_in("V-100").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_insertion_order_is_first_login_first() {
        let registry = TripRegistry::new(test_state());

        registry
            .register_or_update_driver("V-100", "9000000001", "A")
            .await
            .unwrap();
        registry
            .register_or_update_driver("V-100", "9000000002", "B")
            .await
            .unwrap();
        // Un re-login del primero no lo reordena
        registry
            .register_or_update_driver("V-100", "9000000001", "A")
            .await
            .unwrap();

        let drivers = registry.list_drivers("V-100").await.unwrap();
        let phones: Vec<_> = drivers.iter().map(|d| d.phone.as_str()).collect();
        assert_eq!(phones, vec!["9000000001", "9000000002"]);
    }

    #[tokio::test]
    async fn test_trip_status_flip() {
        let registry = TripRegistry::new(test_state());
        registry.ensure_vehicle("V-100").await.unwrap();

        let started = registry.start_trip("V-100").await.unwrap();
        let record = registry.get("V-100").await.unwrap().unwrap();
        assert_eq!(record.trip, TripStatus::Active { started_at: started });

        let ended = registry.end_trip("V-100").await.unwrap();
        let record = registry.get("V-100").await.unwrap().unwrap();
        assert_eq!(
            record.trip,
            TripStatus::Ended {
                started_at: started,
                ended_at: ended
            }
        );
        assert_eq!(record.phase, TripPhase::Ended);
    }

    #[tokio::test]
    async fn test_list_vehicles_overview() {
        let registry = TripRegistry::new(test_state());

        registry
            .register_or_update_driver("V-100", "9000000001", "A")
            .await
            .unwrap();
        registry
            .register_or_update_driver("V-200", "9000000002", "B")
            .await
            .unwrap();
        registry.logout("V-200", "9000000002").await.unwrap();

        let overview = registry.list_vehicles().await.unwrap();
        assert_eq!(overview.len(), 2);

        let v100 = overview.iter().find(|v| v.registration == "V-100").unwrap();
        assert_eq!(v100.driver_count, 1);
        assert_eq!(v100.logged_in_count, 1);

        let v200 = overview.iter().find(|v| v.registration == "V-200").unwrap();
        assert_eq!(v200.logged_in_count, 0);
    }
}
