//! Controlador del ciclo de vida del viaje
//!
//! Máquina de estados por vehículo:
//! AwaitingDrivers → ReadyToStart → PreTripVerification → Active → Ended.
//!
//! Las puertas de política (quorum, proximidad, checklist) devuelven
//! resultados tipados que la UI puede mostrar; los fallos duros
//! (posicionamiento, almacenamiento, llamadas fuera de fase) salen como
//! AppError. Toda verificación GPS consulta una posición fresca: nunca
//! se reutiliza una lectura entre pasos.
//!
//! Asimetría observada y preservada del flujo original: la puerta de
//! inicio compara solo contra conductores actualmente logueados con
//! posición; la de fin compara contra todo conductor que alguna vez
//! reportó una, esté logueado o no.

use std::time::Duration;

use tracing::{info, warn};

use crate::dto::trip_dto::{
    ChecklistResponse, EndTripOutcome, LocationGateOutcome, LoginResponse, PhaseResponse,
    StartTripOutcome, TripStatusResponse,
};
use crate::models::driver::DriverRecord;
use crate::models::location::LocationFix;
use crate::models::notification::{AdminNotification, NotificationKind, Severity};
use crate::models::session::DriverSession;
use crate::models::trip::{PreTripChecklist, TripPhase};
use crate::models::vehicle::{VehicleRecord, REQUIRED_VEHICLE_PHOTOS};
use crate::repositories::{NotificationLog, SessionRepository, TripRegistry};
use crate::services::photo_capture::{Base64PhotoCapture, PhotoCaptureProvider};
use crate::services::positioning::{PositioningError, PositioningProvider};
use crate::services::proximity::ProximityEvaluator;
use crate::state::AppState;
use crate::utils::errors::{validation_error, wrong_phase_error, AppError, AppResult};
use crate::utils::validation::{normalize_phone, normalize_registration, validate_phone};

pub struct TripLifecycleController {
    registry: TripRegistry,
    sessions: SessionRepository,
    notifications: NotificationLog,
    proximity: ProximityEvaluator,
    photos: Base64PhotoCapture,
    quorum: usize,
    positioning_timeout: Duration,
}

impl TripLifecycleController {
    pub fn new(state: &AppState) -> Self {
        Self {
            registry: TripRegistry::new(state.clone()),
            sessions: SessionRepository::new(state.clone()),
            notifications: NotificationLog::new(state.clone()),
            proximity: ProximityEvaluator::new(state.config.proximity_threshold_meters),
            photos: Base64PhotoCapture::new(),
            quorum: state.config.driver_quorum,
            positioning_timeout: Duration::from_secs(state.config.positioning_timeout_seconds),
        }
    }

    /// Adquirir una posición fresca con timeout acotado. En fallo no se
    /// toca ningún estado previo.
    async fn acquire_fix(
        &self,
        provider: &dyn PositioningProvider,
    ) -> AppResult<LocationFix> {
        match tokio::time::timeout(self.positioning_timeout, provider.current_position()).await {
            Ok(Ok(fix)) => Ok(fix),
            Ok(Err(e)) => Err(AppError::Positioning(e)),
            Err(_) => Err(AppError::Positioning(PositioningError::Timeout)),
        }
    }

    async fn require_vehicle(&self, registration: &str) -> AppResult<VehicleRecord> {
        self.registry
            .get(registration)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Vehicle '{}' not found", registration)))
    }

    fn checklist_for(&self, record: &VehicleRecord, phone: &str) -> PreTripChecklist {
        let driver = record.driver(phone);
        PreTripChecklist {
            location_verified: driver.map(|d| d.location_verified).unwrap_or(false),
            selfie_captured: driver.map(|d| d.selfie.is_some()).unwrap_or(false),
            vehicle_photos: record.vehicle_photos.len(),
        }
    }

    /// Posiciones de los otros conductores logueados (puerta de inicio)
    fn logged_in_other_fixes(record: &VehicleRecord, acting_phone: &str) -> Vec<LocationFix> {
        record
            .drivers
            .iter()
            .filter(|d| d.is_logged_in && d.phone != acting_phone)
            .filter_map(|d| d.location)
            .collect()
    }

    /// Posiciones de todo conductor que alguna vez reportó una,
    /// logueado o no (puerta de fin)
    fn any_other_fixes(record: &VehicleRecord, acting_phone: &str) -> Vec<LocationFix> {
        record
            .drivers
            .iter()
            .filter(|d| d.phone != acting_phone)
            .filter_map(|d| d.location)
            .collect()
    }

    /// Seleccionar un vehículo: crea el registro si no existe. Si el
    /// vehículo viene de un viaje terminado, descarta los artefactos de
    /// verificación y rearma la fase para el próximo ciclo.
    pub async fn select_vehicle(&self, vehicle_raw: &str) -> AppResult<PhaseResponse> {
        let registration = normalize_registration(vehicle_raw);
        if registration.is_empty() {
            return Err(validation_error("vehicle", "Vehicle registration is required"));
        }

        let record = self.registry.ensure_vehicle(&registration).await?;

        let mut phase = record.phase;
        if phase == TripPhase::Ended {
            self.registry.reset_verification(&registration).await?;
            phase = if record.logged_in_count() >= self.quorum {
                TripPhase::ReadyToStart
            } else {
                TripPhase::AwaitingDrivers
            };
            self.registry.set_phase(&registration, phase).await?;
        }

        info!("🚌 Vehículo seleccionado: {} (fase {})", registration, phase.as_str());

        Ok(PhaseResponse {
            vehicle: registration,
            phase,
            logged_in_count: record.logged_in_count(),
            quorum: self.quorum,
        })
    }

    /// Login de conductor: upsert idempotente por teléfono. Con quorum
    /// alcanzado la fase pasa a ReadyToStart; un re-login del mismo
    /// teléfono no suma al conteo.
    pub async fn driver_login(
        &self,
        device_id: &str,
        vehicle_raw: &str,
        phone_raw: &str,
        name: Option<String>,
    ) -> AppResult<LoginResponse> {
        let registration = normalize_registration(vehicle_raw);
        if registration.is_empty() {
            return Err(validation_error("vehicle", "Vehicle registration is required"));
        }

        let phone = normalize_phone(phone_raw);
        validate_phone(&phone).map_err(|_| {
            validation_error("phone", "Please enter a valid 10-digit mobile number")
        })?;

        let name = name.unwrap_or_default().trim().to_string();

        let driver = self
            .registry
            .register_or_update_driver(&registration, &phone, &name)
            .await?;

        let record = self.require_vehicle(&registration).await?;
        let mut phase = record.phase;
        if phase == TripPhase::Ended {
            // Login directo sobre un viaje terminado: arranca un ciclo nuevo
            self.registry.reset_verification(&registration).await?;
            phase = TripPhase::AwaitingDrivers;
        }
        let logged_in_count = record.logged_in_count();
        if phase == TripPhase::AwaitingDrivers && logged_in_count >= self.quorum {
            phase = TripPhase::ReadyToStart;
        }
        if phase != record.phase {
            self.registry.set_phase(&registration, phase).await?;
        }

        let session = DriverSession {
            vehicle: registration.clone(),
            phone: driver.phone.clone(),
            name: driver.name.clone(),
        };
        self.sessions.save(device_id, &session).await?;

        info!(
            "👤 Login de conductor {} en {} ({}/{} logueados, fase {})",
            driver.phone,
            registration,
            logged_in_count,
            self.quorum,
            phase.as_str()
        );

        Ok(LoginResponse {
            session,
            phase,
            logged_in_count,
            quorum: self.quorum,
        })
    }

    /// Paso GPS del checklist pre-viaje. Guarda la posición fresca del
    /// conductor y evalúa la puerta de proximidad any-match contra los
    /// otros conductores logueados que ya reportaron posición. El
    /// rechazo de distancia no avanza la fase.
    pub async fn verify_location(
        &self,
        device_id: &str,
        provider: &dyn PositioningProvider,
    ) -> AppResult<LocationGateOutcome> {
        let session = self.sessions.require(device_id).await?;
        let record = self.require_vehicle(&session.vehicle).await?;

        if !matches!(
            record.phase,
            TripPhase::ReadyToStart | TripPhase::PreTripVerification
        ) {
            return Err(wrong_phase_error("verify location", record.phase.as_str()));
        }

        let fix = self.acquire_fix(provider).await?;
        self.registry
            .record_location(&session.vehicle, &session.phone, fix)
            .await?;

        let others = Self::logged_in_other_fixes(&record, &session.phone);
        if !others.is_empty() && !self.proximity.within_range_of_any(&fix, others.iter()) {
            let nearest = self.proximity.nearest_meters(&fix, others.iter());
            warn!(
                "📏 Puerta de distancia en verificación: {} en ({}) a {:?} m de {} (umbral {} m)",
                session.phone,
                fix.display(),
                nearest,
                session.vehicle,
                self.proximity.threshold_meters()
            );
            return Ok(LocationGateOutcome::DistanceRejected {
                nearest_other_m: nearest,
                threshold_m: self.proximity.threshold_meters(),
            });
        }

        self.registry
            .confirm_location_verified(&session.vehicle, &session.phone)
            .await?;

        let record = self.require_vehicle(&session.vehicle).await?;
        Ok(LocationGateOutcome::Verified {
            checklist: self.checklist_for(&record, &session.phone),
        })
    }

    /// Capturar la selfie del conductor. Solo alcanzable con la posición
    /// ya verificada en esta sesión.
    pub async fn record_selfie(
        &self,
        device_id: &str,
        photo_payload: &str,
    ) -> AppResult<ChecklistResponse> {
        let session = self.sessions.require(device_id).await?;
        let record = self.require_vehicle(&session.vehicle).await?;

        if !matches!(
            record.phase,
            TripPhase::ReadyToStart | TripPhase::PreTripVerification
        ) {
            return Err(wrong_phase_error("capture selfie", record.phase.as_str()));
        }

        let verified = record
            .driver(&session.phone)
            .map(|d| d.location_verified)
            .unwrap_or(false);
        if !verified {
            return Err(AppError::Conflict(
                "Location verification must pass before selfie capture".to_string(),
            ));
        }

        let photo = self.photos.capture(photo_payload)?;
        self.registry
            .record_selfie(&session.vehicle, &session.phone, photo)
            .await?;

        let record = self.require_vehicle(&session.vehicle).await?;
        Ok(ChecklistResponse {
            phase: record.phase,
            checklist: self.checklist_for(&record, &session.phone),
        })
    }

    /// Guardar las fotos a nivel de vehículo: exactamente 3
    pub async fn record_vehicle_photos(
        &self,
        device_id: &str,
        photo_payloads: &[String],
    ) -> AppResult<ChecklistResponse> {
        let session = self.sessions.require(device_id).await?;
        let record = self.require_vehicle(&session.vehicle).await?;

        if !matches!(
            record.phase,
            TripPhase::ReadyToStart | TripPhase::PreTripVerification
        ) {
            return Err(wrong_phase_error("record vehicle photos", record.phase.as_str()));
        }

        if photo_payloads.len() != REQUIRED_VEHICLE_PHOTOS {
            return Err(validation_error("photos", "Exactly 3 vehicle photos are required"));
        }

        let mut photos = Vec::with_capacity(photo_payloads.len());
        for payload in photo_payloads {
            photos.push(self.photos.capture(payload)?);
        }
        self.registry
            .record_vehicle_photos(&session.vehicle, photos)
            .await?;

        let record = self.require_vehicle(&session.vehicle).await?;
        Ok(ChecklistResponse {
            phase: record.phase,
            checklist: self.checklist_for(&record, &session.phone),
        })
    }

    /// Arrancar el viaje. Exige el checklist completo y repite la
    /// verificación de proximidad con una posición fresca: entre el paso
    /// GPS y este momento pudo pasar tiempo.
    pub async fn start_trip(
        &self,
        device_id: &str,
        provider: &dyn PositioningProvider,
    ) -> AppResult<StartTripOutcome> {
        let session = self.sessions.require(device_id).await?;
        let record = self.require_vehicle(&session.vehicle).await?;

        if record.phase != TripPhase::PreTripVerification {
            return Err(wrong_phase_error("start trip", record.phase.as_str()));
        }

        let checklist = self.checklist_for(&record, &session.phone);
        if !checklist.is_complete() {
            return Err(AppError::Conflict(format!(
                "Pre-trip checklist incomplete: location_verified={}, selfie_captured={}, vehicle_photos={}/{}",
                checklist.location_verified,
                checklist.selfie_captured,
                checklist.vehicle_photos,
                REQUIRED_VEHICLE_PHOTOS
            )));
        }

        let fix = self.acquire_fix(provider).await?;
        let others = Self::logged_in_other_fixes(&record, &session.phone);
        if !others.is_empty() && !self.proximity.within_range_of_any(&fix, others.iter()) {
            let nearest = self.proximity.nearest_meters(&fix, others.iter());
            warn!(
                "📏 Puerta de distancia en arranque: {} a {:?} m de {} (umbral {} m)",
                session.phone,
                nearest,
                session.vehicle,
                self.proximity.threshold_meters()
            );
            return Ok(StartTripOutcome::DistanceRejected {
                nearest_other_m: nearest,
                threshold_m: self.proximity.threshold_meters(),
            });
        }

        let started_at = self.registry.start_trip(&session.vehicle).await?;
        info!("🚀 Viaje iniciado para {} por {}", session.vehicle, session.phone);

        Ok(StartTripOutcome::Started { started_at })
    }

    /// Pedir el fin del viaje. Compara una posición fresca contra la
    /// última conocida de cada otro conductor que alguna vez reportó
    /// una. Sin otros conductores con posición el fin procede (fallback
    /// de conductor solo); sin ninguno dentro del umbral, se rechaza y
    /// queda la notificación administrativa.
    pub async fn request_end_trip(
        &self,
        device_id: &str,
        provider: &dyn PositioningProvider,
    ) -> AppResult<EndTripOutcome> {
        let session = self.sessions.require(device_id).await?;
        let record = self.require_vehicle(&session.vehicle).await?;

        if record.phase != TripPhase::Active {
            return Err(wrong_phase_error("end trip", record.phase.as_str()));
        }

        let fix = self.acquire_fix(provider).await?;
        let others = Self::any_other_fixes(&record, &session.phone);

        if !others.is_empty() && !self.proximity.within_range_of_any(&fix, others.iter()) {
            let nearest = self.proximity.nearest_meters(&fix, others.iter());
            let display_name = record
                .driver(&session.phone)
                .map(|d| d.display_name().to_string())
                .unwrap_or_else(|| session.phone.clone());

            let notification = AdminNotification::new(
                NotificationKind::DistanceViolation,
                Severity::Warning,
                session.vehicle.clone(),
                session.phone.clone(),
                session.name.clone(),
                format!(
                    "Driver {} attempted to end trip outside {}-meter range",
                    display_name,
                    self.proximity.threshold_meters() as i64
                ),
            );
            let notification_id = notification.id;
            self.notifications.append(notification).await?;
            self.registry
                .mark_end_refused(&session.vehicle, &session.phone)
                .await?;

            warn!(
                "🚫 Fin de viaje rechazado para {} en {} desde ({}): más cercano {:?} m",
                session.phone,
                session.vehicle,
                fix.display(),
                nearest
            );

            return Ok(EndTripOutcome::Refused {
                nearest_other_m: nearest,
                threshold_m: self.proximity.threshold_meters(),
                notification_id,
            });
        }

        let ended_at = self.finish_trip(device_id, &session).await?;
        Ok(EndTripOutcome::Ended {
            ended_at,
            forced: false,
        })
    }

    /// Override administrativo: termina el viaje sin puerta de
    /// proximidad. Solo habilitado después de un fin rechazado para el
    /// mismo conductor, y deja su propia marca en el log para que el
    /// bypass sea visible en la auditoría.
    pub async fn force_end_trip(&self, device_id: &str) -> AppResult<EndTripOutcome> {
        let session = self.sessions.require(device_id).await?;
        let record = self.require_vehicle(&session.vehicle).await?;

        if record.phase != TripPhase::Active {
            return Err(wrong_phase_error("force end trip", record.phase.as_str()));
        }

        if record.end_refused_for.as_deref() != Some(session.phone.as_str()) {
            return Err(AppError::Conflict(
                "Force end is only available after a refused end request".to_string(),
            ));
        }

        let display_name = record
            .driver(&session.phone)
            .map(|d| d.display_name().to_string())
            .unwrap_or_else(|| session.phone.clone());

        self.notifications
            .append(AdminNotification::new(
                NotificationKind::ForcedTripEnd,
                Severity::Warning,
                session.vehicle.clone(),
                session.phone.clone(),
                session.name.clone(),
                format!(
                    "Driver {} forced trip end bypassing the proximity check",
                    display_name
                ),
            ))
            .await?;

        let ended_at = self.finish_trip(device_id, &session).await?;
        warn!("⚠️ Fin forzado de viaje para {} por {}", session.vehicle, session.phone);

        Ok(EndTripOutcome::Ended {
            ended_at,
            forced: true,
        })
    }

    /// Fin común a ambos caminos: estado Ended, logout del conductor,
    /// sesión del dispositivo destruida
    async fn finish_trip(
        &self,
        device_id: &str,
        session: &DriverSession,
    ) -> AppResult<chrono::DateTime<chrono::Utc>> {
        let ended_at = self.registry.end_trip(&session.vehicle).await?;
        self.registry.logout(&session.vehicle, &session.phone).await?;
        self.sessions.clear(device_id).await?;
        info!("🏁 Viaje terminado para {} ({})", session.vehicle, session.phone);
        Ok(ended_at)
    }

    /// Logout explícito del conductor actual (navegación hacia atrás).
    /// Si el quorum se pierde, la fase vuelve a AwaitingDrivers.
    pub async fn logout(&self, device_id: &str) -> AppResult<()> {
        let session = self.sessions.require(device_id).await?;

        self.registry.logout(&session.vehicle, &session.phone).await?;

        if let Some(record) = self.registry.get(&session.vehicle).await? {
            if matches!(
                record.phase,
                TripPhase::ReadyToStart | TripPhase::PreTripVerification
            ) && record.logged_in_count() < self.quorum
            {
                self.registry
                    .set_phase(&session.vehicle, TripPhase::AwaitingDrivers)
                    .await?;
            }
        }

        self.sessions.clear(device_id).await?;
        info!("👋 Logout de {} en {}", session.phone, session.vehicle);
        Ok(())
    }

    // Consultas de solo lectura

    pub async fn get_session(&self, device_id: &str) -> AppResult<Option<DriverSession>> {
        self.sessions.get(device_id).await
    }

    pub async fn get_trip_status(&self, vehicle_raw: &str) -> AppResult<TripStatusResponse> {
        let registration = normalize_registration(vehicle_raw);
        let record = self.require_vehicle(&registration).await?;
        Ok(TripStatusResponse {
            vehicle: record.registration.clone(),
            phase: record.phase,
            trip: record.trip,
        })
    }

    pub async fn list_drivers(&self, vehicle_raw: &str) -> AppResult<Vec<DriverRecord>> {
        let registration = normalize_registration(vehicle_raw);
        self.registry.list_drivers(&registration).await
    }
}
