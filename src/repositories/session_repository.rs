//! Repositorio de sesiones
//!
//! Exactamente una sesión por dispositivo. El login la crea o reemplaza,
//! el logout y el fin de viaje la destruyen.

use crate::models::session::DriverSession;
use crate::state::AppState;
use crate::store::session_key;
use crate::utils::errors::{AppError, AppResult};

pub struct SessionRepository {
    state: AppState,
}

impl SessionRepository {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    pub async fn get(&self, device_id: &str) -> AppResult<Option<DriverSession>> {
        match self.state.store.get(&session_key(device_id)).await? {
            Some(raw) => {
                let session = serde_json::from_str(&raw)
                    .map_err(|e| AppError::Storage(format!("corrupt session: {}", e)))?;
                Ok(Some(session))
            }
            None => Ok(None),
        }
    }

    pub async fn save(&self, device_id: &str, session: &DriverSession) -> AppResult<()> {
        let raw = serde_json::to_string(session)
            .map_err(|e| AppError::Storage(format!("serialize session: {}", e)))?;
        self.state.store.set(&session_key(device_id), raw).await
    }

    pub async fn clear(&self, device_id: &str) -> AppResult<()> {
        self.state.store.remove(&session_key(device_id)).await
    }

    /// Sesión requerida: error NotFound si el dispositivo no tiene una
    pub async fn require(&self, device_id: &str) -> AppResult<DriverSession> {
        self.get(device_id).await?.ok_or_else(|| {
            AppError::NotFound(format!("No active session for device '{}'", device_id))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EnvironmentConfig;
    use crate::store::MemoryStore;
    use std::sync::Arc;

    fn test_repo() -> SessionRepository {
        SessionRepository::new(AppState::new(
            Arc::new(MemoryStore::new()),
            EnvironmentConfig::for_tests(),
        ))
    }

    #[tokio::test]
    async fn test_session_roundtrip_and_clear() {
        let repo = test_repo();
        let session = DriverSession {
            vehicle: "V-100".to_string(),
            phone: "9000000001".to_string(),
            name: "Arun".to_string(),
        };

        repo.save("device-1", &session).await.unwrap();
        assert_eq!(repo.get("device-1").await.unwrap(), Some(session.clone()));

        // Un re-login reemplaza la sesión del dispositivo
        let replacement = DriverSession {
            phone: "9000000002".to_string(),
            ..session
        };
        repo.save("device-1", &replacement).await.unwrap();
        assert_eq!(repo.require("device-1").await.unwrap(), replacement);

        repo.clear("device-1").await.unwrap();
        assert!(repo.get("device-1").await.unwrap().is_none());
        assert!(repo.require("device-1").await.is_err());
    }
}
