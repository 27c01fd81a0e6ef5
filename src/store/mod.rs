//! Almacenamiento clave-valor
//!
//! El Trip Registry, las sesiones y el log de notificaciones se montan
//! sobre un proveedor de persistencia inyectado: pares clave-valor con
//! payloads JSON. `RedisStore` es la implementación de producción y
//! `MemoryStore` el doble en memoria para tests.

pub mod memory_store;
pub mod redis_store;

use async_trait::async_trait;

use crate::utils::errors::AppResult;

pub use memory_store::MemoryStore;
pub use redis_store::RedisStore;

/// Prefijo de todas las claves del servicio
const KEY_NAMESPACE: &str = "trip_coordinator";

/// Operaciones mínimas del proveedor de persistencia
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> AppResult<Option<String>>;
    async fn set(&self, key: &str, value: String) -> AppResult<()>;
    async fn remove(&self, key: &str) -> AppResult<()>;
    async fn exists(&self, key: &str) -> AppResult<bool>;
}

/// Clave del registro de un vehículo
pub fn vehicle_key(registration: &str) -> String {
    format!("{}:vehicle:{}", KEY_NAMESPACE, registration)
}

/// Clave del índice de matrículas conocidas
pub fn vehicle_index_key() -> String {
    format!("{}:vehicles", KEY_NAMESPACE)
}

/// Clave de la sesión de un dispositivo
pub fn session_key(device_id: &str) -> String {
    format!("{}:session:{}", KEY_NAMESPACE, device_id)
}

/// Clave del log de notificaciones administrativas
pub fn notifications_key() -> String {
    format!("{}:notifications", KEY_NAMESPACE)
}
