//! Cliente Redis con connection pooling y operaciones async

use anyhow::Result;
use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands, RedisResult};
use tracing::{debug, error, info, warn};

use super::KvStore;
use crate::utils::errors::{AppError, AppResult};

/// Almacén clave-valor sobre Redis
#[derive(Clone)]
pub struct RedisStore {
    manager: ConnectionManager,
}

impl RedisStore {
    /// Crear nuevo cliente Redis
    pub async fn new(redis_url: &str) -> Result<Self> {
        info!("🔗 Conectando a Redis: {}", redis_url);

        let client = redis::Client::open(redis_url)?;
        let manager = ConnectionManager::new(client).await?;

        // Test de conexión usando un comando simple
        let mut conn = manager.clone();
        let _: () = redis::cmd("PING").query_async(&mut conn).await?;

        info!("✅ Redis conectado exitosamente");

        Ok(Self { manager })
    }
}

#[async_trait]
impl KvStore for RedisStore {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let mut conn = self.manager.clone();

        match conn.get::<_, Option<String>>(key).await {
            Ok(Some(value)) => {
                debug!("📥 Store HIT para clave: {}", key);
                Ok(Some(value))
            }
            Ok(None) => {
                debug!("❌ Store MISS para clave: {}", key);
                Ok(None)
            }
            Err(e) => {
                error!("❌ Error leyendo clave {}: {}", key, e);
                Err(AppError::Storage(format!("redis get '{}': {}", key, e)))
            }
        }
    }

    async fn set(&self, key: &str, value: String) -> AppResult<()> {
        let mut conn = self.manager.clone();

        // Sin TTL: el registro de viajes es el almacén duradero, no un cache
        let result: RedisResult<()> = conn.set(key, value).await;

        match result {
            Ok(()) => {
                debug!("💾 Store SET para clave: {}", key);
                Ok(())
            }
            Err(e) => {
                error!("❌ Error guardando clave {}: {}", key, e);
                Err(AppError::Storage(format!("redis set '{}': {}", key, e)))
            }
        }
    }

    async fn remove(&self, key: &str) -> AppResult<()> {
        let mut conn = self.manager.clone();

        let result: RedisResult<i64> = conn.del(key).await;

        match result {
            Ok(count) => {
                debug!("🗑️ Store DELETE para clave: {} (eliminados: {})", key, count);
                Ok(())
            }
            Err(e) => {
                warn!("⚠️ Error eliminando clave {}: {}", key, e);
                // No fallar si no se puede eliminar
                Ok(())
            }
        }
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        let mut conn = self.manager.clone();

        match conn.exists(key).await {
            Ok(exists) => {
                debug!("🔍 Store EXISTS para clave {}: {}", key, exists);
                Ok(exists)
            }
            Err(e) => {
                warn!("⚠️ Error verificando existencia de clave {}: {}", key, e);
                Ok(false)
            }
        }
    }
}
