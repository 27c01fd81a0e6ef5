//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno y variables de configuración.
//! Todas las variables tienen defaults razonables para desarrollo local.

use std::env;

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub port: u16,
    pub host: String,
    pub redis_url: String,
    pub cors_origins: Vec<String>,
    /// Número mínimo de conductores logueados para habilitar el viaje
    pub driver_quorum: usize,
    /// Umbral de proximidad en metros para las verificaciones GPS
    pub proximity_threshold_meters: f64,
    /// Timeout en segundos para adquirir una posición GPS
    pub positioning_timeout_seconds: u64,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .expect("PORT must be a valid number"),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            redis_url: env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
            cors_origins: env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "*".to_string())
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
            driver_quorum: env::var("DRIVER_QUORUM")
                .unwrap_or_else(|_| "2".to_string())
                .parse()
                .expect("DRIVER_QUORUM must be a valid number"),
            proximity_threshold_meters: env::var("PROXIMITY_THRESHOLD_METERS")
                .unwrap_or_else(|_| "90".to_string())
                .parse()
                .expect("PROXIMITY_THRESHOLD_METERS must be a valid number"),
            positioning_timeout_seconds: env::var("POSITIONING_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .expect("POSITIONING_TIMEOUT_SECONDS must be a valid number"),
        }
    }
}

impl EnvironmentConfig {
    /// Verificar si estamos en modo desarrollo
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Obtener la URL del servidor
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Configuración fija para tests: quorum 2, umbral 90m, timeout corto
    pub fn for_tests() -> Self {
        Self {
            environment: "test".to_string(),
            port: 0,
            host: "127.0.0.1".to_string(),
            redis_url: "redis://localhost:6379".to_string(),
            cors_origins: vec!["*".to_string()],
            driver_quorum: 2,
            proximity_threshold_meters: 90.0,
            positioning_timeout_seconds: 2,
        }
    }
}
