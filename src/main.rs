use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use dotenvy::dotenv;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use trip_coordinator::config::environment::EnvironmentConfig;
use trip_coordinator::middleware::cors::cors_middleware_with_origins;
use trip_coordinator::routes;
use trip_coordinator::state::AppState;
use trip_coordinator::store::RedisStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    let config = EnvironmentConfig::default();

    // Configurar logging: DEBUG en desarrollo, INFO en el resto
    let log_level = if config.is_development() {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(log_level).init();

    info!("🚌 Trip Coordinator - Coordinación de viajes multi-conductor");
    info!("============================================================");

    // Inicializar el almacén clave-valor
    let store = match RedisStore::new(&config.redis_url).await {
        Ok(store) => store,
        Err(e) => {
            error!("❌ Error conectando a Redis: {}", e);
            return Err(anyhow::anyhow!("Error de Redis: {}", e));
        }
    };

    let cors = cors_middleware_with_origins(&config.cors_origins);
    let addr: SocketAddr = config.server_url().parse()?;

    let app_state = AppState::new(Arc::new(store), config);

    let app = Router::new()
        .merge(routes::create_api_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state);

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health - Health check");
    info!("🚚 Endpoints - Flujo de viaje:");
    info!("   POST /api/trip/vehicle/select - Seleccionar vehículo");
    info!("   POST /api/trip/driver/login - Login de conductor");
    info!("   POST /api/trip/verification/location - Verificación GPS");
    info!("   POST /api/trip/verification/selfie - Selfie del conductor");
    info!("   POST /api/trip/verification/photos - Fotos del vehículo");
    info!("   POST /api/trip/start - Iniciar viaje");
    info!("   POST /api/trip/end/request - Pedir fin de viaje");
    info!("   POST /api/trip/end/force - Fin forzado (auditado)");
    info!("   POST /api/trip/logout - Logout del conductor");
    info!("   GET  /api/trip/session/:device_id - Sesión del dispositivo");
    info!("   GET  /api/trip/status/:vehicle - Estado del viaje");
    info!("   GET  /api/trip/drivers/:vehicle - Conductores del vehículo");
    info!("🛠️ Endpoints - Administración:");
    info!("   GET  /api/admin/vehicles - Resumen de vehículos");
    info!("   GET  /api/admin/notifications - Notificaciones");
    info!("   DELETE /api/admin/notifications - Limpiar notificaciones");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            error!("❌ Error del servidor: {}", e);
            anyhow::anyhow!(e)
        })?;

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
