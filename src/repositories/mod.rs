//! Repositorios
//!
//! Este módulo contiene el acceso a datos sobre el almacén clave-valor.

pub mod notification_log;
pub mod session_repository;
pub mod trip_registry;

pub use notification_log::NotificationLog;
pub use session_repository::SessionRepository;
pub use trip_registry::TripRegistry;
