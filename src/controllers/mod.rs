//! Controladores
//!
//! Este módulo contiene la lógica de negocio sobre los repositorios.

pub mod admin_controller;
pub mod trip_lifecycle_controller;

pub use admin_controller::AdminController;
pub use trip_lifecycle_controller::TripLifecycleController;
