//! Utilidades
//!
//! Este módulo contiene las utilidades compartidas del sistema.

pub mod errors;
pub mod validation;

pub use errors::{AppError, AppResult};
