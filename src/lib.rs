//! Núcleo del coordinador de viajes multi-conductor
//!
//! Expone los módulos del servicio para que los tests de integración
//! puedan construir el estado y el router sin levantar el binario.

pub mod config;
pub mod controllers;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;
pub mod utils;
