//! Servicios de dominio
//!
//! Este módulo contiene los servicios que el controlador del ciclo de
//! vida consume: evaluación de proximidad, adquisición de posición y
//! captura de fotos.

pub mod photo_capture;
pub mod positioning;
pub mod proximity;

pub use photo_capture::{Base64PhotoCapture, PhotoCaptureProvider};
pub use positioning::{
    PositioningError, PositioningProvider, ReportedPositioning, SimulatedPositioning,
};
pub use proximity::ProximityEvaluator;
