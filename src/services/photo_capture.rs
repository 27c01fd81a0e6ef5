//! Proveedor de captura de fotos
//!
//! Las fotos llegan como payloads base64 (data URLs del dispositivo) y se
//! guardan como referencias opacas: el digest MD5 del contenido. El core
//! nunca persiste los bytes, solo la referencia.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Utc;

use crate::models::vehicle::PhotoRef;
use crate::utils::errors::{AppError, AppResult};

pub trait PhotoCaptureProvider: Send + Sync {
    /// Convertir un payload capturado en una referencia opaca
    fn capture(&self, payload: &str) -> AppResult<PhotoRef>;
}

/// Captura sobre payloads base64 / data URLs
#[derive(Debug, Clone, Copy, Default)]
pub struct Base64PhotoCapture;

impl Base64PhotoCapture {
    pub fn new() -> Self {
        Self
    }
}

impl PhotoCaptureProvider for Base64PhotoCapture {
    fn capture(&self, payload: &str) -> AppResult<PhotoRef> {
        // Aceptar tanto "data:image/...;base64,XXXX" como base64 pelado
        let encoded = match payload.split_once(";base64,") {
            Some((_, data)) => data,
            None => payload,
        };

        if encoded.trim().is_empty() {
            return Err(AppError::BadRequest("Empty photo payload".to_string()));
        }

        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|_| AppError::BadRequest("Invalid base64 photo payload".to_string()))?;

        let digest = md5::compute(&bytes);

        Ok(PhotoRef {
            reference: format!("{:x}", digest),
            captured_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_data_url() {
        let capture = Base64PhotoCapture::new();
        let photo = capture
            .capture("data:image/png;base64,aGVsbG8gd29ybGQ=")
            .unwrap();

        // md5("hello world")
        assert_eq!(photo.reference, "5eb63bbbe01eeed093cb22bb8f5acdc3");
    }

    #[test]
    fn test_capture_plain_base64() {
        let capture = Base64PhotoCapture::new();
        let photo = capture.capture("aGVsbG8gd29ybGQ=").unwrap();
        assert_eq!(photo.reference, "5eb63bbbe01eeed093cb22bb8f5acdc3");
    }

    #[test]
    fn test_capture_same_payload_same_reference() {
        let capture = Base64PhotoCapture::new();
        let a = capture.capture("aGVsbG8=").unwrap();
        let b = capture.capture("aGVsbG8=").unwrap();
        assert_eq!(a.reference, b.reference);
    }

    #[test]
    fn test_capture_rejects_garbage() {
        let capture = Base64PhotoCapture::new();
        assert!(capture.capture("").is_err());
        assert!(capture.capture("not base64 !!!").is_err());
    }
}
