//! Middleware
//!
//! Este módulo contiene los middleware HTTP compartidos.

pub mod cors;
