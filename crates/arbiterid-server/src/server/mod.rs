//! Server-side components of the ArbiterID HTTP service.
//!
//! - [`config`] - CLI / environment configuration and validation.
//! - [`service`] - Routes, handlers and the JSON envelope.
//! - [`telemetry`] - `tracing-subscriber` initialization.

pub mod config;
pub mod service;
pub mod telemetry;
