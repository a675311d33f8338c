//! HTTP request handling.
//!
//! ## Structure
//!
//! - [`handler`] - Router and endpoint handlers (`AppState`).
//! - [`types`] - Request bodies and the `{ success, data, error }` envelope.
//! - [`error`] - `ServiceError` and its status code mapping.

pub mod error;
pub mod handler;
pub mod types;
