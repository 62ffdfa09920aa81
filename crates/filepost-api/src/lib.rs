//! Filepost API Library
//!
//! This crate provides the HTTP handlers, record lifecycle services, and
//! application setup.

mod handlers;
pub mod services;
pub mod setup;
mod telemetry;

// Public modules
pub mod error;
pub mod state;

// Re-exports
pub use error::{ErrorResponse, HttpAppError};
pub use state::AppState;
