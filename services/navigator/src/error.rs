//! services/navigator/src/error.rs
//!
//! Defines the primary error type for the navigator service.

use crate::config::ConfigError;
use ride_nav_core::{DomainError, PortError};

/// The primary error type for the `navigator` service.
#[derive(Debug, thiserror::Error)]
pub enum NavigatorError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// A domain value broke one of its invariants.
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    /// Represents a standard Input/Output error (e.g., reading a scenario file).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A scenario or recorded-route file could not be parsed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}
