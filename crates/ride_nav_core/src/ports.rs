//! crates/ride_nav_core/src/ports.rs
//!
//! Defines the service contracts (traits) the navigation core depends on.
//! These traits form the boundary of the hexagonal architecture, keeping the core
//! independent of a specific routing engine or positioning backend.

use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;
use std::time::Duration;

use crate::domain::{DomainError, Location, Route};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Service unavailable: {0}")]
    Unavailable(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

impl From<DomainError> for PortError {
    fn from(err: DomainError) -> Self {
        PortError::InvalidData(err.to_string())
    }
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait RoutingService: Send + Sync {
    /// Calculates a complete route between two locations.
    async fn calculate_route(&self, from: &Location, to: &Location) -> PortResult<Route>;
}

/// A push stream of position fixes. Dropping it releases the subscription.
pub type PositionStream = Pin<Box<dyn Stream<Item = PortResult<Location>> + Send>>;

/// How often fixes should be delivered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WatchOptions {
    /// Fixes closer than this to the previously delivered one are suppressed.
    pub min_displacement_m: f64,
    pub interval: Duration,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            min_displacement_m: 10.0,
            interval: Duration::from_millis(1000),
        }
    }
}

#[async_trait]
pub trait PositioningService: Send + Sync {
    /// Starts delivering fixes. Errors on the stream are transient sensor errors.
    async fn subscribe(&self, options: WatchOptions) -> PortResult<PositionStream>;
}
