pub mod adapters;
pub mod config;
pub mod display;
pub mod error;
pub mod scenario;
pub mod session;
