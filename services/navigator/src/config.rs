//! services/navigator/src/config.rs
//!
//! Defines the navigator's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::Level;

use crate::session::NavigationSettings;
use ride_nav_core::WatchOptions;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Which routing engine answers route requests.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RoutingEngineKind {
    StraightLine,
    Recorded { routes_path: PathBuf },
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub log_level: Level,
    pub scenario_path: PathBuf,
    pub routing_engine: RoutingEngineKind,
    pub deviation_threshold_m: f64,
    pub arrival_radius_m: f64,
    pub reroute_cooldown: Duration,
    pub fallback_speed_mps: f64,
    pub replay_interval: Duration,
    pub min_displacement_m: f64,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to keep tests hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let scenario_path = lookup("SCENARIO_PATH")
            .map(PathBuf::from)
            .ok_or_else(|| ConfigError::MissingVar("SCENARIO_PATH".to_string()))?;

        // --- Routing engine selection ---
        let engine = lookup("ROUTING_ENGINE").unwrap_or_else(|| "straight_line".to_string());
        let routing_engine = match engine.to_lowercase().as_str() {
            "straight_line" => RoutingEngineKind::StraightLine,
            "recorded" => {
                let routes_path = lookup("RECORDED_ROUTES_PATH")
                    .map(PathBuf::from)
                    .ok_or_else(|| ConfigError::MissingVar("RECORDED_ROUTES_PATH".to_string()))?;
                RoutingEngineKind::Recorded { routes_path }
            }
            _ => {
                return Err(ConfigError::InvalidValue(
                    "ROUTING_ENGINE".to_string(),
                    format!("'{}' is not a known routing engine", engine),
                ))
            }
        };

        // --- Navigation tuning ---
        let deviation_threshold_m = parse_positive(&lookup, "DEVIATION_THRESHOLD_M", 75.0)?;
        let arrival_radius_m = parse_positive(&lookup, "ARRIVAL_RADIUS_M", 50.0)?;
        let reroute_cooldown =
            Duration::from_millis(parse_or(&lookup, "REROUTE_COOLDOWN_MS", 3000u64)?);
        let fallback_speed_mps = parse_positive(&lookup, "FALLBACK_SPEED_MPS", 10.0)?;

        // --- Positioning replay ---
        let replay_interval =
            Duration::from_millis(parse_or(&lookup, "REPLAY_INTERVAL_MS", 1000u64)?);
        let min_displacement_m = parse_or(&lookup, "MIN_DISPLACEMENT_M", 10.0f64)?;

        Ok(Self {
            log_level,
            scenario_path,
            routing_engine,
            deviation_threshold_m,
            arrival_radius_m,
            reroute_cooldown,
            fallback_speed_mps,
            replay_interval,
            min_displacement_m,
        })
    }

    pub fn navigation_settings(&self) -> NavigationSettings {
        NavigationSettings {
            deviation_threshold_m: self.deviation_threshold_m,
            arrival_radius_m: self.arrival_radius_m,
            reroute_cooldown: self.reroute_cooldown,
        }
    }

    pub fn watch_options(&self) -> WatchOptions {
        WatchOptions {
            min_displacement_m: self.min_displacement_m,
            interval: self.replay_interval,
            ..WatchOptions::default()
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue(key.to_string(), e.to_string())),
        None => Ok(default),
    }
}

fn parse_positive<F>(lookup: &F, key: &str, default: f64) -> Result<f64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = parse_or(lookup, key, default)?;
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::InvalidValue(
            key.to_string(),
            format!("'{}' must be a positive number", value),
        ))
    }
}
