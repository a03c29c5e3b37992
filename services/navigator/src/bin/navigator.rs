//! services/navigator/src/bin/navigator.rs

use navigator_lib::{
    adapters::{routing_engine, ReplayPositioning},
    config::Config,
    display::{format_distance, format_duration},
    error::NavigatorError,
    scenario::Scenario,
    session::{run_navigation, start_trip, NavigationEvent, NavigationSession, SessionCommand},
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), NavigatorError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting navigator...");

    // --- 2. Load the Recorded Ride ---
    let scenario = Scenario::from_file(&config.scenario_path)?;
    info!(
        "Loaded scenario {} with {} fixes.",
        config.scenario_path.display(),
        scenario.fixes.len()
    );

    // --- 3. Initialize Service Adapters ---
    let routing = routing_engine(&config)?;
    let positioning = Arc::new(ReplayPositioning::new(scenario.fixes.clone()));

    // --- 4. Start the Trip ---
    let trip = start_trip(routing.as_ref(), scenario.pickup, scenario.dropoff).await?;
    if let Some(route) = &trip.route {
        info!(
            "Route: {} • {}, {} instructions.",
            format_distance(route.distance),
            format_duration(route.duration),
            route.instructions.len()
        );
    }

    // --- 5. Spawn the Navigation Session ---
    let (session, mut events) = NavigationSession::new(trip, config.navigation_settings());
    let (command_tx, command_rx) = mpsc::channel(8);
    let cancel = CancellationToken::new();

    let navigation = tokio::spawn(run_navigation(
        session,
        routing.clone(),
        positioning,
        config.watch_options(),
        command_rx,
        cancel.clone(),
    ));

    let ctrl_c_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping navigation.");
            ctrl_c_cancel.cancel();
        }
    });

    // --- 6. Present Events ---
    while let Some(event) = events.recv().await {
        match event {
            NavigationEvent::Progress {
                instruction_index,
                instruction,
                distance_to_next,
                distance_to_destination,
            } => match instruction {
                Some(step) => info!(
                    "{} {}{} in {} ({} to destination).",
                    step.maneuver.symbol(),
                    step.text,
                    step.street_name
                        .map(|street| format!(" onto {}", street))
                        .unwrap_or_default(),
                    format_distance(distance_to_next),
                    format_distance(distance_to_destination)
                ),
                None => info!(
                    "Instruction #{}: {} to next turn, {} to destination.",
                    instruction_index,
                    format_distance(distance_to_next),
                    format_distance(distance_to_destination)
                ),
            },
            NavigationEvent::RouteReplaced {
                distance,
                duration,
                instructions,
            } => {
                info!(
                    "New route: {} • {}, {} instructions.",
                    format_distance(distance),
                    format_duration(duration),
                    instructions
                );
            }
            NavigationEvent::RerouteStatusChanged { rerouting: true } => {
                info!("Recalculating route...");
            }
            NavigationEvent::RerouteStatusChanged { rerouting: false } => {
                info!("Route recalculation finished.");
            }
            NavigationEvent::Arrived { trip_id } => {
                info!("Arrived! Ending trip {}.", trip_id);
                if command_tx.send(SessionCommand::EndTrip).await.is_err() {
                    error!("Navigation already stopped before the trip could be ended.");
                }
            }
            NavigationEvent::TripCompleted { trip } => {
                info!(
                    "Trip {} completed at {}.",
                    trip.id,
                    trip.end_time.map(|t| t.to_rfc3339()).unwrap_or_default()
                );
            }
        }
    }

    // --- 7. Collect the Completed Trip ---
    let trip = navigation
        .await
        .map_err(|e| NavigatorError::Internal(e.to_string()))??;
    println!("{}", serde_json::to_string_pretty(&trip)?);

    Ok(())
}
