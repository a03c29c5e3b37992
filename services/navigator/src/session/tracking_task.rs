//! services/navigator/src/session/tracking_task.rs
//!
//! This module contains the asynchronous "worker" that drives a navigation
//! session: it consumes position fixes, issues reroute requests, runs the
//! reroute cooldown timer and reacts to user commands.

use chrono::Utc;
use futures::future::OptionFuture;
use futures::{FutureExt, StreamExt};
use ride_nav_core::{
    Location, PortError, PortResult, PositioningService, Route, RoutingService, Trip, WatchOptions,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::events::SessionCommand;
use super::state::{NavigationSession, RerouteRequest};

/// Requests the first route for a pickup/dropoff pair and returns the trip,
/// already active. Unlike reroutes, a failure here is reported to the caller.
pub async fn start_trip(
    routing: &dyn RoutingService,
    pickup: Location,
    dropoff: Location,
) -> PortResult<Trip> {
    info!(
        "Calculating route from ({:.6}, {:.6}) to ({:.6}, {:.6}).",
        pickup.latitude(),
        pickup.longitude(),
        dropoff.latitude(),
        dropoff.longitude()
    );
    let route = routing.calculate_route(&pickup, &dropoff).await?.validate()?;
    let trip = Trip::new(pickup, dropoff).activate(route, Utc::now());
    info!("Trip {} started.", trip.id);
    Ok(trip)
}

/// The main asynchronous task for one navigation screen.
///
/// Runs until the trip is ended by `SessionCommand::EndTrip`, the command
/// channel closes, the position stream ends, or `cancel` fires. The position
/// subscription is released on every one of those paths, and an in-flight
/// reroute is left to finish on its own with its result discarded.
pub async fn run_navigation(
    mut session: NavigationSession,
    routing: Arc<dyn RoutingService>,
    positioning: Arc<dyn PositioningService>,
    watch: WatchOptions,
    mut commands: mpsc::Receiver<SessionCommand>,
    cancel: CancellationToken,
) -> PortResult<Trip> {
    let mut fixes = positioning.subscribe(watch).await?.fuse();
    info!("Navigation started for trip {}.", session.trip().id);

    let mut reroute: Option<JoinHandle<PortResult<Route>>> = None;

    loop {
        let cooldown = session.cooldown_deadline();

        tokio::select! {
            _ = cancel.cancelled() => {
                info!("Navigation cancelled.");
                break;
            }

            command = commands.recv() => match command {
                Some(SessionCommand::EndTrip) => {
                    info!("End trip requested.");
                    break;
                }
                None => {
                    info!("Command channel closed, ending navigation.");
                    break;
                }
            },

            fix = fixes.next() => match fix {
                Some(first) => {
                    // Only the newest of a burst of ready fixes is acted on.
                    let mut latest = None;
                    let mut pending = Some(first);
                    while let Some(item) = pending.take() {
                        match item {
                            Ok(location) => latest = Some(location),
                            Err(e) => session.handle_fix_error(&e),
                        }
                        pending = fixes.next().now_or_never().flatten();
                    }

                    if let Some(location) = latest {
                        if let Some(request) = session.handle_fix(location, Instant::now()) {
                            reroute = Some(spawn_reroute(routing.clone(), request));
                        }
                    }
                }
                None => {
                    warn!("Position stream ended, ending navigation.");
                    break;
                }
            },

            Some(joined) = OptionFuture::from(reroute.as_mut()), if reroute.is_some() => {
                reroute = None;
                let result = joined.unwrap_or_else(|e| Err(PortError::Unexpected(e.to_string())));
                session.apply_reroute(result, Instant::now());
            }

            _ = tokio::time::sleep_until(cooldown.unwrap_or_else(Instant::now)), if cooldown.is_some() => {
                session.poll_cooldown(Instant::now());
            }
        }
    }

    drop(fixes);
    debug!("Position subscription released.");
    if reroute.take().is_some() {
        debug!("Leaving the in-flight reroute to finish unobserved.");
    }

    Ok(session.end_trip(Utc::now()))
}

fn spawn_reroute(
    routing: Arc<dyn RoutingService>,
    request: RerouteRequest,
) -> JoinHandle<PortResult<Route>> {
    tokio::spawn(async move { routing.calculate_route(&request.from, &request.to).await })
}
