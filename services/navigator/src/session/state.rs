//! services/navigator/src/session/state.rs
//!
//! The live working set of one navigation screen and the state machine that
//! advances it. Every operation here is synchronous; the async driver in
//! `tracking_task` feeds it fixes, reroute results and timer ticks.

use chrono::{DateTime, Utc};
use ride_nav_core::{
    project, DeviationMonitor, Location, PortError, PortResult, Route, RouteInstruction, Trip,
};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::events::NavigationEvent;

//=========================================================================================
// Settings
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NavigationSettings {
    /// Meters from the nearest route vertex beyond which a reroute is requested.
    pub deviation_threshold_m: f64,
    /// Meters from the dropoff at which the rider counts as arrived.
    pub arrival_radius_m: f64,
    /// Quiet period after a reroute completes, before another may start.
    pub reroute_cooldown: Duration,
}

impl Default for NavigationSettings {
    fn default() -> Self {
        Self {
            deviation_threshold_m: ride_nav_core::DEFAULT_DEVIATION_THRESHOLD_M,
            arrival_radius_m: 50.0,
            reroute_cooldown: Duration::from_millis(3000),
        }
    }
}

//=========================================================================================
// Session State
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No fix received yet.
    Idle,
    Tracking,
    /// A reroute is in flight or cooling down.
    Rerouting,
    Arrived,
    Completed,
}

/// A request the driver must send to the routing engine.
#[derive(Debug, Clone, PartialEq)]
pub struct RerouteRequest {
    pub from: Location,
    pub to: Location,
}

pub struct NavigationSession {
    trip: Trip,
    settings: NavigationSettings,
    monitor: DeviationMonitor,
    phase: SessionPhase,
    current_location: Option<Location>,
    instruction_index: usize,
    distance_to_next: f64,
    arrival_announced: bool,
    /// Set once the in-flight reroute has answered.
    cooldown_until: Option<Instant>,
    events: mpsc::UnboundedSender<NavigationEvent>,
}

impl NavigationSession {
    /// Creates a session for an active trip, along with the receiving end of
    /// its event channel.
    pub fn new(
        trip: Trip,
        settings: NavigationSettings,
    ) -> (Self, mpsc::UnboundedReceiver<NavigationEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let session = Self {
            trip,
            settings,
            monitor: DeviationMonitor::new(settings.deviation_threshold_m),
            phase: SessionPhase::Idle,
            current_location: None,
            instruction_index: 0,
            distance_to_next: 0.0,
            arrival_announced: false,
            cooldown_until: None,
            events,
        };
        (session, receiver)
    }

    pub fn trip(&self) -> &Trip {
        &self.trip
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn current_location(&self) -> Option<&Location> {
        self.current_location.as_ref()
    }

    pub fn instruction_index(&self) -> usize {
        self.instruction_index
    }

    pub fn distance_to_next(&self) -> f64 {
        self.distance_to_next
    }

    pub fn is_rerouting(&self) -> bool {
        self.phase == SessionPhase::Rerouting
    }

    pub fn current_instruction(&self) -> Option<&RouteInstruction> {
        self.trip
            .route
            .as_ref()
            .and_then(|route| route.instructions.get(self.instruction_index))
    }

    /// When the current reroute cooldown expires, if one is running.
    pub fn cooldown_deadline(&self) -> Option<Instant> {
        match self.phase {
            SessionPhase::Rerouting => self.cooldown_until,
            _ => None,
        }
    }

    //=====================================================================================
    // Transitions
    //=====================================================================================

    /// Processes one position fix. Returns a reroute request when the fix is
    /// off-route and no reroute is in flight or cooling down.
    pub fn handle_fix(&mut self, location: Location, now: Instant) -> Option<RerouteRequest> {
        if self.phase == SessionPhase::Completed {
            debug!("Ignoring fix for a completed trip.");
            return None;
        }
        if !location.coordinate.is_valid() {
            warn!(
                "Discarding invalid position fix ({}, {}), keeping last known location.",
                location.latitude(),
                location.longitude()
            );
            return None;
        }

        self.current_location = Some(location.clone());
        if self.phase == SessionPhase::Idle {
            info!("First position fix received, tracking trip {}.", self.trip.id);
            self.phase = SessionPhase::Tracking;
        }
        self.poll_cooldown(now);

        let route = self.trip.route.as_ref()?;

        if let Some(projection) = project(&location, route) {
            self.instruction_index = projection.instruction_index;
            self.distance_to_next = projection.distance_to_anchor;
        }

        let distance_to_destination = location.distance_to(&self.trip.dropoff);
        self.emit(NavigationEvent::Progress {
            instruction_index: self.instruction_index,
            instruction: self.current_instruction().cloned(),
            distance_to_next: self.distance_to_next,
            distance_to_destination,
        });

        if distance_to_destination <= self.settings.arrival_radius_m {
            self.arrive(distance_to_destination);
            return None;
        }

        if self.phase != SessionPhase::Tracking {
            return None;
        }

        let deviated = self.monitor.is_deviated(&location, &route.coordinates);
        if !deviated {
            return None;
        }

        info!(
            "Position ({:.6}, {:.6}) is more than {} m off route, rerouting.",
            location.latitude(),
            location.longitude(),
            self.settings.deviation_threshold_m
        );
        self.phase = SessionPhase::Rerouting;
        self.cooldown_until = None;
        self.emit(NavigationEvent::RerouteStatusChanged { rerouting: true });

        Some(RerouteRequest {
            from: location,
            to: self.trip.dropoff.clone(),
        })
    }

    /// A transient positioning error: logged, the last known location stays.
    pub fn handle_fix_error(&self, err: &PortError) {
        warn!("Position fix failed, keeping last known location: {}", err);
    }

    /// Applies the answer to a reroute request. Returns whether the route was
    /// replaced. Results arriving after the trip ended are discarded.
    pub fn apply_reroute(&mut self, result: PortResult<Route>, now: Instant) -> bool {
        if self.phase == SessionPhase::Completed {
            info!("Discarding reroute result for completed trip {}.", self.trip.id);
            return false;
        }

        let applied = match result.and_then(|route| route.validate().map_err(PortError::from)) {
            Ok(route) => {
                info!(
                    "Rerouted: {:.0} m, {} instructions.",
                    route.distance,
                    route.instructions.len()
                );
                let summary = NavigationEvent::RouteReplaced {
                    distance: route.distance,
                    duration: route.duration,
                    instructions: route.instructions.len(),
                };
                self.trip.replace_route(route);
                self.emit(summary);
                true
            }
            Err(e) => {
                warn!("Reroute failed, keeping the current route: {}", e);
                false
            }
        };

        if self.phase == SessionPhase::Rerouting {
            self.cooldown_until = Some(now + self.settings.reroute_cooldown);
        }
        applied
    }

    /// Returns to tracking once the reroute cooldown has elapsed.
    pub fn poll_cooldown(&mut self, now: Instant) {
        let Some(deadline) = self.cooldown_deadline() else {
            return;
        };
        if now >= deadline {
            debug!("Reroute cooldown finished.");
            self.phase = SessionPhase::Tracking;
            self.cooldown_until = None;
            self.emit(NavigationEvent::RerouteStatusChanged { rerouting: false });
        }
    }

    /// Ends the trip from any state. Idempotent.
    pub fn end_trip(&mut self, now: DateTime<Utc>) -> Trip {
        if self.phase != SessionPhase::Completed {
            self.phase = SessionPhase::Completed;
            self.cooldown_until = None;
            self.trip.complete(now);
            info!("Trip {} completed.", self.trip.id);
            self.emit(NavigationEvent::TripCompleted {
                trip: self.trip.clone(),
            });
        }
        self.trip.clone()
    }

    fn arrive(&mut self, distance_to_destination: f64) {
        if self.phase == SessionPhase::Rerouting {
            self.emit(NavigationEvent::RerouteStatusChanged { rerouting: false });
        }
        self.phase = SessionPhase::Arrived;
        self.cooldown_until = None;

        if !self.arrival_announced {
            self.arrival_announced = true;
            info!(
                "Arrived at dropoff ({:.0} m away) for trip {}.",
                distance_to_destination, self.trip.id
            );
            self.emit(NavigationEvent::Arrived {
                trip_id: self.trip.id,
            });
        }
    }

    fn emit(&self, event: NavigationEvent) {
        // The presentation layer may already be gone; navigation carries on.
        if self.events.send(event).is_err() {
            debug!("No listener for navigation events.");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ride_nav_core::{Coordinate, Maneuver};

    /// Due north from (25.0, 55.0), one vertex every ~111 m, dropoff at the end.
    fn trip() -> Trip {
        let coordinates: Vec<Coordinate> = (0..10)
            .map(|i| Coordinate {
                latitude: 25.0 + i as f64 * 0.001,
                longitude: 55.0,
            })
            .collect();
        let instructions = [Maneuver::Start, Maneuver::Straight, Maneuver::Arrive]
            .into_iter()
            .map(|maneuver| ride_nav_core::RouteInstruction {
                text: maneuver.to_string(),
                maneuver,
                distance: 0.0,
                duration: 0.0,
                street_name: None,
            })
            .collect();
        let route = Route {
            coordinates,
            distance: 1000.0,
            duration: 100.0,
            instructions,
        };
        Trip::new(Location::new(25.0, 55.0), Location::new(25.009, 55.0))
            .activate(route, Utc::now())
    }

    fn off_route() -> Location {
        // ~200 m east of the route.
        Location::new(25.003, 55.002)
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<NavigationEvent>) -> Vec<NavigationEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    fn status_changes(events: &[NavigationEvent]) -> Vec<bool> {
        events
            .iter()
            .filter_map(|event| match event {
                NavigationEvent::RerouteStatusChanged { rerouting } => Some(*rerouting),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn on_route_fixes_never_reroute() {
        let (mut session, mut rx) = NavigationSession::new(trip(), NavigationSettings::default());
        let t0 = Instant::now();
        assert_eq!(session.phase(), SessionPhase::Idle);

        for i in 0..5 {
            let fix = Location::new(25.0 + i as f64 * 0.0011, 55.0002);
            assert!(session.handle_fix(fix, t0).is_none());
        }
        assert_eq!(session.phase(), SessionPhase::Tracking);
        assert_eq!(session.instruction_index(), 2);
        assert!(status_changes(&drain(&mut rx)).is_empty());
    }

    #[test]
    fn one_reroute_per_cooldown_window() {
        let (mut session, mut rx) = NavigationSession::new(trip(), NavigationSettings::default());
        let t0 = Instant::now();

        let request = session.handle_fix(off_route(), t0).expect("reroute requested");
        assert_eq!(request.from, off_route());
        assert_eq!(request.to, session.trip().dropoff);
        assert!(session.is_rerouting());

        // Still deviated while the request is in flight.
        assert!(session.handle_fix(off_route(), t0).is_none());
        assert_eq!(session.current_location(), Some(&off_route()));

        assert!(!session.apply_reroute(Err(PortError::Unavailable("engine down".into())), t0));
        assert_eq!(session.cooldown_deadline(), Some(t0 + Duration::from_millis(3000)));

        // Still deviated during the cooldown window.
        session.poll_cooldown(t0 + Duration::from_millis(2999));
        assert!(session
            .handle_fix(off_route(), t0 + Duration::from_millis(2999))
            .is_none());

        session.poll_cooldown(t0 + Duration::from_millis(3000));
        assert_eq!(session.phase(), SessionPhase::Tracking);
        assert!(session
            .handle_fix(off_route(), t0 + Duration::from_millis(3001))
            .is_some());

        assert_eq!(status_changes(&drain(&mut rx)), vec![true, false, true]);
    }

    #[test]
    fn failed_or_malformed_reroutes_keep_the_route() {
        let (mut session, _rx) = NavigationSession::new(trip(), NavigationSettings::default());
        let t0 = Instant::now();
        let original = session.trip().route.clone();

        session.handle_fix(off_route(), t0);
        assert!(!session.apply_reroute(Err(PortError::NotFound("no path".into())), t0));
        assert_eq!(session.trip().route, original);

        let mut empty = original.clone().unwrap();
        empty.instructions.clear();
        assert!(!session.apply_reroute(Ok(empty), t0));
        assert_eq!(session.trip().route, original);
    }

    #[test]
    fn successful_reroute_swaps_the_route() {
        let (mut session, mut rx) = NavigationSession::new(trip(), NavigationSettings::default());
        let t0 = Instant::now();

        let request = session.handle_fix(off_route(), t0).unwrap();
        let new_route = Route {
            coordinates: vec![request.from.coordinate, request.to.coordinate],
            distance: 700.0,
            duration: 70.0,
            instructions: session.trip().route.as_ref().unwrap().instructions.clone(),
        };
        assert!(session.apply_reroute(Ok(new_route.clone()), t0));
        assert_eq!(session.trip().route.as_ref(), Some(&new_route));
        assert!(drain(&mut rx).contains(&NavigationEvent::RouteReplaced {
            distance: 700.0,
            duration: 70.0,
            instructions: 3,
        }));

        // The new route starts at the current position, so it is on-route now.
        session.poll_cooldown(t0 + Duration::from_secs(3));
        assert!(session.handle_fix(off_route(), t0 + Duration::from_secs(4)).is_none());
        assert_eq!(session.instruction_index(), 0);
    }

    #[test]
    fn arrival_fires_once() {
        let (mut session, mut rx) = NavigationSession::new(trip(), NavigationSettings::default());
        let t0 = Instant::now();
        let near_dropoff = Location::new(25.0088, 55.0001);

        for _ in 0..4 {
            assert!(session.handle_fix(near_dropoff.clone(), t0).is_none());
            assert_eq!(session.phase(), SessionPhase::Arrived);
        }

        let arrivals = drain(&mut rx)
            .into_iter()
            .filter(|event| matches!(event, NavigationEvent::Arrived { .. }))
            .count();
        assert_eq!(arrivals, 1);
        assert_eq!(
            session.current_instruction().map(|i| i.maneuver),
            Some(Maneuver::Arrive)
        );
    }

    #[test]
    fn arriving_mid_reroute_clears_the_banner() {
        let (mut session, mut rx) = NavigationSession::new(trip(), NavigationSettings::default());
        let t0 = Instant::now();

        session.handle_fix(off_route(), t0).unwrap();
        session.handle_fix(Location::new(25.009, 55.0), t0);
        assert_eq!(session.phase(), SessionPhase::Arrived);
        assert_eq!(session.cooldown_deadline(), None);

        // The late answer may still update the route shown to the rider.
        let late = session.trip().route.clone().unwrap();
        assert!(session.apply_reroute(Ok(late), t0));
        assert_eq!(session.phase(), SessionPhase::Arrived);
        assert_eq!(status_changes(&drain(&mut rx)), vec![true, false]);
    }

    #[test]
    fn ending_discards_late_reroute_results() {
        let (mut session, mut rx) = NavigationSession::new(trip(), NavigationSettings::default());
        let t0 = Instant::now();
        let original = session.trip().route.clone();

        let request = session.handle_fix(off_route(), t0).unwrap();
        let completed = session.end_trip(Utc::now());
        assert!(completed.is_completed());
        assert!(completed.end_time.is_some());

        let late = Route {
            coordinates: vec![request.from.coordinate, request.to.coordinate],
            distance: 1.0,
            duration: 1.0,
            instructions: original.clone().unwrap().instructions,
        };
        assert!(!session.apply_reroute(Ok(late), t0));
        assert_eq!(session.trip().route, original);

        // Further fixes are ignored, and ending again changes nothing.
        assert!(session.handle_fix(off_route(), t0).is_none());
        assert_eq!(session.end_trip(Utc::now()).end_time, completed.end_time);

        let completions = drain(&mut rx)
            .into_iter()
            .filter(|event| matches!(event, NavigationEvent::TripCompleted { .. }))
            .count();
        assert_eq!(completions, 1);
    }

    #[test]
    fn sensor_errors_keep_the_last_fix() {
        let (mut session, _rx) = NavigationSession::new(trip(), NavigationSettings::default());
        let t0 = Instant::now();
        let fix = Location::new(25.001, 55.0);

        session.handle_fix(fix.clone(), t0);
        session.handle_fix_error(&PortError::Unavailable("GPS timeout".into()));
        assert_eq!(session.current_location(), Some(&fix));
        assert_eq!(session.phase(), SessionPhase::Tracking);
    }

    #[test]
    fn progress_carries_the_current_instruction() {
        let (mut session, mut rx) = NavigationSession::new(trip(), NavigationSettings::default());

        session.handle_fix(Location::new(25.0012, 55.0001), Instant::now());
        let progress = drain(&mut rx)
            .into_iter()
            .find_map(|event| match event {
                NavigationEvent::Progress {
                    instruction_index,
                    instruction,
                    ..
                } => Some((instruction_index, instruction)),
                _ => None,
            })
            .unwrap();
        assert_eq!(progress.0, 1);
        assert_eq!(progress.1.map(|i| i.maneuver), Some(Maneuver::Straight));
    }

    #[test]
    fn invalid_fixes_are_treated_as_sensor_errors() {
        let (mut session, mut rx) = NavigationSession::new(trip(), NavigationSettings::default());
        let t0 = Instant::now();
        let fix = Location::new(25.001, 55.0);
        session.handle_fix(fix.clone(), t0);
        drain(&mut rx);

        for bad in [
            Location::new(f64::NAN, 55.0),
            Location::new(25.0, f64::NAN),
            Location::new(91.0, 55.0),
        ] {
            assert!(session.handle_fix(bad, t0).is_none());
        }
        assert_eq!(session.current_location(), Some(&fix));
        assert_eq!(session.phase(), SessionPhase::Tracking);
        assert!(drain(&mut rx).is_empty());
    }
}
