pub mod events;
pub mod state;
pub mod tracking_task;

pub use events::{NavigationEvent, SessionCommand};
pub use state::{NavigationSession, NavigationSettings, RerouteRequest, SessionPhase};
pub use tracking_task::{run_navigation, start_trip};
