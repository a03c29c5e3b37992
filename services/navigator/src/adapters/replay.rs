//! services/navigator/src/adapters/replay.rs
//!
//! A positioning source that replays a recorded track of fixes, paced at the
//! watch interval and thinned by the minimum-displacement filter.

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use ride_nav_core::{
    distance, Coordinate, Location, PortError, PortResult, PositionStream, PositioningService,
    WatchOptions,
};

#[derive(Clone, Debug, Default)]
pub struct ReplayPositioning {
    track: Vec<Coordinate>,
}

impl ReplayPositioning {
    pub fn new(track: Vec<Coordinate>) -> Self {
        Self { track }
    }

    /// Applies the displacement filter the way a device watch would. Invalid
    /// fixes are kept so they surface as sensor errors.
    fn filtered(&self, min_displacement_m: f64) -> Vec<Coordinate> {
        let mut last: Option<Coordinate> = None;
        self.track
            .iter()
            .copied()
            .filter(|fix| {
                if !fix.is_valid() {
                    return true;
                }
                let keep = last.map_or(true, |prev| distance(prev, *fix) >= min_displacement_m);
                if keep {
                    last = Some(*fix);
                }
                keep
            })
            .collect()
    }
}

#[async_trait]
impl PositioningService for ReplayPositioning {
    async fn subscribe(&self, options: WatchOptions) -> PortResult<PositionStream> {
        let interval = options.interval;
        let fixes = self.filtered(options.min_displacement_m);

        let stream = stream::iter(fixes).then(move |fix| async move {
            tokio::time::sleep(interval).await;
            Coordinate::new(fix.latitude, fix.longitude)
                .map(Location::from)
                .map_err(|e| PortError::InvalidData(e.to_string()))
        });
        Ok(Box::pin(stream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn c(latitude: f64, longitude: f64) -> Coordinate {
        Coordinate {
            latitude,
            longitude,
        }
    }

    fn options(min_displacement_m: f64) -> WatchOptions {
        WatchOptions {
            min_displacement_m,
            interval: Duration::ZERO,
        }
    }

    #[tokio::test]
    async fn suppresses_fixes_closer_than_min_displacement() {
        let replay = ReplayPositioning::new(vec![
            c(25.0, 55.0),
            c(25.00001, 55.0), // ~1 m
            c(25.0002, 55.0),  // ~22 m
        ]);
        let fixes: Vec<_> = replay.subscribe(options(10.0)).await.unwrap().collect().await;
        assert_eq!(fixes.len(), 2);
        assert_eq!(fixes[1].as_ref().unwrap().latitude(), 25.0002);
    }

    #[tokio::test]
    async fn invalid_fixes_surface_as_errors() {
        let replay = ReplayPositioning::new(vec![c(25.0, 55.0), c(95.0, 55.0), c(25.001, 55.0)]);
        let fixes: Vec<_> = replay.subscribe(options(0.0)).await.unwrap().collect().await;
        assert_eq!(fixes.len(), 3);
        assert!(matches!(fixes[1], Err(PortError::InvalidData(_))));
        assert!(fixes[2].is_ok());
    }
}
