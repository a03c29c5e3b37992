//! services/navigator/src/display.rs
//!
//! Human-readable distance and duration strings for navigation output.

/// `"N m"` below one kilometer, `"X.Y km"` otherwise.
pub fn format_distance(meters: f64) -> String {
    if meters < 1000.0 {
        format!("{} m", meters.round() as i64)
    } else {
        format!("{:.1} km", meters / 1000.0)
    }
}

/// `"N min"` below one hour, `"Hh Mm"` otherwise.
pub fn format_duration(seconds: f64) -> String {
    let minutes = (seconds / 60.0).floor() as i64;
    if minutes < 60 {
        return format!("{} min", minutes);
    }
    format!("{}h {}m", minutes / 60, minutes % 60)
}
