//! Formatting of the telemetry line burned into the header.

use std::fmt::{
    Display,
    Formatter,
};

use crate::overlay::TELEMETRY_MAX_CHARS;

/// A station position in decimal degrees and meters.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Position {
    /// Positive is north.
    pub latitude: f64,
    /// Positive is east.
    pub longitude: f64,
    pub altitude: f64,
}

impl Position {
    pub fn new(latitude: f64, longitude: f64, altitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude,
        }
    }

    /// The telemetry line for this position, cut to what the header can show.
    pub fn to_telemetry(&self) -> String {
        let mut line = self.to_string();
        if let Some((end, _)) = line.char_indices().nth(TELEMETRY_MAX_CHARS) {
            line.truncate(end);
        }
        line
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let north_south = if self.latitude < 0.0 { 'S' } else { 'N' };
        let east_west = if self.longitude < 0.0 { 'W' } else { 'E' };
        write!(
            f,
            "LAT: {:.4}{north_south} LONG: {:.4}{east_west} ALT:{:.0}",
            self.latitude.abs(),
            self.longitude.abs(),
            self.altitude,
        )
    }
}
