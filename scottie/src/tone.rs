use std::time::Duration;

/// Hz per channel step. 800 Hz of video bandwidth spread over 255 steps.
pub const COLOR_CORRECTION: f32 = 3.1372549;

pub const CHANNEL_LOW_TONE: f32 = 1500.0;
pub const CHANNEL_HIGH_TONE: f32 = 2300.0;

pub const LEADER_TONE: f32 = 1900.0;
pub const LEADER_TIME: Duration = Duration::from_millis(300);

pub const LEADER_BREAK_TIME: Duration = Duration::from_millis(10);

pub const VIS_BIT_TIME: Duration = Duration::from_millis(30);
pub const VIS_LOW_TONE: f32 = 1300.0;
pub const VIS_HIGH_TONE: f32 = 1100.0;

// sync, leader break, vis start/stop
pub const SYNC_TONE: f32 = 1200.0;

// separator and sync porch
pub const PORCH_TONE: f32 = 1500.0;

pub const VOX_TONES: [f32; 8] = [
    1900.0, 1500.0, 1900.0, 1500.0, 2300.0, 1500.0, 2300.0, 1500.0,
];
pub const VOX_TIME: Duration = Duration::from_millis(100);

/// Frequency an inert oscillator is parked at.
pub const PARK_FREQUENCY: f32 = 0.0;

/// Maps a single color channel value to its scan frequency.
///
/// `0` maps to 1500 Hz (black), `255` to 2300 Hz (white). Only used for pixel
/// tones; protocol tones are the constants above.
#[inline]
pub fn tone_for(value: u8) -> f32 {
    CHANNEL_LOW_TONE + f32::from(value) * COLOR_CORRECTION
}

/// A fixed frequency held for a fixed time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ToneEvent {
    pub frequency: f32,
    pub duration: Duration,
}

impl ToneEvent {
    #[inline]
    pub const fn new(frequency: f32, duration: Duration) -> Self {
        Self {
            frequency,
            duration,
        }
    }

    #[inline]
    pub fn is_inert(&self) -> bool {
        self.frequency <= PARK_FREQUENCY
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn channel_extremes() {
        assert_eq!(tone_for(0), CHANNEL_LOW_TONE);
        assert_abs_diff_eq!(tone_for(255), CHANNEL_HIGH_TONE, epsilon = 1e-3);
        assert_abs_diff_eq!(tone_for(128), 1901.56, epsilon = 1e-2);
    }

    #[test]
    fn strictly_monotonic() {
        for value in 0..255u8 {
            let low = tone_for(value);
            let high = tone_for(value + 1);
            assert!(high > low, "{value}: {low} >= {high}");
            assert!((CHANNEL_LOW_TONE..=CHANNEL_HIGH_TONE + 1e-3).contains(&high));
        }
    }

    #[test]
    fn park_is_inert() {
        assert!(ToneEvent::new(PARK_FREQUENCY, VOX_TIME).is_inert());
        assert!(!ToneEvent::new(SYNC_TONE, VIS_BIT_TIME).is_inert());
    }
}
