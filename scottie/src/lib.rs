//! Scottie S1 slow-scan television encoder.
//!
//! A 320×256 RGB raster is turned into a sequence of audio tones: an optional
//! VOX burst, the VIS calibration header and 256 lines of green, blue and red
//! pixel scans. Tones are written to an [`Oscillator`](oscillator::Oscillator),
//! which can be played live ([`audio`]) or recorded and rendered to a WAV file
//! ([`sink::wav`]).

#[cfg(feature = "audio")]
pub mod audio;
pub mod modes;
pub mod oscillator;
pub mod overlay;
pub mod raster;
pub mod scan;
pub mod sequencer;
pub mod sink;
pub mod source;
pub mod telemetry;
pub mod timebase;
pub mod tone;

pub use crate::{
    modes::ModeSpecification,
    overlay::HeaderRasterizer,
    raster::Raster,
    sequencer::{
        AbortHandle,
        TransmitConfig,
        TransmitSummary,
        Transmitter,
    },
    tone::tone_for,
};
