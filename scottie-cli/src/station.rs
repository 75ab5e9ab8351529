use std::{
    path::Path,
    time::Duration,
};

use color_eyre::eyre::bail;
use scottie::{
    ModeSpecification,
    TransmitConfig,
    sink::wav::DEFAULT_SAMPLE_RATE,
    telemetry::Position,
};
use serde::{
    Deserialize,
    Serialize,
};

use crate::{
    Error,
    args::{
        HeaderArgs,
        TransmitArgs,
    },
};

/// Settings of the transmitting station, stored as TOML.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Station {
    pub callsign: String,
    /// Fixed telemetry line. Takes precedence over `position`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telemetry: Option<String>,
    pub vox: bool,
    /// Pixel clock period in microseconds. Live transmission defaults to the
    /// calibrated period, rendering to the nominal pixel time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pixel_period: Option<u64>,
    pub sample_rate: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<StationPosition>,
}

impl Default for Station {
    fn default() -> Self {
        Self {
            callsign: "N0CALL".to_owned(),
            telemetry: None,
            vox: true,
            pixel_period: None,
            sample_rate: DEFAULT_SAMPLE_RATE,
            position: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StationPosition {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub altitude: f64,
}

impl Station {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Error> {
        tracing::debug!(path = %path.as_ref().display(), "Loading station from file");
        Ok(toml::from_str(&std::fs::read_to_string(path)?)?)
    }

    pub fn to_path(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        tracing::debug!(path = %path.as_ref().display(), "Writing station to file");
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn apply_header_args(&mut self, args: HeaderArgs) {
        if let Some(callsign) = args.callsign {
            self.callsign = callsign;
        }
        if let Some(telemetry) = args.telemetry {
            self.telemetry = Some(telemetry);
        }
    }

    pub fn apply_transmit_args(&mut self, args: &TransmitArgs) {
        if args.no_vox {
            self.vox = false;
        }
        if let Some(pixel_period) = args.pixel_period {
            self.pixel_period = Some(pixel_period);
        }
        if let Some(sample_rate) = args.sample_rate {
            self.sample_rate = sample_rate;
        }
    }

    pub fn telemetry_line(&self) -> String {
        match (&self.telemetry, &self.position) {
            (Some(telemetry), _) => telemetry.clone(),
            (None, Some(position)) => {
                Position::new(position.latitude, position.longitude, position.altitude)
                    .to_telemetry()
            }
            (None, None) => String::new(),
        }
    }

    pub fn check(&self) -> Result<(), Error> {
        if self.pixel_period == Some(0) {
            bail!("Pixel period must be greater than 0");
        }
        if self.sample_rate == 0 {
            bail!("Sample rate must be greater than 0");
        }
        Ok(())
    }

    /// Settings for live transmission.
    pub fn transmit_config(&self) -> TransmitConfig {
        self.config_with_pixel_period(TransmitConfig::DEFAULT_PIXEL_PERIOD)
    }

    /// Settings for rendering on a simulated timebase, which has no dispatch
    /// overhead to calibrate for.
    pub fn render_config(&self) -> TransmitConfig {
        self.config_with_pixel_period(ModeSpecification::S1.pixel_time)
    }

    fn config_with_pixel_period(&self, default: Duration) -> TransmitConfig {
        TransmitConfig {
            vox: self.vox,
            pixel_period: self.pixel_period.map_or(default, Duration::from_micros),
            ..Default::default()
        }
    }
}
