use std::path::PathBuf;

use clap::{
    Parser,
    Subcommand,
};

#[derive(Debug, Parser)]
pub struct Args {
    /// Station file. Defaults to `station.toml` in the config directory.
    #[clap(short, long)]
    pub station: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Scale an image to 320x256 and burn the header into it.
    Prepare {
        /// Image to read (JPEG or PNG).
        input: PathBuf,

        /// Raster file to write.
        output: PathBuf,

        #[clap(flatten)]
        header: HeaderArgs,
    },

    /// Burn the header into an existing raster file in place.
    Overlay {
        raster: PathBuf,

        #[clap(flatten)]
        header: HeaderArgs,
    },

    /// Render a raster file to a WAV file.
    Render {
        input: PathBuf,

        output: PathBuf,

        #[clap(flatten)]
        transmit: TransmitArgs,
    },

    /// Play a raster file on the default audio output in real time.
    Transmit {
        input: PathBuf,

        /// Output volume
        #[clap(long, default_value = "0.5")]
        volume: f32,

        #[clap(flatten)]
        transmit: TransmitArgs,
    },
}

#[derive(Debug, clap::Args)]
pub struct HeaderArgs {
    /// Callsign shown in the banner. Overrides the station file.
    #[clap(short, long)]
    pub callsign: Option<String>,

    /// Telemetry line. Overrides the station file.
    #[clap(short, long)]
    pub telemetry: Option<String>,
}

#[derive(Debug, clap::Args)]
pub struct TransmitArgs {
    /// Don't send the VOX tones.
    #[clap(long)]
    pub no_vox: bool,

    /// Pixel clock period in microseconds.
    #[clap(long)]
    pub pixel_period: Option<u64>,

    /// Audio sample rate
    #[clap(long = "samplerate")]
    pub sample_rate: Option<u32>,
}
